//! Sign-in, sign-up and sign-out.

use shared::protocol::{SignInRequest, SignUpRequest};
use tracing::{error, info, warn};

use super::{ControllerContext, Navigation};
use crate::{
    notifications::{AlertKind, AUTH_ALERT_TTL},
    session::Session,
    validation::{fields, FormState},
};

pub const INVALID_CREDENTIALS: &str = "Invalid Credentials. Please try again!";
pub const SIGN_UP_SUCCEEDED: &str = "Sign up successful. Redirecting to feedback list...";
pub const SIGN_UP_FAILED: &str = "Error signing up. Please check you input details and try again.";
pub const SIGNED_OUT: &str = "User signed out successfully";
pub const SIGN_OUT_FAILED: &str = "Error signing out. Please try again.";
pub const SESSION_NOT_STORED: &str = "Unable to store your session. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOperation {
    SignIn,
    SignUp,
    SignOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    Validation,
    /// Non-2xx answer, `result: false`, or no answer at all.
    Rejected,
    SessionStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Idle,
    Validating(AuthOperation),
    Requesting(AuthOperation),
    Success(AuthOperation),
    Failed {
        operation: AuthOperation,
        failure: AuthFailure,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthEvent {
    Start(AuthOperation),
    Valid,
    Invalid,
    /// Straight to the request; sign-out has no form.
    Dispatch(AuthOperation),
    Accepted,
    Failed(AuthFailure),
    Reset,
}

fn transition(state: AuthState, event: AuthEvent) -> AuthState {
    use AuthState::*;

    match (state, event) {
        (_, AuthEvent::Reset) => Idle,
        (Idle | Success(_) | Failed { .. }, AuthEvent::Start(operation)) => Validating(operation),
        (Idle | Success(_) | Failed { .. }, AuthEvent::Dispatch(operation)) => {
            Requesting(operation)
        }
        (Validating(operation), AuthEvent::Valid) => Requesting(operation),
        (Validating(operation), AuthEvent::Invalid) => Failed {
            operation,
            failure: AuthFailure::Validation,
        },
        (Requesting(operation), AuthEvent::Accepted) => Success(operation),
        (Requesting(operation), AuthEvent::Failed(failure)) => Failed { operation, failure },
        (state, event) => {
            warn!(?state, ?event, "ignoring auth event not valid in current state");
            state
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

pub struct AuthController {
    ctx: ControllerContext,
    state: AuthState,
    sign_in_form: FormState,
    sign_up_form: FormState,
}

impl AuthController {
    pub fn new(ctx: ControllerContext) -> Self {
        Self {
            ctx,
            state: AuthState::Idle,
            sign_in_form: FormState::new(fields::SIGN_IN),
            sign_up_form: FormState::new(fields::SIGN_UP),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, AuthState::Requesting(_))
    }

    pub fn sign_in_form(&self) -> &FormState {
        &self.sign_in_form
    }

    pub fn sign_up_form(&self) -> &FormState {
        &self.sign_up_form
    }

    pub fn edit_sign_in(&mut self, field: &str, value: impl Into<String>) -> bool {
        self.sign_in_form.edit(field, value)
    }

    pub fn edit_sign_up(&mut self, field: &str, value: impl Into<String>) -> bool {
        self.sign_up_form.edit(field, value)
    }

    /// Returns a finished operation to `Idle`.
    pub fn acknowledge(&mut self) {
        self.apply(AuthEvent::Reset);
    }

    fn apply(&mut self, event: AuthEvent) {
        self.state = transition(self.state, event);
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Option<Navigation> {
        self.sign_in_form.edit(fields::EMAIL.name, email);
        self.sign_in_form.edit(fields::PASSWORD.name, password);
        self.submit_sign_in().await
    }

    pub async fn submit_sign_in(&mut self) -> Option<Navigation> {
        self.apply(AuthEvent::Start(AuthOperation::SignIn));
        if !self.sign_in_form.validate() {
            info!(
                errors = self.sign_in_form.errors().len(),
                "sign-in form validation failed"
            );
            self.apply(AuthEvent::Invalid);
            return None;
        }
        self.apply(AuthEvent::Valid);

        let request = SignInRequest {
            email: self.sign_in_form.value(fields::EMAIL.name).to_string(),
            password: self.sign_in_form.value(fields::PASSWORD.name).to_string(),
        };

        let response = match self.ctx.api.sign_in(request).await {
            Ok(response) => response,
            Err(failure) => {
                // The server's own message is deliberately not shown.
                warn!(error = %failure, code = ?failure.error_code(), "sign-in rejected");
                self.ctx
                    .notifications
                    .push(AlertKind::Error, INVALID_CREDENTIALS, Some(AUTH_ALERT_TTL))
                    .await;
                self.apply(AuthEvent::Failed(AuthFailure::Rejected));
                return None;
            }
        };

        let session = Session {
            token: response.token,
            user_id: response.user.user_id,
        };
        if let Err(err) = self.ctx.session.save(&session).await {
            error!(error = %err, "failed to persist session after sign-in");
            self.ctx
                .notifications
                .push(AlertKind::Error, SESSION_NOT_STORED, Some(AUTH_ALERT_TTL))
                .await;
            self.apply(AuthEvent::Failed(AuthFailure::SessionStore));
            return None;
        }

        info!(user_id = session.user_id.0, "signed in");
        self.sign_in_form.reset();
        self.apply(AuthEvent::Accepted);
        Some(Navigation::Listing)
    }

    pub async fn sign_up(&mut self, input: SignUpFields) -> Option<Navigation> {
        self.sign_up_form.edit(fields::FIRST_NAME.name, input.first_name);
        self.sign_up_form.edit(fields::LAST_NAME.name, input.last_name);
        self.sign_up_form.edit(fields::EMAIL.name, input.email);
        self.sign_up_form.edit(fields::PASSWORD.name, input.password);
        self.submit_sign_up().await
    }

    /// A new account is not signed in; success leads back to sign-in.
    pub async fn submit_sign_up(&mut self) -> Option<Navigation> {
        self.apply(AuthEvent::Start(AuthOperation::SignUp));
        if !self.sign_up_form.validate() {
            info!(
                errors = self.sign_up_form.errors().len(),
                "sign-up form validation failed"
            );
            self.apply(AuthEvent::Invalid);
            return None;
        }
        self.apply(AuthEvent::Valid);

        let form = &self.sign_up_form;
        let request = SignUpRequest {
            firstname: form.value(fields::FIRST_NAME.name).to_string(),
            lastname: form.value(fields::LAST_NAME.name).to_string(),
            email: form.value(fields::EMAIL.name).to_string(),
            password: form.value(fields::PASSWORD.name).to_string(),
        };

        match self.ctx.api.sign_up(request).await {
            Ok(()) => {
                info!("account created");
                self.ctx
                    .notifications
                    .push(AlertKind::Success, SIGN_UP_SUCCEEDED, Some(AUTH_ALERT_TTL))
                    .await;
                self.sign_up_form.reset();
                self.apply(AuthEvent::Accepted);
                Some(Navigation::SignIn)
            }
            Err(failure) => {
                warn!(error = %failure, code = ?failure.error_code(), "sign-up rejected");
                self.ctx
                    .notifications
                    .push(AlertKind::Error, SIGN_UP_FAILED, Some(AUTH_ALERT_TTL))
                    .await;
                self.apply(AuthEvent::Failed(AuthFailure::Rejected));
                None
            }
        }
    }

    /// Without a complete stored session this is a silent no-op that drops any
    /// leftover key. A failed request keeps the session: the server may still
    /// consider it valid.
    pub async fn sign_out(&mut self) -> Option<Navigation> {
        let Some(session) = self.ctx.session.load_or_clear().await else {
            warn!("sign-out requested without a stored session; ignoring");
            return None;
        };

        self.apply(AuthEvent::Dispatch(AuthOperation::SignOut));
        if let Err(failure) = self.ctx.api.sign_out(&session.token).await {
            warn!(error = %failure, code = ?failure.error_code(), "sign-out rejected");
            self.ctx
                .notifications
                .replace_sticky(AlertKind::Error, SIGN_OUT_FAILED)
                .await;
            self.apply(AuthEvent::Failed(AuthFailure::Rejected));
            return None;
        }

        if let Err(err) = self.ctx.session.clear().await {
            error!(error = %err, "signed out remotely but failed to clear stored session");
            self.ctx
                .notifications
                .replace_sticky(AlertKind::Error, SIGN_OUT_FAILED)
                .await;
            self.apply(AuthEvent::Failed(AuthFailure::SessionStore));
            return None;
        }

        info!(user_id = session.user_id.0, "signed out");
        self.ctx
            .notifications
            .replace_sticky(AlertKind::Success, SIGNED_OUT)
            .await;
        self.apply(AuthEvent::Accepted);
        Some(Navigation::SignIn)
    }
}

#[cfg(test)]
#[path = "../tests/auth_tests.rs"]
mod tests;
