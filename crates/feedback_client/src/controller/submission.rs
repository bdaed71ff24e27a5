//! Feedback creation: validate, attach the session identity, submit.

use rand::Rng;
use shared::{domain::Category, protocol::SubmitFeedbackRequest};
use tracing::{debug, info, warn};

use super::{ControllerContext, Navigation};
use crate::{
    notifications::{AlertKind, FORM_ALERT_TTL},
    validation::{fields, FormState},
};

pub const SUBMITTED: &str = "Feedback submitted successfully!";
pub const SUBMIT_FAILED: &str = "Error submitting feedback. Please try again.";
pub const MISSING_CREDENTIALS: &str = "Missing credentials. Please sign in again.";

pub const MIN_RATING: u8 = 0;
pub const MAX_RATING: u8 = 5;

/// Rating attached to every submission. It is not user input: each submit
/// draws a fresh value uniformly from `0..=5`.
pub fn random_rating<R: Rng>(rng: &mut R) -> u8 {
    let raw: i32 = rng.random_range(i32::from(MIN_RATING)..=i32::from(MAX_RATING));
    raw.clamp(i32::from(MIN_RATING), i32::from(MAX_RATING)) as u8
}

/// A validated draft ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionFailure {
    Validation,
    SessionMissing,
    /// Rejected by the service or never answered.
    Request,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    AttachingIdentity,
    Submitting,
    Success,
    Failed(SubmissionFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubmissionEvent {
    Start,
    Valid,
    Invalid,
    IdentityAttached,
    Accepted,
    Failed(SubmissionFailure),
    Reset,
}

fn transition(state: SubmissionState, event: SubmissionEvent) -> SubmissionState {
    use SubmissionState::*;

    match (state, event) {
        (_, SubmissionEvent::Reset) => Idle,
        (Idle | Success | Failed(_), SubmissionEvent::Start) => Validating,
        (Validating, SubmissionEvent::Valid) => AttachingIdentity,
        (Validating, SubmissionEvent::Invalid) => Failed(SubmissionFailure::Validation),
        (AttachingIdentity, SubmissionEvent::IdentityAttached) => Submitting,
        (AttachingIdentity, SubmissionEvent::Failed(SubmissionFailure::SessionMissing)) => {
            Failed(SubmissionFailure::SessionMissing)
        }
        (Submitting, SubmissionEvent::Accepted) => Success,
        (Submitting, SubmissionEvent::Failed(failure)) => Failed(failure),
        (state, event) => {
            warn!(?state, ?event, "ignoring submission event not valid in current state");
            state
        }
    }
}

pub struct SubmissionController {
    ctx: ControllerContext,
    state: SubmissionState,
    form: FormState,
    last_rating: Option<u8>,
}

impl SubmissionController {
    pub fn new(ctx: ControllerContext) -> Self {
        Self {
            ctx,
            state: SubmissionState::Idle,
            form: FormState::new(fields::FEEDBACK),
            last_rating: None,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Re-entrant submits while this is true are outside the contract.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            SubmissionState::AttachingIdentity | SubmissionState::Submitting
        )
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn edit(&mut self, field: &str, value: impl Into<String>) -> bool {
        self.form.edit(field, value)
    }

    pub fn last_rating(&self) -> Option<u8> {
        self.last_rating
    }

    /// Drops the draft, e.g. when the user navigates away.
    pub fn reset(&mut self) {
        self.form.reset();
        self.last_rating = None;
        self.state = transition(self.state, SubmissionEvent::Reset);
    }

    fn apply(&mut self, event: SubmissionEvent) {
        self.state = transition(self.state, event);
    }

    fn validated_draft(&mut self) -> Option<FeedbackDraft> {
        if !self.form.validate() {
            return None;
        }
        match self.form.value(fields::CATEGORY.name).parse::<Category>() {
            Ok(category) => Some(FeedbackDraft {
                title: self.form.value(fields::TITLE.name).to_string(),
                description: self.form.value(fields::DESCRIPTION.name).to_string(),
                category,
            }),
            Err(err) => {
                debug!(error = %err, "category is not one of the offered labels");
                self.form
                    .set_error(fields::CATEGORY.name, fields::CATEGORY.required_message());
                None
            }
        }
    }

    pub async fn submit(&mut self) -> Option<Navigation> {
        let rating = random_rating(&mut rand::rng());
        self.submit_with_rating(rating).await
    }

    async fn submit_with_rating(&mut self, rating: u8) -> Option<Navigation> {
        self.apply(SubmissionEvent::Start);
        let Some(draft) = self.validated_draft() else {
            info!(errors = self.form.errors().len(), "feedback validation failed");
            self.apply(SubmissionEvent::Invalid);
            return None;
        };
        self.apply(SubmissionEvent::Valid);

        let Some(session) = self.ctx.session.load_or_clear().await else {
            warn!("feedback submit attempted without a stored session");
            self.ctx
                .notifications
                .push(AlertKind::Error, MISSING_CREDENTIALS, Some(FORM_ALERT_TTL))
                .await;
            self.apply(SubmissionEvent::Failed(SubmissionFailure::SessionMissing));
            return None;
        };

        let request = SubmitFeedbackRequest {
            title: draft.title,
            description: draft.description,
            category: draft.category,
            user_id: session.user_id,
            rating,
        };
        self.last_rating = Some(rating);
        self.apply(SubmissionEvent::IdentityAttached);

        match self.ctx.api.submit_feedback(&session.token, request).await {
            Ok(()) => {
                info!(
                    user_id = session.user_id.0,
                    category = %draft.category,
                    rating,
                    "feedback submitted"
                );
                self.ctx
                    .notifications
                    .push(AlertKind::Success, SUBMITTED, Some(FORM_ALERT_TTL))
                    .await;
                self.form.reset();
                self.apply(SubmissionEvent::Accepted);
                Some(Navigation::Listing)
            }
            Err(failure) => {
                // The draft stays so the user can retry without retyping.
                warn!(error = %failure, code = ?failure.error_code(), "feedback submit failed");
                self.ctx
                    .notifications
                    .push(AlertKind::Error, SUBMIT_FAILED, Some(FORM_ALERT_TTL))
                    .await;
                self.apply(SubmissionEvent::Failed(SubmissionFailure::Request));
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/submission_tests.rs"]
mod tests;
