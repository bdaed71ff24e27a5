//! Recording `FeedbackApi` fake shared by the controller tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::{
    domain::{FeedbackId, FeedbackRecord, UserId},
    protocol::{
        SignInRequest, SignInResponse, SignUpRequest, SignedInUser, SubmitCommentRequest,
        SubmitFeedbackRequest,
    },
};

use crate::{
    controller::ControllerContext,
    error::ApiFailure,
    notifications::NotificationChannel,
    session::{Session, SessionStore},
    transport::FeedbackApi,
};

pub const TEST_TOKEN: &str = "tok-test";
pub const TEST_USER: UserId = UserId(7);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SignIn(SignInRequest),
    SignUp(SignUpRequest),
    SignOut { token: String },
    ListFeedback { token: String },
    SubmitFeedback { token: String, request: SubmitFeedbackRequest },
    SubmitComment { token: String, request: SubmitCommentRequest },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Accept,
    /// Answered with `result: false` or an error status.
    Reject(Option<String>),
    /// Never answered.
    Transport,
}

impl Reply {
    fn outcome(&self, status: u16) -> Result<(), ApiFailure> {
        match self {
            Reply::Accept => Ok(()),
            Reply::Reject(message) => Err(ApiFailure::rejected(status, message.clone())),
            Reply::Transport => Err(ApiFailure::Transport("connection refused".into())),
        }
    }
}

pub struct RecordingApi {
    pub sign_in: Reply,
    pub sign_up: Reply,
    pub sign_out: Reply,
    pub list: Reply,
    pub submit: Reply,
    pub comment: Reply,
    pub records: Vec<FeedbackRecord>,
    pub signed_in_user: UserId,
    pub log: Mutex<Vec<Call>>,
}

impl Default for RecordingApi {
    fn default() -> Self {
        Self {
            sign_in: Reply::Accept,
            sign_up: Reply::Accept,
            sign_out: Reply::Accept,
            list: Reply::Accept,
            submit: Reply::Accept,
            comment: Reply::Accept,
            records: Vec::new(),
            signed_in_user: TEST_USER,
            log: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingApi {
    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().expect("call log lock").clone()
    }

    fn record(&self, call: Call) {
        self.log.lock().expect("call log lock").push(call);
    }
}

#[async_trait]
impl FeedbackApi for RecordingApi {
    async fn sign_in(&self, request: SignInRequest) -> Result<SignInResponse, ApiFailure> {
        self.record(Call::SignIn(request));
        self.sign_in.outcome(401)?;
        Ok(SignInResponse {
            token: TEST_TOKEN.into(),
            user: SignedInUser {
                user_id: self.signed_in_user,
            },
        })
    }

    async fn sign_up(&self, request: SignUpRequest) -> Result<(), ApiFailure> {
        self.record(Call::SignUp(request));
        self.sign_up.outcome(409)
    }

    async fn sign_out(&self, token: &str) -> Result<(), ApiFailure> {
        self.record(Call::SignOut {
            token: token.into(),
        });
        self.sign_out.outcome(200)
    }

    async fn list_feedback(&self, token: &str) -> Result<Vec<FeedbackRecord>, ApiFailure> {
        self.record(Call::ListFeedback {
            token: token.into(),
        });
        self.list.outcome(401)?;
        Ok(self.records.clone())
    }

    async fn submit_feedback(
        &self,
        token: &str,
        request: SubmitFeedbackRequest,
    ) -> Result<(), ApiFailure> {
        self.record(Call::SubmitFeedback {
            token: token.into(),
            request,
        });
        self.submit.outcome(200)
    }

    async fn submit_comment(
        &self,
        token: &str,
        request: SubmitCommentRequest,
    ) -> Result<(), ApiFailure> {
        self.record(Call::SubmitComment {
            token: token.into(),
            request,
        });
        self.comment.outcome(200)
    }
}

pub fn context_with(api: RecordingApi) -> (ControllerContext, Arc<RecordingApi>) {
    let api = Arc::new(api);
    let ctx = ControllerContext::new(
        SessionStore::in_memory(),
        api.clone(),
        Arc::new(NotificationChannel::new()),
    );
    (ctx, api)
}

pub async fn seed_session(ctx: &ControllerContext) {
    ctx.session
        .save(&Session {
            token: TEST_TOKEN.into(),
            user_id: TEST_USER,
        })
        .await
        .expect("seed session");
}

pub fn sample_records(count: usize) -> Vec<FeedbackRecord> {
    (0..count)
        .map(|i| FeedbackRecord {
            feedback_id: FeedbackId(100 + i as i64),
            title: format!("Feedback {i}"),
            category: "Bug Report".into(),
            description: format!("Description {i}"),
            rating: (i % 6) as u8,
            user_id: UserId(500 + i as i64),
            firstname: "Ada".into(),
            lastname: format!("Tester{i}"),
            created_at: format!("2024-03-{:02}T10:00:00Z", (i % 28) + 1),
        })
        .collect()
}
