use serde::{Deserialize, Serialize};

use crate::domain::{Category, FeedbackId, FeedbackRecord, UserId};

/// Header carrying the session token on authenticated calls.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

pub mod paths {
    pub const SIGN_IN: &str = "/users/sign-in";
    pub const SIGN_UP: &str = "/users/sign-up";
    pub const SIGN_OUT: &str = "/users/sign-out";
    pub const FEEDBACK_LIST: &str = "/feedback/list";
    pub const FEEDBACK_SUBMIT: &str = "/feedback/submit";
    pub const COMMENT_SUBMIT: &str = "/feedback/comment/submit";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInUser {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: SignedInUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

/// Envelope used by sign-out, feedback submission and comment submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultResponse {
    pub result: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackListResponse {
    #[serde(default)]
    pub feedback: Vec<FeedbackRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub user_id: UserId,
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitCommentRequest {
    pub feedback_id: FeedbackId,
    pub user_id: UserId,
    pub content: String,
}
