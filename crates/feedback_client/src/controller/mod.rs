//! Workflow controllers. Each owns one tagged state enum and changes it only
//! through its `transition` function; views re-render from that state.

use std::sync::Arc;

use crate::{notifications::NotificationChannel, session::SessionContext, transport::FeedbackApi};

pub mod auth;
pub mod listing;
pub mod pagination;
pub mod submission;

/// View the caller should show next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    SignIn,
    Listing,
    SubmissionForm,
}

/// Collaborators shared by every controller. The session store is the only
/// state read across controllers; only the auth controller writes it.
#[derive(Clone)]
pub struct ControllerContext {
    pub session: SessionContext,
    pub api: Arc<dyn FeedbackApi>,
    pub notifications: Arc<NotificationChannel>,
}

impl ControllerContext {
    pub fn new(
        session: SessionContext,
        api: Arc<dyn FeedbackApi>,
        notifications: Arc<NotificationChannel>,
    ) -> Self {
        Self {
            session,
            api,
            notifications,
        }
    }
}
