//! Client-side workflows for the feedback service: session handling, form
//! validation, the HTTP seam, user notices and the three view controllers.

pub mod config;
pub mod controller;
pub mod error;
pub mod notifications;
pub mod session;
pub mod transport;
pub mod validation;

pub use config::{load_settings, ClientSettings};
pub use controller::{
    auth::{AuthController, AuthState, SignUpFields},
    listing::{CommentState, FetchState, ListingController},
    pagination::{PageSize, Pagination},
    submission::{SubmissionController, SubmissionState},
    ControllerContext, Navigation,
};
pub use error::{ApiFailure, SessionStoreError, SettingsError};
pub use notifications::{Alert, AlertKind, Banner, Notification, NotificationChannel};
pub use session::{
    JsonFileKeyValueStore, KeyValueStore, MemoryKeyValueStore, Session, SessionContext,
    SessionStore,
};
pub use transport::{FeedbackApi, HttpFeedbackApi};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
