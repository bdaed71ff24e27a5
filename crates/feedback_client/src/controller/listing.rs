//! Feedback list, local pagination and the comment modal.

use shared::{
    domain::{FeedbackId, FeedbackRecord, UserId},
    protocol::SubmitCommentRequest,
};
use tracing::{debug, info, warn};

use super::{
    pagination::{PageSize, Pagination},
    submission::MISSING_CREDENTIALS,
    ControllerContext, Navigation,
};
use crate::{
    notifications::{AlertKind, BANNER_TTL},
    validation::{fields, validate_first, FieldSpec, ValidationErrorMap},
};

pub const COMMENT_SUBMITTING: &str = "Submitting Comment...";
pub const COMMENT_POSTED: &str = "Comment posted successfully";
pub const COMMENT_FAILED: &str = "Error posting comment. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    SessionMissing,
    Request,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Loaded,
    Failed(FetchFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchEvent {
    Start,
    Missing,
    Received,
    Failed,
}

fn fetch_transition(state: FetchState, event: FetchEvent) -> FetchState {
    use FetchState::*;

    match (state, event) {
        (Loading, FetchEvent::Start) => {
            warn!("list fetch already in flight");
            Loading
        }
        (_, FetchEvent::Start) => Loading,
        (Idle | Loaded | Failed(_), FetchEvent::Missing) => Failed(FetchFailure::SessionMissing),
        (Loading, FetchEvent::Received) => Loaded,
        (Loading, FetchEvent::Failed) => Failed(FetchFailure::Request),
        (state, event) => {
            warn!(?state, ?event, "ignoring fetch event not valid in current state");
            state
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentFailure {
    Validation,
    SessionMissing,
    Request,
}

/// The modal is open in every state but `Closed`. `Success` and non-validation
/// failures are reported through [`ListingController::last_comment_outcome`]
/// since the modal closes as soon as the attempt finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentState {
    Closed,
    Open,
    Validating,
    Submitting,
    Success,
    Failed(CommentFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentEvent {
    Select,
    Submit,
    Valid,
    Invalid,
    Accepted,
    Failed(CommentFailure),
    Close,
}

fn comment_transition(state: CommentState, event: CommentEvent) -> CommentState {
    use CommentState::*;

    match (state, event) {
        (_, CommentEvent::Close) => Closed,
        (Closed | Open | Failed(CommentFailure::Validation), CommentEvent::Select) => Open,
        (Open | Failed(CommentFailure::Validation), CommentEvent::Submit) => Validating,
        (Validating, CommentEvent::Invalid) => Failed(CommentFailure::Validation),
        (Validating, CommentEvent::Valid) => Submitting,
        (Submitting, CommentEvent::Accepted) => Success,
        (Submitting, CommentEvent::Failed(failure)) => Failed(failure),
        (state, event) => {
            warn!(?state, ?event, "ignoring comment event not valid in current state");
            state
        }
    }
}

/// Comment being written for one selected row. Username and date are seeded
/// from the row for display and are never sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub feedback_id: FeedbackId,
    pub user_id: UserId,
    pub content: String,
    pub username_display: String,
    pub date_display: String,
}

impl CommentDraft {
    fn for_record(record: &FeedbackRecord) -> Self {
        Self {
            feedback_id: record.feedback_id,
            user_id: record.user_id,
            content: String::new(),
            username_display: record.author_display(),
            date_display: record.created_at.clone(),
        }
    }

    fn field_values(&self) -> [(&'static FieldSpec, &str); 3] {
        [
            (&fields::USERNAME, self.username_display.as_str()),
            (&fields::DATE, self.date_display.as_str()),
            (&fields::COMMENT, self.content.as_str()),
        ]
    }
}

pub struct ListingController {
    ctx: ControllerContext,
    fetch_state: FetchState,
    records: Vec<FeedbackRecord>,
    pagination: Pagination,
    comment_state: CommentState,
    draft: Option<CommentDraft>,
    comment_errors: ValidationErrorMap,
    last_comment_outcome: Option<CommentState>,
}

impl ListingController {
    pub fn new(ctx: ControllerContext) -> Self {
        Self {
            ctx,
            fetch_state: FetchState::Idle,
            records: Vec::new(),
            pagination: Pagination::default(),
            comment_state: CommentState::Closed,
            draft: None,
            comment_errors: ValidationErrorMap::default(),
            last_comment_outcome: None,
        }
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch_state
    }

    pub fn records(&self) -> &[FeedbackRecord] {
        &self.records
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn visible_records(&self) -> &[FeedbackRecord] {
        self.pagination.visible_slice(&self.records)
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.records.len())
    }

    pub fn set_page(&mut self, page: usize) {
        self.pagination.set_page(page);
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.pagination.set_page_size(page_size);
    }

    pub fn comment_state(&self) -> CommentState {
        self.comment_state
    }

    pub fn is_comment_open(&self) -> bool {
        self.comment_state != CommentState::Closed
    }

    pub fn comment_draft(&self) -> Option<&CommentDraft> {
        self.draft.as_ref()
    }

    pub fn comment_errors(&self) -> &ValidationErrorMap {
        &self.comment_errors
    }

    /// How the most recent comment attempt ended once the modal closed.
    pub fn last_comment_outcome(&self) -> Option<CommentState> {
        self.last_comment_outcome
    }

    pub fn open_submission_form(&self) -> Navigation {
        Navigation::SubmissionForm
    }

    /// Replaces the collection wholesale. Without a complete session nothing is
    /// requested and nothing is shown, and any partial session is removed; a
    /// failed request keeps the stale list.
    pub async fn fetch(&mut self) {
        let Some(session) = self.ctx.session.load_or_clear().await else {
            warn!("feedback list requested without a stored session");
            self.fetch_state = fetch_transition(self.fetch_state, FetchEvent::Missing);
            return;
        };

        self.fetch_state = fetch_transition(self.fetch_state, FetchEvent::Start);
        match self.ctx.api.list_feedback(&session.token).await {
            Ok(records) => {
                info!(count = records.len(), "feedback list loaded");
                self.records = records;
                self.fetch_state = fetch_transition(self.fetch_state, FetchEvent::Received);
            }
            Err(failure) => {
                warn!(
                    error = %failure,
                    code = ?failure.error_code(),
                    kept = self.records.len(),
                    "feedback list fetch failed"
                );
                self.fetch_state = fetch_transition(self.fetch_state, FetchEvent::Failed);
            }
        }
    }

    /// Opens the comment modal for the row at `index` in the full collection.
    pub fn select_row(&mut self, index: usize) -> bool {
        let Some(record) = self.records.get(index) else {
            debug!(index, len = self.records.len(), "no feedback row at index");
            return false;
        };
        self.draft = Some(CommentDraft::for_record(record));
        self.last_comment_outcome = None;
        self.comment_state = comment_transition(self.comment_state, CommentEvent::Select);
        true
    }

    pub fn select_feedback(&mut self, feedback_id: FeedbackId) -> bool {
        match self
            .records
            .iter()
            .position(|record| record.feedback_id == feedback_id)
        {
            Some(index) => self.select_row(index),
            None => {
                debug!(%feedback_id, "feedback not in the loaded list");
                false
            }
        }
    }

    /// Edits a modal field. Unlike the other forms, existing errors stay
    /// until the next successful validation.
    pub fn edit_comment_field(&mut self, field: &str, value: impl Into<String>) -> bool {
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        let slot = match field {
            f if f == fields::USERNAME.name => &mut draft.username_display,
            f if f == fields::DATE.name => &mut draft.date_display,
            f if f == fields::COMMENT.name => &mut draft.content,
            _ => return false,
        };
        *slot = value.into();
        true
    }

    pub fn cancel_comment(&mut self) {
        self.close_comment();
    }

    fn close_comment(&mut self) {
        self.draft = None;
        self.comment_errors.clear();
        self.comment_state = comment_transition(self.comment_state, CommentEvent::Close);
    }

    fn finish_comment(&mut self, event: CommentEvent) {
        self.comment_state = comment_transition(self.comment_state, event);
        self.last_comment_outcome = Some(self.comment_state);
        self.close_comment();
    }

    pub async fn submit_comment(&mut self) {
        let Some(draft) = self.draft.clone() else {
            debug!("comment submit without a selected row");
            return;
        };

        self.comment_state = comment_transition(self.comment_state, CommentEvent::Submit);
        let errors = validate_first(draft.field_values());
        if !errors.is_valid() {
            info!(field = ?errors.iter().next().map(|(field, _)| field), "comment validation failed");
            for (field, message) in errors.iter() {
                self.comment_errors.insert(field, message);
            }
            self.comment_state = comment_transition(self.comment_state, CommentEvent::Invalid);
            return;
        }
        self.comment_errors.clear();
        self.comment_state = comment_transition(self.comment_state, CommentEvent::Valid);

        let Some(session) = self.ctx.session.load_or_clear().await else {
            warn!("comment submit attempted without a stored session");
            self.ctx
                .notifications
                .replace_sticky(AlertKind::Error, MISSING_CREDENTIALS)
                .await;
            self.finish_comment(CommentEvent::Failed(CommentFailure::SessionMissing));
            return;
        };

        self.ctx
            .notifications
            .replace_sticky(AlertKind::Info, COMMENT_SUBMITTING)
            .await;
        let request = SubmitCommentRequest {
            feedback_id: draft.feedback_id,
            user_id: draft.user_id,
            content: draft.content,
        };

        match self.ctx.api.submit_comment(&session.token, request).await {
            Ok(()) => {
                info!(feedback_id = %draft.feedback_id, "comment posted");
                self.ctx.notifications.clear_info().await;
                self.ctx.notifications.show_banner(COMMENT_POSTED, BANNER_TTL).await;
                self.finish_comment(CommentEvent::Accepted);
            }
            Err(failure) => {
                warn!(
                    error = %failure,
                    code = ?failure.error_code(),
                    feedback_id = %draft.feedback_id,
                    "comment submit failed"
                );
                self.ctx
                    .notifications
                    .replace_sticky(AlertKind::Error, COMMENT_FAILED)
                    .await;
                self.finish_comment(CommentEvent::Failed(CommentFailure::Request));
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/listing_tests.rs"]
mod tests;
