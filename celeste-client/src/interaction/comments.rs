use std::sync::{Arc, Mutex};
use std::time::Duration;

use celeste_types::{Comment, CommentStats};
use chrono::Utc;
use uuid::Uuid;

use super::collection::{ItemCollection, SharedItems};
use super::inflight::Loading;
use super::likes::LikeCoordinator;
use super::notice::{categorize_error, Notice, NoticeSink};
use super::InteractionError;
use crate::api::InteractionApi;
use crate::session::ViewerContext;

/// State of the single compose dialog shared by a comment thread
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ComposeDialog {
    #[default]
    Closed,
    /// Composing a top-level comment on the parent post
    OpenForItem,
    /// Composing a reply to an existing comment
    OpenForComment(Comment),
}

impl ComposeDialog {
    pub fn is_open(&self) -> bool {
        !matches!(self, ComposeDialog::Closed)
    }

    pub fn reply_target(&self) -> Option<&Comment> {
        match self {
            ComposeDialog::OpenForComment(comment) => Some(comment),
            _ => None,
        }
    }
}

/// Comments attached to one post: loading, optimistic submission, the
/// compose dialog and per-comment likes.
pub struct CommentThread {
    post_id: String,
    api: Arc<dyn InteractionApi>,
    viewer: ViewerContext,
    notices: Arc<dyn NoticeSink>,
    comments: Arc<SharedItems<Comment>>,
    dialog: Mutex<ComposeDialog>,
    loading: Loading,
    likes: LikeCoordinator<Comment>,
}

impl CommentThread {
    pub fn new(
        post_id: impl Into<String>,
        api: Arc<dyn InteractionApi>,
        viewer: ViewerContext,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        let comments = SharedItems::new(Vec::new());
        let likes: LikeCoordinator<Comment> = LikeCoordinator::new(
            Arc::clone(&api),
            viewer.clone(),
            comments.clone(),
            Arc::clone(&notices),
        );

        Self {
            post_id: post_id.into(),
            api,
            viewer,
            notices,
            comments,
            dialog: Mutex::new(ComposeDialog::Closed),
            loading: Loading::default(),
            likes,
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.comments.items()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Like coordinator scoped to this thread's comments
    pub fn comment_likes(&self) -> &LikeCoordinator<Comment> {
        &self.likes
    }

    pub fn dialog(&self) -> ComposeDialog {
        self.lock_dialog().clone()
    }

    pub fn is_dialog_open(&self) -> bool {
        self.lock_dialog().is_open()
    }

    pub fn reply_target(&self) -> Option<Comment> {
        self.lock_dialog().reply_target().cloned()
    }

    /// Open the compose dialog, replying to `target` if given or to the post otherwise
    pub fn open_reply_dialog(&self, target: Option<Comment>) {
        let next = match target {
            Some(comment) => ComposeDialog::OpenForComment(comment),
            None => ComposeDialog::OpenForItem,
        };
        *self.lock_dialog() = next;
    }

    /// Cancel composing and forget the reply target
    pub fn close_dialog(&self) {
        *self.lock_dialog() = ComposeDialog::Closed;
    }

    /// Replace the local list with the server's. On failure the previous list stays.
    ///
    /// Overlapping calls each replace the whole list when they settle, so a
    /// slow older response can overwrite a newer one. `is_loading` stays true
    /// until the last of them settles.
    pub async fn fetch_comments(&self) -> Result<usize, InteractionError> {
        if self.post_id.is_empty() {
            return Ok(0);
        }

        let result = {
            let _loading = self.loading.begin();
            self.api.fetch_comments(&self.post_id).await
        };

        match result {
            Ok(comments) => {
                let count = comments.len();
                self.comments.replace(comments);
                log_interaction!("post {} loaded {} comments", self.post_id, count);
                Ok(count)
            }
            Err(e) => {
                log::warn!("post {} comments failed to load: {}", self.post_id, e);
                self.notices.notify(Notice::error(format!(
                    "Failed to load comments. {}",
                    categorize_error(&e)
                )));
                Err(InteractionError::Api(e))
            }
        }
    }

    /// Submit `content` as a comment on the post, or as a reply to the
    /// dialog's target comment. On success the new comment is prepended to
    /// the local list and the dialog closes.
    pub async fn handle_comment(&self, content: &str) -> Result<Comment, InteractionError> {
        let Some(viewer) = self.viewer.current() else {
            self.notices.notify(Notice::warning("Please sign in to comment"));
            return Err(InteractionError::NotSignedIn);
        };

        if content.trim().is_empty() {
            self.notices.notify(Notice::warning("Comment cannot be empty"));
            return Err(InteractionError::EmptyContent);
        }

        let reply_to = self.reply_target().map(|comment| comment.id);

        let created_id = match self
            .api
            .create_comment(&self.post_id, &viewer.handle, content, reply_to.as_deref())
            .await
        {
            Ok(id) => id,
            Err(e) => {
                log::warn!("post {} comment submission failed: {}", self.post_id, e);
                self.notices.notify(Notice::error(format!(
                    "Comment failed, please try again. {}",
                    categorize_error(&e)
                )));
                return Err(InteractionError::Api(e));
            }
        };

        let now = Utc::now();
        let comment = Comment {
            id: created_id.unwrap_or_else(|| format!("local-{}", Uuid::new_v4())),
            post_id: self.post_id.clone(),
            author_id: viewer.handle.clone(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
            likes: Vec::new(),
            reply_to,
            author: Some(viewer.as_author()),
            stats: Some(CommentStats::default()),
        };

        self.comments.update(&mut |current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.push(comment.clone());
            next.extend_from_slice(current);
            Some(next)
        });
        self.close_dialog();

        log_interaction!("post {} comment {} prepended", self.post_id, comment.id);
        self.notices.notify(Notice::success("Comment posted"));
        Ok(comment)
    }

    fn lock_dialog(&self) -> std::sync::MutexGuard<'_, ComposeDialog> {
        self.dialog.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Refetch `thread`'s comments every `every` until the returned task is aborted
pub fn poll_comments(thread: Arc<CommentThread>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            // Failures already surfaced as notices
            let _ = thread.fetch_comments().await;
        }
    })
}
