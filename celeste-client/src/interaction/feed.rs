use std::sync::{Arc, Mutex};

use celeste_types::Post;

use super::collection::{ItemCollection, SharedItems};
use super::inflight::Loading;
use super::likes::LikeCoordinator;
use super::notice::{categorize_error, Notice, NoticeSink};
use super::InteractionError;
use crate::api::{ApiError, InteractionApi};
use crate::session::ViewerContext;

/// The home feed: the post collection likes and bookmarks act on.
///
/// A failed load keeps the previous posts and records a message in
/// `error` until the next load starts.
pub struct HomeFeed {
    api: Arc<dyn InteractionApi>,
    notices: Arc<dyn NoticeSink>,
    posts: Arc<SharedItems<Post>>,
    loading: Loading,
    error: Mutex<Option<String>>,
}

impl HomeFeed {
    pub fn new(api: Arc<dyn InteractionApi>, notices: Arc<dyn NoticeSink>) -> Self {
        Self {
            api,
            notices,
            posts: SharedItems::new(Vec::new()),
            loading: Loading::default(),
            error: Mutex::new(None),
        }
    }

    pub fn posts(&self) -> Vec<Post> {
        self.posts.items()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Message from the last failed load, if it failed
    pub fn error(&self) -> Option<String> {
        self.lock_error().clone()
    }

    /// Like coordinator working on this feed's posts
    pub fn like_coordinator(&self, viewer: ViewerContext) -> LikeCoordinator<Post> {
        LikeCoordinator::new(
            Arc::clone(&self.api),
            viewer,
            self.posts.clone(),
            Arc::clone(&self.notices),
        )
    }

    pub async fn fetch_posts(&self) -> Result<usize, InteractionError> {
        *self.lock_error() = None;

        let result = {
            let _loading = self.loading.begin();
            self.api.fetch_home_posts().await
        };

        match result {
            Ok(posts) => {
                let count = posts.len();
                self.posts.replace(posts);
                log_interaction!("home feed loaded {} posts", count);
                Ok(count)
            }
            Err(e) => {
                log::warn!("home feed failed to load: {}", e);
                let message = match &e {
                    ApiError::Envelope { message, .. } => message.clone(),
                    _ => "Failed to load home posts".to_string(),
                };
                *self.lock_error() = Some(message);
                self.notices.notify(Notice::error(categorize_error(&e)));
                Err(InteractionError::Api(e))
            }
        }
    }

    fn lock_error(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.error.lock().unwrap_or_else(|e| e.into_inner())
    }
}
