use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use super::inflight::InFlight;
use super::notice::{categorize_error, Notice, NoticeSink};
use super::InteractionError;
use crate::api::InteractionApi;
use crate::session::ViewerContext;

/// Client-local bookmark set with optimistic toggling.
///
/// Bookmarks are not fetched at construction and live only as long as the
/// coordinator. Persistence goes through `InteractionApi::toggle_bookmark`,
/// which the HTTP client currently answers locally.
pub struct BookmarkCoordinator {
    api: Arc<dyn InteractionApi>,
    viewer: ViewerContext,
    notices: Arc<dyn NoticeSink>,
    bookmarked: RwLock<HashSet<String>>,
    in_flight: InFlight,
}

impl BookmarkCoordinator {
    pub fn new(
        api: Arc<dyn InteractionApi>,
        viewer: ViewerContext,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        Self {
            api,
            viewer,
            notices,
            bookmarked: RwLock::new(HashSet::new()),
            in_flight: InFlight::new(),
        }
    }

    pub fn is_bookmarked(&self, post_id: &str) -> bool {
        self.read().contains(post_id)
    }

    pub fn bookmarked_posts(&self) -> HashSet<String> {
        self.read().clone()
    }

    pub fn processing_posts(&self) -> HashSet<String> {
        self.in_flight.snapshot()
    }

    /// Flip the bookmark on `post_id`, returning whether it is bookmarked afterwards
    pub async fn toggle_bookmark(&self, post_id: &str) -> Result<bool, InteractionError> {
        let Some(viewer) = self.viewer.handle() else {
            self.notices.notify(Notice::warning("Please sign in to bookmark"));
            return Err(InteractionError::NotSignedIn);
        };

        let Some(_guard) = self.in_flight.try_acquire(post_id) else {
            log_interaction!("bookmark {} dropped, already in flight", post_id);
            return Err(InteractionError::InFlight(post_id.to_string()));
        };

        let was_bookmarked = self.set(post_id, None);
        log_interaction!(
            "bookmark {} optimistic {}",
            post_id,
            if was_bookmarked { "remove" } else { "add" }
        );

        match self.api.toggle_bookmark(post_id, &viewer).await {
            Ok(()) => Ok(!was_bookmarked),
            Err(e) => {
                self.set(post_id, Some(was_bookmarked));
                log::warn!("bookmark {} failed, rolled back: {}", post_id, e);
                self.notices.notify(Notice::error(categorize_error(&e)));
                Err(InteractionError::Api(e))
            }
        }
    }

    /// Set membership to `to`, or flip it when `to` is `None`. Returns the prior membership.
    fn set(&self, post_id: &str, to: Option<bool>) -> bool {
        let mut bookmarked = self.bookmarked.write().unwrap_or_else(|e| e.into_inner());
        let was = bookmarked.contains(post_id);
        if to.unwrap_or(!was) {
            bookmarked.insert(post_id.to_string());
        } else {
            bookmarked.remove(post_id);
        }
        was
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashSet<String>> {
        self.bookmarked.read().unwrap_or_else(|e| e.into_inner())
    }
}
