use std::collections::HashSet;
use std::sync::Arc;

use celeste_types::{ItemKind, Likeable, ServerLikes, ViewerId};

use super::collection::ItemCollection;
use super::inflight::InFlight;
use super::notice::{categorize_error, Notice, NoticeSink};
use super::transform::{self, LikeSnapshot};
use super::InteractionError;
use crate::api::{ApiResult, InteractionApi};
use crate::session::ViewerContext;

/// Settled result of a like toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeToggle {
    pub item_id: String,
    /// Whether the viewer likes the item after settlement
    pub liked: bool,
    pub likes: Vec<ViewerId>,
}

/// Optimistic like/unlike over a view-owned collection of posts or comments.
///
/// At most one toggle per item is outstanding at a time; a second toggle on
/// the same id while the first is pending is refused without touching state
/// or the network. Toggles on different ids run independently and settle in
/// whatever order their responses arrive.
pub struct LikeCoordinator<T: Likeable> {
    api: Arc<dyn InteractionApi>,
    viewer: ViewerContext,
    items: Arc<dyn ItemCollection<T>>,
    notices: Arc<dyn NoticeSink>,
    in_flight: InFlight,
}

impl<T: Likeable> LikeCoordinator<T> {
    pub fn new(
        api: Arc<dyn InteractionApi>,
        viewer: ViewerContext,
        items: Arc<dyn ItemCollection<T>>,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        Self {
            api,
            viewer,
            items,
            notices,
            in_flight: InFlight::new(),
        }
    }

    /// Whether the current viewer is in `item.likes`. Anonymous viewers like nothing.
    pub fn is_liked(&self, item: &T) -> bool {
        match self.viewer.handle() {
            Some(handle) => transform::is_liked(item, &handle),
            None => false,
        }
    }

    /// Ids with a toggle still waiting on the server
    pub fn processing(&self) -> HashSet<String> {
        self.in_flight.snapshot()
    }

    pub fn is_processing(&self, item_id: &str) -> bool {
        self.in_flight.contains(item_id)
    }

    pub async fn toggle_like(&self, item_id: &str) -> Result<LikeToggle, InteractionError> {
        let Some(viewer) = self.viewer.handle() else {
            self.notices.notify(Notice::warning("Please sign in to like"));
            return Err(InteractionError::NotSignedIn);
        };

        let Some(_guard) = self.in_flight.try_acquire(item_id) else {
            log_interaction!("{} {} toggle dropped, already in flight", T::KIND, item_id);
            return Err(InteractionError::InFlight(item_id.to_string()));
        };

        let mut snapshot = None;
        self.items.update(&mut |items| {
            let (optimistic, taken) = transform::toggle_likes(items, item_id, &viewer)?;
            snapshot = Some(taken);
            Some(optimistic)
        });
        let Some(snapshot) = snapshot else {
            return Err(InteractionError::UnknownItem(item_id.to_string()));
        };

        log_interaction!(
            "{} {} optimistic {} by {}",
            T::KIND,
            item_id,
            if snapshot.was_liked { "unlike" } else { "like" },
            viewer
        );

        match self.send(item_id, &viewer, snapshot.was_liked).await {
            Ok(server) => Ok(self.reconcile(item_id, &viewer, server)),
            Err(e) => {
                self.rollback(&snapshot);
                log::warn!("{} {} like request failed, rolled back: {}", T::KIND, item_id, e);
                self.notices.notify(Notice::error(categorize_error(&e)));
                Err(InteractionError::Api(e))
            }
        }
    }

    async fn send(
        &self,
        item_id: &str,
        viewer: &str,
        was_liked: bool,
    ) -> ApiResult<Option<ServerLikes>> {
        match (T::KIND, was_liked) {
            (ItemKind::Post, false) => self.api.like_post(item_id, viewer).await,
            (ItemKind::Post, true) => self.api.unlike_post(item_id, viewer).await,
            (ItemKind::Comment, _) => self.api.toggle_comment_like(item_id, viewer).await,
        }
    }

    fn reconcile(&self, item_id: &str, viewer: &str, server: Option<ServerLikes>) -> LikeToggle {
        if let Some(server) = server {
            self.items.update(&mut |items| {
                Some(transform::apply_server_likes(items, item_id, &server))
            });
            log_interaction!("{} {} reconciled with server likes", T::KIND, item_id);
        }

        let likes = self
            .items
            .items()
            .into_iter()
            .find(|item| item.item_id() == item_id)
            .map(|item| item.likes().to_vec())
            .unwrap_or_default();

        LikeToggle {
            item_id: item_id.to_string(),
            liked: likes.iter().any(|id| id == viewer),
            likes,
        }
    }

    fn rollback(&self, snapshot: &LikeSnapshot) {
        self.items
            .update(&mut |items| Some(transform::restore_likes(items, snapshot)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{NoticeQueue, SharedItems};
    use crate::testing::{comment, post, MockApi, Op};
    use celeste_types::{Comment, Post, Viewer};

    fn coordinator<T: Likeable>(
        api: &Arc<MockApi>,
        items: &Arc<SharedItems<T>>,
        notices: &Arc<NoticeQueue>,
    ) -> LikeCoordinator<T> {
        LikeCoordinator::new(
            api.clone(),
            ViewerContext::signed_in(Viewer::new("u1", "User One")),
            items.clone(),
            notices.clone(),
        )
    }

    fn likes_of<T: Likeable>(items: &SharedItems<T>, id: &str) -> Vec<String> {
        items
            .items()
            .into_iter()
            .find(|item| item.item_id() == id)
            .unwrap()
            .likes()
            .to_vec()
    }

    #[tokio::test]
    async fn test_like_accepts_server_truth() {
        let api = Arc::new(MockApi::new());
        api.set_like_response(Some(ServerLikes {
            likes: vec!["u1".into()],
            like_count: None,
        }));
        let items = SharedItems::new(vec![post("p1", &[])]);
        let notices = Arc::new(NoticeQueue::new());
        let likes = coordinator(&api, &items, &notices);

        let result = likes.toggle_like("p1").await.unwrap();

        assert!(result.liked);
        assert_eq!(result.likes, vec!["u1"]);
        assert!(likes.is_liked(&items.items()[0]));
        assert_eq!(api.calls(), vec![(Op::LikePost, "p1".to_string())]);
        assert!(likes.processing().is_empty());
    }

    #[tokio::test]
    async fn test_server_like_count_updates_post_stats() {
        let api = Arc::new(MockApi::new());
        api.set_like_response(Some(ServerLikes {
            likes: vec!["u1".into()],
            like_count: Some(5),
        }));
        let items = SharedItems::new(vec![post("p1", &[])]);
        let notices = Arc::new(NoticeQueue::new());
        let likes = coordinator(&api, &items, &notices);

        likes.toggle_like("p1").await.unwrap();

        let p = &items.items()[0];
        assert_eq!(p.likes, vec!["u1"]);
        assert_eq!(p.stats.likes, 5);
    }

    #[tokio::test]
    async fn test_unlike_failure_restores_exact_likes() {
        let api = Arc::new(MockApi::new());
        api.fail(Op::UnlikePost);
        let items = SharedItems::new(vec![post("p1", &["u0", "u1", "u2"])]);
        let notices = Arc::new(NoticeQueue::new());
        let likes = coordinator(&api, &items, &notices);

        let err = likes.toggle_like("p1").await.unwrap_err();

        assert!(matches!(err, InteractionError::Api(_)));
        assert_eq!(likes_of(&items, "p1"), vec!["u0", "u1", "u2"]);
        assert_eq!(notices.len(), 1);
        assert!(likes.processing().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_twice_returns_to_original() {
        let api = Arc::new(MockApi::new());
        let items = SharedItems::new(vec![post("p1", &["u2"])]);
        let notices = Arc::new(NoticeQueue::new());
        let likes = coordinator(&api, &items, &notices);

        likes.toggle_like("p1").await.unwrap();
        assert_eq!(likes_of(&items, "p1"), vec!["u2", "u1"]);
        likes.toggle_like("p1").await.unwrap();

        assert_eq!(likes_of(&items, "p1"), vec!["u2"]);
        assert_eq!(
            api.calls(),
            vec![(Op::LikePost, "p1".to_string()), (Op::UnlikePost, "p1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_second_toggle_while_pending_is_refused() {
        let api = Arc::new(MockApi::new());
        api.hold();
        let items = SharedItems::new(vec![post("p1", &[])]);
        let notices = Arc::new(NoticeQueue::new());
        let likes = coordinator(&api, &items, &notices);

        let first = likes.toggle_like("p1");
        let second = async {
            // The first toggle is parked on the held request by now
            tokio::task::yield_now().await;
            assert!(likes.is_processing("p1"));
            let refused = likes.toggle_like("p1").await;
            assert!(matches!(refused, Err(InteractionError::InFlight(_))));
            assert_eq!(likes_of(&items, "p1"), vec!["u1"]);
            api.release(1);
        };

        let (first, _) = tokio::join!(first, second);

        assert!(first.unwrap().liked);
        assert_eq!(api.calls().len(), 1);
        assert!(likes.processing().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_toggles_on_different_items_all_survive() {
        let api = Arc::new(MockApi::new());
        let ids: Vec<String> = (0..64).map(|i| format!("p{}", i)).collect();
        let items = SharedItems::new(ids.iter().map(|id| post(id, &[])).collect::<Vec<_>>());
        let notices = Arc::new(NoticeQueue::new());
        let likes = Arc::new(coordinator(&api, &items, &notices));

        for round in 0..10 {
            let tasks: Vec<_> = ids
                .iter()
                .cloned()
                .map(|id| {
                    let likes = Arc::clone(&likes);
                    tokio::spawn(async move { likes.toggle_like(&id).await })
                })
                .collect();
            for task in tasks {
                task.await.unwrap().unwrap();
            }

            let liked = round % 2 == 0;
            for item in items.items() {
                assert_eq!(likes.is_liked(&item), liked, "{} in round {}", item.id, round);
            }
        }
        assert!(notices.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_rollback_keeps_neighbour_like() {
        let api = Arc::new(MockApi::new());
        api.fail(Op::UnlikePost);
        api.hold();
        let items = SharedItems::new(vec![post("p1", &["u1"]), post("p2", &[])]);
        let notices = Arc::new(NoticeQueue::new());
        let likes = Arc::new(coordinator(&api, &items, &notices));

        let failing = tokio::spawn({
            let likes = Arc::clone(&likes);
            async move { likes.toggle_like("p1").await }
        });
        let passing = tokio::spawn({
            let likes = Arc::clone(&likes);
            async move { likes.toggle_like("p2").await }
        });
        while api.calls().len() < 2 {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        api.release(2);

        assert!(failing.await.unwrap().is_err());
        assert!(passing.await.unwrap().unwrap().liked);
        assert_eq!(likes_of(&items, "p1"), vec!["u1"]);
        assert_eq!(likes_of(&items, "p2"), vec!["u1"]);
    }

    #[tokio::test]
    async fn test_anonymous_viewer_is_refused() {
        let api = Arc::new(MockApi::new());
        let items: Arc<SharedItems<Post>> = SharedItems::new(vec![post("p1", &[])]);
        let notices = Arc::new(NoticeQueue::new());
        let likes: LikeCoordinator<Post> = LikeCoordinator::new(
            api.clone(),
            ViewerContext::anonymous(),
            items.clone(),
            notices.clone(),
        );

        let err = likes.toggle_like("p1").await.unwrap_err();

        assert!(matches!(err, InteractionError::NotSignedIn));
        assert!(err.is_precondition());
        assert!(api.calls().is_empty());
        assert!(likes_of(&items, "p1").is_empty());
        assert!(!likes.is_liked(&items.items()[0]));
    }

    #[tokio::test]
    async fn test_unknown_item_releases_marker() {
        let api = Arc::new(MockApi::new());
        let items = SharedItems::new(vec![post("p1", &[])]);
        let notices = Arc::new(NoticeQueue::new());
        let likes = coordinator(&api, &items, &notices);

        let err = likes.toggle_like("nope").await.unwrap_err();

        assert!(matches!(err, InteractionError::UnknownItem(_)));
        assert!(!likes.is_processing("nope"));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_comment_like_uses_toggle_endpoint_and_stats() {
        let api = Arc::new(MockApi::new());
        api.set_like_response(Some(ServerLikes {
            likes: vec!["u9".into(), "u1".into()],
            like_count: Some(2),
        }));
        let items: Arc<SharedItems<Comment>> = SharedItems::new(vec![comment("c1", &["u9"])]);
        let notices = Arc::new(NoticeQueue::new());
        let likes = coordinator(&api, &items, &notices);

        likes.toggle_like("c1").await.unwrap();

        assert_eq!(api.calls(), vec![(Op::ToggleCommentLike, "c1".to_string())]);
        let c = &items.items()[0];
        assert_eq!(c.likes, vec!["u9", "u1"]);
        assert_eq!(c.stats.unwrap().likes, 2);
    }

    #[tokio::test]
    async fn test_comment_like_failure_restores_stats() {
        let api = Arc::new(MockApi::new());
        api.fail(Op::ToggleCommentLike);
        let mut c = comment("c1", &[]);
        c.stats.as_mut().unwrap().likes = 5;
        let items = SharedItems::new(vec![c]);
        let notices = Arc::new(NoticeQueue::new());
        let likes = coordinator(&api, &items, &notices);

        likes.toggle_like("c1").await.unwrap_err();

        let c = &items.items()[0];
        assert!(c.likes.is_empty());
        assert_eq!(c.stats.unwrap().likes, 5);
    }
}
