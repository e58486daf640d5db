use async_trait::async_trait;
use celeste_types::{Comment, Post, ServerLikes};

use super::ApiResult;

/// REST operations the interaction layer depends on.
///
/// `ApiClient` is the production implementation; tests swap in in-memory
/// doubles that can hold requests pending or fail on demand.
#[async_trait]
pub trait InteractionApi: Send + Sync {
    /// `GET /posts/home/`, the signed-in viewer's home feed
    async fn fetch_home_posts(&self) -> ApiResult<Vec<Post>>;

    /// `PUT /posts/{id}/like`
    async fn like_post(&self, post_id: &str, viewer: &str) -> ApiResult<Option<ServerLikes>>;

    /// `DELETE /posts/{id}/like`
    async fn unlike_post(&self, post_id: &str, viewer: &str) -> ApiResult<Option<ServerLikes>>;

    /// `POST /comments/{id}/toggle`
    async fn toggle_comment_like(
        &self,
        comment_id: &str,
        viewer: &str,
    ) -> ApiResult<Option<ServerLikes>>;

    /// `GET /posts/{id}/comments`
    async fn fetch_comments(&self, post_id: &str) -> ApiResult<Vec<Comment>>;

    /// `POST /posts/{id}/comment`, returning the server-assigned comment id if any
    async fn create_comment(
        &self,
        post_id: &str,
        viewer: &str,
        content: &str,
        reply_to: Option<&str>,
    ) -> ApiResult<Option<String>>;

    /// Bookmark persistence. The backend has no endpoint for this yet.
    async fn toggle_bookmark(&self, post_id: &str, viewer: &str) -> ApiResult<()>;

    async fn search_posts(&self, query: &str) -> ApiResult<Vec<Post>>;
}
