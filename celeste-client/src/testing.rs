//! Fixtures and an in-memory `InteractionApi` for unit tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use celeste_types::{Comment, CommentStats, Post, PostStats, ServerLikes};
use chrono::{TimeZone, Utc};
use tokio::sync::Semaphore;

use crate::api::{ApiError, ApiResult, InteractionApi};

pub fn post(id: &str, likes: &[&str]) -> Post {
    let at = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
    Post {
        id: id.to_string(),
        author_id: "author".to_string(),
        content: format!("post {}", id),
        created_at: at,
        updated_at: at,
        is_repost: false,
        media: vec![],
        likes: likes.iter().map(|s| s.to_string()).collect(),
        repost_count: 0,
        reply_to: None,
        author: None,
        stats: PostStats::default(),
    }
}

pub fn comment(id: &str, likes: &[&str]) -> Comment {
    let at = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
    Comment {
        id: id.to_string(),
        post_id: "p1".to_string(),
        author_id: "author".to_string(),
        content: format!("comment {}", id),
        created_at: at,
        updated_at: at,
        likes: likes.iter().map(|s| s.to_string()).collect(),
        reply_to: None,
        author: None,
        stats: Some(CommentStats {
            likes: likes.len() as u64,
            ..CommentStats::default()
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FetchHomePosts,
    LikePost,
    UnlikePost,
    ToggleCommentLike,
    FetchComments,
    CreateComment,
    ToggleBookmark,
    SearchPosts,
}

/// Records every call, can fail chosen operations and can hold requests
/// pending until `release` is called
#[derive(Default)]
pub struct MockApi {
    calls: Mutex<Vec<(Op, String)>>,
    failing: Mutex<HashSet<Op>>,
    like_response: Mutex<Option<ServerLikes>>,
    comments: Mutex<Vec<Comment>>,
    created_id: Mutex<Option<String>>,
    last_reply_to: Mutex<Option<String>>,
    search_results: Mutex<Vec<Post>>,
    home_posts: Mutex<Vec<Post>>,
    gate: Mutex<Option<std::sync::Arc<Semaphore>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn set_like_response(&self, response: Option<ServerLikes>) {
        *self.like_response.lock().unwrap() = response;
    }

    pub fn set_comments(&self, comments: Vec<Comment>) {
        *self.comments.lock().unwrap() = comments;
    }

    pub fn set_created_id(&self, id: Option<&str>) {
        *self.created_id.lock().unwrap() = id.map(String::from);
    }

    pub fn set_home_posts(&self, posts: Vec<Post>) {
        *self.home_posts.lock().unwrap() = posts;
    }

    pub fn set_search_results(&self, posts: Vec<Post>) {
        *self.search_results.lock().unwrap() = posts;
    }

    pub fn last_reply_to(&self) -> Option<String> {
        self.last_reply_to.lock().unwrap().clone()
    }

    /// Park every following request until a permit is released for it
    pub fn hold(&self) {
        *self.gate.lock().unwrap() = Some(std::sync::Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, requests: usize) {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            gate.add_permits(requests);
        }
    }

    pub fn calls(&self) -> Vec<(Op, String)> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, op: Op, id: &str) -> ApiResult<()> {
        self.calls.lock().unwrap().push((op, id.to_string()));

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        if self.failing.lock().unwrap().contains(&op) {
            return Err(ApiError::Envelope {
                code: 500,
                message: format!("simulated {:?} failure", op),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl InteractionApi for MockApi {
    async fn fetch_home_posts(&self) -> ApiResult<Vec<Post>> {
        self.enter(Op::FetchHomePosts, "home").await?;
        Ok(self.home_posts.lock().unwrap().clone())
    }

    async fn like_post(&self, post_id: &str, _viewer: &str) -> ApiResult<Option<ServerLikes>> {
        self.enter(Op::LikePost, post_id).await?;
        Ok(self.like_response.lock().unwrap().clone())
    }

    async fn unlike_post(&self, post_id: &str, _viewer: &str) -> ApiResult<Option<ServerLikes>> {
        self.enter(Op::UnlikePost, post_id).await?;
        Ok(self.like_response.lock().unwrap().clone())
    }

    async fn toggle_comment_like(
        &self,
        comment_id: &str,
        _viewer: &str,
    ) -> ApiResult<Option<ServerLikes>> {
        self.enter(Op::ToggleCommentLike, comment_id).await?;
        Ok(self.like_response.lock().unwrap().clone())
    }

    async fn fetch_comments(&self, post_id: &str) -> ApiResult<Vec<Comment>> {
        self.enter(Op::FetchComments, post_id).await?;
        Ok(self.comments.lock().unwrap().clone())
    }

    async fn create_comment(
        &self,
        post_id: &str,
        _viewer: &str,
        _content: &str,
        reply_to: Option<&str>,
    ) -> ApiResult<Option<String>> {
        *self.last_reply_to.lock().unwrap() = reply_to.map(String::from);
        self.enter(Op::CreateComment, post_id).await?;
        Ok(self.created_id.lock().unwrap().clone())
    }

    async fn toggle_bookmark(&self, post_id: &str, _viewer: &str) -> ApiResult<()> {
        self.enter(Op::ToggleBookmark, post_id).await
    }

    async fn search_posts(&self, query: &str) -> ApiResult<Vec<Post>> {
        self.enter(Op::SearchPosts, query).await?;
        Ok(self.search_results.lock().unwrap().clone())
    }
}
