use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ApiError, ApiResult, InteractionApi};
use celeste_types::*;

/// Path prefix every backend route lives under
pub const API_PREFIX: &str = "/api/v1";

/// API client for communicating with the CelesteTalk backend
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session_token: Option<String>,
}

impl ApiClient {
    /// Create a new API client. `base_url` is the server origin without the API prefix.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_token: None,
        }
    }

    /// Set the session token for authenticated requests
    pub fn set_session_token(&mut self, token: Option<String>) {
        self.session_token = token;
    }

    fn url(&self, endpoint: &str) -> String {
        let endpoint = endpoint.trim_start_matches('/');
        format!("{}{}/{}", self.base_url, API_PREFIX, endpoint)
    }

    /// Helper to add session token to request if available
    fn add_auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.session_token {
            req.header("Authorization", format!("Bearer {}", token))
        } else {
            req
        }
    }

    /// Helper to handle API responses.
    ///
    /// Both a non-2xx HTTP status and an envelope whose `code` is not 200 are
    /// reported as errors; callers never see a "half successful" response.
    async fn handle_response(&self, response: reqwest::Response) -> ApiResult<Value> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            // Clean up HTML error messages (e.g., from reverse proxy error pages)
            let clean_error = if error_text.contains("<html>") || error_text.contains("<!DOCTYPE") {
                format!("Server returned {} error. Please check the server URL.", status.as_u16())
            } else {
                error_text
            };

            return match status.as_u16() {
                404 => Err(ApiError::NotFound(clean_error)),
                401 => Err(ApiError::Unauthorized(clean_error)),
                400 => Err(ApiError::BadRequest(clean_error)),
                _ => Err(ApiError::Api(clean_error)),
            };
        }

        let envelope: ApiEnvelope<Value> = response.json().await?;
        if !envelope.is_success() {
            return Err(ApiError::Envelope {
                code: envelope.code,
                message: envelope
                    .message
                    .unwrap_or_else(|| "request was not accepted".to_string()),
            });
        }

        Ok(envelope.data.unwrap_or(Value::Null))
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> ApiResult<Value> {
        let req = self.add_auth_header(req);
        let response = req.send().await?;
        self.handle_response(response).await
    }
}

#[async_trait]
impl InteractionApi for ApiClient {
    async fn fetch_home_posts(&self) -> ApiResult<Vec<Post>> {
        let url = self.url("posts/home/");
        log_api_call!("GET {}", url);
        let mut data = self.send(self.client.get(&url)).await?;

        if data.is_array() {
            return Ok(serde_json::from_value(data)?);
        }
        // An empty feed may come back without a `posts` field at all
        match data.get_mut("posts").map(Value::take) {
            Some(posts) if !posts.is_null() => Ok(serde_json::from_value(posts)?),
            _ => Ok(Vec::new()),
        }
    }

    async fn like_post(&self, post_id: &str, viewer: &str) -> ApiResult<Option<ServerLikes>> {
        let url = self.url(&format!("posts/{}/like", post_id));
        log_api_call!("PUT {} viewer={}", url, viewer);
        let request = LikeRequest {
            viewer_id: viewer.to_string(),
        };
        let data = self.send(self.client.put(&url).json(&request)).await?;
        Ok(server_likes_from(&data))
    }

    async fn unlike_post(&self, post_id: &str, viewer: &str) -> ApiResult<Option<ServerLikes>> {
        let url = self.url(&format!("posts/{}/like", post_id));
        log_api_call!("DELETE {} viewer={}", url, viewer);
        let request = LikeRequest {
            viewer_id: viewer.to_string(),
        };
        let data = self.send(self.client.delete(&url).json(&request)).await?;
        Ok(server_likes_from(&data))
    }

    async fn toggle_comment_like(
        &self,
        comment_id: &str,
        viewer: &str,
    ) -> ApiResult<Option<ServerLikes>> {
        let url = self.url(&format!("comments/{}/toggle", comment_id));
        log_api_call!("POST {} viewer={}", url, viewer);
        let request = CommentLikeRequest {
            comment_id: comment_id.to_string(),
            user_id: viewer.to_string(),
        };
        let data = self.send(self.client.post(&url).json(&request)).await?;
        Ok(server_likes_from(&data))
    }

    async fn fetch_comments(&self, post_id: &str) -> ApiResult<Vec<Comment>> {
        let url = self.url(&format!("posts/{}/comments", post_id));
        log_api_call!("GET {}", url);
        let data = self.send(self.client.get(&url)).await?;

        // Older servers answer with a bare array instead of `{ comments: [...] }`
        if data.is_array() {
            return Ok(serde_json::from_value(data)?);
        }
        decode_field(data, "comments")
    }

    async fn create_comment(
        &self,
        post_id: &str,
        viewer: &str,
        content: &str,
        reply_to: Option<&str>,
    ) -> ApiResult<Option<String>> {
        let url = self.url(&format!("posts/{}/comment", post_id));
        log_api_call!("POST {} viewer={} reply_to={:?}", url, viewer, reply_to);
        let request = CreateCommentRequest {
            viewer_id: viewer.to_string(),
            content: content.to_string(),
            reply_to: reply_to.map(String::from),
        };
        let data = self.send(self.client.post(&url).json(&request)).await?;

        let comment = data.get("comment").unwrap_or(&data);
        Ok(comment
            .get("_id")
            .or_else(|| comment.get("id"))
            .and_then(Value::as_str)
            .map(String::from))
    }

    async fn toggle_bookmark(&self, post_id: &str, viewer: &str) -> ApiResult<()> {
        // TODO: call the bookmark endpoint once the backend exposes one
        log_api_call!("bookmark {} viewer={} kept client-side only", post_id, viewer);
        Ok(())
    }

    async fn search_posts(&self, query: &str) -> ApiResult<Vec<Post>> {
        let url = format!(
            "{}?q={}",
            self.url("posts/search"),
            urlencoding::encode(query)
        );
        log_api_call!("GET {}", url);
        let data = self.send(self.client.get(&url)).await?;
        decode_field(data, "posts")
    }
}

/// Decode `data[field]`, falling back to `data` itself when the field is absent
fn decode_field<T: DeserializeOwned>(mut data: Value, field: &str) -> ApiResult<T> {
    if let Some(inner) = data.get_mut(field) {
        return Ok(serde_json::from_value(inner.take())?);
    }
    Ok(serde_json::from_value(data)?)
}

/// Pull the authoritative like state out of a like/unlike/toggle response.
///
/// The server may answer with `{ post: {...} }`, `{ comment: {...} }` or a
/// bare `{ likes, stats }` object. Anything without a `likes` array yields
/// `None`, meaning the optimistic value stands.
pub fn server_likes_from(data: &Value) -> Option<ServerLikes> {
    let item = ["post", "comment"]
        .iter()
        .find_map(|key| data.get(*key).filter(|v| v.is_object()))
        .unwrap_or(data);

    let likes = item.get("likes")?.as_array()?;
    let likes = likes
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect();
    let like_count = item
        .get("stats")
        .and_then(|stats| stats.get("likes"))
        .and_then(Value::as_u64);

    Some(ServerLikes { likes, like_count })
}
