use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::MediaType;

/// Handle of a user as it appears in `likes` lists.
pub type ViewerId = String;

// Custom serde module for DateTime to ensure RFC3339 string format.
// The backend stores naive timestamps, so offset-less strings are read as UTC.
pub mod datetime_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        match s.parse::<DateTime<Utc>>() {
            Ok(date) => Ok(date),
            Err(e) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc())
                .map_err(|_| e),
        }
    }
}

/// Display data for the author of a post or comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(alias = "name")]
    pub username: String,
    pub handle: String,
    #[serde(default)]
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub url: String,
}

/// Denormalized post counters. Not kept in step with `likes.len()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStats {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub views: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentStats {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub replies: u64,
    #[serde(default)]
    pub shares: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub author_id: String,
    pub content: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_repost: bool,
    #[serde(default)]
    pub media: Vec<Media>,
    /// Handles of users who liked this post, without duplicates
    #[serde(default)]
    pub likes: Vec<ViewerId>,
    #[serde(default)]
    pub repost_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default)]
    pub stats: PostStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub content: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: Vec<ViewerId>,
    /// Comment this one answers, if it is a nested reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<CommentStats>,
}

/// Authoritative like state returned by the server after a like request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerLikes {
    pub likes: Vec<ViewerId>,
    pub like_count: Option<u64>,
}

/// Standard response wrapper used by every backend endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: u16,
    #[serde(default, alias = "msg", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub const SUCCESS: u16 = 200;

    pub fn is_success(&self) -> bool {
        self.code == Self::SUCCESS
    }
}

// Request types for API

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeRequest {
    #[serde(rename = "_id")]
    pub viewer_id: ViewerId,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentLikeRequest {
    pub comment_id: String,
    pub user_id: ViewerId,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(rename = "_id")]
    pub viewer_id: ViewerId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_deserializes_backend_shape() {
        let json = r#"{
            "_id": "p1",
            "authorId": "a1",
            "content": "hello",
            "createdAt": "2024-03-05T10:00:00",
            "updatedAt": "2024-03-05T10:00:00Z",
            "isRepost": false,
            "likes": ["u1", "u2"],
            "repostCount": 0,
            "author": {"username": "Alice", "handle": "alice", "avatar": ""},
            "stats": {"likes": 7, "comments": 1, "shares": 0, "views": 3}
        }"#;

        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, "p1");
        assert_eq!(post.likes, vec!["u1", "u2"]);
        // Denormalized stats are kept as sent, not recomputed from likes
        assert_eq!(post.stats.likes, 7);
        assert_eq!(post.created_at.to_rfc3339(), "2024-03-05T10:00:00+00:00");
    }

    #[test]
    fn test_comment_author_accepts_name_alias() {
        let json = r#"{
            "_id": "c1",
            "postId": "p1",
            "authorId": "a1",
            "content": "nice",
            "createdAt": "2024-03-05T10:00:00Z",
            "updatedAt": "2024-03-05T10:00:00Z",
            "author": {"name": "Bob", "handle": "bob", "avatar": "b.png"}
        }"#;

        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.author.unwrap().username, "Bob");
        assert!(comment.likes.is_empty());
        assert!(comment.stats.is_none());
    }

    #[test]
    fn test_envelope_reads_msg_alias() {
        let env: ApiEnvelope<serde_json::Value> =
            serde_json::from_str(r#"{"code": 401, "msg": "You have already liked this post"}"#)
                .unwrap();
        assert!(!env.is_success());
        assert_eq!(env.message.as_deref(), Some("You have already liked this post"));
        assert!(env.data.is_none());
    }

    #[test]
    fn test_create_comment_request_omits_missing_reply_target() {
        let body = CreateCommentRequest {
            viewer_id: "u1".to_string(),
            content: "hi".to_string(),
            reply_to: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, serde_json::json!({"_id": "u1", "content": "hi"}));
    }
}
