//! Optimistic like, bookmark and comment interactions.
//!
//! Every coordinator follows the same shape: check preconditions, mark the id
//! in flight, apply the change locally, send exactly one request, then accept
//! the server's answer or roll back to the captured snapshot. Failures end up
//! as `InteractionError` values plus a `Notice`; nothing panics into the view.

mod bookmarks;
mod collection;
mod comments;
mod error;
mod feed;
mod inflight;
mod likes;
mod notice;
pub mod transform;

pub use bookmarks::BookmarkCoordinator;
pub use collection::{ItemCollection, SharedItems};
pub use comments::{poll_comments, CommentThread, ComposeDialog};
pub use error::InteractionError;
pub use feed::HomeFeed;
pub use inflight::{InFlight, InFlightGuard};
pub use likes::{LikeCoordinator, LikeToggle};
pub use notice::{categorize_error, Notice, NoticeLevel, NoticeQueue, NoticeSink};
