mod backend;
mod client;
mod error;

pub use backend::InteractionApi;
pub use client::{server_likes_from, ApiClient, API_PREFIX};
pub use error::{ApiError, ApiResult};
