//! Typed REST resources consumed by the protected views.
//!
//! Every call goes through [`RequestPipeline`], so token attachment and
//! `401` handling apply uniformly. Input checks that the web forms performed
//! before submitting live here as well, returning [`ApiError::Validation`]
//! without touching the network.
//!
//! [`ApiError::Validation`]: crate::error::ApiError::Validation

pub mod posts;
pub mod users;

pub use posts::PostsApi;
pub use users::AdminUsersApi;

use crate::pipeline::RequestPipeline;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Convenience bundle of every resource over one pipeline.
#[derive(Clone)]
pub struct BlogApi {
    pub posts: PostsApi,
    pub users: AdminUsersApi,
}

impl BlogApi {
    #[must_use]
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self { posts: PostsApi::new(pipeline.clone()), users: AdminUsersApi::new(pipeline) }
    }
}
