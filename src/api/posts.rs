//! Posts resource: listing, authoring and deletion.

use serde::de::IgnoredAny;

use crate::error::ApiError;
use crate::pipeline::RequestPipeline;
use crate::transport::HttpRequest;
use crate::types::{Page, Post, PostDraft};

pub const TITLE_MAX_CHARS: usize = 120;
pub const CONTENT_MAX_CHARS: usize = 5000;
pub const EXCERPT_CHARS: usize = 140;

#[derive(Clone)]
pub struct PostsApi {
    pipeline: RequestPipeline,
}

impl PostsApi {
    #[must_use]
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self { pipeline }
    }

    /// `GET /posts`. Backends without pagination answer with a bare array,
    /// which comes back as a single page.
    ///
    /// # Errors
    ///
    /// Propagates pipeline errors.
    pub async fn list(&self, page: u32, size: u32) -> Result<Page<Post>, ApiError> {
        let path = self.pipeline.endpoints().posts();
        self.pipeline.get_json(HttpRequest::get(path).query("page", page).query("size", size)).await
    }

    /// `GET /posts/mine`.
    ///
    /// # Errors
    ///
    /// Propagates pipeline errors.
    pub async fn mine(&self, page: u32, size: u32) -> Result<Page<Post>, ApiError> {
        let path = self.pipeline.endpoints().my_posts();
        self.pipeline.get_json(HttpRequest::get(path).query("page", page).query("size", size)).await
    }

    /// # Errors
    ///
    /// Propagates pipeline errors.
    pub async fn get(&self, id: i64) -> Result<Post, ApiError> {
        self.pipeline.get_json(HttpRequest::get(self.pipeline.endpoints().post(id))).await
    }

    /// # Errors
    ///
    /// [`ApiError::Validation`] for an invalid draft, otherwise pipeline errors.
    pub async fn create(&self, draft: &PostDraft) -> Result<(), ApiError> {
        let draft = validate_draft(draft)?;
        let _: IgnoredAny = self.pipeline.post_json(self.pipeline.endpoints().posts(), &draft).await?;
        tracing::info!(title = %draft.title, "post created");
        Ok(())
    }

    /// # Errors
    ///
    /// [`ApiError::Validation`] for an invalid draft, otherwise pipeline errors.
    pub async fn update(&self, id: i64, draft: &PostDraft) -> Result<(), ApiError> {
        let draft = validate_draft(draft)?;
        let _: IgnoredAny = self.pipeline.put_json(self.pipeline.endpoints().post(id), &draft).await?;
        tracing::info!(post_id = id, "post updated");
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates pipeline errors.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.pipeline.delete(self.pipeline.endpoints().post(id)).await?;
        tracing::info!(post_id = id, "post deleted");
        Ok(())
    }
}

/// Trim both fields and check them the way the editor form does.
///
/// # Errors
///
/// [`ApiError::Validation`] when a field is blank or too long.
pub fn validate_draft(draft: &PostDraft) -> Result<PostDraft, ApiError> {
    let title = draft.title.trim();
    let content = draft.content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(ApiError::Validation("Title and content are both required.".to_owned()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(ApiError::Validation(format!("Title must be at most {TITLE_MAX_CHARS} characters.")));
    }
    if content.chars().count() > CONTENT_MAX_CHARS {
        return Err(ApiError::Validation(format!("Content must be at most {CONTENT_MAX_CHARS} characters.")));
    }
    Ok(PostDraft { title: title.to_owned(), content: content.to_owned() })
}

/// Case-insensitive search over title and content. A blank query keeps all.
#[must_use]
pub fn filter_posts<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return posts.iter().collect();
    }
    posts
        .iter()
        .filter(|post| post.title.to_lowercase().contains(&needle) || post.content.to_lowercase().contains(&needle))
        .collect()
}

/// Shorten `text` to at most `max_chars` characters plus an ellipsis.
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_owned(),
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
    }
}

#[cfg(test)]
#[path = "posts_test.rs"]
mod tests;
