//! Admin user management (`/admin/users`).
//!
//! Only regular accounts are managed here: listings hide administrators,
//! administrator records cannot be opened for editing, and new accounts are
//! always created with the user role.

use serde::de::IgnoredAny;

use crate::error::ApiError;
use crate::pipeline::RequestPipeline;
use crate::transport::HttpRequest;
use crate::types::{NewUser, Page, Role, UserRecord, UserUpdate};

#[derive(Clone)]
pub struct AdminUsersApi {
    pipeline: RequestPipeline,
}

impl AdminUsersApi {
    #[must_use]
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self { pipeline }
    }

    /// Search users. Administrators are filtered out of the page.
    ///
    /// # Errors
    ///
    /// Propagates pipeline errors.
    pub async fn list(&self, query: &str, page: u32, size: u32) -> Result<Page<UserRecord>, ApiError> {
        let request = HttpRequest::get(self.pipeline.endpoints().admin_users())
            .query("q", query.trim())
            .query("page", page)
            .query("size", size);
        let mut listing: Page<UserRecord> = self.pipeline.get_json(request).await?;
        listing.content.retain(|user| user.role == Role::User);
        Ok(listing)
    }

    /// Load a user for editing.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for administrator records, otherwise
    /// pipeline errors.
    pub async fn get(&self, id: i64) -> Result<UserRecord, ApiError> {
        let user: UserRecord = self.pipeline.get_json(HttpRequest::get(self.pipeline.endpoints().admin_user(id))).await?;
        if user.role == Role::Admin {
            return Err(ApiError::Validation("Administrators cannot be edited here.".to_owned()));
        }
        Ok(user)
    }

    /// Create a regular account.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for blank input, otherwise pipeline errors.
    pub async fn create(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::Validation("Username and password are required.".to_owned()));
        }
        let body = NewUser { username: username.to_owned(), password: password.to_owned(), role: Role::User };
        let _: IgnoredAny = self.pipeline.post_json(self.pipeline.endpoints().admin_users(), &body).await?;
        tracing::info!(%username, "user created");
        Ok(())
    }

    /// Rename a user and optionally reset the password. A blank password
    /// leaves it unchanged.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a blank username, otherwise pipeline errors.
    pub async fn update(&self, id: i64, username: &str, password: Option<&str>) -> Result<(), ApiError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ApiError::Validation("Username is required.".to_owned()));
        }
        let body = UserUpdate {
            username: username.to_owned(),
            password: password.filter(|p| !p.is_empty()).map(ToOwned::to_owned),
        };
        let _: IgnoredAny = self.pipeline.put_json(self.pipeline.endpoints().admin_user(id), &body).await?;
        tracing::info!(user_id = id, "user updated");
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates pipeline errors.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.pipeline.delete(self.pipeline.endpoints().admin_user(id)).await?;
        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }
}

/// Page to show after deleting a row from a page that held `rows_on_page`
/// rows: step back when the last row of a later page disappears.
#[must_use]
pub fn page_after_delete(rows_on_page: usize, page: u32) -> u32 {
    if rows_on_page <= 1 && page > 0 { page - 1 } else { page }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
