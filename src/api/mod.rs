//! Remote catalog access
//!
//! The traits below are the seams the rest of the client talks through.
//! `RemoteClient` implements them over HTTP; tests use an in-memory
//! backend instead.

pub mod client;
#[cfg(test)]
pub mod fake;
pub mod wire;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::state::data::{Color, ColorImages, Group, Image, Role, Section, User};

pub use client::RemoteClient;
pub use wire::{GroupPatch, NewUser, SessionKey, TrackBody};

/// Groups, colors and images
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_groups(&self, section: Section) -> ApiResult<Vec<Group>>;
    async fn create_group(&self, name: &str, section: Section) -> ApiResult<Group>;
    async fn patch_group(&self, slug: &str, patch: &GroupPatch) -> ApiResult<Group>;
    async fn delete_group(&self, slug: &str) -> ApiResult<()>;
    async fn reorder_colors(&self, group_slug: &str, ids: &[i64]) -> ApiResult<()>;

    async fn create_color(&self, group_slug: &str, name: &str) -> ApiResult<Color>;
    async fn rename_color(&self, color_id: i64, name: &str) -> ApiResult<Color>;
    async fn delete_color(&self, color_id: i64) -> ApiResult<()>;

    async fn color_images(&self, color_id: i64) -> ApiResult<ColorImages>;
    async fn upload_images(
        &self,
        color_id: i64,
        files: &[PathBuf],
        is_presentation: bool,
    ) -> ApiResult<Vec<Image>>;
    async fn set_presentation(&self, color_id: i64, image_id: i64) -> ApiResult<()>;
    async fn reorder_gallery(&self, color_id: i64, ids: &[i64]) -> ApiResult<()>;
    async fn delete_image(&self, color_id: i64, image_id: i64) -> ApiResult<()>;

    /// Raw bytes behind an image URL, for thumbnails
    async fn fetch_image(&self, url: &str) -> ApiResult<Vec<u8>>;
}

/// Back-office accounts (admin only)
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list_users(&self) -> ApiResult<Vec<User>>;
    async fn create_user(&self, user: &NewUser) -> ApiResult<User>;
    async fn set_role(&self, user_id: i64, role: Role) -> ApiResult<()>;
    async fn reset_password(&self, user_id: i64) -> ApiResult<()>;
    async fn delete_user(&self, user_id: i64) -> ApiResult<()>;
}

/// Usage analytics endpoints
#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    async fn session_start(&self, client_id: &str) -> ApiResult<SessionKey>;
    async fn session_stop(&self, session: &SessionKey) -> ApiResult<()>;
    async fn track(&self, body: &TrackBody) -> ApiResult<()>;
}
