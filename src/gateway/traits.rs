//! `ProfileGateway` trait — single async interface over the hosted backend.
//!
//! The underlying identity/storage/database platform is wholly external;
//! the wizard core only ever talks to it through this boundary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::photo::crop::CroppedImage;
use crate::profile::model::{BasicInfo, Location, ProfileStatus, SkillEntry};

/// Backend-agnostic persistence gateway covering the per-step saves, the
/// photo object store, and profile status.
#[async_trait]
pub trait ProfileGateway: Send + Sync {
    /// Save the basic-info step for `owner`.
    async fn save_basic_info(&self, owner: Uuid, info: &BasicInfo) -> Result<(), GatewayError>;

    /// Save the location step for `owner` (stored as the primary address).
    async fn save_location(&self, owner: Uuid, location: &Location) -> Result<(), GatewayError>;

    /// Save the offered-skills batch for `owner`.
    async fn save_skill_offers(
        &self,
        owner: Uuid,
        skills: &[SkillEntry],
    ) -> Result<(), GatewayError>;

    /// Save the needed-skills batch for `owner`.
    async fn save_skill_requests(
        &self,
        owner: Uuid,
        skills: &[SkillEntry],
    ) -> Result<(), GatewayError>;

    /// Upload a cropped photo to object storage. Returns its public URL.
    async fn upload_photo(&self, file: &CroppedImage) -> Result<String, GatewayError>;

    /// Persist the uploaded photo's URL on the owner's profile row.
    async fn save_photo_url(&self, owner: Uuid, url: &str) -> Result<(), GatewayError>;

    /// Clear the owner's photo URL and remove the stored object.
    async fn delete_photo(&self, owner: Uuid) -> Result<(), GatewayError>;

    /// Fetch the owner's wizard completion status (resume support).
    async fn profile_status(&self, owner: Uuid) -> Result<ProfileStatus, GatewayError>;
}
