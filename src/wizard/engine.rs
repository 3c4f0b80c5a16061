//! WizardEngine — coordinates validation, persistence, and step
//! transitions for the profile setup flow.
//!
//! Within one transition the ordering is fixed: validation completes
//! before any gateway call, and the gateway call completes (success or
//! failure) before any store mutation or step-pointer change. There is no
//! optimistic commit.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PhotoError, WizardError};
use crate::gateway::ProfileGateway;
use crate::navigation::Navigator;
use crate::photo::crop::{crop_to_png, CropRect};
use crate::photo::file::SelectedFile;
use crate::photo::flow::{PhotoEvent, PhotoFlow, PhotoStage};
use crate::profile::model::{BasicInfo, Location, ProfileStatus, SkillEntry};
use crate::validation::{
    validate_basic_info, validate_location, validate_skill_entry, validate_skills_needed,
    validate_skills_offered,
};

use super::state::{StepData, WizardState};
use super::step::WizardStep;

/// A step's submitted form. The skills and photo steps carry no payload:
/// skills transitions validate the engine's in-memory list buffers, and
/// the photo step persists eagerly at upload time.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", content = "form", rename_all = "kebab-case")]
pub enum StepForm {
    BasicInfo(BasicInfo),
    Location(Location),
    SkillsOffered,
    SkillsNeeded,
    ProfilePhoto,
}

impl StepForm {
    pub fn step(&self) -> WizardStep {
        match self {
            Self::BasicInfo(_) => WizardStep::BasicInfo,
            Self::Location(_) => WizardStep::Location,
            Self::SkillsOffered => WizardStep::SkillsOffered,
            Self::SkillsNeeded => WizardStep::SkillsNeeded,
            Self::ProfilePhoto => WizardStep::ProfilePhoto,
        }
    }
}

/// Snapshot of the wizard for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct WizardStatus {
    pub current_step: WizardStep,
    pub completed: bool,
    pub photo_stage: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub finish_label: &'static str,
}

/// Owns the wizard state and drives the step-transition protocol.
pub struct WizardEngine {
    state: WizardState,
    photo: PhotoFlow,
    offered_buffer: Vec<SkillEntry>,
    needed_buffer: Vec<SkillEntry>,
    gateway: Arc<dyn ProfileGateway>,
    navigator: Arc<dyn Navigator>,
}

impl WizardEngine {
    pub fn new(
        user_id: Option<Uuid>,
        gateway: Arc<dyn ProfileGateway>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            state: WizardState::new(user_id),
            photo: PhotoFlow::new(None),
            offered_buffer: Vec::new(),
            needed_buffer: Vec::new(),
            gateway,
            navigator,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// The Next/Finish label on the photo step: the photo is optional, so
    /// finishing without one is allowed.
    pub fn finish_label(&self) -> &'static str {
        if self.state.profile().photo_url.is_some() {
            "Finish"
        } else {
            "Skip & Finish"
        }
    }

    pub fn status(&self) -> WizardStatus {
        WizardStatus {
            current_step: self.state.current_step(),
            completed: self.state.current_step().is_terminal(),
            photo_stage: self.photo.stage().name(),
            photo_url: self.state.profile().photo_url.clone(),
            finish_label: self.finish_label(),
        }
    }

    /// Position the wizard from a fetched completion status.
    pub async fn resume(&mut self, status: &ProfileStatus) {
        if status.completed {
            self.navigator.go_to_dashboard().await;
            self.state.set_current_step(WizardStep::Confirmation);
            return;
        }
        if let Some(next) = status.last_completed_step.and_then(|last| last.next()) {
            self.enter_step(next);
        }
    }

    /// Validate, persist, commit, advance.
    ///
    /// On the photo step this is Finish: no validation or persistence
    /// (uploads commit eagerly), one dashboard navigation.
    pub async fn next(&mut self, form: StepForm) -> Result<WizardStep, WizardError> {
        let current = self.state.current_step();
        let requested = form.step();
        if requested != current {
            return Err(WizardError::StepMismatch { current, requested });
        }

        if let StepForm::ProfilePhoto = form {
            self.guard_photo_settled()?;
            self.navigator.go_to_dashboard().await;
            self.state.set_current_step(WizardStep::Confirmation);
            return Ok(WizardStep::Confirmation);
        }

        let data = self.validate_and_save(&form).await?;
        self.state.commit(data);
        if let Some(next) = current.next() {
            self.enter_step(next);
        }
        Ok(self.state.current_step())
    }

    /// Previous — no validation, no persistence. A no-op on the first
    /// step. On the photo step an in-progress crop is cancelled instead
    /// of navigating.
    pub fn previous(&mut self) -> Result<WizardStep, WizardError> {
        let current = self.state.current_step();
        if current == WizardStep::ProfilePhoto {
            if self.photo.is_uploading() {
                return Err(PhotoError::Busy.into());
            }
            if self.photo.is_cropping() {
                let committed = self.state.profile().photo_url.clone();
                self.photo.apply(PhotoEvent::CancelCrop { committed })?;
                return Ok(current);
            }
        }
        if let Some(prev) = current.previous() {
            self.enter_step(prev);
        }
        Ok(self.state.current_step())
    }

    /// Same validate-then-persist contract as [`next`], but on success
    /// calls the exit navigation instead of advancing.
    pub async fn save_and_exit(&mut self, form: StepForm) -> Result<(), WizardError> {
        let current = self.state.current_step();
        let requested = form.step();
        if requested != current {
            return Err(WizardError::StepMismatch { current, requested });
        }

        if let StepForm::ProfilePhoto = form {
            self.guard_photo_settled()?;
            self.navigator.exit_wizard().await;
            return Ok(());
        }

        let data = self.validate_and_save(&form).await?;
        self.state.commit(data);
        self.navigator.exit_wizard().await;
        Ok(())
    }

    /// Finish from the photo step (Next's terminal form).
    pub async fn finish(&mut self) -> Result<WizardStep, WizardError> {
        self.next(StepForm::ProfilePhoto).await
    }

    // ── Skills list buffers ─────────────────────────────────────────

    /// Append an entry to the step's in-memory list. Only the entry's
    /// title and description are checked here; the full list is validated
    /// as a batch at step transition. Returns the new list length.
    pub fn add_skill(&mut self, step: WizardStep, entry: SkillEntry) -> Result<usize, WizardError> {
        let result = validate_skill_entry(&entry);
        if !result.is_valid {
            return Err(WizardError::Validation(result));
        }
        let buffer = self.skills_buffer_mut(step)?;
        buffer.push(entry);
        Ok(buffer.len())
    }

    /// Remove one buffered entry. Out-of-range indexes are a no-op.
    pub fn remove_skill(&mut self, step: WizardStep, index: usize) -> Result<bool, WizardError> {
        let buffer = self.skills_buffer_mut(step)?;
        if index >= buffer.len() {
            return Ok(false);
        }
        buffer.remove(index);
        Ok(true)
    }

    /// The step's mutable list buffer; errors mirror the step-mismatch
    /// rules of the transition protocol.
    fn skills_buffer_mut(
        &mut self,
        step: WizardStep,
    ) -> Result<&mut Vec<SkillEntry>, WizardError> {
        let current = self.state.current_step();
        if step != current {
            return Err(WizardError::StepMismatch {
                current,
                requested: step,
            });
        }
        match step {
            WizardStep::SkillsOffered => Ok(&mut self.offered_buffer),
            WizardStep::SkillsNeeded => Ok(&mut self.needed_buffer),
            _ => Err(WizardError::NotSkillsStep),
        }
    }

    /// The uncommitted list buffer for a skills step.
    pub fn skills_buffer(&self, step: WizardStep) -> Option<&[SkillEntry]> {
        match step {
            WizardStep::SkillsOffered => Some(&self.offered_buffer),
            WizardStep::SkillsNeeded => Some(&self.needed_buffer),
            _ => None,
        }
    }

    // ── Photo step ──────────────────────────────────────────────────

    /// The user picked a file. Pure MIME/size checks run before decode;
    /// a rejected file never reaches the gateway.
    pub fn select_photo(&mut self, file: SelectedFile) -> Result<(), WizardError> {
        self.require_photo_step()?;
        self.photo.apply(PhotoEvent::Select(file))?;
        Ok(())
    }

    /// Replace the pending crop region.
    pub fn set_photo_crop(&mut self, rect: CropRect) -> Result<(), WizardError> {
        self.require_photo_step()?;
        self.photo.apply(PhotoEvent::SetCrop(rect))?;
        Ok(())
    }

    /// Rasterize the confirmed crop region and upload it; on success the
    /// returned URL is saved to the profile and committed into the store.
    ///
    /// Failures are field-scoped and leave the flow in `Cropping` so the
    /// user can retry without reselecting the file. A retry is a brand-new
    /// request; nothing here cancels or dedupes in-flight work beyond the
    /// `Uploading` guard.
    pub async fn confirm_crop_and_upload(&mut self) -> Result<String, WizardError> {
        self.require_photo_step()?;
        let owner = self.state.user_id().ok_or(WizardError::MissingUser)?;

        let cropped = match self.photo.stage() {
            PhotoStage::Cropping {
                file,
                image,
                display,
                crop,
            } => crop_to_png(image, *display, *crop, &file.name),
            PhotoStage::Uploading { .. } => return Err(PhotoError::Busy.into()),
            _ => return Err(PhotoError::NothingToUpload.into()),
        };
        let Some(cropped) = cropped else {
            return Err(PhotoError::CropFailed.into());
        };

        self.photo.apply(PhotoEvent::BeginUpload)?;

        let url = match self.gateway.upload_photo(&cropped).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Profile photo upload failed");
                self.photo_upload_failed();
                return Err(PhotoError::UploadFailed(e.to_string()).into());
            }
        };

        if let Err(e) = self.gateway.save_photo_url(owner, &url).await {
            tracing::warn!(error = %e, "Saving profile photo URL failed");
            self.photo_upload_failed();
            return Err(PhotoError::UploadFailed(e.to_string()).into());
        }

        self.state.commit(StepData::PhotoUrl(Some(url.clone())));
        if let Err(e) = self.photo.apply(PhotoEvent::UploadSucceeded { url: url.clone() }) {
            tracing::warn!(error = %e, "Photo flow out of sync after upload");
        }
        Ok(url)
    }

    /// Discard the selected file and crop buffers, restoring the
    /// previously committed photo (if any) as the preview.
    pub fn cancel_crop(&mut self) -> Result<(), WizardError> {
        self.require_photo_step()?;
        let committed = self.state.profile().photo_url.clone();
        self.photo.apply(PhotoEvent::CancelCrop { committed })?;
        Ok(())
    }

    /// Delete the committed photo via the gateway, then clear it from the
    /// store. Only reachable with a committed photo.
    pub async fn delete_photo(&mut self) -> Result<(), WizardError> {
        self.require_photo_step()?;
        if self.photo.is_uploading() {
            return Err(PhotoError::Busy.into());
        }
        if !matches!(self.photo.stage(), PhotoStage::IdleWithPhoto { .. }) {
            return Err(PhotoError::NoPhoto.into());
        }
        let owner = self.state.user_id().ok_or(WizardError::MissingUser)?;

        if let Err(e) = self.gateway.delete_photo(owner).await {
            tracing::warn!(error = %e, "Profile photo deletion failed");
            return Err(WizardError::Persistence {
                message: "Failed to delete photo.".to_string(),
            });
        }

        self.state.commit(StepData::PhotoUrl(None));
        if let Err(e) = self.photo.apply(PhotoEvent::PhotoDeleted) {
            tracing::warn!(error = %e, "Photo flow out of sync after deletion");
        }
        Ok(())
    }

    /// Restore all wizard state to initial empty values.
    pub fn reset(&mut self) {
        self.state.reset();
        self.offered_buffer.clear();
        self.needed_buffer.clear();
        self.photo = PhotoFlow::new(None);
    }

    // ── Internals ───────────────────────────────────────────────────

    /// Move the step pointer and refresh the entered step's edit buffers
    /// from committed state, the way a re-rendered step would.
    fn enter_step(&mut self, step: WizardStep) {
        self.state.set_current_step(step);
        match step {
            WizardStep::SkillsOffered => {
                self.offered_buffer = self.state.profile().skills_offered.clone();
            }
            WizardStep::SkillsNeeded => {
                self.needed_buffer = self.state.profile().skills_needed.clone();
            }
            WizardStep::ProfilePhoto => {
                self.photo = PhotoFlow::new(self.state.profile().photo_url.clone());
            }
            _ => {}
        }
    }

    fn require_photo_step(&self) -> Result<(), WizardError> {
        let current = self.state.current_step();
        if current != WizardStep::ProfilePhoto {
            return Err(WizardError::StepMismatch {
                current,
                requested: WizardStep::ProfilePhoto,
            });
        }
        Ok(())
    }

    fn guard_photo_settled(&self) -> Result<(), PhotoError> {
        if self.photo.is_uploading() {
            return Err(PhotoError::Busy);
        }
        if self.photo.is_cropping() {
            return Err(PhotoError::CropPending);
        }
        Ok(())
    }

    fn photo_upload_failed(&mut self) {
        if let Err(e) = self.photo.apply(PhotoEvent::UploadFailed) {
            tracing::warn!(error = %e, "Photo flow out of sync after failed upload");
        }
    }

    /// Validate the step's form buffer, then persist through the gateway.
    /// Gateway failures surface a form-level, step-specific message and
    /// leave all state untouched.
    async fn validate_and_save(&self, form: &StepForm) -> Result<StepData, WizardError> {
        let current = self.state.current_step();

        let (result, data) = match form {
            StepForm::BasicInfo(info) => {
                (validate_basic_info(info), StepData::BasicInfo(info.clone()))
            }
            StepForm::Location(location) => (
                validate_location(location),
                StepData::Location(location.clone()),
            ),
            StepForm::SkillsOffered => (
                validate_skills_offered(&self.offered_buffer),
                StepData::SkillsOffered(self.offered_buffer.clone()),
            ),
            StepForm::SkillsNeeded => (
                validate_skills_needed(&self.needed_buffer),
                StepData::SkillsNeeded(self.needed_buffer.clone()),
            ),
            // Handled by the callers before validate_and_save.
            StepForm::ProfilePhoto => return Err(WizardError::StepMismatch {
                current,
                requested: WizardStep::ProfilePhoto,
            }),
        };
        if !result.is_valid {
            return Err(WizardError::Validation(result));
        }

        let owner = self.state.user_id().ok_or(WizardError::MissingUser)?;

        let saved = match form {
            StepForm::BasicInfo(info) => self.gateway.save_basic_info(owner, info).await,
            StepForm::Location(location) => self.gateway.save_location(owner, location).await,
            StepForm::SkillsOffered => {
                self.gateway
                    .save_skill_offers(owner, &self.offered_buffer)
                    .await
            }
            StepForm::SkillsNeeded => {
                self.gateway
                    .save_skill_requests(owner, &self.needed_buffer)
                    .await
            }
            StepForm::ProfilePhoto => Ok(()),
        };
        if let Err(e) = saved {
            tracing::warn!(step = %current, error = %e, "Step save failed");
            return Err(WizardError::Persistence {
                message: save_failure_message(current).to_string(),
            });
        }

        Ok(data)
    }
}

fn save_failure_message(step: WizardStep) -> &'static str {
    match step {
        WizardStep::BasicInfo => "Failed to save basic information. Please try again.",
        WizardStep::Location => "Failed to save location. Please try again.",
        WizardStep::SkillsOffered => "Failed to save skills offered. Please try again.",
        WizardStep::SkillsNeeded => "Failed to save skills needed. Please try again.",
        WizardStep::ProfilePhoto | WizardStep::Confirmation => {
            "Failed to save. Please try again."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::navigation::RedirectNavigator;
    use crate::profile::model::ExchangeKind;
    use async_trait::async_trait;

    /// Gateway stub that accepts everything.
    struct OkGateway;

    #[async_trait]
    impl ProfileGateway for OkGateway {
        async fn save_basic_info(&self, _: Uuid, _: &BasicInfo) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn save_location(&self, _: Uuid, _: &Location) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn save_skill_offers(&self, _: Uuid, _: &[SkillEntry]) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn save_skill_requests(&self, _: Uuid, _: &[SkillEntry]) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn upload_photo(
            &self,
            _: &crate::photo::crop::CroppedImage,
        ) -> Result<String, GatewayError> {
            Ok("https://cdn/photo.png".to_string())
        }
        async fn save_photo_url(&self, _: Uuid, _: &str) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn delete_photo(&self, _: Uuid) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn profile_status(&self, _: Uuid) -> Result<ProfileStatus, GatewayError> {
            Ok(ProfileStatus::default())
        }
    }

    fn engine(user_id: Option<Uuid>) -> WizardEngine {
        WizardEngine::new(
            user_id,
            Arc::new(OkGateway),
            Arc::new(RedirectNavigator::default()),
        )
    }

    fn entry(title: &str) -> SkillEntry {
        SkillEntry {
            title: title.to_string(),
            description: "desc".to_string(),
            exchange_kind: ExchangeKind::Barter,
        }
    }

    #[tokio::test]
    async fn form_must_match_current_step() {
        let mut engine = engine(Some(Uuid::new_v4()));
        let err = engine
            .next(StepForm::Location(Location {
                address_text: "somewhere".to_string(),
                latitude: None,
                longitude: None,
            }))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WizardError::StepMismatch {
                current: WizardStep::BasicInfo,
                requested: WizardStep::Location,
            }
        ));
        assert_eq!(engine.state().current_step(), WizardStep::BasicInfo);
    }

    #[tokio::test]
    async fn missing_user_blocks_persistence() {
        let mut engine = engine(None);
        let err = engine
            .next(StepForm::BasicInfo(BasicInfo {
                full_name: "Jane".to_string(),
                bio: String::new(),
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::MissingUser));
        assert_eq!(err.to_string(), "User ID not found. Cannot save.");
        assert_eq!(engine.state().current_step(), WizardStep::BasicInfo);
    }

    #[tokio::test]
    async fn add_skill_rejects_non_skills_steps() {
        let mut engine = engine(Some(Uuid::new_v4()));
        let err = engine
            .add_skill(WizardStep::BasicInfo, entry("Gardening"))
            .unwrap_err();
        assert!(matches!(err, WizardError::NotSkillsStep));
    }

    #[tokio::test]
    async fn skills_buffer_reseeds_from_committed_state_on_reentry() {
        let mut engine = engine(Some(Uuid::new_v4()));
        engine
            .next(StepForm::BasicInfo(BasicInfo {
                full_name: "Jane".to_string(),
                bio: String::new(),
            }))
            .await
            .unwrap();
        engine
            .next(StepForm::Location(Location {
                address_text: "123 Main St".to_string(),
                latitude: None,
                longitude: None,
            }))
            .await
            .unwrap();
        assert_eq!(engine.state().current_step(), WizardStep::SkillsOffered);

        // Buffered but uncommitted edits are lost when leaving the step,
        // the way a remounted component reloads from the store.
        engine
            .add_skill(WizardStep::SkillsOffered, entry("Gardening"))
            .unwrap();
        engine.previous().unwrap();
        engine
            .next(StepForm::Location(Location {
                address_text: "123 Main St".to_string(),
                latitude: None,
                longitude: None,
            }))
            .await
            .unwrap();
        assert!(engine
            .skills_buffer(WizardStep::SkillsOffered)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn remove_skill_out_of_range_is_a_noop() {
        let mut engine = engine(Some(Uuid::new_v4()));
        engine.state.set_current_step(WizardStep::SkillsOffered);
        engine
            .add_skill(WizardStep::SkillsOffered, entry("Gardening"))
            .unwrap();
        assert!(!engine.remove_skill(WizardStep::SkillsOffered, 5).unwrap());
        assert!(engine.remove_skill(WizardStep::SkillsOffered, 0).unwrap());
        assert!(engine
            .skills_buffer(WizardStep::SkillsOffered)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn finish_label_reflects_committed_photo() {
        let mut engine = engine(Some(Uuid::new_v4()));
        assert_eq!(engine.finish_label(), "Skip & Finish");
        engine
            .state
            .commit(StepData::PhotoUrl(Some("https://cdn/p.png".to_string())));
        assert_eq!(engine.finish_label(), "Finish");
    }

    #[tokio::test]
    async fn resume_positions_after_last_completed_step() {
        let mut engine = engine(Some(Uuid::new_v4()));
        engine
            .resume(&ProfileStatus {
                completed: false,
                last_completed_step: Some(WizardStep::Location),
            })
            .await;
        assert_eq!(engine.state().current_step(), WizardStep::SkillsOffered);

        engine.resume(&ProfileStatus::default()).await;
        // No last step recorded: stay where we are.
        assert_eq!(engine.state().current_step(), WizardStep::SkillsOffered);
    }

    #[tokio::test]
    async fn resume_of_completed_profile_is_terminal() {
        let mut engine = engine(Some(Uuid::new_v4()));
        engine
            .resume(&ProfileStatus {
                completed: true,
                last_completed_step: None,
            })
            .await;
        assert_eq!(engine.state().current_step(), WizardStep::Confirmation);
        assert!(engine.status().completed);
    }
}
