//! Wizard state store — the single source of truth for the setup flow.

use serde::Serialize;
use uuid::Uuid;

use crate::profile::model::{BasicInfo, Location, ProfileData, SkillEntry};

use super::step::WizardStep;

/// Data committed into exactly one profile slot.
///
/// The step → slot mapping is a total function over this sum type, so an
/// "invalid step" write is unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum StepData {
    BasicInfo(BasicInfo),
    Location(Location),
    SkillsOffered(Vec<SkillEntry>),
    SkillsNeeded(Vec<SkillEntry>),
    PhotoUrl(Option<String>),
}

impl StepData {
    /// The step this data belongs to.
    pub fn step(&self) -> WizardStep {
        match self {
            Self::BasicInfo(_) => WizardStep::BasicInfo,
            Self::Location(_) => WizardStep::Location,
            Self::SkillsOffered(_) => WizardStep::SkillsOffered,
            Self::SkillsNeeded(_) => WizardStep::SkillsNeeded,
            Self::PhotoUrl(_) => WizardStep::ProfilePhoto,
        }
    }
}

/// Holds the current step, the accumulated per-step data, and the owner.
///
/// Profile slots are written only through [`WizardState::commit`]; step
/// components read the store and keep local, uncommitted edit buffers.
#[derive(Debug, Clone, Serialize)]
pub struct WizardState {
    current_step: WizardStep,
    user_id: Option<Uuid>,
    profile: ProfileData,
}

impl WizardState {
    /// A fresh wizard positioned at the first step.
    pub fn new(user_id: Option<Uuid>) -> Self {
        Self {
            current_step: WizardStep::default(),
            user_id,
            profile: ProfileData::default(),
        }
    }

    /// A wizard positioned at `initial_step` (resume support).
    pub fn with_initial_step(user_id: Option<Uuid>, initial_step: WizardStep) -> Self {
        Self {
            current_step: initial_step,
            ..Self::new(user_id)
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    /// Unconditionally overwrite the step pointer. Transition legality is
    /// enforced by the engine, not here.
    pub fn set_current_step(&mut self, step: WizardStep) {
        self.current_step = step;
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    pub fn set_user_id(&mut self, user_id: Uuid) {
        self.user_id = Some(user_id);
    }

    pub fn profile(&self) -> &ProfileData {
        &self.profile
    }

    /// Commit step data into its slot. The single mutation entrypoint for
    /// profile data.
    pub fn commit(&mut self, data: StepData) {
        match data {
            StepData::BasicInfo(v) => self.profile.basic_info = v,
            StepData::Location(v) => self.profile.location = v,
            StepData::SkillsOffered(v) => self.profile.skills_offered = v,
            StepData::SkillsNeeded(v) => self.profile.skills_needed = v,
            StepData::PhotoUrl(v) => self.profile.photo_url = v,
        }
    }

    /// Restore all fields to their initial empty values.
    pub fn reset(&mut self) {
        *self = Self::new(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::model::ExchangeKind;

    fn skill(title: &str) -> SkillEntry {
        SkillEntry {
            title: title.to_string(),
            description: "desc".to_string(),
            exchange_kind: ExchangeKind::Barter,
        }
    }

    #[test]
    fn new_state_starts_at_basic_info() {
        let state = WizardState::new(Some(Uuid::new_v4()));
        assert_eq!(state.current_step(), WizardStep::BasicInfo);
        assert_eq!(state.profile(), &ProfileData::default());
    }

    #[test]
    fn commit_writes_exactly_one_slot() {
        let mut state = WizardState::new(None);

        state.commit(StepData::BasicInfo(BasicInfo {
            full_name: "Jane".to_string(),
            bio: String::new(),
        }));
        assert_eq!(state.profile().basic_info.full_name, "Jane");
        assert!(state.profile().location.address_text.is_empty());

        state.commit(StepData::SkillsOffered(vec![skill("Gardening")]));
        assert_eq!(state.profile().skills_offered.len(), 1);
        assert!(state.profile().skills_needed.is_empty());

        state.commit(StepData::PhotoUrl(Some("https://x/y.png".to_string())));
        assert_eq!(state.profile().photo_url.as_deref(), Some("https://x/y.png"));

        state.commit(StepData::PhotoUrl(None));
        assert!(state.profile().photo_url.is_none());
    }

    #[test]
    fn step_data_maps_to_its_step() {
        assert_eq!(
            StepData::BasicInfo(BasicInfo::default()).step(),
            WizardStep::BasicInfo
        );
        assert_eq!(
            StepData::SkillsNeeded(vec![]).step(),
            WizardStep::SkillsNeeded
        );
        assert_eq!(StepData::PhotoUrl(None).step(), WizardStep::ProfilePhoto);
    }

    #[test]
    fn set_current_step_is_unconditional() {
        let mut state = WizardState::new(None);
        state.set_current_step(WizardStep::ProfilePhoto);
        assert_eq!(state.current_step(), WizardStep::ProfilePhoto);
        state.set_current_step(WizardStep::BasicInfo);
        assert_eq!(state.current_step(), WizardStep::BasicInfo);
    }

    #[test]
    fn reset_restores_initial_values() {
        let mut state = WizardState::with_initial_step(Some(Uuid::new_v4()), WizardStep::Location);
        state.commit(StepData::SkillsNeeded(vec![skill("Plumbing")]));
        state.reset();
        assert_eq!(state.current_step(), WizardStep::BasicInfo);
        assert!(state.user_id().is_none());
        assert_eq!(state.profile(), &ProfileData::default());
    }
}
