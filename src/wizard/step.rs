//! Wizard step enum — the linear forward chain of the profile setup flow.

use serde::{Deserialize, Serialize};

/// The steps of the profile setup wizard.
///
/// Progresses linearly: BasicInfo → Location → SkillsOffered →
/// SkillsNeeded → ProfilePhoto → Confirmation (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    BasicInfo,
    Location,
    SkillsOffered,
    SkillsNeeded,
    ProfilePhoto,
    Confirmation,
}

impl WizardStep {
    /// The next step in the linear progression, if any.
    pub fn next(&self) -> Option<WizardStep> {
        use WizardStep::*;
        match self {
            BasicInfo => Some(Location),
            Location => Some(SkillsOffered),
            SkillsOffered => Some(SkillsNeeded),
            SkillsNeeded => Some(ProfilePhoto),
            ProfilePhoto => Some(Confirmation),
            Confirmation => None,
        }
    }

    /// The previous step, if any. `BasicInfo` has none (Previous is a no-op).
    pub fn previous(&self) -> Option<WizardStep> {
        use WizardStep::*;
        match self {
            BasicInfo => None,
            Location => Some(BasicInfo),
            SkillsOffered => Some(Location),
            SkillsNeeded => Some(SkillsOffered),
            ProfilePhoto => Some(SkillsNeeded),
            Confirmation => Some(ProfilePhoto),
        }
    }

    /// Whether this step is terminal (the wizard is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmation)
    }

    /// Whether this step collects a skills list.
    pub fn is_skills(&self) -> bool {
        matches!(self, Self::SkillsOffered | Self::SkillsNeeded)
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::BasicInfo
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::BasicInfo => "basic-info",
            Self::Location => "location",
            Self::SkillsOffered => "skills-offered",
            Self::SkillsNeeded => "skills-needed",
            Self::ProfilePhoto => "profile-photo",
            Self::Confirmation => "confirmation",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for WizardStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic-info" => Ok(Self::BasicInfo),
            "location" => Ok(Self::Location),
            "skills-offered" => Ok(Self::SkillsOffered),
            "skills-needed" => Ok(Self::SkillsNeeded),
            "profile-photo" => Ok(Self::ProfilePhoto),
            "confirmation" => Ok(Self::Confirmation),
            _ => Err(format!("Unknown wizard step: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_walks_the_whole_chain() {
        use WizardStep::*;
        let expected = [Location, SkillsOffered, SkillsNeeded, ProfilePhoto, Confirmation];
        let mut current = BasicInfo;
        for expected_next in expected {
            let next = current.next().unwrap();
            assert_eq!(next, expected_next);
            current = next;
        }
        assert!(current.next().is_none());
    }

    #[test]
    fn previous_reverses_one_position() {
        use WizardStep::*;
        assert_eq!(Location.previous(), Some(BasicInfo));
        assert_eq!(SkillsOffered.previous(), Some(Location));
        assert_eq!(SkillsNeeded.previous(), Some(SkillsOffered));
        assert_eq!(ProfilePhoto.previous(), Some(SkillsNeeded));
        assert!(BasicInfo.previous().is_none());
    }

    #[test]
    fn confirmation_is_terminal() {
        assert!(WizardStep::Confirmation.is_terminal());
        assert!(!WizardStep::BasicInfo.is_terminal());
        assert!(!WizardStep::ProfilePhoto.is_terminal());
    }

    #[test]
    fn display_matches_serde_and_from_str() {
        use WizardStep::*;
        for step in [BasicInfo, Location, SkillsOffered, SkillsNeeded, ProfilePhoto, Confirmation] {
            let display = format!("{step}");
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{display}\""), json);
            assert_eq!(display.parse::<WizardStep>().unwrap(), step);
        }
        assert!("not-a-step".parse::<WizardStep>().is_err());
    }
}
