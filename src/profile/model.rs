//! Profile data models — the shapes collected by the wizard steps.

use serde::{Deserialize, Serialize};

use crate::wizard::step::WizardStep;

/// How a skill is exchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeKind {
    /// Trade for other skills or goods.
    Barter,
    /// Offered or requested for free.
    Volunteer,
    /// Paid service.
    Paid,
}

impl Default for ExchangeKind {
    fn default() -> Self {
        Self::Barter
    }
}

impl std::fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Barter => write!(f, "barter"),
            Self::Volunteer => write!(f, "volunteer"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

/// One skill a user offers or needs.
///
/// Created client-side when added to an in-progress list; persisted as a
/// batch when the step transitions; never mutated after persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub exchange_kind: ExchangeKind,
}

/// Basic-info step data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub full_name: String,
    #[serde(default)]
    pub bio: String,
}

/// Location step data. Coordinates are optional; the address is what the
/// user typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Accumulated per-step profile data held by the wizard state store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub basic_info: BasicInfo,
    pub location: Location,
    pub skills_offered: Vec<SkillEntry>,
    pub skills_needed: Vec<SkillEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Completion status fetched from the backend, used to resume the wizard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileStatus {
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed_step: Option<WizardStep>,
}
