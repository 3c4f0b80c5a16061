//! Profile data models shared by the wizard and the gateway.

pub mod model;

pub use model::{BasicInfo, ExchangeKind, Location, ProfileData, ProfileStatus, SkillEntry};
