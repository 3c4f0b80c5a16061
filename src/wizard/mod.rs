//! Profile setup wizard — state store, step chain, transition engine, and
//! the REST surface.
//!
//! A linear forward chain of steps collects profile data; each Next
//! validates the step's form buffer, persists through the gateway, then
//! commits into the state store and advances. Previous never validates or
//! persists. Save & Exit persists, then leaves the wizard.

pub mod engine;
pub mod routes;
pub mod state;
pub mod step;

pub use engine::{StepForm, WizardEngine, WizardStatus};
pub use routes::{wizard_routes, WizardRouteState};
pub use state::{StepData, WizardState};
pub use step::WizardStep;
