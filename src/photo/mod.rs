//! Profile photo step — file checks, crop utility, and the upload flow
//! state machine.

pub mod crop;
pub mod file;
pub mod flow;

pub use crop::{centered_crop, crop_to_png, display_size, CropRect, CroppedImage};
pub use file::{SelectedFile, ACCEPTED_IMAGE_TYPES, MAX_FILE_SIZE_BYTES, MAX_FILE_SIZE_MB};
pub use flow::{PhotoEvent, PhotoFlow, PhotoStage};
