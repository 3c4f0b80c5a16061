//! Photo step state machine.
//!
//! Explicit tagged-union states with a single mutation entrypoint,
//! [`PhotoFlow::apply`]. The stage while an upload is in flight retains the
//! file and crop buffers so a failed upload drops back to `Cropping` and the
//! user can retry without reselecting.

use image::{DynamicImage, GenericImageView};

use crate::error::PhotoError;

use super::crop::{centered_crop, display_size, CropRect};
use super::file::SelectedFile;

/// Where the photo step is.
#[derive(Debug)]
pub enum PhotoStage {
    /// No file chosen, no committed photo.
    Idle,
    /// A file is chosen and decoded; awaiting a user-confirmed crop region.
    Cropping {
        file: SelectedFile,
        image: DynamicImage,
        display: (u32, u32),
        crop: CropRect,
    },
    /// Crop confirmed, upload in flight. All photo operations are rejected
    /// until the upload resolves.
    Uploading {
        file: SelectedFile,
        image: DynamicImage,
        display: (u32, u32),
        crop: CropRect,
    },
    /// An uploaded photo is committed.
    IdleWithPhoto { url: String },
}

impl PhotoStage {
    /// Stable stage name for status reporting.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Cropping { .. } => "cropping",
            Self::Uploading { .. } => "uploading",
            Self::IdleWithPhoto { .. } => "idle-with-photo",
        }
    }
}

/// Events accepted by [`PhotoFlow::apply`].
#[derive(Debug)]
pub enum PhotoEvent {
    /// The user picked a file. Checked, decoded, and given an initial
    /// centered crop on success.
    Select(SelectedFile),
    /// The user adjusted the crop region.
    SetCrop(CropRect),
    /// Crop confirmed; an upload is starting.
    BeginUpload,
    /// The upload (and URL save) succeeded.
    UploadSucceeded { url: String },
    /// The upload failed; return to cropping for a user-initiated retry.
    UploadFailed,
    /// Discard the selected file and crop buffers, restoring the committed
    /// photo if there is one.
    CancelCrop { committed: Option<String> },
    /// The committed photo was deleted.
    PhotoDeleted,
}

/// The photo step's state machine.
#[derive(Debug)]
pub struct PhotoFlow {
    stage: PhotoStage,
}

impl PhotoFlow {
    /// Start in `Idle`, or `IdleWithPhoto` if a photo is already committed.
    pub fn new(committed: Option<String>) -> Self {
        let stage = match committed {
            Some(url) => PhotoStage::IdleWithPhoto { url },
            None => PhotoStage::Idle,
        };
        Self { stage }
    }

    pub fn stage(&self) -> &PhotoStage {
        &self.stage
    }

    /// Whether an upload is in flight — the subsystem's only reentrancy
    /// guard.
    pub fn is_uploading(&self) -> bool {
        matches!(self.stage, PhotoStage::Uploading { .. })
    }

    pub fn is_cropping(&self) -> bool {
        matches!(self.stage, PhotoStage::Cropping { .. })
    }

    /// Apply one event. The only way the stage changes.
    pub fn apply(&mut self, event: PhotoEvent) -> Result<(), PhotoError> {
        if self.is_uploading()
            && !matches!(
                event,
                PhotoEvent::UploadSucceeded { .. } | PhotoEvent::UploadFailed
            )
        {
            return Err(PhotoError::Busy);
        }

        match event {
            PhotoEvent::Select(file) => {
                if self.is_cropping() {
                    return Err(PhotoError::CropPending);
                }
                file.check()?;
                let image = image::load_from_memory(&file.bytes)
                    .map_err(|e| PhotoError::Decode(e.to_string()))?;
                let (natural_width, natural_height) = image.dimensions();
                let display = display_size(natural_width, natural_height);
                let crop = centered_crop(display.0, display.1);
                self.stage = PhotoStage::Cropping {
                    file,
                    image,
                    display,
                    crop,
                };
                Ok(())
            }
            PhotoEvent::SetCrop(rect) => match &mut self.stage {
                PhotoStage::Cropping { crop, .. } => {
                    *crop = rect;
                    Ok(())
                }
                _ => Err(PhotoError::NothingToUpload),
            },
            PhotoEvent::BeginUpload => {
                match std::mem::replace(&mut self.stage, PhotoStage::Idle) {
                    PhotoStage::Cropping {
                        file,
                        image,
                        display,
                        crop,
                    } => {
                        self.stage = PhotoStage::Uploading {
                            file,
                            image,
                            display,
                            crop,
                        };
                        Ok(())
                    }
                    other => {
                        self.stage = other;
                        Err(PhotoError::NothingToUpload)
                    }
                }
            }
            PhotoEvent::UploadSucceeded { url } => {
                match std::mem::replace(&mut self.stage, PhotoStage::Idle) {
                    PhotoStage::Uploading { .. } => {
                        self.stage = PhotoStage::IdleWithPhoto { url };
                        Ok(())
                    }
                    other => {
                        self.stage = other;
                        Err(PhotoError::NothingToUpload)
                    }
                }
            }
            PhotoEvent::UploadFailed => {
                match std::mem::replace(&mut self.stage, PhotoStage::Idle) {
                    PhotoStage::Uploading {
                        file,
                        image,
                        display,
                        crop,
                    } => {
                        self.stage = PhotoStage::Cropping {
                            file,
                            image,
                            display,
                            crop,
                        };
                        Ok(())
                    }
                    other => {
                        self.stage = other;
                        Err(PhotoError::NothingToUpload)
                    }
                }
            }
            PhotoEvent::CancelCrop { committed } => {
                if self.is_cropping() {
                    self.stage = match committed {
                        Some(url) => PhotoStage::IdleWithPhoto { url },
                        None => PhotoStage::Idle,
                    };
                }
                Ok(())
            }
            PhotoEvent::PhotoDeleted => match self.stage {
                PhotoStage::IdleWithPhoto { .. } => {
                    self.stage = PhotoStage::Idle;
                    Ok(())
                }
                _ => Err(PhotoError::NoPhoto),
            },
        }
    }
}
