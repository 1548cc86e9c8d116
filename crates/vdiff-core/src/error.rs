use thiserror::Error;

/// Which of the two compared images an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSlot {
    First,
    Second,
}

impl std::fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "image 1"),
            Self::Second => write!(f, "image 2"),
        }
    }
}

#[derive(Error, Debug)]
pub enum VdiffError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("{slot} could not be loaded: {reason}")]
    ImageLoad { slot: ImageSlot, reason: String },

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Buffer size mismatch: expected {expected_w}x{expected_h}, got {actual_w}x{actual_h}")]
    SizeMismatch {
        expected_w: usize,
        expected_h: usize,
        actual_w: usize,
        actual_h: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid comparison parameters: {0}")]
    Parameters(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VdiffError>;
