use thiserror::Error;

/// Error returned by a host drawing context.
pub type HostError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a shape was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeDefect {
    #[error("polygon has {0} points, at least 3 are required")]
    TooFewPoints(usize),
    #[error("coordinate is not finite")]
    NonFinite,
    #[error("circle radius is negative")]
    NegativeRadius,
    #[error("rectangle has a negative width or height")]
    NegativeExtent,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("size {0} is invalid: the size should be 1 pixel or larger")]
    InvalidSize(u32),
    #[error("invalid dimensions {width}x{height}: both must be at least 1")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("invalid shape: {0}")]
    InvalidShape(#[from] ShapeDefect),
    #[error("{0} is required")]
    ArgumentRequired(&'static str),
    #[error("the renderer has already been finalized")]
    AlreadyFinalized,
    #[error("encoding failed: {0}")]
    EncodingFailed(#[from] std::io::Error),
    #[error("host drawing failed: {0}")]
    HostDrawingFailed(#[source] HostError),
}

impl RenderError {
    /// The caller passed a missing or out-of-range argument.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            RenderError::InvalidSize(_)
                | RenderError::InvalidDimensions { .. }
                | RenderError::ArgumentRequired(_)
        )
    }
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;
