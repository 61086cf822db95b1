use crate::scene::layer::LayerSlot;

/// Convenience result type used across fibertwist.
pub type FiberResult<T> = Result<T, FiberError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only conditions that prevent producing any output are errors. Degradations that still yield
/// a frame are reported as [`RenderWarning`] values next to the result.
#[derive(thiserror::Error, Debug)]
pub enum FiberError {
    /// Invalid user-provided configuration (ranges, palette size, gradient stops).
    #[error("validation error: {0}")]
    Validation(String),

    /// Raster bytes could not be decoded into a bitmap.
    #[error("decode error: {0}")]
    Decode(String),

    /// A frame could not be encoded for export.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors raised while executing a render plan.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing scene data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FiberError {
    /// Build a [`FiberError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FiberError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`FiberError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`FiberError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FiberError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// A non-fatal degradation reported alongside a rendered or encoded result.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderWarning {
    /// A layer image failed to load or decode; the layer was drawn without it.
    ImageDecode {
        /// Layer whose image was skipped.
        slot: LayerSlot,
        /// Decoder or IO message.
        message: String,
    },
    /// A gradient stop had an invalid hex color and was drawn black.
    InvalidGradientStop {
        /// Index of the stop after sorting by position.
        index: usize,
        /// The rejected color text.
        color: String,
    },
    /// The requested export encoding is not supported; PNG was produced instead.
    UnsupportedExport {
        /// The encoding that was asked for.
        requested: String,
    },
}

impl std::fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImageDecode { slot, message } => {
                write!(f, "failed to load image for {slot} layer: {message}")
            }
            Self::InvalidGradientStop { index, color } => {
                write!(f, "gradient stop {index} has invalid color \"{color}\", using black")
            }
            Self::UnsupportedExport { requested } => {
                write!(f, "{requested} export is not supported yet, using PNG instead")
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
