//! Error types for the fallible edges of the game
//!
//! The simulation itself never fails; these cover configuration loading and
//! frame presentation.

/// Errors produced while loading or validating `Settings` / `Tuning`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A numeric field is outside its accepted range.
    #[error("config field '{field}' out of range: {value} (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        expected: &'static str,
    },

    /// A field that must not be empty was empty.
    #[error("config field '{field}' must not be empty")]
    Empty { field: &'static str },

    /// An operator list named something other than + - x ÷.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// A config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced while presenting a frame.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The GPU surface rejected the frame.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

pub(crate) fn check_range(
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
    expected: &'static str,
) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected,
        })
    }
}
