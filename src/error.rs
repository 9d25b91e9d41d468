use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid chart configuration: {0}")]
    InvalidConfig(String),

    #[error("record {index} is missing field `{field}`")]
    MissingField { field: String, index: usize },

    #[error("record {index} has invalid magnitude `{value}` in field `{field}`")]
    InvalidMagnitude {
        field: String,
        index: usize,
        value: String,
    },

    #[error("failed to load `{path}`: {reason}")]
    Load { path: String, reason: String },

    #[error("chart has already been detached from its surface")]
    ChartDetached,
}

impl ChartError {
    /// Returns `true` for errors caused by an unusable chart setup rather than
    /// by the data source.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_)
                | Self::MissingField { .. }
                | Self::InvalidMagnitude { .. }
                | Self::InvalidViewport { .. }
        )
    }
}
