use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Empty or non-finite value sequence fed to scale fitting.
    #[error("invalid scale domain: {0}")]
    InvalidDomain(String),

    /// Two items in one reconciliation pass share an identity.
    #[error("duplicate key `{key}` in {layer} layer")]
    DuplicateKey { layer: &'static str, key: String },

    /// Negative, missing or non-numeric packing weight.
    #[error("invalid pack weight for `{id}`: {value}")]
    InvalidWeight { id: String, value: String },
}
