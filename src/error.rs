use thiserror::Error;

#[derive(Error, Debug)]
pub enum AvcError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("capacity exceeded: {0}")]
    Capacity(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("unsupported feature: {0}")]
    Unsupported(String),
}

impl AvcError {
    /// Process exit status for the error category. Used by the binary
    /// boundary only; library code never terminates the process.
    pub fn exit_code(&self) -> i32 {
        match self {
            AvcError::Config(_) | AvcError::Unsupported(_) => 2,
            AvcError::Capacity(_) => 3,
            AvcError::Io(_) => 4,
            AvcError::Codec(_) => 5,
        }
    }
}

pub type Result<T> = std::result::Result<T, AvcError>;
