/// Result alias that carries the custom [`TreeRingError`] type.
pub type Result<T> = std::result::Result<T, TreeRingError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum TreeRingError {
    /// Free-form message for failures that do not deserve their own variant.
    #[error("{0}")]
    Message(String),
    /// The ring data set contained no records. The animation cannot start
    /// without at least one ring.
    #[error("ring data set is empty")]
    EmptyData,
    /// A record broke one of the data model constraints.
    #[error("invalid ring record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
    /// Engine parameters that would produce NaN or negative state.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Host command text outside the control surface.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON input.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl TreeRingError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn invalid_record(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            index,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

impl From<&str> for TreeRingError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for TreeRingError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
