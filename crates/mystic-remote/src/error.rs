use thiserror::Error;

/// Setup failures for remote collaborators.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// An environment variable held a value that could not be used.
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// The offending value.
        value: String,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result alias for remote setup.
pub type RemoteResult<T> = Result<T, RemoteError>;
