use thiserror::Error;

/// Failure of a single call to the translation backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, reset, timed out or otherwise never got a response
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The backend answered with a non-success status
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The body could not be read as the expected JSON shape
    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl ApiError {
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::Decode { url, .. } => {
                url
            }
        }
    }

    /// Short label for the taxonomy bucket, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::Decode { .. } => "decode",
        }
    }
}

/// Errors surfaced by the view controller.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("controller is already attached")]
    AlreadyAttached,

    #[error("controller has been detached")]
    Detached,

    #[error("page has no tab triggers")]
    NoTriggers,

    #[error("submission aborted")]
    Aborted,
}
