use thiserror::Error;

/// Errors returned synchronously when the checker is misused.
///
/// Runtime failures of a check never surface here; they are classified into a
/// [`CheckOutcome`](crate::CheckOutcome) and, where relevant, captured as a [`Fault`].
#[derive(Error, Debug)]
pub enum CheckError {
    /// The project identifier was empty or whitespace.
    #[error("Source identifier must not be blank")]
    BlankSourceId,

    /// The locally installed version was empty or whitespace.
    #[error("Local version must not be blank")]
    BlankLocalVersion,

    /// Invalid base URL override.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// A check was started outside a Tokio runtime.
    #[error("Update checks must be started from within a Tokio runtime")]
    NoRuntime,

    /// The HTTP client could not be built from the configuration.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A failure captured while fetching or parsing a response, before the
/// response content could be classified.
#[derive(Error, Debug)]
pub enum Fault {
    /// Connection refused, timed out, or the response stream broke.
    #[error("Failed to reach release API: {0}")]
    Transport(#[from] reqwest::Error),

    /// The release API answered with a non-success status.
    #[error("Release API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The response body was not valid JSON.
    #[error("Failed to parse release API response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The worker task running the check panicked or was cancelled.
    #[error("Update check task failed: {0}")]
    Worker(String),
}

/// The response parsed but did not have the shape the platform expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed release API response: {0}")]
pub struct MalformedResponse(pub String);

/// Result type alias for UpdateChecker operations.
pub type Result<T> = std::result::Result<T, CheckError>;
