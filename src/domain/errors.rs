/// Failures a form session can run into.
///
/// None of them are fatal: every variant leaves the session interactive and
/// the user may retry.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Submit was attempted while the uploaded document is not validated.
    ValidationBlocked,
    /// The service answered with a non-success status.
    RemoteRejected { status: u16, message: String },
    /// Network failure or an unreadable response.
    Transport(String),
    /// The validation endpoint itself could not be used.
    ValidationService(String),
    /// The signature raster could not be encoded.
    Signature(String),
    /// Local file system failure (reading an upload, saving an artifact).
    Io(String),
    /// Configuration file could not be read or parsed.
    Config(String),
}

pub const BLOCKED_MESSAGE: &str = "Document must be validated before submission";
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while generating the PDF";

impl ClientError {
    /// Text shown to the user in the error banner.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::ValidationBlocked => BLOCKED_MESSAGE.to_string(),
            ClientError::RemoteRejected { message, .. } => message.clone(),
            ClientError::Transport(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// The underlying cause, without the variant's prefix.
    pub fn detail(&self) -> String {
        match self {
            ClientError::ValidationBlocked => BLOCKED_MESSAGE.to_string(),
            ClientError::RemoteRejected { message, .. } => message.clone(),
            ClientError::Transport(msg)
            | ClientError::ValidationService(msg)
            | ClientError::Signature(msg)
            | ClientError::Io(msg)
            | ClientError::Config(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::ValidationBlocked => write!(f, "{}", BLOCKED_MESSAGE),
            ClientError::RemoteRejected { status, message } => {
                write!(f, "Service rejected request ({}): {}", status, message)
            }
            ClientError::Transport(msg) => write!(f, "Transport failure: {}", msg),
            ClientError::ValidationService(msg) => write!(f, "Could not validate PDF: {}", msg),
            ClientError::Signature(msg) => write!(f, "Signature export failed: {}", msg),
            ClientError::Io(msg) => write!(f, "File error: {}", msg),
            ClientError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

pub type ClientResult<T> = Result<T, ClientError>;
