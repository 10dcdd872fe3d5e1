use thiserror::Error;

/// Failures of a request to the chat service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("unable to connect to the server: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("invalid response format from server")]
    InvalidResponse,

    #[error("request interrupted: {0}")]
    Aborted(String),
}

impl ChatError {
    /// Human-readable cause shown in the transcript
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Transport(_) => {
                "Unable to connect to the server. Please check if the backend is running".to_string()
            }
            ChatError::Timeout => "The server took too long to respond".to_string(),
            ChatError::Server { message, .. } => message.clone(),
            ChatError::InvalidResponse => "Invalid response format from server".to_string(),
            ChatError::Aborted(_) => "The request was interrupted".to_string(),
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Timeout
        } else if err.is_decode() {
            ChatError::InvalidResponse
        } else {
            ChatError::Transport(err.to_string())
        }
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
