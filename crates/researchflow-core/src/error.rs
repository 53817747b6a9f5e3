use researchflow_storage::StoreError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Message shown when the server could not be reached at all
const CONNECTION_NOTICE: &str = "Could not connect to the server.";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected before any network call
    #[error("{0}")]
    Validation(String),

    /// A request is already pending on this surface
    #[error("a request is already in flight on this surface")]
    Busy,

    #[error("server responded with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("could not reach the server: {0}")]
    Transport(String),

    /// 2xx response whose body reports failure
    #[error("{0}")]
    Backend(String),

    #[error("cannot {action} while the surface is {from}")]
    InvalidTransition { from: String, action: String },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Text suitable for an inline notice or notification
    pub fn user_message(&self) -> String {
        match self {
            Error::Http { message, .. } if !message.is_empty() => message.clone(),
            Error::Http { status, .. } => format!("The server responded with status {status}."),
            Error::Transport(_) => CONNECTION_NOTICE.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let http = Error::Http {
            status: 503,
            message: "Database unavailable".to_string(),
        };
        assert_eq!(http.user_message(), "Database unavailable");

        let bare = Error::Http {
            status: 500,
            message: String::new(),
        };
        assert!(bare.user_message().contains("500"));

        let transport = Error::Transport("connection refused".to_string());
        assert_eq!(transport.user_message(), CONNECTION_NOTICE);

        assert_eq!(Error::validation("passwords differ").user_message(), "passwords differ");
    }
}
