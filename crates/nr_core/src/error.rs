use thiserror::Error;

/// Message shown when the endpoint fails without saying why.
pub const GENERIC_FETCH_MESSAGE: &str = "ニュースの取得に失敗しました。";

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Non-2xx response or transport failure while fetching articles.
    #[error("Fetch error: {message}")]
    Fetch {
        message: String,
        status: Option<u16>,
    },

    /// A storage slot held text that isn't a valid collection.
    #[error("Malformed value in storage slot '{key}': {source}")]
    StorageParse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn fetch(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Fetch {
            message: message.into(),
            status,
        }
    }

    /// Text rendered in place of the article list when initialization fails.
    pub fn display_message(&self) -> String {
        match self {
            Error::Fetch { message, .. } => format!("エラー: {}", message),
            other => format!("エラー: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_display_message_uses_server_text() {
        let err = Error::fetch("server down", Some(500));
        assert_eq!(err.display_message(), "エラー: server down");
    }

    #[test]
    fn test_other_errors_are_prefixed() {
        let err = Error::Storage("disk full".to_string());
        assert_eq!(err.display_message(), "エラー: Storage error: disk full");
    }
}
