use thiserror::Error;

#[derive(Debug, Error)]
pub enum OsrmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("OSRM returned non-Ok code: {code}")]
    Api { code: String },

    #[error("malformed duration matrix: {reason}")]
    MalformedMatrix { reason: String },

    #[error("too many sources in one table request: {got} (max {max})")]
    TooManySources { got: usize, max: usize },
}
