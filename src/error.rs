use thiserror::Error;

// Structural misuse of the document builder. These are programmer errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    #[error("Document already started; end it or flush before starting another")]
    DocumentAlreadyStarted,

    #[error("No document in progress")]
    DocumentNotStarted,

    #[error("No open element to close")]
    NoOpenElement,

    #[error("Attribute {name} must follow start_element before any content")]
    AttributeOutOfPosition { name: String },

    #[error("Unclosed elements: {0:?}")]
    UnclosedElements(Vec<String>),

    #[error("Document started but not ended")]
    DocumentNotEnded,

    #[error("XML write error: {0}")]
    Write(String),
}

// Failures delivering the request or receiving the reply
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid transport configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            TransportError::InvalidConfig(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

// The reply arrived but is not the XML we expected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("Malformed reply: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Missing required configuration: {0}")]
    MissingConfiguration(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
