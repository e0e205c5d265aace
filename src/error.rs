#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid graph payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("node {0} is not part of the current graph")]
    UnknownNode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
