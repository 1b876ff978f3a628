use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unable to open serial port {port}: {reason}")]
    Open { port: String, reason: String },
    #[error("database unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },
    #[error("database rejected write ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("http: {0}")]
    Http(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IoError>;
