use std::fmt;

/// Failure turning bytes into a chart document or back.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Bytes are not valid UTF-8.
    Encoding(String),
    /// Text is not well-formed JSON.
    Parse(String),
    /// Well-formed JSON that is not a chart document (e.g. a bare array).
    Shape(String),
    /// Document could not be written out.
    Serialize(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding(msg) => write!(f, "invalid text encoding: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Shape(msg) => write!(f, "not a chart document: {msg}"),
            Self::Serialize(msg) => write!(f, "serialize error: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Failure reading or writing chart bytes.
#[derive(Debug)]
pub enum StoreError {
    /// Source could not be read.
    Read(String),
    /// Destination could not be written.
    Write(String),
    /// Bytes were read but are not a usable chart.
    Codec(CodecError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(msg) => write!(f, "read error: {msg}"),
            Self::Write(msg) => write!(f, "write error: {msg}"),
            Self::Codec(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CodecError> for StoreError {
    /// Bytes that are not text count as unreadable input, not as a bad document.
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Encoding(msg) => Self::Read(format!("invalid text encoding: {msg}")),
            other => Self::Codec(other),
        }
    }
}
