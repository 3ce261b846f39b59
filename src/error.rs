use std::path::PathBuf;

/// Errors raised by table operations and by persistence
#[derive(Debug)]
pub enum Error {
    /// The file could not be opened in the requested mode
    Unavailable {
        /// Path that was being opened
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// I/O error while reading or writing an already opened stream
    Io(std::io::Error),

    /// The stream does not have the expected shape
    Malformed(&'static str),

    /// A persisted field is not valid UTF-8
    Utf8(std::string::FromUtf8Error),

    /// A count or field length does not fit the 32-bit length prefix
    FieldTooLarge(usize),

    /// No free slot was reachable within `capacity` probes
    TableFull,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { path, source } => {
                write!(f, "cannot open file {}: {source}", path.display())
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Malformed(reason) => write!(f, "malformed stream: {reason}"),
            Self::Utf8(e) => write!(f, "field is not valid UTF-8: {e}"),
            Self::FieldTooLarge(len) => write!(f, "length {len} does not fit a 32-bit prefix"),
            Self::TableFull => write!(f, "table is full"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unavailable { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            Self::Utf8(e) => Some(e),
            Self::Malformed(_) | Self::FieldTooLarge(_) | Self::TableFull => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(value: std::string::FromUtf8Error) -> Self {
        Self::Utf8(value)
    }
}

/// Crate result
pub type Result<T> = std::result::Result<T, Error>;
