use std::error::Error;
use std::fmt::{Display, Formatter, Result};

#[macro_export]
macro_rules! create_m3u_curator_error {
     ($kind: expr, $($arg:tt)*) => {
        $crate::m3u_curator_error::M3uCuratorError::new($kind, format!($($arg)*))
    }
}
pub use create_m3u_curator_error;

#[macro_export]
macro_rules! create_m3u_curator_error_result {
     ($kind: expr, $($arg:tt)*) => {
        Err($crate::m3u_curator_error::M3uCuratorError::new($kind, format!($($arg)*)))
    }
}
pub use create_m3u_curator_error_result;

#[macro_export]
macro_rules! info_err {
    ($($arg:tt)*) => {
        $crate::m3u_curator_error::M3uCuratorError::new($crate::m3u_curator_error::M3uCuratorErrorKind::Info, format!($($arg)*))
    }
}
pub use info_err;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum M3uCuratorErrorKind {
    // the unfiltered playlist is absent or empty, no catalog can be built
    MissingSource,
    // malformed guide document
    Parse,
    // the persistence sink rejected the playlist
    Persist,
    Info,
}

impl Display for M3uCuratorErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", match self {
            Self::MissingSource => "missing source",
            Self::Parse => "parse",
            Self::Persist => "persist",
            Self::Info => "info",
        })
    }
}

#[derive(Debug)]
pub struct M3uCuratorError {
    pub kind: M3uCuratorErrorKind,
    pub message: String,
}

impl M3uCuratorError {
    pub const fn new(kind: M3uCuratorErrorKind, message: String) -> Self {
        Self {
            kind,
            message,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, M3uCuratorErrorKind::MissingSource)
    }
}

impl Display for M3uCuratorError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "M3uCurator {} error: {}", self.kind, self.message)
    }
}

impl Error for M3uCuratorError {}
