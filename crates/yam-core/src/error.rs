use thiserror::Error;
use yam_types::{DefaultAction, Notice, TargetId};

use crate::platform::PlatformError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Watcher error: {0}")]
    Watcher(#[from] notify::Error),

    #[error("Capability not ready: {0}")]
    Unavailable(String),

    #[error("Label must not be empty")]
    InvalidLabel,

    #[error("Shortcut slot {0} is not bound")]
    SlotNotBound(usize),

    #[error("Shortcut slot {index} out of range (capacity {capacity})")]
    SlotOutOfRange { index: usize, capacity: usize },

    #[error("Shortcuts are locked")]
    ShortcutsLocked,

    #[error("Cannot resolve {0}")]
    ResolutionFailure(TargetId),

    #[error("No app handles {0}")]
    NoMatchingDefaultApp(DefaultAction),

    #[error("Platform error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// How a failure is handled by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Capability not ready yet; retried on the next cycle or keystroke
    TransientUnavailable,
    /// Rejected synchronously, nothing persisted
    InvalidInput,
    /// A bound target no longer resolves; binding is kept
    ResolutionFailure,
    /// No handler for an implicit system action
    NoMatchingDefaultApp,
    /// Anything else (I/O, corrupt state); logged, never fatal
    Internal,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable(_) => ErrorKind::TransientUnavailable,
            Self::InvalidLabel
            | Self::SlotNotBound(_)
            | Self::SlotOutOfRange { .. }
            | Self::ShortcutsLocked => ErrorKind::InvalidInput,
            Self::ResolutionFailure(_) => ErrorKind::ResolutionFailure,
            Self::NoMatchingDefaultApp(_) => ErrorKind::NoMatchingDefaultApp,
            Self::Io(_) | Self::Json(_) | Self::Config(_) | Self::Watcher(_) | Self::Platform(_) => {
                ErrorKind::Internal
            }
        }
    }

    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::TransientUnavailable
    }

    /// The toast to show for this error, if the user should see one
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::InvalidLabel => Some(Notice::EmptyLabel),
            Self::SlotNotBound(index) => Some(Notice::EmptySlot { index: *index }),
            Self::ShortcutsLocked => Some(Notice::ShortcutsLocked),
            Self::ResolutionFailure(id) => Some(Notice::LaunchFailed {
                target: id.package().to_string(),
            }),
            Self::NoMatchingDefaultApp(action) => Some(Notice::NoDefaultApp {
                action: action.clone(),
            }),
            _ => None,
        }
    }
}

impl From<PlatformError> for Error {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Unavailable(what) => Self::Unavailable(what),
            PlatformError::NotFound(what) | PlatformError::Failed(what) => Self::Platform(what),
        }
    }
}
