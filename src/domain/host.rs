use crate::domain::models::{DirEntryInfo, FileKind, FolderRef, Notification, WorkspaceFolder};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("No such file or directory: {0}")]
    NotFound(String),

    #[error("Failed to access {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not part of the explorer view")]
    NotInView(String),

    #[error("No node is focused in the explorer")]
    NoFocus,

    #[error("{0}")]
    Rejected(String),
}

pub type HostResult<T> = std::result::Result<T, HostError>;

/// Cooperative cancellation flag shared between a progress surface and the
/// traversal polling it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Capabilities the surrounding explorer provides. Expansion logic only ever
/// talks to the tree view through this trait.
pub trait ExplorerHost {
    fn focus_explorer(&mut self) -> HostResult<()>;

    fn stat(&self, folder: &FolderRef) -> HostResult<FileKind>;

    /// Immediate children of a directory, in the host's own order.
    fn list_children(&self, folder: &FolderRef) -> HostResult<Vec<DirEntryInfo>>;

    /// Bring a location into view and make it the current node.
    fn reveal(&mut self, folder: &FolderRef) -> HostResult<()>;

    fn expand_current(&mut self) -> HostResult<()>;

    fn collapse_all(&mut self) -> HostResult<()>;

    fn select_all(&mut self) -> HostResult<()>;

    fn workspace_folders(&self) -> Vec<WorkspaceFolder>;

    /// Current exclusion setting. Never cached by callers.
    fn exclude_patterns(&self) -> Vec<String>;

    fn notify(&mut self, notification: Notification);

    /// Opens the cancellable progress surface that `report_progress` writes to.
    fn begin_progress(&mut self, _title: &str) {}

    fn report_progress(&mut self, message: &str, percentage: Option<u8>);

    fn end_progress(&mut self) {}

    fn cancellation_token(&self) -> CancellationToken;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_token_is_shared_between_clones() {
        let token = CancellationToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());

        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn test_host_error_messages() {
        assert_eq!(
            HostError::NotFound("/tmp/x".to_string()).to_string(),
            "No such file or directory: /tmp/x"
        );
        assert_eq!(
            HostError::NoFocus.to_string(),
            "No node is focused in the explorer"
        );
    }
}
