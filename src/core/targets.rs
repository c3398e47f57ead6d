//! Works out which folders a command invocation should expand.

use crate::domain::host::ExplorerHost;
use crate::domain::models::{
    FileKind, FolderRef, Invocation, Notification, TargetSet, TargetSource,
};
use log::debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("No workspace folder is open.")]
    NoWorkspace,

    #[error("Selected item is not a folder.")]
    NotAFolder(FolderRef),

    #[error("None of the selected items is a folder.")]
    NoFolderSelected,
}

impl TargetError {
    pub fn into_notification(self) -> Notification {
        match self {
            TargetError::NoWorkspace => Notification::info(self.to_string()),
            _ => Notification::error(self.to_string()),
        }
    }
}

fn is_directory<H: ExplorerHost + ?Sized>(host: &H, folder: &FolderRef) -> bool {
    match host.stat(folder) {
        Ok(FileKind::Directory) => true,
        Ok(kind) => {
            debug!("Dropping {} from targets: {:?}", folder, kind);
            false
        }
        Err(e) => {
            debug!("Dropping {} from targets: {}", folder, e);
            false
        }
    }
}

fn keep_directories<H: ExplorerHost + ?Sized>(host: &H, candidates: &[FolderRef]) -> Vec<FolderRef> {
    let mut folders: Vec<FolderRef> = Vec::new();
    for candidate in candidates {
        if folders.contains(candidate) {
            continue;
        }
        if is_directory(host, candidate) {
            folders.push(candidate.clone());
        }
    }
    folders
}

/// Multi-selection wins over the primary target, which wins over the open
/// workspace roots. Entries that are not directories are dropped.
pub fn resolve_targets<H: ExplorerHost + ?Sized>(
    host: &H,
    invocation: &Invocation,
) -> Result<TargetSet, TargetError> {
    if !invocation.selected.is_empty() {
        let folders = keep_directories(host, &invocation.selected);
        debug!(
            "{} of {} selected items are folders",
            folders.len(),
            invocation.selected.len()
        );
        if folders.is_empty() {
            return Err(TargetError::NoFolderSelected);
        }
        return Ok(TargetSet {
            source: TargetSource::Selection,
            folders,
        });
    }

    if let Some(primary) = &invocation.primary {
        if !is_directory(host, primary) {
            return Err(TargetError::NotAFolder(primary.clone()));
        }
        return Ok(TargetSet {
            source: TargetSource::Primary,
            folders: vec![primary.clone()],
        });
    }

    let roots: Vec<FolderRef> = host
        .workspace_folders()
        .into_iter()
        .map(|w| w.folder)
        .collect();
    let folders = keep_directories(host, &roots);
    if folders.is_empty() {
        return Err(TargetError::NoWorkspace);
    }

    Ok(TargetSet {
        source: TargetSource::Workspace,
        folders,
    })
}
