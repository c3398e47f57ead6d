use crate::domain::host::{CancellationToken, ExplorerHost, HostError, HostResult};
use crate::domain::models::{
    DirEntryInfo, FileKind, FolderRef, Notification, NotificationLevel, WorkspaceFolder,
};
use crate::infra::explorer_view::ExplorerView;
use crate::infra::progress::ConsoleProgress;
use crate::infra::settings::ExcludeSettings;
use crossterm::{
    ExecutableCommand,
    style::{Color, ResetColor, SetForegroundColor},
};
use log::{debug, info, warn};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

fn io_error(path: &Path, source: io::Error) -> HostError {
    if source.kind() == io::ErrorKind::NotFound {
        HostError::NotFound(path.display().to_string())
    } else {
        HostError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

fn stat_path(path: &Path) -> HostResult<FileKind> {
    let metadata = fs::metadata(path).map_err(|e| io_error(path, e))?;
    Ok(if metadata.is_dir() {
        FileKind::Directory
    } else if metadata.is_file() {
        FileKind::File
    } else {
        FileKind::Other
    })
}

/// Immediate children sorted by file name. Symlinks are reported as such and
/// never followed.
pub fn list_directory(path: &Path) -> HostResult<Vec<DirEntryInfo>> {
    let mut entries = Vec::new();
    for entry in walkdir::WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| io_error(path, e.into()))?;
        let file_type = entry.file_type();
        let kind = if file_type.is_symlink() {
            FileKind::Symlink
        } else if file_type.is_dir() {
            FileKind::Directory
        } else if file_type.is_file() {
            FileKind::File
        } else {
            FileKind::Other
        };
        entries.push(DirEntryInfo::new(
            entry.file_name().to_string_lossy().to_string(),
            kind,
        ));
    }
    Ok(entries)
}

/// Explorer host backed by the local filesystem and an in-memory tree view.
pub struct FsHost {
    workspace: Vec<WorkspaceFolder>,
    view: ExplorerView,
    settings: ExcludeSettings,
    token: CancellationToken,
    progress: ConsoleProgress,
    notifications: Vec<Notification>,
    echo: bool,
    explorer_focused: bool,
}

impl FsHost {
    pub fn new(workspace: Vec<WorkspaceFolder>, settings: ExcludeSettings, echo: bool) -> Self {
        let workspace: Vec<WorkspaceFolder> = workspace
            .into_iter()
            .map(|w| WorkspaceFolder {
                name: w.name,
                folder: w.folder.normalized(),
            })
            .collect();
        let token = CancellationToken::new();
        Self {
            view: ExplorerView::new(&workspace),
            workspace,
            settings,
            progress: ConsoleProgress::new(token.clone(), echo),
            token,
            notifications: Vec::new(),
            echo,
            explorer_focused: false,
        }
    }

    pub fn view(&self) -> &ExplorerView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ExplorerView {
        &mut self.view
    }

    pub fn last_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    /// Turns console notifications and the progress line on or off.
    pub fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
        self.progress.set_enabled(echo);
    }

    /// Fresh cancellation token for the next command.
    pub fn reset_cancellation(&mut self) {
        self.token = CancellationToken::new();
        self.progress = ConsoleProgress::new(self.token.clone(), self.echo);
    }

    pub fn set_expanded(&mut self, path: &Path, expanded: bool) -> HostResult<()> {
        self.view.set_expanded(path, expanded, &list_directory)
    }

    fn print_notification(&self, notification: &Notification) -> io::Result<()> {
        let mut stdout = io::stdout();
        let (color, icon) = match notification.level {
            NotificationLevel::Info => (Color::Green, "ℹ"),
            NotificationLevel::Error => (Color::Red, "✖"),
        };
        stdout.execute(SetForegroundColor(color))?;
        write!(stdout, "{} ", icon)?;
        stdout.execute(ResetColor)?;
        writeln!(stdout, "{}", notification.text)?;
        Ok(())
    }
}

impl ExplorerHost for FsHost {
    fn focus_explorer(&mut self) -> HostResult<()> {
        debug!("Focusing explorer with {} roots", self.workspace.len());
        self.explorer_focused = true;
        Ok(())
    }

    fn stat(&self, folder: &FolderRef) -> HostResult<FileKind> {
        stat_path(folder.path())
    }

    fn list_children(&self, folder: &FolderRef) -> HostResult<Vec<DirEntryInfo>> {
        list_directory(folder.path())
    }

    /// Folders outside every workspace root are shown as extra roots.
    fn reveal(&mut self, folder: &FolderRef) -> HostResult<()> {
        let folder = folder.normalized();
        if !self.view.covers(folder.path()) {
            info!("{} is outside the workspace, adding it to the explorer", folder);
            self.view.add_root(&WorkspaceFolder::new(folder.clone()));
        }
        self.view.reveal(folder.path(), &list_directory)
    }

    fn expand_current(&mut self) -> HostResult<()> {
        self.view.expand_focused(&list_directory)
    }

    fn collapse_all(&mut self) -> HostResult<()> {
        self.view.collapse_all();
        Ok(())
    }

    fn select_all(&mut self) -> HostResult<()> {
        self.view.select_all();
        Ok(())
    }

    fn workspace_folders(&self) -> Vec<WorkspaceFolder> {
        self.workspace.clone()
    }

    fn exclude_patterns(&self) -> Vec<String> {
        self.settings.current()
    }

    fn notify(&mut self, notification: Notification) {
        info!("{}", notification.text);
        if self.echo
            && let Err(e) = self.print_notification(&notification)
        {
            warn!("Failed to print notification: {}", e);
        }
        self.notifications.push(notification);
    }

    fn begin_progress(&mut self, title: &str) {
        if let Err(e) = self.progress.begin(title) {
            warn!("Failed to open progress line: {}", e);
        }
    }

    fn report_progress(&mut self, message: &str, percentage: Option<u8>) {
        if let Err(e) = self.progress.report(message, percentage) {
            warn!("Failed to report progress: {}", e);
        }
    }

    fn end_progress(&mut self) {
        if let Err(e) = self.progress.finish() {
            warn!("Failed to close progress line: {}", e);
        }
        debug!("Progress closed after {} updates", self.progress.report_count());
    }

    fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}
