use crate::domain::host::{CancellationToken, ExplorerHost, HostError, HostResult};
use crate::domain::models::{
    DirEntryInfo, FileKind, FolderRef, Notification, NotificationLevel, WorkspaceFolder,
};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Focus,
    Stat(FolderRef),
    List(FolderRef),
    Reveal(FolderRef),
    Expand(FolderRef),
    CollapseAll,
    SelectAll,
}

/// In-memory explorer that records every host call.
#[derive(Default)]
pub struct FakeHost {
    dirs: HashMap<FolderRef, Vec<DirEntryInfo>>,
    files: HashSet<FolderRef>,
    workspace: Vec<WorkspaceFolder>,
    patterns: Vec<String>,
    pattern_reads: Cell<usize>,
    failing_lists: HashSet<FolderRef>,
    failing_reveals: HashSet<FolderRef>,
    failing_focus: bool,
    cancel_after_expands: Option<usize>,
    current: Option<FolderRef>,
    calls: RefCell<Vec<Call>>,
    expanded: Vec<FolderRef>,
    pub notifications: Vec<Notification>,
    pub progress: Vec<(String, Option<u8>)>,
    token: CancellationToken,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory and every missing ancestor, linking each to its parent.
    pub fn dir(mut self, path: &str) -> Self {
        self.add_dir(FolderRef::from(path));
        self
    }

    pub fn file(mut self, path: &str) -> Self {
        let file = FolderRef::from(path);
        if let Some(parent) = file.path().parent() {
            let parent = FolderRef::new(parent);
            self.add_dir(parent.clone());
            self.dirs
                .entry(parent)
                .or_default()
                .push(DirEntryInfo::new(file.name(), FileKind::File));
        }
        self.files.insert(file);
        self
    }

    pub fn workspace(mut self, path: &str) -> Self {
        self.add_dir(FolderRef::from(path));
        self.workspace.push(WorkspaceFolder::new(FolderRef::from(path)));
        self
    }

    pub fn patterns(mut self, patterns: &[&str]) -> Self {
        self.patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn failing_list(mut self, path: &str) -> Self {
        self.failing_lists.insert(FolderRef::from(path));
        self
    }

    pub fn failing_reveal(mut self, path: &str) -> Self {
        self.failing_reveals.insert(FolderRef::from(path));
        self
    }

    pub fn failing_focus(mut self) -> Self {
        self.failing_focus = true;
        self
    }

    pub fn cancel_after_expands(mut self, count: usize) -> Self {
        self.cancel_after_expands = Some(count);
        self
    }

    fn add_dir(&mut self, folder: FolderRef) {
        if self.dirs.contains_key(&folder) {
            return;
        }
        self.dirs.insert(folder.clone(), Vec::new());
        if let Some(parent) = folder.path().parent() {
            if parent.as_os_str().is_empty() {
                return;
            }
            let parent = FolderRef::new(parent);
            self.add_dir(parent.clone());
            if let Some(children) = self.dirs.get_mut(&parent) {
                children.push(DirEntryInfo::new(folder.name(), FileKind::Directory));
            }
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn reset_calls(&mut self) {
        self.calls.borrow_mut().clear();
        self.expanded.clear();
        self.notifications.clear();
        self.progress.clear();
    }

    pub fn expanded(&self) -> &[FolderRef] {
        &self.expanded
    }

    pub fn pattern_reads(&self) -> usize {
        self.pattern_reads.get()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn infos(&self) -> Vec<&str> {
        self.texts(NotificationLevel::Info)
    }

    pub fn errors(&self) -> Vec<&str> {
        self.texts(NotificationLevel::Error)
    }

    fn texts(&self, level: NotificationLevel) -> Vec<&str> {
        self.notifications
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.text.as_str())
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl ExplorerHost for FakeHost {
    fn focus_explorer(&mut self) -> HostResult<()> {
        self.record(Call::Focus);
        if self.failing_focus {
            return Err(HostError::Rejected("explorer view is unavailable".to_string()));
        }
        Ok(())
    }

    fn stat(&self, folder: &FolderRef) -> HostResult<FileKind> {
        self.record(Call::Stat(folder.clone()));
        if self.dirs.contains_key(folder) {
            Ok(FileKind::Directory)
        } else if self.files.contains(folder) {
            Ok(FileKind::File)
        } else {
            Err(HostError::NotFound(folder.to_string()))
        }
    }

    fn list_children(&self, folder: &FolderRef) -> HostResult<Vec<DirEntryInfo>> {
        self.record(Call::List(folder.clone()));
        if self.failing_lists.contains(folder) {
            return Err(HostError::Rejected(format!("permission denied: {}", folder)));
        }
        self.dirs
            .get(folder)
            .cloned()
            .ok_or_else(|| HostError::NotFound(folder.to_string()))
    }

    fn reveal(&mut self, folder: &FolderRef) -> HostResult<()> {
        self.record(Call::Reveal(folder.clone()));
        if self.failing_reveals.contains(folder) {
            return Err(HostError::NotInView(folder.to_string()));
        }
        self.current = Some(folder.clone());
        Ok(())
    }

    fn expand_current(&mut self) -> HostResult<()> {
        let current = self.current.clone().ok_or(HostError::NoFocus)?;
        self.record(Call::Expand(current.clone()));
        if !self.expanded.contains(&current) {
            self.expanded.push(current);
        }
        if let Some(limit) = self.cancel_after_expands
            && self.count(|c| matches!(c, Call::Expand(_))) >= limit
        {
            self.token.cancel();
        }
        Ok(())
    }

    fn collapse_all(&mut self) -> HostResult<()> {
        self.record(Call::CollapseAll);
        Ok(())
    }

    fn select_all(&mut self) -> HostResult<()> {
        self.record(Call::SelectAll);
        Ok(())
    }

    fn workspace_folders(&self) -> Vec<WorkspaceFolder> {
        self.workspace.clone()
    }

    fn exclude_patterns(&self) -> Vec<String> {
        self.pattern_reads.set(self.pattern_reads.get() + 1);
        self.patterns.clone()
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    fn report_progress(&mut self, message: &str, percentage: Option<u8>) {
        self.progress.push((message.to_string(), percentage));
    }

    fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}
