//! In-memory explorer tree: lazily loaded nodes with expanded flags, a focused
//! node and a selection. This is the view the filesystem host drives.

use crate::domain::host::{HostError, HostResult};
use crate::domain::models::{DirEntryInfo, FileKind, WorkspaceFolder};
use log::{debug, trace};
use std::path::{Path, PathBuf};

pub type ChildLoader<'a> = &'a dyn Fn(&Path) -> HostResult<Vec<DirEntryInfo>>;

#[derive(Debug, Clone)]
struct ViewNode {
    name: String,
    path: PathBuf,
    is_dir: bool,
    expanded: bool,
    children: Option<Vec<ViewNode>>,
}

impl ViewNode {
    fn new_directory(name: String, path: PathBuf) -> Self {
        ViewNode {
            name,
            path,
            is_dir: true,
            expanded: false,
            children: None,
        }
    }

    fn new_file(name: String, path: PathBuf) -> Self {
        ViewNode {
            name,
            path,
            is_dir: false,
            expanded: false,
            children: None,
        }
    }

    fn ensure_loaded(&mut self, loader: ChildLoader<'_>) -> HostResult<&mut Vec<ViewNode>> {
        if self.children.is_none() {
            let mut loaded: Vec<ViewNode> = loader(&self.path)?
                .into_iter()
                .map(|entry| {
                    let path = self.path.join(&entry.name);
                    if entry.kind == FileKind::Directory {
                        ViewNode::new_directory(entry.name, path)
                    } else {
                        ViewNode::new_file(entry.name, path)
                    }
                })
                .collect();
            loaded.sort_by(|a, b| {
                b.is_dir
                    .cmp(&a.is_dir)
                    .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            });
            trace!("Loaded {} children for {}", loaded.len(), self.path.display());
            self.children = Some(loaded);
        }
        Ok(self.children.get_or_insert_with(Vec::new))
    }

    fn collapse_recursive(&mut self) {
        self.expanded = false;
        if let Some(children) = self.children.as_mut() {
            for child in children {
                child.collapse_recursive();
            }
        }
    }

    fn count_expanded(&self) -> usize {
        let own = usize::from(self.is_dir && self.expanded);
        own + self
            .children
            .iter()
            .flatten()
            .map(ViewNode::count_expanded)
            .sum::<usize>()
    }
}

fn find_node_mut<'a>(nodes: &'a mut [ViewNode], path: &Path) -> Option<&'a mut ViewNode> {
    for node in nodes.iter_mut() {
        if node.path == path {
            return Some(node);
        }
        if path.starts_with(&node.path) {
            return match node.children.as_mut() {
                Some(children) => find_node_mut(children, path),
                None => None,
            };
        }
    }
    None
}

/// A visible line of the explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub depth: usize,
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub expanded: bool,
    pub focused: bool,
    pub selected: bool,
}

#[derive(Debug, Default)]
pub struct ExplorerView {
    roots: Vec<ViewNode>,
    focused: Option<PathBuf>,
    selection: Vec<PathBuf>,
}

impl ExplorerView {
    pub fn new(workspace: &[WorkspaceFolder]) -> Self {
        ExplorerView {
            roots: workspace
                .iter()
                .map(|w| ViewNode::new_directory(w.name.clone(), w.folder.path().to_path_buf()))
                .collect(),
            focused: None,
            selection: Vec::new(),
        }
    }

    pub fn focused(&self) -> Option<&Path> {
        self.focused.as_deref()
    }

    pub fn selection(&self) -> &[PathBuf] {
        &self.selection
    }

    /// Whether `path` lies under one of the view's roots.
    pub fn covers(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| path.starts_with(&root.path))
    }

    /// Adds a top-level node for a folder outside the current roots.
    pub fn add_root(&mut self, folder: &WorkspaceFolder) {
        debug!("Adding {} as an explorer root", folder.folder);
        self.roots.push(ViewNode::new_directory(
            folder.name.clone(),
            folder.folder.path().to_path_buf(),
        ));
    }

    /// Focuses a visible row without loading anything.
    pub fn focus(&mut self, path: &Path) {
        self.focused = Some(path.to_path_buf());
    }

    /// Expands every ancestor of `target` below its workspace root and focuses
    /// it.
    pub fn reveal(&mut self, target: &Path, loader: ChildLoader<'_>) -> HostResult<()> {
        let not_in_view = || HostError::NotInView(target.display().to_string());

        let root_idx = self
            .roots
            .iter()
            .enumerate()
            .filter(|(_, root)| target.starts_with(&root.path))
            .max_by_key(|(_, root)| root.path.components().count())
            .map(|(idx, _)| idx)
            .ok_or_else(not_in_view)?;

        let root_path = self.roots[root_idx].path.clone();
        let relative = target.strip_prefix(&root_path).map_err(|_| not_in_view())?;

        let mut node = &mut self.roots[root_idx];
        for component in relative.components() {
            let name = component.as_os_str().to_string_lossy().to_string();
            node.expanded = true;
            let children = node.ensure_loaded(loader)?;
            node = children
                .iter_mut()
                .find(|child| child.name == name)
                .ok_or_else(not_in_view)?;
        }

        debug!("Revealed {}", target.display());
        self.focused = Some(target.to_path_buf());
        Ok(())
    }

    pub fn expand_focused(&mut self, loader: ChildLoader<'_>) -> HostResult<()> {
        let focused = self.focused.clone().ok_or(HostError::NoFocus)?;
        self.set_expanded(&focused, true, loader)
    }

    /// Expanding a file is a no-op, as is expanding an already expanded node.
    pub fn set_expanded(&mut self, path: &Path, expanded: bool, loader: ChildLoader<'_>) -> HostResult<()> {
        let node = find_node_mut(&mut self.roots, path)
            .ok_or_else(|| HostError::NotInView(path.display().to_string()))?;
        if !node.is_dir {
            return Ok(());
        }
        if expanded {
            node.ensure_loaded(loader)?;
        }
        node.expanded = expanded;
        Ok(())
    }

    pub fn collapse_all(&mut self) {
        for root in &mut self.roots {
            root.collapse_recursive();
        }
    }

    pub fn select_all(&mut self) {
        self.selection = self.rows().into_iter().map(|row| row.path).collect();
    }

    pub fn expanded_count(&self) -> usize {
        self.roots.iter().map(ViewNode::count_expanded).sum()
    }

    #[cfg(test)]
    pub fn is_expanded(&self, path: &Path) -> bool {
        self.rows()
            .iter()
            .any(|row| row.path == path && row.expanded)
    }

    pub fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        for root in &self.roots {
            self.flatten_node(root, 0, &mut rows);
        }
        rows
    }

    fn flatten_node(&self, node: &ViewNode, depth: usize, rows: &mut Vec<Row>) {
        rows.push(Row {
            depth,
            name: node.name.clone(),
            path: node.path.clone(),
            is_dir: node.is_dir,
            expanded: node.expanded,
            focused: self.focused.as_deref() == Some(node.path.as_path()),
            selected: self.selection.contains(&node.path),
        });

        if node.expanded {
            for child in node.children.iter().flatten() {
                self.flatten_node(child, depth + 1, rows);
            }
        }
    }

    /// Plain-text rendering of the visible rows.
    pub fn render(&self) -> String {
        let mut output = String::new();
        for row in self.rows() {
            let prefix = match (row.is_dir, row.expanded) {
                (true, true) => "▼ ",
                (true, false) => "► ",
                (false, _) => "  ",
            };
            output.push_str(&format!("{}{}{}\n", "  ".repeat(row.depth), prefix, row.name));
        }
        output
    }
}
