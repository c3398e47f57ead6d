//! Depth-first expansion of a folder and its descendants through the host.

use crate::core::exclusion::ExcludeFilter;
use crate::domain::host::{CancellationToken, ExplorerHost, HostError, HostResult};
use crate::domain::models::{ExpandConfig, ExpansionReport, FileKind, FolderRef};
use crate::infra::delay::{DelayPolicy, HostStep};
use log::{debug, trace, warn};
use std::path::PathBuf;

pub struct Expander<'a> {
    config: &'a ExpandConfig,
    delay: &'a dyn DelayPolicy,
}

impl<'a> Expander<'a> {
    pub fn new(config: &'a ExpandConfig, delay: &'a dyn DelayPolicy) -> Self {
        Self { config, delay }
    }

    /// Reveals and expands `root` and every non-excluded descendant directory,
    /// pre-order, one node at a time. Host failures skip the failing node's
    /// subtree; cancellation stops the walk without undoing anything.
    pub fn expand<H: ExplorerHost + ?Sized>(
        &self,
        host: &mut H,
        root: &FolderRef,
        token: &CancellationToken,
    ) -> ExpansionReport {
        debug!(
            "Expanding {} recursively (max depth: {:?})",
            root, self.config.max_depth
        );
        let mut report = ExpansionReport::default();
        self.expand_node(host, root, root, 0, token, &mut report);
        report.cancelled = token.is_cancelled();
        debug!(
            "Finished {}: {} visited, {} skipped, cancelled={}",
            root,
            report.visited.len(),
            report.skipped.len(),
            report.cancelled
        );
        report
    }

    fn expand_node<H: ExplorerHost + ?Sized>(
        &self,
        host: &mut H,
        root: &FolderRef,
        folder: &FolderRef,
        depth: usize,
        token: &CancellationToken,
        report: &mut ExpansionReport,
    ) {
        if token.is_cancelled() {
            return;
        }
        if self.config.max_depth.is_some_and(|max| depth > max) {
            trace!("Depth limit reached at {}", folder);
            return;
        }

        let children = match self.process_node(host, folder, depth, report) {
            Ok(children) => children,
            Err(e) => {
                warn!("Error expanding {}: {}", folder, e);
                report.skipped.push((folder.clone(), e.to_string()));
                return;
            }
        };

        for name in children {
            if token.is_cancelled() {
                return;
            }

            let child = folder.join(&name);
            host.report_progress(
                &format!("Expanding: {}", relative_label(root, &child)),
                None,
            );
            self.expand_node(host, root, &child, depth + 1, token, report);
        }
    }

    /// Handles one directory and returns the names of the child directories
    /// to descend into.
    fn process_node<H: ExplorerHost + ?Sized>(
        &self,
        host: &mut H,
        folder: &FolderRef,
        depth: usize,
        report: &mut ExpansionReport,
    ) -> HostResult<Vec<String>> {
        let kind = host.stat(folder)?;
        if kind != FileKind::Directory {
            return Err(HostError::Rejected(format!(
                "{} is not a directory ({:?})",
                folder, kind
            )));
        }

        host.reveal(folder)?;
        self.delay.pause(HostStep::Reveal);
        host.expand_current()?;
        self.delay.pause(HostStep::Expand);
        report.visited.push(folder.clone());

        if self.config.max_depth == Some(depth) {
            return Ok(Vec::new());
        }

        let entries = host.list_children(folder)?;
        let filter = ExcludeFilter::new(&host.exclude_patterns());
        trace!("{} exclude patterns active under {}", filter.len(), folder);

        Ok(entries
            .into_iter()
            .filter(|entry| entry.kind == FileKind::Directory)
            .filter(|entry| !filter.is_excluded(&entry.name))
            .map(|entry| entry.name)
            .collect())
    }
}

/// `root-name/relative/path` label for progress messages.
pub fn relative_label(root: &FolderRef, folder: &FolderRef) -> String {
    let mut label = PathBuf::from(root.name());
    if let Ok(rel) = folder.path().strip_prefix(root.path()) {
        label.push(rel);
    }
    label.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fake_host::{Call, FakeHost};
    use crate::infra::delay::NoDelay;
    use std::collections::BTreeSet;

    fn sample_tree() -> FakeHost {
        FakeHost::new()
            .workspace("/w")
            .dir("/w/src/core")
            .dir("/w/src/cli")
            .dir("/w/node_modules/pkg/lib")
            .dir("/w/.git/objects")
            .dir("/w/docs")
            .file("/w/README.md")
            .file("/w/src/main.rs")
            .patterns(&[".*", "node_modules"])
    }

    fn run(host: &mut FakeHost, config: &ExpandConfig) -> ExpansionReport {
        let token = host.cancellation_token();
        Expander::new(config, &NoDelay).expand(host, &FolderRef::from("/w"), &token)
    }

    fn as_set(folders: &[FolderRef]) -> BTreeSet<String> {
        folders.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_visits_all_non_excluded_directories() {
        let mut host = sample_tree();
        let report = run(&mut host, &ExpandConfig { max_depth: None });

        let expected: BTreeSet<String> = ["/w", "/w/src", "/w/src/core", "/w/src/cli", "/w/docs"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(as_set(&report.visited), expected);
        assert!(report.skipped.is_empty());
        assert!(!report.cancelled);
    }

    #[test]
    fn test_excluded_subtree_is_never_enumerated() {
        let mut host = sample_tree();
        run(&mut host, &ExpandConfig { max_depth: None });

        for call in host.calls() {
            let path = match &call {
                Call::Stat(f) | Call::List(f) | Call::Reveal(f) | Call::Expand(f) => f.to_string(),
                _ => continue,
            };
            assert!(!path.contains("node_modules"), "unexpected {:?}", call);
            assert!(!path.contains(".git"), "unexpected {:?}", call);
        }
    }

    #[test]
    fn test_order_is_depth_first_pre_order() {
        let mut host = sample_tree();
        let report = run(&mut host, &ExpandConfig { max_depth: None });

        let order: Vec<String> = report.visited.iter().map(|f| f.to_string()).collect();
        assert_eq!(
            order,
            vec!["/w", "/w/src", "/w/src/core", "/w/src/cli", "/w/docs"]
        );
    }

    #[test]
    fn test_reveal_precedes_expand_for_each_node() {
        let mut host = FakeHost::new().workspace("/w").dir("/w/a");
        run(&mut host, &ExpandConfig::default());

        let calls = host.calls();
        assert_eq!(
            calls,
            vec![
                Call::Stat("/w".into()),
                Call::Reveal("/w".into()),
                Call::Expand("/w".into()),
                Call::List("/w".into()),
                Call::Stat("/w/a".into()),
                Call::Reveal("/w/a".into()),
                Call::Expand("/w/a".into()),
                Call::List("/w/a".into()),
            ]
        );
    }

    #[test]
    fn test_patterns_are_read_on_every_visit() {
        let mut host = sample_tree();
        let report = run(&mut host, &ExpandConfig { max_depth: None });
        assert_eq!(host.pattern_reads(), report.visited.len());
    }

    #[test]
    fn test_depth_bound_limits_descent() {
        let mut host = FakeHost::new().workspace("/w").dir("/w/a/b/c/d");
        let report = run(&mut host, &ExpandConfig { max_depth: Some(2) });

        let order: Vec<String> = report.visited.iter().map(|f| f.to_string()).collect();
        assert_eq!(order, vec!["/w", "/w/a", "/w/a/b"]);
        assert_eq!(host.count(|c| matches!(c, Call::List(f) if f.to_string() == "/w/a/b")), 0);
    }

    #[test]
    fn test_default_depth_is_five() {
        let mut host = FakeHost::new().workspace("/w").dir("/w/1/2/3/4/5/6/7");
        let report = run(&mut host, &ExpandConfig::default());
        assert_eq!(report.visited.len(), 6);
        assert_eq!(report.visited.last().unwrap().to_string(), "/w/1/2/3/4/5");
    }

    #[test]
    fn test_list_failure_skips_subtree_and_continues() {
        let mut host = sample_tree().failing_list("/w/src");
        let report = run(&mut host, &ExpandConfig { max_depth: None });

        let visited = as_set(&report.visited);
        assert!(visited.contains("/w/src"));
        assert!(!visited.contains("/w/src/core"));
        assert!(visited.contains("/w/docs"));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0.to_string(), "/w/src");
    }

    #[test]
    fn test_reveal_failure_skips_node_without_expanding() {
        let mut host = sample_tree().failing_reveal("/w/src");
        let report = run(&mut host, &ExpandConfig { max_depth: None });

        assert!(!as_set(&report.visited).contains("/w/src"));
        assert!(!host.expanded().contains(&FolderRef::from("/w/src")));
        assert!(as_set(&report.visited).contains("/w/docs"));
    }

    #[test]
    fn test_missing_root_is_skipped() {
        let mut host = FakeHost::new();
        let token = host.cancellation_token();
        let report =
            Expander::new(&ExpandConfig::default(), &NoDelay).expand(&mut host, &"/gone".into(), &token);

        assert!(report.visited.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(host.count(|c| matches!(c, Call::Reveal(_))), 0);
    }

    #[test]
    fn test_cancelled_before_start_issues_no_commands() {
        let mut host = sample_tree();
        host.cancellation_token().cancel();
        let report = run(&mut host, &ExpandConfig::default());

        assert!(report.cancelled);
        assert!(report.visited.is_empty());
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_cancel_mid_traversal_keeps_partial_expansion() {
        let mut host = sample_tree().cancel_after_expands(2);
        let report = run(&mut host, &ExpandConfig { max_depth: None });

        assert!(report.cancelled);
        let order: Vec<String> = report.visited.iter().map(|f| f.to_string()).collect();
        assert_eq!(order, vec!["/w", "/w/src"]);
        assert_eq!(host.expanded().len(), 2);
        assert_eq!(host.count(|c| matches!(c, Call::CollapseAll)), 0);
    }

    #[test]
    fn test_second_run_visits_same_set() {
        let mut host = sample_tree();
        let first = run(&mut host, &ExpandConfig::default());
        host.reset_calls();
        let second = run(&mut host, &ExpandConfig::default());

        assert_eq!(first.visited, second.visited);
    }

    #[test]
    fn test_progress_labels_are_relative_to_root() {
        let mut host = FakeHost::new().workspace("/w").dir("/w/src/core");
        run(&mut host, &ExpandConfig::default());

        let messages: Vec<&str> = host.progress.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(messages, vec!["Expanding: w/src", "Expanding: w/src/core"]);
    }
}
