use crate::core::targets::resolve_targets;
use crate::core::traversal::Expander;
use crate::domain::host::{CancellationToken, ExplorerHost};
use crate::domain::models::{
    ExpandConfig, ExpansionReport, Invocation, Notification, TargetSet, TargetSource,
};
use crate::infra::delay::{DelayPolicy, HostStep};
use log::{debug, error, info};

pub const PROGRESS_TITLE: &str = "Expanding file explorer folders...";
pub const MSG_CANCELLED: &str = "Expansion cancelled by user.";
pub const MSG_COMPLETED: &str = "Folder expansion completed!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandCommand {
    /// Collapses the explorer first when run against the whole workspace.
    ExpandAll,
    ExpandRecursively,
}

/// Runs one command invocation end to end. Every failure ends up as a
/// notification on the host; the returned report is for logging and tests.
pub fn run_command<H: ExplorerHost + ?Sized>(
    host: &mut H,
    command: ExpandCommand,
    invocation: &Invocation,
    config: &ExpandConfig,
    delay: &dyn DelayPolicy,
) -> ExpansionReport {
    info!("Running {:?} with {:?}", command, invocation);

    match execute(host, command, invocation, config, delay) {
        Ok(report) => report,
        Err(e) => {
            error!("{:?} failed: {:#}", command, e);
            host.notify(Notification::error(format!("Error: {:#}", e)));
            ExpansionReport::default()
        }
    }
}

fn execute<H: ExplorerHost + ?Sized>(
    host: &mut H,
    command: ExpandCommand,
    invocation: &Invocation,
    config: &ExpandConfig,
    delay: &dyn DelayPolicy,
) -> anyhow::Result<ExpansionReport> {
    host.focus_explorer()?;
    delay.pause(HostStep::Focus);

    if invocation.is_empty() {
        debug!("No folder arguments, using the workspace roots");
    }

    let targets = match resolve_targets(&*host, invocation) {
        Ok(targets) => targets,
        Err(e) => {
            info!("Nothing to expand: {}", e);
            host.notify(e.into_notification());
            return Ok(ExpansionReport::default());
        }
    };
    debug!("Resolved {} target(s) from {:?}", targets.len(), targets.source);

    if targets.source == TargetSource::Selection {
        host.notify(Notification::info(format!(
            "Found {} folder(s) to expand.",
            targets.len()
        )));
    }

    let reset_view = command == ExpandCommand::ExpandAll && targets.source == TargetSource::Workspace;
    if reset_view {
        host.select_all()?;
        delay.pause(HostStep::SelectAll);
    }

    let token = host.cancellation_token();
    host.begin_progress(PROGRESS_TITLE);
    let outcome = expand_targets(host, &targets, reset_view, config, delay, &token);
    host.end_progress();

    match outcome {
        Ok(report) => {
            let text = if report.cancelled { MSG_CANCELLED } else { MSG_COMPLETED };
            info!(
                "{} ({} folders expanded, {} skipped)",
                text,
                report.visited.len(),
                report.skipped.len()
            );
            host.notify(Notification::info(text));
            Ok(report)
        }
        Err(e) => {
            error!("Expansion failed: {:#}", e);
            host.notify(Notification::error(format!("Error during expansion: {:#}", e)));
            Ok(ExpansionReport::default())
        }
    }
}

fn expand_targets<H: ExplorerHost + ?Sized>(
    host: &mut H,
    targets: &TargetSet,
    reset_view: bool,
    config: &ExpandConfig,
    delay: &dyn DelayPolicy,
    token: &CancellationToken,
) -> anyhow::Result<ExpansionReport> {
    let mut report = ExpansionReport::default();

    if reset_view {
        host.collapse_all()?;
        delay.pause(HostStep::Collapse);

        for folder in &targets.folders {
            if token.is_cancelled() {
                report.cancelled = true;
                return Ok(report);
            }
            host.report_progress(&format!("Expanding workspace: {}", folder.name()), None);
            host.reveal(folder)?;
            delay.pause(HostStep::Reveal);
            host.expand_current()?;
            delay.pause(HostStep::Expand);
        }
    }

    let expander = Expander::new(config, delay);
    let total = targets.len();
    for (i, folder) in targets.folders.iter().enumerate() {
        if token.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let (message, percentage) = progress_message(folder.name().as_str(), i + 1, total);
        host.report_progress(&message, percentage);
        report.merge(expander.expand(host, folder, token));
    }

    report.cancelled |= token.is_cancelled();
    Ok(report)
}

/// Status line for target `index` (1-based) of `total`.
pub fn progress_message(name: &str, index: usize, total: usize) -> (String, Option<u8>) {
    if total <= 1 {
        return (format!("Recursively expanding: {}", name), None);
    }
    let percentage = (index.min(total) * 100 / total) as u8;
    (
        format!("Recursively expanding ({}/{}): {}", index, total, name),
        Some(percentage),
    )
}
