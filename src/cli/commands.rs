use crate::core::browser::run_browser;
use crate::core::exclusion::DEFAULT_EXCLUDE_LIST;
use crate::core::expansion::{ExpandCommand, run_command};
use crate::domain::models::{ExpandConfig, FolderRef, Invocation, WorkspaceFolder};
use crate::infra::delay::create_delay_policy;
use crate::infra::fs_host::FsHost;
use crate::infra::logger::setup_logger;
use crate::infra::output::write_output;
use crate::infra::settings::{ExcludeSettings, parse_pattern_list};
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "explorer-expand")]
#[command(about = "Recursively expand folders in a file explorer tree", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collapse the explorer, then expand every workspace root recursively
    ExpandAll(ExpandArgs),
    /// Expand the given folder, selection, or workspace roots recursively
    ExpandRecursively(ExpandArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExpandArgs {
    /// Folder to expand
    pub folder: Option<String>,

    /// Comma-separated multi-selection; takes priority over FOLDER
    #[arg(long)]
    pub selected: Option<String>,

    /// Workspace root folder (repeatable)
    #[arg(short, long)]
    pub workspace: Vec<String>,

    #[arg(long, default_value = DEFAULT_EXCLUDE_LIST)]
    pub exclude: String,

    /// File with one exclude pattern per line, re-read for every folder
    #[arg(long)]
    pub exclude_file: Option<String>,

    #[arg(long, default_value_t = 5)]
    pub max_depth: usize,

    #[arg(long, conflicts_with = "max_depth")]
    pub unbounded: bool,

    #[arg(long)]
    pub no_delay: bool,

    #[arg(long, default_value_t = 1.0)]
    pub delay_scale: f64,

    #[arg(long)]
    pub output: Option<String>,

    #[arg(long)]
    pub interactive: bool,
}

impl ExpandArgs {
    fn config(&self) -> ExpandConfig {
        ExpandConfig {
            max_depth: if self.unbounded {
                None
            } else {
                Some(self.max_depth)
            },
        }
    }

    fn invocation(&self) -> anyhow::Result<Invocation> {
        let mut invocation = Invocation::default();
        if let Some(folder) = &self.folder {
            invocation = invocation.with_primary(to_folder_ref(folder)?);
        }
        if let Some(selected) = &self.selected {
            let folders = parse_pattern_list(selected)
                .iter()
                .map(|s| to_folder_ref(s))
                .collect::<anyhow::Result<Vec<_>>>()?;
            invocation = invocation.with_selected(folders);
        }
        Ok(invocation)
    }

    fn workspace_folders(&self) -> anyhow::Result<Vec<WorkspaceFolder>> {
        self.workspace
            .iter()
            .map(|w| to_folder_ref(w).map(WorkspaceFolder::new))
            .collect()
    }

    fn settings(&self) -> ExcludeSettings {
        ExcludeSettings::new(
            parse_pattern_list(&self.exclude),
            self.exclude_file.as_ref().map(PathBuf::from),
        )
    }
}

fn to_folder_ref(path: &str) -> anyhow::Result<FolderRef> {
    Ok(FolderRef::new(std::path::absolute(path)?).normalized())
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logger(cli.verbose)?;

    match cli.command {
        Commands::ExpandAll(args) => {
            info!("Starting expand-all command");
            expand(ExpandCommand::ExpandAll, &args)
        }
        Commands::ExpandRecursively(args) => {
            info!("Starting expand-recursively command");
            expand(ExpandCommand::ExpandRecursively, &args)
        }
    }
}

fn expand(command: ExpandCommand, args: &ExpandArgs) -> anyhow::Result<()> {
    debug!("Command parameters: {:?}", args);

    let config = args.config();
    let invocation = args.invocation()?;
    let delay = create_delay_policy(args.no_delay, args.delay_scale);
    let mut host = FsHost::new(args.workspace_folders()?, args.settings(), !args.interactive);
    let report = run_command(&mut host, command, &invocation, &config, delay.as_ref());
    info!(
        "Expanded {} folders, skipped {}",
        report.visited.len(),
        report.skipped.len()
    );

    if args.interactive {
        return run_browser(&mut host, &config, delay.as_ref());
    }

    write_output(&host.view().render(), &args.output)
}
