//! CLI for Ramses Out
//!
//! Thin command layer over the [`ramses_out::review`] core: `scan` lists
//! previews with their send-status, `collect` builds a review package,
//! `send` writes markers and history, `history` and `config` inspect the
//! personal state.

pub mod collect;
pub mod config;
pub mod history;
pub mod output;
pub mod scan;
pub mod send;

use anyhow::{bail, Context};
use clap::{Args, ValueEnum};
use ramses_out::review::scanner::{
    filter_by_date, filter_by_sequence, filter_by_step, DateRange, Scanner,
};
use ramses_out::review::{PreviewRecord, ScanOutcome, SendStatus};
use ramses_out::OutConfig;
use std::path::PathBuf;
use tracing::warn;

/// Date-range filter values accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RangeArg {
    Today,
    Week,
    Month,
    All,
}

impl From<RangeArg> for DateRange {
    fn from(value: RangeArg) -> Self {
        match value {
            RangeArg::Today => DateRange::Today,
            RangeArg::Week => DateRange::ThisWeek,
            RangeArg::Month => DateRange::ThisMonth,
            RangeArg::All => DateRange::All,
        }
    }
}

/// Status filter values accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Ready or Ready (Updated)
    Ready,
    /// Ready (Updated) only
    Updated,
    /// Already sent
    Sent,
}

impl StatusArg {
    pub fn matches(self, status: SendStatus) -> bool {
        match self {
            StatusArg::Ready => status.is_ready(),
            StatusArg::Updated => status == SendStatus::ReadyUpdated,
            StatusArg::Sent => status == SendStatus::Sent,
        }
    }
}

/// Filters shared by the scan/collect/send commands
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Restrict to previews modified in this range
    #[arg(long, value_enum, default_value = "all")]
    pub range: RangeArg,

    /// Restrict to one sequence (e.g. SEQ01)
    #[arg(long)]
    pub sequence: Option<String>,

    /// Restrict to one step (e.g. COMP)
    #[arg(long)]
    pub step: Option<String>,

    /// Restrict to previews with this send-status
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,
}

impl FilterArgs {
    pub fn apply(&self, records: Vec<PreviewRecord>) -> Vec<PreviewRecord> {
        let mut records = filter_by_date(records, self.range.into());
        if let Some(sequence) = &self.sequence {
            records = filter_by_sequence(records, sequence);
        }
        if let Some(step) = &self.step {
            records = filter_by_step(records, step);
        }
        if let Some(status) = self.status {
            records.retain(|record| status.matches(record.status));
        }
        records
    }
}

/// Resolved project context for one command invocation
#[derive(Debug)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub code: String,
    pub user: String,
}

/// Resolve the active project from the `--root` flag or the config file;
/// the project code falls back to the root folder name.
pub fn resolve_context(
    root_flag: Option<PathBuf>,
    config: &OutConfig,
) -> anyhow::Result<ProjectContext> {
    let root = match root_flag.or_else(|| config.project_root.clone()) {
        Some(root) => root,
        None => bail!("no project root: pass --root or set project_root in the config"),
    };
    let code = config
        .project_code
        .clone()
        .filter(|code| !code.is_empty())
        .or_else(|| {
            root.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "PROJECT".to_string());

    Ok(ProjectContext {
        root,
        code,
        user: config.current_user(),
    })
}

/// Scan the project and report skips on stderr
pub fn scan_project(context: &ProjectContext) -> anyhow::Result<ScanOutcome> {
    let outcome = Scanner::new(&context.root)
        .scan()
        .with_context(|| format!("scanning {}", context.root.display()))?;
    for skip in &outcome.skips {
        warn!(path = %skip.path.display(), reason = %skip.reason, "Skipped during scan");
    }
    Ok(outcome)
}
