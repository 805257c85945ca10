use super::{load_session, member_labels, print_status, start_refactoring, Settings};
use crate::config::OutputFormat;
use crate::session::Session;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use hoist_changes::{
    BlockingContext, CancellationToken, LoggingProgressMonitor, Recovery, RefactoringStatus, TransactionError,
    UndoManager,
};
use hoist_hierarchy::HierarchyProvider;
use hoist_refactor::{RefactorError, Workspace};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Session file describing the hierarchy and the pull-up
    pub session: PathBuf,

    /// Mark members required by the selection `PullUp`
    #[arg(long)]
    pub accept_required: bool,

    /// Undo the change after applying it
    #[arg(long)]
    pub undo: bool,

    /// Output format (defaults to the config file's)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub change: String,
    pub accepted_required: Vec<String>,
    pub status: RefactoringStatus,
    pub undone: bool,
    pub workspace: Workspace,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let settings = Settings::resolve(cwd, args.accept_required, args.format)?;
    let session = load_session(&args.session)?;

    let report = match run(&session, &settings, args.undo) {
        Ok(report) => report,
        Err(err) => {
            print_failure(&err);
            return Err(err.into());
        }
    };

    match settings.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

pub(crate) fn run(session: &Session, settings: &Settings, undo: bool) -> Result<ApplyReport, RefactorError> {
    let (refactoring, required) = start_refactoring(session, settings.accept_required)?;

    let mut workspace = Workspace::from_hierarchy(&session.hierarchy);
    for ty in &session.read_only {
        workspace.set_read_only(*ty, true);
    }

    let mut context = BlockingContext::new(LoggingProgressMonitor::new(CancellationToken::new()));
    let mut history = UndoManager::with_max_levels(settings.undo_levels);

    let change = format!(
        "Pull up to {}",
        session.hierarchy.type_name(refactoring.destination().id)
    );
    let outcome = refactoring.perform(&mut workspace, &mut context)?;
    let reversible = history.push(change.clone(), outcome.undo);
    if undo && !reversible {
        warn!(change = %change, "Applied change cannot be undone");
    }

    let undone = if undo {
        history.undo(&mut workspace, &mut context)?
    } else {
        false
    };
    info!(change = %change, undone, "Apply finished");

    Ok(ApplyReport {
        change,
        accepted_required: if settings.accept_required {
            member_labels(session, required)
        } else {
            Vec::new()
        },
        status: outcome.status,
        undone,
        workspace,
    })
}

fn print_report(report: &ApplyReport) {
    println!("✨ {} {}", "Applied".green().bold(), report.change);
    if !report.accepted_required.is_empty() {
        println!("   Accepted as required: {}", report.accepted_required.join(", "));
    }
    print_status(&report.status);
    if report.undone {
        println!("   {} Change undone", "↺".blue());
    }
    println!();
    print!("{}", report.workspace);
}

fn print_failure(err: &RefactorError) {
    match err {
        RefactorError::Incomplete(status) | RefactorError::Transaction(TransactionError::Invalid(status)) => {
            eprintln!("{} Preconditions not met", "✗".red());
            print_status(status);
        }
        RefactorError::Transaction(TransactionError::Apply { change, source, recovery }) => {
            eprintln!("{} {} failed: {}", "✗".red(), change, source);
            match recovery {
                Recovery::NotNeeded => eprintln!("   Nothing had been applied"),
                Recovery::RolledBack { undone } => {
                    eprintln!("   {} Rolled back {} completed edit(s)", "↺".blue(), undone)
                }
                Recovery::Unavailable => {
                    eprintln!("   {} Some edits cannot be undone, workspace left partially modified", "⚠".yellow())
                }
                Recovery::Aborted(status) => {
                    eprintln!("   {} Rollback aborted, workspace may be inconsistent", "⚠".yellow());
                    print_status(status);
                }
                Recovery::Failed(err) => {
                    eprintln!("   {} Rollback failed: {}", "⚠".yellow(), err)
                }
            }
        }
        _ => {}
    }
}
