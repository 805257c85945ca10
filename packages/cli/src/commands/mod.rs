pub mod apply;
pub mod plan;

pub use apply::{apply, ApplyArgs};
pub use plan::{plan, PlanArgs};

use crate::config::{Config, OutputFormat};
use crate::session::{Session, SessionFile};
use anyhow::{Context, Result};
use colored::Colorize;
use hoist_changes::{RefactoringStatus, Severity};
use hoist_hierarchy::{HierarchyProvider, MemberId};
use hoist_refactor::{PullUpRefactoring, RefactorError};
use std::path::Path;

/// Settings after command-line flags are layered over the config file
#[derive(Debug, Clone, Copy)]
pub(crate) struct Settings {
    pub accept_required: bool,
    pub format: OutputFormat,
    pub undo_levels: usize,
}

impl Settings {
    pub fn resolve(cwd: &str, accept_required: bool, format: Option<OutputFormat>) -> Result<Self> {
        let config = Config::load(cwd).context("Cannot load hoist.config.json")?;
        Ok(Self {
            accept_required: accept_required || config.accept_required_members,
            format: format.unwrap_or(config.output),
            undo_levels: config.undo_levels,
        })
    }
}

pub(crate) fn load_session(path: &Path) -> Result<Session> {
    let file = SessionFile::load(path).with_context(|| format!("Cannot load {}", path.display()))?;
    Ok(file.resolve()?)
}

/// Configure a refactoring from the session. Returns the members the
/// selection requires, and whether they were accepted.
pub(crate) fn start_refactoring<'h>(
    session: &'h Session,
    accept_required: bool,
) -> Result<(PullUpRefactoring<'h>, Vec<MemberId>), RefactorError> {
    let mut refactoring = PullUpRefactoring::new(&session.hierarchy, session.declaring_type)?;
    if let Some(destination) = session.destination {
        refactoring.set_destination(destination)?;
    }
    for (member, action) in &session.actions {
        refactoring.set_action(*member, *action)?;
    }

    let required = if accept_required {
        refactoring.accept_required(&session.references)?
    } else {
        refactoring.required_members(&session.references)
    };
    Ok((refactoring, required))
}

pub(crate) fn member_labels(session: &Session, members: impl IntoIterator<Item = MemberId>) -> Vec<String> {
    members
        .into_iter()
        .map(|id| match session.hierarchy.member(id) {
            Some(member) => member.label(),
            None => id.to_string(),
        })
        .collect()
}

pub(crate) fn print_status(status: &RefactoringStatus) {
    if status.is_ok() {
        println!("   {} No problems found", "✓".green());
        return;
    }
    for entry in status.entries() {
        let marker = match entry.severity {
            Severity::Fatal | Severity::Error => "✗".red(),
            Severity::Warning => "⚠".yellow(),
            Severity::Info | Severity::Ok => "ℹ".blue(),
        };
        match &entry.context {
            Some(context) => println!("   {} {} ({})", marker, entry.message, context),
            None => println!("   {} {}", marker, entry.message),
        }
    }
}
