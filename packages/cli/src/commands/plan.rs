use super::{load_session, member_labels, print_status, start_refactoring, Settings};
use crate::config::OutputFormat;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use hoist_changes::RefactoringStatus;
use hoist_hierarchy::{HierarchyProvider, TypeId};
use hoist_members::MemberAction;
use hoist_refactor::{RefactorError, Workspace};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Session file describing the hierarchy and the pull-up
    pub session: PathBuf,

    /// Mark members required by the selection `PullUp`
    #[arg(long)]
    pub accept_required: bool,

    /// Output format (defaults to the config file's)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// What a pull-up would do, without touching anything
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub declaring_type: String,
    pub destination: String,
    pub candidates: Vec<String>,
    pub pull_up: Vec<String>,
    pub declare_abstract: Vec<String>,
    pub required: Vec<String>,
    pub required_accepted: bool,
    pub showable_types: Vec<String>,
    pub status: RefactoringStatus,
    pub edits: Vec<String>,
}

pub fn plan(args: PlanArgs, cwd: &str) -> Result<()> {
    let settings = Settings::resolve(cwd, args.accept_required, args.format)?;
    let session = load_session(&args.session)?;
    let report = build_report(&session, settings.accept_required)?;

    match settings.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

pub(crate) fn build_report(session: &crate::session::Session, accept_required: bool) -> Result<PlanReport> {
    let (mut refactoring, required) = start_refactoring(session, accept_required)?;
    let hierarchy = refactoring.hierarchy();
    let type_names = |ids: Vec<TypeId>| -> Vec<String> {
        ids.into_iter()
            .map(|id| hierarchy.type_name(id).to_string())
            .collect()
    };

    let pull_up = member_labels(
        session,
        refactoring.members_for(MemberAction::PullUp).iter().map(|m| m.id),
    );
    let declare_abstract = member_labels(
        session,
        refactoring.members_for(MemberAction::DeclareAbstract).iter().map(|m| m.id),
    );
    let candidates = type_names(refactoring.candidate_destinations());
    let showable_types = type_names(refactoring.showable_types().iter().collect());
    let status = refactoring.check_final_conditions();

    let workspace = Workspace::from_hierarchy(hierarchy);
    let edits = match refactoring.planned_edits() {
        Ok(edits) => edits.iter().map(|edit| edit.describe(&workspace)).collect(),
        Err(RefactorError::Incomplete(_)) => Vec::new(),
        Err(err) => return Err(err.into()),
    };

    Ok(PlanReport {
        declaring_type: hierarchy.type_name(refactoring.declaring_type()).to_string(),
        destination: hierarchy.type_name(refactoring.destination().id).to_string(),
        candidates,
        pull_up,
        declare_abstract,
        required: member_labels(session, required),
        required_accepted: accept_required,
        showable_types,
        status,
        edits,
    })
}

fn print_report(report: &PlanReport) {
    println!(
        "🔍 {} {} → {}",
        "Planning".green().bold(),
        report.declaring_type,
        report.destination
    );
    println!("   Candidates: {}", report.candidates.join(", "));
    println!();

    println!("{}", "Members".bold());
    print_list("Pull up", &report.pull_up);
    print_list("Declare abstract", &report.declare_abstract);
    if report.required_accepted {
        print_list("Accepted as required", &report.required);
    } else if !report.required.is_empty() {
        println!(
            "   {} Also required: {} (use --accept-required)",
            "⚠".yellow(),
            report.required.join(", ")
        );
    }
    println!();

    println!("{}", "Affected types".bold());
    println!("   {}", report.showable_types.join(", "));
    println!();

    println!("{}", "Conditions".bold());
    print_status(&report.status);
    println!();

    if report.edits.is_empty() {
        println!("   No edits planned");
    } else {
        println!("{}", "Edits".bold());
        for (i, edit) in report.edits.iter().enumerate() {
            println!("   {}. {}", i + 1, edit);
        }
    }
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        println!("   {}: {}", title, "none".dimmed());
    } else {
        println!("   {}: {}", title, items.join(", "));
    }
}
