//! Fake changes over an append-only journal

use crate::change::Change;
use crate::errors::ChangeError;
use crate::progress::ProgressMonitor;
use hoist_common::{RefactoringStatus, Severity, StatusEntry};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct Journal {
    pub entries: Vec<String>,
    pub undone: Vec<String>,
}

/// Records dispose calls across changes
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    disposed: Rc<RefCell<Vec<String>>>,
}

impl Tracker {
    pub fn disposed(&self) -> Vec<String> {
        self.disposed.borrow().clone()
    }

    fn record(&self, label: &str) {
        self.disposed.borrow_mut().push(label.to_string());
    }
}

/// Appends its label to the journal
#[derive(Debug)]
pub struct Edit {
    label: String,
    fail: bool,
    invalid: Option<Severity>,
    undo_invalid: bool,
    undo_fails: bool,
    no_undo: bool,
    cancels: bool,
    tracker: Tracker,
}

impl Edit {
    pub fn ok(label: &str, tracker: &Tracker) -> Self {
        Self {
            label: label.to_string(),
            fail: false,
            invalid: None,
            undo_invalid: false,
            undo_fails: false,
            no_undo: false,
            cancels: false,
            tracker: tracker.clone(),
        }
    }

    /// Applies, then requests cancellation as if the user pressed cancel
    pub fn canceling(label: &str, tracker: &Tracker) -> Self {
        Self {
            cancels: true,
            ..Self::ok(label, tracker)
        }
    }

    pub fn failing(label: &str, tracker: &Tracker) -> Self {
        Self {
            fail: true,
            ..Self::ok(label, tracker)
        }
    }

    pub fn invalid(mut self, severity: Severity) -> Self {
        self.invalid = Some(severity);
        self
    }

    /// The undo of this edit reports a fatal validation error
    pub fn with_invalid_undo(mut self) -> Self {
        self.undo_invalid = true;
        self
    }

    /// Applies but cannot be undone
    pub fn without_undo(mut self) -> Self {
        self.no_undo = true;
        self
    }

    /// The undo of this edit fails when performed
    pub fn with_failing_undo(mut self) -> Self {
        self.undo_fails = true;
        self
    }
}

impl Change<Journal> for Edit {
    fn name(&self) -> String {
        self.label.clone()
    }

    fn is_valid(&self, _workspace: &Journal, _monitor: &mut dyn ProgressMonitor) -> RefactoringStatus {
        let mut status = RefactoringStatus::new();
        if let Some(severity) = self.invalid {
            status.add_entry(StatusEntry::new(severity, format!("{} is {}", self.label, severity)));
        }
        status
    }

    fn perform(
        &mut self,
        workspace: &mut Journal,
        monitor: &mut dyn ProgressMonitor,
    ) -> Result<Option<Box<dyn Change<Journal>>>, ChangeError> {
        if self.cancels {
            monitor.set_canceled(true);
        }
        if self.fail {
            return Err(ChangeError::Other(format!("{} exploded", self.label)));
        }
        workspace.entries.push(self.label.clone());
        if self.no_undo {
            return Ok(None);
        }
        Ok(Some(Box::new(Undo {
            label: self.label.clone(),
            invalid: self.undo_invalid,
            fails: self.undo_fails,
            tracker: self.tracker.clone(),
        })))
    }

    fn dispose(&mut self) {
        self.tracker.record(&self.label);
    }
}

/// Removes its label from the end of the journal
#[derive(Debug)]
pub struct Undo {
    label: String,
    invalid: bool,
    fails: bool,
    tracker: Tracker,
}

impl Change<Journal> for Undo {
    fn name(&self) -> String {
        format!("undo {}", self.label)
    }

    fn is_valid(&self, _workspace: &Journal, _monitor: &mut dyn ProgressMonitor) -> RefactoringStatus {
        if self.invalid {
            RefactoringStatus::fatal(format!("{} can no longer be undone", self.label))
        } else {
            RefactoringStatus::new()
        }
    }

    fn perform(
        &mut self,
        workspace: &mut Journal,
        _monitor: &mut dyn ProgressMonitor,
    ) -> Result<Option<Box<dyn Change<Journal>>>, ChangeError> {
        if self.fails {
            return Err(ChangeError::Other(format!("undo {} exploded", self.label)));
        }
        match workspace.entries.last() {
            Some(last) if *last == self.label => {
                workspace.entries.pop();
                workspace.undone.push(self.label.clone());
                Ok(Some(Box::new(Edit::ok(&self.label, &self.tracker))))
            }
            _ => Err(ChangeError::Conflict(format!("{} is not the last entry", self.label))),
        }
    }

    fn dispose(&mut self) {
        self.tracker.record(&format!("undo {}", self.label));
    }
}
