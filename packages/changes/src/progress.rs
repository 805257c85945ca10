//! # Progress and cancellation
//!
//! Long operations report coarse progress in abstract units and poll for
//! cancellation between steps. Monitors nest: a [`SubProgressMonitor`]
//! maps a child's task onto a fixed slice of its parent's units, and a
//! [`NotCancelableProgressMonitor`] hides cancellation from the work it
//! wraps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

pub trait ProgressMonitor {
    fn begin_task(&mut self, name: &str, total_units: u32);

    fn worked(&mut self, units: u32);

    fn sub_task(&mut self, _name: &str) {}

    fn done(&mut self);

    fn is_canceled(&self) -> bool;

    fn set_canceled(&mut self, canceled: bool);
}

/// Shared cancellation flag, settable from another thread
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    canceled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.canceled.store(false, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

/// Monitor that reports nothing
#[derive(Debug, Default)]
pub struct NullProgressMonitor {
    canceled: bool,
}

impl NullProgressMonitor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressMonitor for NullProgressMonitor {
    fn begin_task(&mut self, _name: &str, _total_units: u32) {}

    fn worked(&mut self, _units: u32) {}

    fn done(&mut self) {}

    fn is_canceled(&self) -> bool {
        self.canceled
    }

    fn set_canceled(&mut self, canceled: bool) {
        self.canceled = canceled;
    }
}

/// Monitor that logs progress through `tracing`
#[derive(Debug, Default)]
pub struct LoggingProgressMonitor {
    task: String,
    total: u32,
    worked: u32,
    token: CancellationToken,
}

impl LoggingProgressMonitor {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl ProgressMonitor for LoggingProgressMonitor {
    fn begin_task(&mut self, name: &str, total_units: u32) {
        self.task = name.to_string();
        self.total = total_units;
        self.worked = 0;
        debug!(task = %self.task, total = total_units, "Task started");
    }

    fn worked(&mut self, units: u32) {
        if units == 0 {
            return;
        }
        self.worked = self.worked.saturating_add(units);
        debug!(task = %self.task, worked = self.worked, total = self.total, "Progress");
    }

    fn sub_task(&mut self, name: &str) {
        debug!(task = %self.task, sub_task = %name, "Sub-task");
    }

    fn done(&mut self) {
        debug!(task = %self.task, "Task done");
    }

    fn is_canceled(&self) -> bool {
        self.token.is_canceled()
    }

    fn set_canceled(&mut self, canceled: bool) {
        if canceled {
            self.token.cancel();
        } else {
            self.token.reset();
        }
    }
}

/// Maps a child task onto `parent_units` of the parent's budget.
///
/// However many units the child declares, the parent advances by exactly
/// `parent_units` once the child is done.
pub struct SubProgressMonitor<'a> {
    parent: &'a mut dyn ProgressMonitor,
    parent_units: u32,
    total: u32,
    worked: u32,
    reported: u32,
}

impl<'a> SubProgressMonitor<'a> {
    pub fn new(parent: &'a mut dyn ProgressMonitor, parent_units: u32) -> Self {
        Self {
            parent,
            parent_units,
            total: 0,
            worked: 0,
            reported: 0,
        }
    }

    fn report_up_to(&mut self, target: u32) {
        let target = target.min(self.parent_units);
        if target > self.reported {
            self.parent.worked(target - self.reported);
            self.reported = target;
        }
    }
}

impl ProgressMonitor for SubProgressMonitor<'_> {
    fn begin_task(&mut self, name: &str, total_units: u32) {
        self.total = total_units;
        self.worked = 0;
        if !name.is_empty() {
            self.parent.sub_task(name);
        }
    }

    fn worked(&mut self, units: u32) {
        self.worked = self.worked.saturating_add(units);
        if self.total == 0 {
            return;
        }
        let scaled = u64::from(self.worked.min(self.total)) * u64::from(self.parent_units) / u64::from(self.total);
        self.report_up_to(scaled as u32);
    }

    fn sub_task(&mut self, name: &str) {
        self.parent.sub_task(name);
    }

    fn done(&mut self) {
        let all = self.parent_units;
        self.report_up_to(all);
    }

    fn is_canceled(&self) -> bool {
        self.parent.is_canceled()
    }

    fn set_canceled(&mut self, canceled: bool) {
        self.parent.set_canceled(canceled);
    }
}

/// Hides cancellation: always reports "not canceled" and ignores requests
pub struct NotCancelableProgressMonitor<'a> {
    inner: &'a mut dyn ProgressMonitor,
}

impl<'a> NotCancelableProgressMonitor<'a> {
    pub fn new(inner: &'a mut dyn ProgressMonitor) -> Self {
        Self { inner }
    }
}

impl ProgressMonitor for NotCancelableProgressMonitor<'_> {
    fn begin_task(&mut self, name: &str, total_units: u32) {
        self.inner.begin_task(name, total_units);
    }

    fn worked(&mut self, units: u32) {
        self.inner.worked(units);
    }

    fn sub_task(&mut self, name: &str) {
        self.inner.sub_task(name);
    }

    fn done(&mut self) {
        self.inner.done();
    }

    fn is_canceled(&self) -> bool {
        false
    }

    fn set_canceled(&mut self, _canceled: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        worked: u32,
        sub_tasks: Vec<String>,
        canceled: bool,
    }

    impl ProgressMonitor for Counting {
        fn begin_task(&mut self, _name: &str, _total_units: u32) {}

        fn worked(&mut self, units: u32) {
            self.worked += units;
        }

        fn sub_task(&mut self, name: &str) {
            self.sub_tasks.push(name.to_string());
        }

        fn done(&mut self) {}

        fn is_canceled(&self) -> bool {
            self.canceled
        }

        fn set_canceled(&mut self, canceled: bool) {
            self.canceled = canceled;
        }
    }

    #[test]
    fn test_sub_monitor_scales_to_parent_units() {
        let mut parent = Counting::default();
        {
            let mut sub = SubProgressMonitor::new(&mut parent, 9);
            sub.begin_task("perform", 3);
            sub.worked(1);
            sub.worked(1);
        }
        assert_eq!(parent.worked, 6);
        assert_eq!(parent.sub_tasks, vec!["perform"]);
    }

    #[test]
    fn test_sub_monitor_done_reports_remainder_once() {
        let mut parent = Counting::default();
        {
            let mut sub = SubProgressMonitor::new(&mut parent, 4);
            sub.begin_task("", 100);
            sub.worked(30);
            sub.done();
            sub.done();
            sub.worked(500);
        }
        assert_eq!(parent.worked, 4);
        assert!(parent.sub_tasks.is_empty());
    }

    #[test]
    fn test_sub_monitor_without_begin_task() {
        let mut parent = Counting::default();
        {
            let mut sub = SubProgressMonitor::new(&mut parent, 2);
            sub.worked(10);
            sub.done();
        }
        assert_eq!(parent.worked, 2);
    }

    #[test]
    fn test_sub_monitor_forwards_cancellation() {
        let mut parent = Counting::default();
        parent.canceled = true;
        let sub = SubProgressMonitor::new(&mut parent, 1);
        assert!(sub.is_canceled());
    }

    #[test]
    fn test_not_cancelable_hides_cancellation() {
        let mut parent = Counting::default();
        parent.canceled = true;
        {
            let mut guarded = NotCancelableProgressMonitor::new(&mut parent);
            assert!(!guarded.is_canceled());
            guarded.set_canceled(false);
            guarded.worked(3);
        }
        // The request to clear was ignored, progress was not
        assert!(parent.canceled);
        assert_eq!(parent.worked, 3);
    }

    #[test]
    fn test_logging_monitor_uses_shared_token() {
        let token = CancellationToken::new();
        let mut monitor = LoggingProgressMonitor::new(token.clone());
        assert!(!monitor.is_canceled());

        token.cancel();
        assert!(monitor.is_canceled());

        monitor.set_canceled(false);
        assert!(!token.is_canceled());
    }
}
