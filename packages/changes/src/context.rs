use crate::progress::{NotCancelableProgressMonitor, ProgressMonitor};

/// Runs a unit of work with a progress monitor.
///
/// When `cancelable` is false the work sees a monitor that never reports
/// cancellation, whatever the user does meanwhile.
pub trait ExecutionContext {
    fn run<T, F>(&mut self, cancelable: bool, work: F) -> T
    where
        F: FnOnce(&mut dyn ProgressMonitor) -> T;
}

/// Runs work synchronously on the calling thread
#[derive(Debug, Default)]
pub struct BlockingContext<M> {
    monitor: M,
}

impl<M: ProgressMonitor> BlockingContext<M> {
    pub fn new(monitor: M) -> Self {
        Self { monitor }
    }

    pub fn monitor(&self) -> &M {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut M {
        &mut self.monitor
    }

    pub fn into_monitor(self) -> M {
        self.monitor
    }
}

impl<M: ProgressMonitor> ExecutionContext for BlockingContext<M> {
    fn run<T, F>(&mut self, cancelable: bool, work: F) -> T
    where
        F: FnOnce(&mut dyn ProgressMonitor) -> T,
    {
        if cancelable {
            work(&mut self.monitor)
        } else {
            work(&mut NotCancelableProgressMonitor::new(&mut self.monitor))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgressMonitor;

    #[test]
    fn test_non_cancelable_run_hides_cancellation() {
        let mut monitor = NullProgressMonitor::new();
        monitor.set_canceled(true);
        let mut context = BlockingContext::new(monitor);

        assert!(context.run(true, |m| m.is_canceled()));
        assert!(!context.run(false, |m| m.is_canceled()));
        assert!(context.monitor().is_canceled());
    }
}
