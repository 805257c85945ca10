//! Transactions over a small key-value store

use hoist_changes::{
    BlockingContext, CancellationToken, Change, ChangeError, ChangeExecutionTransaction, CompositeChange,
    LoggingProgressMonitor, NullProgressMonitor, ProgressMonitor, Recovery, RefactoringStatus, TransactionError,
    UndoManager,
};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Clone, PartialEq)]
struct Store {
    values: BTreeMap<String, String>,
    locked: BTreeSet<String>,
}

impl Store {
    fn with(pairs: &[(&str, &str)]) -> Self {
        let mut store = Store::default();
        for (k, v) in pairs {
            store.values.insert(k.to_string(), v.to_string());
        }
        store
    }
}

/// Sets `key` to `value` (or removes it), undone by restoring the previous value
#[derive(Debug)]
struct SetValue {
    key: String,
    value: Option<String>,
}

impl SetValue {
    fn boxed(key: &str, value: Option<&str>) -> Box<dyn Change<Store>> {
        Box::new(SetValue {
            key: key.to_string(),
            value: value.map(str::to_string),
        })
    }
}

impl Change<Store> for SetValue {
    fn name(&self) -> String {
        format!("set {}", self.key)
    }

    fn modified_element(&self) -> Option<String> {
        Some(self.key.clone())
    }

    fn is_valid(&self, store: &Store, _monitor: &mut dyn ProgressMonitor) -> RefactoringStatus {
        if self.value.is_none() && !store.values.contains_key(&self.key) {
            return RefactoringStatus::fatal(format!("{} does not exist", self.key));
        }
        RefactoringStatus::new()
    }

    fn perform(
        &mut self,
        store: &mut Store,
        _monitor: &mut dyn ProgressMonitor,
    ) -> Result<Option<Box<dyn Change<Store>>>, ChangeError> {
        if store.locked.contains(&self.key) {
            return Err(ChangeError::ReadOnly(self.key.clone()));
        }
        let previous = match &self.value {
            Some(value) => store.values.insert(self.key.clone(), value.clone()),
            None => store.values.remove(&self.key),
        };
        Ok(Some(Box::new(SetValue {
            key: self.key.clone(),
            value: previous,
        })))
    }
}

fn context() -> BlockingContext<NullProgressMonitor> {
    BlockingContext::new(NullProgressMonitor::new())
}

#[test]
fn test_apply_and_undo_restores_store() {
    let original = Store::with(&[("a", "1"), ("b", "2")]);
    let mut store = original.clone();

    let change = CompositeChange::new("update")
        .with(SetValue::boxed("a", Some("10")))
        .with(SetValue::boxed("b", None))
        .with(SetValue::boxed("c", Some("3")));

    let outcome = ChangeExecutionTransaction::new(change)
        .execute(&mut store, &mut context())
        .unwrap();
    assert_eq!(store, Store::with(&[("a", "10"), ("c", "3")]));

    ChangeExecutionTransaction::new(outcome.undo.unwrap())
        .execute(&mut store, &mut context())
        .unwrap();
    assert_eq!(store, original);
}

#[test]
fn test_read_only_key_rolls_back_earlier_edits() {
    let mut store = Store::with(&[("a", "1"), ("b", "2")]);
    store.locked.insert("b".into());
    let original = store.clone();

    let change = CompositeChange::new("update")
        .with(SetValue::boxed("a", Some("10")))
        .with(SetValue::boxed("x", Some("new")))
        .with(SetValue::boxed("b", Some("20")))
        .with(SetValue::boxed("c", Some("3")));

    let err = ChangeExecutionTransaction::new(change)
        .execute(&mut store, &mut context())
        .unwrap_err();

    match &err {
        TransactionError::Apply {
            change,
            source,
            recovery,
        } => {
            assert_eq!(change, "set b");
            assert_eq!(source, &ChangeError::ReadOnly("b".into()));
            assert_eq!(recovery, &Recovery::RolledBack { undone: 2 });
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(store, original);
    assert!(err.to_string().starts_with("set b failed"));
}

#[test]
fn test_nested_group_is_rolled_back_too() {
    let mut store = Store::with(&[("locked", "0")]);
    store.locked.insert("locked".into());
    let original = store.clone();

    let inner = CompositeChange::new("inner")
        .with(SetValue::boxed("b", Some("2")))
        .with(SetValue::boxed("locked", Some("1")));
    let change = CompositeChange::new("outer")
        .with(SetValue::boxed("a", Some("1")))
        .with(Box::new(inner));

    let err = ChangeExecutionTransaction::new(change)
        .execute(&mut store, &mut context())
        .unwrap_err();

    // The nested partial undo and the undo of "a" are both replayed
    assert_eq!(err.recovery(), Some(&Recovery::RolledBack { undone: 2 }));
    assert_eq!(store, original);
}

#[test]
fn test_rolled_back_count_includes_nested_edits() {
    let mut store = Store::with(&[("locked", "0")]);
    store.locked.insert("locked".into());
    let original = store.clone();

    let inner = CompositeChange::new("inner")
        .with(SetValue::boxed("b", Some("2")))
        .with(SetValue::boxed("c", Some("3")))
        .with(SetValue::boxed("locked", Some("1")));
    let change = CompositeChange::new("outer")
        .with(SetValue::boxed("a", Some("1")))
        .with(Box::new(inner));

    let err = ChangeExecutionTransaction::new(change)
        .execute(&mut store, &mut context())
        .unwrap_err();

    // "a", then "b" and "c" inside the group
    assert_eq!(err.recovery(), Some(&Recovery::RolledBack { undone: 3 }));
    assert_eq!(store, original);
}

#[test]
fn test_validation_failure_leaves_store_untouched() {
    let mut store = Store::with(&[("a", "1")]);
    let original = store.clone();

    let change = CompositeChange::new("update")
        .with(SetValue::boxed("a", Some("2")))
        .with(SetValue::boxed("missing", None));

    let err = ChangeExecutionTransaction::new(change)
        .execute(&mut store, &mut context())
        .unwrap_err();

    assert!(matches!(err, TransactionError::Invalid(ref status) if status.has_fatal_error()));
    assert_eq!(store, original);
}

#[test]
fn test_canceled_before_start() {
    let mut store = Store::with(&[("a", "1")]);
    let token = CancellationToken::new();
    token.cancel();
    let mut context = BlockingContext::new(LoggingProgressMonitor::new(token.clone()));

    let change = CompositeChange::new("update").with(SetValue::boxed("a", Some("2")));
    let err = ChangeExecutionTransaction::new(change)
        .execute(&mut store, &mut context)
        .unwrap_err();

    match err {
        TransactionError::Apply { source, recovery, .. } => {
            assert_eq!(source, ChangeError::Canceled);
            assert_eq!(recovery, Recovery::NotNeeded);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(store.values["a"], "1");
}

#[test]
fn test_undo_manager_round_trip() {
    let mut store = Store::with(&[("a", "1")]);
    let mut context = context();
    let mut history = UndoManager::new();

    for (i, value) in ["2", "3"].into_iter().enumerate() {
        let change = CompositeChange::new(format!("edit {}", i)).with(SetValue::boxed("a", Some(value)));
        let outcome = ChangeExecutionTransaction::new(change)
            .execute(&mut store, &mut context)
            .unwrap();
        history.push(format!("Edit {}", i), outcome.undo);
    }
    assert_eq!(store.values["a"], "3");

    history.undo(&mut store, &mut context).unwrap();
    history.undo(&mut store, &mut context).unwrap();
    assert_eq!(store.values["a"], "1");
    assert_eq!(history.redo_description(), Some("Edit 0"));

    history.redo(&mut store, &mut context).unwrap();
    assert_eq!(store.values["a"], "2");
    assert_eq!(history.undo_levels(), 1);
    assert_eq!(history.redo_levels(), 1);
}
