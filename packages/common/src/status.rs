use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a status entry, ordered from harmless to blocking
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Ok => "ok",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(label)
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// The severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Element the finding is about (type or member label), if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl StatusEntry {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Accumulated outcome of a precondition or validity check.
///
/// An empty status is OK. The overall severity is the highest severity of
/// any entry, so merging statuses never hides a blocking finding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactoringStatus {
    entries: Vec<StatusEntry>,
}

impl RefactoringStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::single(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::single(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::single(Severity::Error, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::single(Severity::Fatal, message)
    }

    fn single(severity: Severity, message: impl Into<String>) -> Self {
        let mut status = Self::new();
        status.add_entry(StatusEntry::new(severity, message));
        status
    }

    pub fn add_entry(&mut self, entry: StatusEntry) {
        // OK entries carry no information
        if entry.severity != Severity::Ok {
            self.entries.push(entry);
        }
    }

    pub fn add_info(&mut self, message: impl Into<String>) {
        self.add_entry(StatusEntry::new(Severity::Info, message));
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.add_entry(StatusEntry::new(Severity::Warning, message));
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.add_entry(StatusEntry::new(Severity::Error, message));
    }

    pub fn add_fatal(&mut self, message: impl Into<String>) {
        self.add_entry(StatusEntry::new(Severity::Fatal, message));
    }

    /// Append all entries of `other`
    pub fn merge(&mut self, other: RefactoringStatus) {
        self.entries.extend(other.entries);
    }

    pub fn severity(&self) -> Severity {
        self.entries
            .iter()
            .map(|e| e.severity)
            .max()
            .unwrap_or(Severity::Ok)
    }

    pub fn is_ok(&self) -> bool {
        self.entries.is_empty()
    }

    /// True for `Error` and `Fatal`
    pub fn has_error(&self) -> bool {
        self.severity() >= Severity::Error
    }

    pub fn has_fatal_error(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    pub fn entry_with_highest_severity(&self) -> Option<&StatusEntry> {
        self.entries.iter().max_by_key(|e| e.severity)
    }
}

impl fmt::Display for RefactoringStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return f.write_str("ok");
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            match &entry.context {
                Some(context) => write!(f, "{}: {} ({})", entry.severity, entry.message, context)?,
                None => write!(f, "{}: {}", entry.severity, entry.message)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_status_is_ok() {
        let status = RefactoringStatus::new();
        assert!(status.is_ok());
        assert_eq!(status.severity(), Severity::Ok);
        assert!(!status.has_error());
        assert_eq!(status.to_string(), "ok");
    }

    #[test]
    fn test_merge_keeps_highest_severity() {
        let mut status = RefactoringStatus::warning("field becomes a constant");
        status.merge(RefactoringStatus::fatal("destination is not a supertype"));
        status.add_info("nothing else");

        assert_eq!(status.severity(), Severity::Fatal);
        assert!(status.has_fatal_error());
        assert_eq!(status.entries().len(), 3);
        assert_eq!(
            status.entry_with_highest_severity().map(|e| e.message.as_str()),
            Some("destination is not a supertype")
        );
    }

    #[test]
    fn test_error_is_not_fatal() {
        let status = RefactoringStatus::error("name collision");
        assert!(status.has_error());
        assert!(!status.has_fatal_error());
    }

    #[test]
    fn test_ok_entries_are_dropped() {
        let mut status = RefactoringStatus::new();
        status.add_entry(StatusEntry::new(Severity::Ok, "fine"));
        assert!(status.is_ok());
    }

    #[test]
    fn test_status_serialization() {
        let mut status = RefactoringStatus::new();
        status.add_entry(StatusEntry::new(Severity::Error, "collision").with_context("Shape.area()"));

        let json = serde_json::to_string(&status).unwrap();
        let deserialized: RefactoringStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}
