//! Aggregation of task outcomes into a single verdict.

use std::time::Duration;

use tracing::debug;

use crate::error::Error;
use crate::handle::TaskHandle;

/// Final state of one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Succeeded(T),
    /// The operation reported an error; holds its message.
    Failed(String),
    /// The operation did not finish before its deadline.
    TimedOut(Duration),
}

impl<T> Outcome<T> {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }
}

/// Outcome of a single work item, tagged with its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome<T> {
    pub id: String,
    pub outcome: Outcome<T>,
}

impl<T> ItemOutcome<T> {
    /// One-line, human-readable description of a failure.
    ///
    /// Returns `None` for successful items.
    pub fn failure_line(&self) -> Option<String> {
        match &self.outcome {
            Outcome::Succeeded(_) => None,
            Outcome::Failed(message) => Some(format!("{}: {}", self.id, message)),
            Outcome::TimedOut(deadline) => {
                Some(format!("{}: timed out after {:?}", self.id, deadline))
            }
        }
    }
}

/// Per-item outcomes in submission order, plus whether anything failed.
#[derive(Debug, Clone)]
pub struct Verdict<T> {
    items: Vec<ItemOutcome<T>>,
    failed: bool,
}

impl<T> Default for Verdict<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            failed: false,
        }
    }
}

impl<T> Verdict<T> {
    fn record(&mut self, item: ItemOutcome<T>) {
        self.failed |= !item.outcome.is_success();
        self.items.push(item);
    }

    /// Returns `true` if at least one item failed or timed out.
    #[inline]
    pub fn has_failures(&self) -> bool {
        self.failed
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemOutcome<T>> {
        self.items.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Outcome<T>> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .map(|item| &item.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome<T>> {
        self.items.iter().filter(|item| !item.outcome.is_success())
    }

    pub fn success_count(&self) -> usize {
        self.items.len() - self.failure_count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// One line per failed item, naming the item and its error.
    pub fn failure_lines(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(ItemOutcome::failure_line)
            .collect()
    }
}

/// Waits for every handle in turn and builds the [`Verdict`].
///
/// See [`collect_with`].
pub async fn collect<T>(handles: Vec<TaskHandle<T>>, per_item_deadline: Duration) -> Verdict<T> {
    collect_with(handles, per_item_deadline, |_| {}).await
}

/// Waits for every handle in input order, each under `per_item_deadline`.
///
/// A failing or hanging item is recorded and never stops the remaining handles
/// from being awaited. `on_outcome` is called as each item resolves.
pub async fn collect_with<T, F>(
    handles: Vec<TaskHandle<T>>,
    per_item_deadline: Duration,
    mut on_outcome: F,
) -> Verdict<T>
where
    F: FnMut(&ItemOutcome<T>),
{
    let mut verdict = Verdict {
        items: Vec::with_capacity(handles.len()),
        failed: false,
    };

    for handle in handles {
        let id = handle.id().to_string();
        let outcome = match handle.wait(per_item_deadline).await {
            Ok(value) => Outcome::Succeeded(value),
            Err(Error::Timeout { deadline, .. }) => Outcome::TimedOut(deadline),
            Err(e) => Outcome::Failed(e.to_string()),
        };
        debug!(item = %id, success = outcome.is_success(), "Task resolved");

        let item = ItemOutcome { id, outcome };
        on_outcome(&item);
        verdict.record(item);
    }

    verdict
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_line_names_item() {
        let failed: ItemOutcome<()> = ItemOutcome {
            id: "barchart".to_string(),
            outcome: Outcome::Failed("exit status: 1".to_string()),
        };
        assert_eq!(
            failed.failure_line().as_deref(),
            Some("barchart: exit status: 1")
        );

        let hung: ItemOutcome<()> = ItemOutcome {
            id: "tempo".to_string(),
            outcome: Outcome::TimedOut(Duration::from_secs(180)),
        };
        assert_eq!(
            hung.failure_line().as_deref(),
            Some("tempo: timed out after 180s")
        );
    }

    #[test]
    fn test_success_has_no_failure_line() {
        let ok = ItemOutcome {
            id: "table".to_string(),
            outcome: Outcome::Succeeded(()),
        };
        assert!(ok.failure_line().is_none());
    }

    #[test]
    fn test_empty_verdict_has_no_failures() {
        let verdict: Verdict<()> = Verdict::default();
        assert!(verdict.is_empty());
        assert!(!verdict.has_failures());
        assert!(verdict.failure_lines().is_empty());
    }
}
