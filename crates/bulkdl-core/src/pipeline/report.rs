//! Run outcome: counts plus one entry per failed item.

use crate::items::WorkItem;
use crate::task::TaskError;
use crate::transport::FailureKind;

/// An item whose fetch or persist failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    pub index: usize,
    pub url: String,
    pub name: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Items in the plan.
    pub total: usize,
    /// Items fetched and persisted.
    pub succeeded: usize,
    /// Body bytes written across all artifacts.
    pub bytes: u64,
    /// Failed items, in completion order.
    pub failures: Vec<FailedItem>,
}

impl RunReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub(crate) fn record_success(&mut self, bytes: usize) {
        self.succeeded += 1;
        self.bytes += bytes as u64;
    }

    pub(crate) fn record_failure(&mut self, item: &WorkItem, err: &TaskError) {
        self.failures.push(FailedItem {
            index: item.index(),
            url: item.url().to_string(),
            name: item.name().to_string(),
            kind: err.kind(),
            message: err.to_string(),
        });
    }

    /// Fold a partial report (e.g. from one worker) into this one.
    pub(crate) fn absorb(&mut self, other: RunReport) {
        self.succeeded += other.succeeded;
        self.bytes += other.bytes;
        self.failures.extend(other.failures);
    }

    /// Items that finished, successfully or not.
    pub fn completed(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.succeeded == self.total
    }
}
