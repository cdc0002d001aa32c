//! Fan-out of word-length counts over a contiguous range of lengths.
//!
//! One task per length, dispatched with a short stagger, all joined before
//! returning. The first failing task aborts the join; the remaining tasks
//! are aborted when the set is dropped.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::{self, JoinError, JoinSet};

use crate::counter::{CountTable, count_into};
use crate::error::FanOutError;

/// A batch of counting tasks over `start_length ..= start_length + batch_size - 1`.
#[derive(Debug, Clone)]
pub struct FanOutCounter {
    start_length: usize,
    batch_size: usize,
    dispatch_delay: Duration,
}

impl Default for FanOutCounter {
    fn default() -> Self {
        Self {
            start_length: Self::DEFAULT_START_LENGTH,
            batch_size: Self::DEFAULT_BATCH_SIZE,
            dispatch_delay: Self::DEFAULT_DISPATCH_DELAY,
        }
    }
}

impl FanOutCounter {
    pub const DEFAULT_START_LENGTH: usize = 2;
    pub const DEFAULT_BATCH_SIZE: usize = 13;
    pub const DEFAULT_DISPATCH_DELAY: Duration = Duration::from_millis(1);

    pub fn new(start_length: usize, batch_size: usize) -> Self {
        Self {
            start_length,
            batch_size,
            ..Self::default()
        }
    }

    pub fn with_dispatch_delay(mut self, dispatch_delay: Duration) -> Self {
        self.dispatch_delay = dispatch_delay;
        self
    }

    /// Lengths covered by one run. Empty when `batch_size` is zero.
    /// Truncated at `usize::MAX` rather than overflowing.
    pub fn lengths(&self) -> Range<usize> {
        self.start_length..self.start_length.saturating_add(self.batch_size)
    }

    /// Count every length in the batch into `table` and wait for all of them.
    pub async fn run(
        &self,
        words: Arc<[String]>,
        table: Arc<CountTable>,
    ) -> Result<(), FanOutError> {
        let mut tasks = JoinSet::new();
        let mut lengths_by_task = HashMap::with_capacity(self.lengths().len());

        for length in self.lengths() {
            tokio::time::sleep(self.dispatch_delay).await;

            let words = Arc::clone(&words);
            let table = Arc::clone(&table);
            let handle = tasks.spawn(async move { count_into(length, &words[..], &table) });
            lengths_by_task.insert(handle.id(), length);
            tracing::trace!(length, "Dispatched counting task");
        }

        tracing::debug!(
            tasks = tasks.len(),
            words = words.len(),
            "Waiting for counting tasks"
        );

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(_count)) => {}
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Counting task failed - aborting fan-out");
                    return Err(e);
                }
                Err(join_err) => return Err(join_failure(&lengths_by_task, join_err)),
            }
        }

        tracing::debug!(lengths = ?self.lengths(), "Fan-out complete");
        Ok(())
    }
}

/// Map a failed join back to the length its task was counting.
fn join_failure(lengths_by_task: &HashMap<task::Id, usize>, join_err: JoinError) -> FanOutError {
    let message = join_err.to_string();
    match lengths_by_task.get(&join_err.id()) {
        Some(&length) => {
            tracing::error!(length, error = %message, "Counting task did not complete");
            FanOutError::Join { length, message }
        }
        None => {
            let task_id = join_err.id().to_string();
            tracing::error!(task = %task_id, error = %message, "Untracked counting task did not complete");
            FanOutError::UntrackedTask { task_id, message }
        }
    }
}
