//! Selection of the most frequent word lengths.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::counter::CountTable;
use crate::stage::{Stage, TurnId};

/// One reported entry: a length and how often it occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LengthCount {
    pub length: usize,
    pub count: usize,
}

/// Every length whose count equals the table maximum, in ascending length order.
///
/// Ties are all reported. Zero is a valid maximum: a table of zeros reports
/// every length. An empty table reports nothing.
pub fn select_maxima(table: &CountTable) -> Vec<LengthCount> {
    maxima_of(&table.snapshot())
}

pub(crate) fn maxima_of(counts: &BTreeMap<usize, usize>) -> Vec<LengthCount> {
    let Some(max) = counts.values().copied().max() else {
        return Vec::new();
    };

    counts
        .iter()
        .filter(|(_, count)| **count == max)
        .map(|(&length, &count)| LengthCount { length, count })
        .collect()
}

/// Timing of one stage's critical section.
#[derive(Debug, Clone, Serialize)]
pub struct StageSpan {
    pub stage: Stage,
    pub entered_at: chrono::DateTime<chrono::Utc>,
    pub exited_at: chrono::DateTime<chrono::Utc>,
    /// Failed gate attempts before the stage got its turn.
    pub polls: u64,
}

/// Outcome of a complete relay run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub maxima: Vec<LengthCount>,
    pub counts: BTreeMap<usize, usize>,
    /// Critical sections in the order they were entered.
    pub timeline: Vec<StageSpan>,
    /// Turn left on the gate once every stage returned. `None` if the gate was still held.
    pub final_turn: Option<TurnId>,
}

impl RunReport {
    pub fn stage_order(&self) -> Vec<Stage> {
        self.timeline.iter().map(|span| span.stage).collect()
    }
}
