//! Orchestrator - runs the Produce → Count → Report relay once.
//!
//! Flow:
//! 1. Spawn all three stage tasks at once; each waits on the gate for its own id
//! 2. Produce (P1): generate text, write it to the store, hand the turn to P2
//! 3. Count (P2): read the blob, fan out the length counts, hand the turn to P3
//! 4. Report (P3): emit every maximal length, hand the turn back to P1
//! 5. On the first stage failure: abort the remaining stages and return the error
//!
//! A failed stage never releases its turn, so the stages behind it would poll
//! forever. Dropping the join set aborts them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::task::{self, JoinError, JoinSet};

use crate::config::RelayConfig;
use crate::counter::{CountTable, split_words};
use crate::error::RelayError;
use crate::fanout::FanOutCounter;
use crate::gate::TurnGate;
use crate::generator::WordGenerator;
use crate::report::{LengthCount, RunReport, StageSpan, maxima_of};
use crate::sink::{ConsoleSink, ResultSink, SinkEvent};
use crate::stage::Stage;
use crate::store::{DataSource, FileStore};

/// State shared by the three stage tasks for one run.
struct RelayContext {
    gate: TurnGate,
    table: Arc<CountTable>,
    store: Arc<dyn DataSource>,
    sink: Arc<dyn ResultSink>,
    generator: WordGenerator,
    seed: Option<u64>,
    fan_out: FanOutCounter,
    timeline: Mutex<Vec<StageSpan>>,
    maxima: Mutex<Vec<LengthCount>>,
}

impl RelayContext {
    async fn run_stage(&self, stage: Stage) -> Result<(), RelayError> {
        self.sink.emit(SinkEvent::Waiting(stage));

        let permit = self.gate.acquire(stage).await;
        let entered_at = Utc::now();
        let polls = permit.polls();
        tracing::info!(stage = %stage, polls, "Stage entered critical section");

        match stage {
            Stage::Produce => self.produce().await?,
            Stage::Count => self.count().await?,
            Stage::Report => self.report(),
        }

        let span = StageSpan {
            stage,
            entered_at,
            exited_at: Utc::now(),
            polls,
        };
        if let Ok(mut timeline) = self.timeline.lock() {
            timeline.push(span);
        }
        self.sink.emit(SinkEvent::Finished(stage));

        permit.release(stage.next());
        tracing::info!(stage = %stage, next = %stage.next(), "Stage handed over turn");
        Ok(())
    }

    async fn produce(&self) -> Result<(), RelayError> {
        let text = self.generator.generate_seeded(self.seed);
        self.store.write_blob(&text).await?;
        tracing::debug!(
            words = self.generator.word_count(),
            seeded = self.seed.is_some(),
            "Produced blob"
        );
        self.sink.emit(SinkEvent::ArtifactCreated {
            name: self.store.artifact_name(),
        });
        Ok(())
    }

    async fn count(&self) -> Result<(), RelayError> {
        let blob = self.store.read_blob().await?;
        let words: Arc<[String]> = split_words(&blob).into();
        self.fan_out.run(words, Arc::clone(&self.table)).await?;
        Ok(())
    }

    fn report(&self) {
        let maxima = maxima_of(&self.table.snapshot());
        if maxima.is_empty() {
            tracing::warn!("Count table is empty - nothing to report");
        }
        for entry in &maxima {
            self.sink.emit(SinkEvent::MaxLength(*entry));
        }
        if let Ok(mut stored) = self.maxima.lock() {
            *stored = maxima;
        }
    }

    fn run_report(&self) -> RunReport {
        let maxima = self
            .maxima
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default();
        let timeline = self
            .timeline
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default();
        RunReport {
            maxima,
            counts: self.table.snapshot(),
            timeline,
            final_turn: self.gate.current_turn(),
        }
    }
}

/// A single relay run over a data source and a result sink.
pub struct Relay {
    ctx: Arc<RelayContext>,
}

impl Relay {
    pub fn new(
        config: &RelayConfig,
        store: Arc<dyn DataSource>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        let ctx = RelayContext {
            gate: TurnGate::new(Stage::Produce).with_poll_interval(config.poll_interval),
            table: Arc::new(CountTable::new()),
            store,
            sink,
            generator: config.generator(),
            seed: config.seed,
            fan_out: config.fan_out(),
            timeline: Mutex::new(Vec::with_capacity(Stage::ALL.len())),
            maxima: Mutex::new(Vec::new()),
        };
        Self { ctx: Arc::new(ctx) }
    }

    /// File-backed store at `config.data_path`, results printed to stdout.
    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        config.validate()?;
        Ok(Self::new(
            config,
            Arc::new(FileStore::new(config.data_path.clone())),
            Arc::new(ConsoleSink),
        ))
    }

    /// The table the Count stage fills.
    pub fn count_table(&self) -> Arc<CountTable> {
        Arc::clone(&self.ctx.table)
    }

    /// Launch all stages concurrently and wait for every one of them.
    pub async fn run(self) -> Result<RunReport, RelayError> {
        let mut stages = JoinSet::new();
        let mut stage_by_task = HashMap::with_capacity(Stage::ALL.len());

        for stage in Stage::ALL {
            let ctx = Arc::clone(&self.ctx);
            let handle = stages.spawn(async move { ctx.run_stage(stage).await.map(|()| stage) });
            stage_by_task.insert(handle.id(), stage);
        }
        tracing::debug!(stages = stages.len(), "Launched stage tasks");

        while let Some(joined) = stages.join_next().await {
            match joined {
                Ok(Ok(stage)) => tracing::debug!(stage = %stage, "Stage task returned"),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Stage failed - aborting relay");
                    return Err(e);
                }
                Err(join_err) => return Err(join_failure(&stage_by_task, join_err)),
            }
        }

        let report = self.ctx.run_report();
        tracing::info!(maxima = report.maxima.len(), "Relay complete");
        Ok(report)
    }
}

/// Map a failed join back to the stage whose task it was.
fn join_failure(stage_by_task: &HashMap<task::Id, Stage>, join_err: JoinError) -> RelayError {
    let message = join_err.to_string();
    match stage_by_task.get(&join_err.id()) {
        Some(&stage) => {
            tracing::error!(stage = %stage, error = %message, "Stage task did not complete");
            RelayError::Stage { stage, message }
        }
        None => {
            let task_id = join_err.id().to_string();
            tracing::error!(task = %task_id, error = %message, "Untracked stage task did not complete");
            RelayError::UntrackedTask { task_id, message }
        }
    }
}
