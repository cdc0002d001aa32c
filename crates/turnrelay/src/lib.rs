//! turnrelay: three concurrent stages handing one critical section along
//! a fixed turn order, with a fan-out word-length count in the middle.

mod generator;
mod report;
mod sink;
mod stage;

pub mod config;
pub mod counter;
pub mod error;
pub mod fanout;
pub mod gate;
pub mod orchestrator;
pub mod store;

pub use orchestrator::Relay;

pub use config::RelayConfig;
pub use counter::{CountTable, split_words, words_of_length};
pub use error::{ConfigError, FanOutError, RelayError, StoreError};
pub use fanout::FanOutCounter;
pub use gate::{TurnGate, TurnPermit};
pub use generator::WordGenerator;
pub use report::{LengthCount, RunReport, StageSpan, select_maxima};
pub use sink::{ConsoleSink, MemorySink, ResultSink, SinkEvent};
pub use stage::{Stage, TurnId};
pub use store::{DataSource, FileStore, MemoryStore};
