//! Run orchestration for the table compiler.
//!
//! A run ingests the selected workbooks in parallel, pulls in the
//! workbooks their tables reference, consolidates merge groups, validates
//! every table in parallel and finally emits the output tree. Every stage
//! gates on the diagnostics of the stages before it.

mod context;
mod merge;
mod pipeline;
mod pool;
mod shard;
mod state;

pub use context::{RunContext, Selection};
pub use merge::{MergeOutcome, merge_group};
pub use pipeline::{RunOutcome, Stage, TableReport, run};
pub use pool::{DEFAULT_POLL_INTERVAL, NoProgress, Phase, ProgressObserver, WorkerPool};
pub use shard::partition;
pub use state::{CompileState, LoadedTable, PendingMergeSheet};
