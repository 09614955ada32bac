//! Durable run state: rolling checkpoints, structural snapshots and the
//! append-only progress log.
//!
//! # File Formats
//!
//! A checkpoint holds the last saved generation and one genome per line:
//!
//! ```text
//! Generation: 120
//! 14,3,200,17,9;88,41,0,0,255;...
//! 51,77,12,12,12;3,9,250,1,40;...
//! ```
//!
//! The progress log gains one line per checkpoint. Columns are separated by
//! a single space: generation, mean fitness, best fitness and the best
//! genome's encoding.
//!
//! ```text
//! 120 71.83 74.02 14,3,200,17,9;88,41,0,0,255;...
//! ```
//!
//! Checkpoints are replaced atomically (write to a sibling `.tmp` file,
//! sync, rename), so an interrupted run leaves either the previous or the
//! new checkpoint on disk, never a truncated one.

mod checkpoint;
mod progress;
mod store;

pub use checkpoint::{Checkpoint, write_checkpoint};
pub use progress::{ProgressLog, ProgressRecord, read_progress_log};
pub use store::{CheckpointError, CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
