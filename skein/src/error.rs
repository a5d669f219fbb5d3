//! Errors raised while reporting

use std::io;
use thiserror::Error;

/// Errors that can occur while reacting to events or writing the report
#[derive(Error, Debug)]
pub enum ReportError {
    /// An event referenced a worker that never sent `runner:start`
    #[error("Unknown worker {cid}")]
    UnknownWorker {
        /// Worker id
        cid: String,
    },
    /// A suite was looked up that never sent `suite:start`
    #[error("Unknown suite {uid} on worker {cid}")]
    UnknownSuite {
        /// Worker id
        cid: String,
        /// Suite id
        uid: String,
    },
    /// The event stream closed before the final `end` event
    #[error("Event stream closed before the run ended")]
    Closed,
    /// The report could not be written
    #[error("Could not write report")]
    Io(#[from] io::Error),
}
