#![warn(missing_docs)]

//! Skein: spec-style console reports for multi-worker test runs
//! ============================================================
//!
//! Skein listens to the lifecycle events of a test-execution engine (runner, suite and test
//! start/end) and turns them into a human readable report:
//!
//! 1. **Per worker**: every line is prefixed with the worker's environment and id, so output from
//!    concurrent workers stays attributable.
//! 2. **Two modes**: with a single worker the suite tree streams as tests complete. With several,
//!    each worker's tree is printed in one piece when the worker ends.
//! 3. **Read only**: Skein never runs tests or decides outcomes. It renders what the engine and
//!    the run's statistics report.

pub mod duration;
pub mod environment;
pub mod error;
pub mod event;
pub mod indent;
pub mod options;
pub mod recorder;
pub mod render;
pub mod reporter;
pub mod state;
pub mod stats;
pub mod symbol;
pub mod top;

pub use error::*;
pub use event::*;
pub use options::*;
pub use recorder::*;
pub use reporter::*;
pub use state::*;
pub use stats::*;
pub use top::*;
