//! Board Export: incremental extraction engine for virtualized kanban boards.
//!
//! The engine enumerates a board's columns, visits every distinct task's
//! detail view one at a time, pages its activity feed until nothing more
//! loads, and folds the normalized comments into a column-grouped
//! [`ExportDocument`]. All access to the host page goes through a
//! [`ViewLocator`].

pub mod assembler;
pub mod config;
pub mod driver;
pub mod engine;
pub mod enumerator;
pub mod error;
pub mod extractor;
pub mod feed;
pub mod locator;
pub mod progress;
pub mod rich_text;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;
pub mod visibility;
pub mod waiter;
pub mod worklist;

pub use assembler::assemble;
pub use config::ExportConfig;
pub use driver::{DetailViewDriver, DriverState};
pub use engine::{AutoConfirm, BoardExporter, ConfirmGate, RunOutcome};
pub use enumerator::enumerate_groups;
pub use error::{ExportError, ExportResult};
pub use extractor::extract_records;
pub use feed::{ExhaustionOutcome, ExhaustionReport, FeedExhauster};
pub use locator::ViewLocator;
pub use progress::{ProgressEvent, ProgressReporter, TracingReporter};
pub use types::*;
pub use waiter::wait_until;
pub use worklist::build_worklist;
