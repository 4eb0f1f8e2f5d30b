//! Pubgraph Core - Common infrastructure for metadata fetch pipelines
//!
//! Blocking HTTP over a shared runtime, logging with progress-bar
//! integration, shutdown signalling, and a small tabular model with a
//! tab-separated sink.

pub mod logging;
pub mod progress;
pub mod shutdown;
pub mod sink;
pub mod stream;
pub mod table;

// Re-exports for convenience
pub use logging::{IndicatifLogger, init_logging, parse_level};
pub use progress::{ProgressContext, SharedProgress};
pub use shutdown::{install_signal_handlers, shutdown_flag};
pub use sink::{TsvSink, cleanup_tmp_files, read_table, write_table};
pub use stream::{HttpTransport, SHARED_RUNTIME, StreamError, Transport, fetch_text};
pub use table::{Cell, Table};
