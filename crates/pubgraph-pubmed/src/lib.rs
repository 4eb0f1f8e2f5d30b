//! Pubgraph PubMed - per-article metadata fetcher
//!
//! Fetches single-article efetch documents for a list of PMIDs, caches the
//! raw XML, and flattens the results into node, text and citation-edge tables.
//!
//! # Features
//!
//! - Strict structural checks on each document, typed extraction errors
//! - On-disk cache, one file per PMID
//! - Jittered request pacing
//! - Per-identifier failure isolation
//!
//! # Example
//!
//! ```ignore
//! use pubgraph_pubmed::{BatchFetcher, Config};
//!
//! let config = Config {
//!     cache_dir: Some("output/cache".into()),
//!     ..Default::default()
//! };
//!
//! let mut fetcher = BatchFetcher::new(config)?;
//! let tables = fetcher.run(&[12187484, 2344352]);
//! tables.write("output".as_ref())?;
//! ```

pub mod benchmark;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod pacing;
pub mod record;
pub mod tables;
mod xml;

// Re-exports
pub use benchmark::{ReferenceDataset, attach_labels, merge_reference_edges};
pub use config::Config;
pub use error::{ExtractError, FetchError};
pub use extract::extract;
pub use fetcher::{BatchFetcher, Summary};
pub use record::{Pmid, Record, TextKind, TextSegment};
pub use tables::{BatchTables, build_tables, filter_edges};
