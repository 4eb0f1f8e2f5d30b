//! Sequential batch fetcher
//!
//! Drives one identifier at a time through cache lookup, paced network
//! fetch, cache write and extraction. Failures are logged per identifier and
//! never abort the batch.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use pubgraph_core::{HttpTransport, Transport, shutdown_flag};
use rustc_hash::FxHashMap;

use crate::cache::DocumentCache;
use crate::config::Config;
use crate::error::FetchError;
use crate::extract::extract;
use crate::pacing::Pacer;
use crate::record::{Pmid, Record};
use crate::tables::{BatchTables, build_tables};

/// Where a raw document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Network,
}

/// Batch execution summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    /// Identifiers handed to the batch (duplicates included)
    pub total: usize,
    pub populated: usize,
    /// Already populated by an earlier batch or an earlier duplicate
    pub skipped: usize,
    /// Documents read from the cache
    pub cached: usize,
    /// Documents fetched over the network
    pub fetched: usize,
    /// Pacing pauses taken before network fetches
    pub pauses: usize,
    pub paced: Duration,
    pub failed: usize,
    /// Stopped early on a shutdown request
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl Summary {
    pub fn log(&self) {
        log::info!("=== PubMed Fetch Summary ===");
        log::info!(
            "Records: {}/{} populated ({} failed, {} skipped)",
            self.populated,
            self.total,
            self.failed,
            self.skipped
        );
        log::info!("Sources: {} cached, {} fetched", self.cached, self.fetched);
        if self.pauses > 0 {
            log::info!(
                "Pacing: {} pauses, {:.1}s",
                self.pauses,
                self.paced.as_secs_f64()
            );
        }
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
        if self.interrupted {
            log::warn!("Batch interrupted before all identifiers were processed");
        }
    }
}

pub struct BatchFetcher<T: Transport = HttpTransport> {
    config: Config,
    cache: Option<DocumentCache>,
    transport: T,
    pacer: Pacer,
    records: Vec<Record>,
    index: FxHashMap<Pmid, usize>,
    stop: &'static AtomicBool,
}

impl BatchFetcher<HttpTransport> {
    /// Fetcher backed by the shared HTTP client
    pub fn new(config: Config) -> io::Result<Self> {
        let transport = HttpTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> BatchFetcher<T> {
    /// Creates the cache directory when one is configured.
    pub fn with_transport(config: Config, transport: T) -> io::Result<Self> {
        let cache = config
            .cache_dir
            .as_ref()
            .map(DocumentCache::open)
            .transpose()?;
        let pacer = Pacer::new(config.pace_delays);

        Ok(Self {
            config,
            cache,
            transport,
            pacer,
            records: Vec::new(),
            index: FxHashMap::default(),
            stop: shutdown_flag(),
        })
    }

    /// Replace the process-wide shutdown flag checked before each identifier
    pub fn with_stop_flag(mut self, stop: &'static AtomicBool) -> Self {
        self.stop = stop;
        self
    }

    /// Replace the pacer built from `Config::pace_delays`
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// All records seen so far, in first-seen order, populated or not
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: Pmid) -> Option<&Record> {
        self.index.get(&id).map(|&i| &self.records[i])
    }

    /// Populate every identifier, then aggregate.
    pub fn run(&mut self, ids: &[Pmid]) -> BatchTables {
        self.populate(ids, &ProgressBar::hidden());
        self.tables()
    }

    pub fn tables(&self) -> BatchTables {
        build_tables(&self.records)
    }

    /// Populate identifiers in order. Always completes; per-identifier
    /// failures are logged and counted.
    pub fn populate(&mut self, ids: &[Pmid], pb: &ProgressBar) -> Summary {
        let start = Instant::now();
        let mut summary = Summary {
            total: ids.len(),
            ..Default::default()
        };

        for &id in ids {
            if self.stop.load(Ordering::Relaxed) {
                log::warn!("Shutdown requested, stopping batch");
                summary.interrupted = true;
                break;
            }

            let slot = self.slot(id);
            if self.records[slot].is_populated() {
                log::debug!("{id} already populated, skipping");
                summary.skipped += 1;
                pb.inc(1);
                continue;
            }

            log::info!("Populating {id}");
            match self.populate_one(id, &mut summary) {
                Ok(record) => {
                    self.records[slot] = record;
                    summary.populated += 1;
                }
                Err(e) => {
                    log::error!("Error on populating {id}: {e}");
                    summary.failed += 1;
                }
            }
            pb.inc(1);
        }

        summary.elapsed = start.elapsed();
        summary
    }

    fn slot(&mut self, id: Pmid) -> usize {
        let records = &mut self.records;
        *self.index.entry(id).or_insert_with(|| {
            records.push(Record::new(id));
            records.len() - 1
        })
    }

    fn populate_one(&mut self, id: Pmid, summary: &mut Summary) -> Result<Record, FetchError> {
        let (document, origin) = self.load_document(id, summary)?;
        match origin {
            Origin::Cache => summary.cached += 1,
            Origin::Network => summary.fetched += 1,
        }
        Ok(extract(&document, id)?)
    }

    /// Raw trimmed document for `id`, from the cache or the network.
    ///
    /// A fetched body is written to the cache before it is parsed.
    fn load_document(
        &mut self,
        id: Pmid,
        summary: &mut Summary,
    ) -> Result<(String, Origin), FetchError> {
        let cache_err = |source: io::Error| FetchError::Cache { id, source };

        if let Some(cache) = &self.cache {
            if cache.contains(id) {
                let document = cache.read(id).map_err(cache_err)?;
                return Ok((document, Origin::Cache));
            }
        }

        if let Some(slept) = self.pacer.pause() {
            summary.pauses += 1;
            summary.paced += slept;
        }
        let body = self.transport.get_text(&self.config.url_for(id))?;
        let document = body.trim().to_string();

        if let Some(cache) = &self.cache {
            cache.write(id, &document).map_err(cache_err)?;
        }
        Ok((document, Origin::Network))
    }
}
