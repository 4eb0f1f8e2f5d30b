//! Integration tests for pubgraph-pubmed
//!
//! The batch fetcher is driven through an in-memory transport so these run
//! offline. The ignored test at the bottom talks to the real E-utilities
//! endpoint: cargo test -p pubgraph-pubmed --test integration -- --ignored

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;

use indicatif::ProgressBar;
use pubgraph_core::{Cell, StreamError, Transport};
use pubgraph_pubmed::tables::{EDGE_FILE, NODE_FILE, TEXT_FILE};
use pubgraph_pubmed::{BatchFetcher, BatchTables, Config, Pmid};
use tempfile::TempDir;

static NEVER: AtomicBool = AtomicBool::new(false);

const FIXTURE: &str = include_str!("fixtures/pubmed_12187484.xml");
const BASE_URL: &str = "mock://efetch?id=";

/// Serves documents by URL and counts every request
#[derive(Default)]
struct MockTransport {
    documents: HashMap<String, Result<String, u16>>,
    calls: Vec<String>,
}

impl MockTransport {
    fn serve(mut self, id: Pmid, body: impl Into<String>) -> Self {
        self.documents.insert(format!("{BASE_URL}{id}"), Ok(body.into()));
        self
    }

    fn fail(mut self, id: Pmid, status: u16) -> Self {
        self.documents.insert(format!("{BASE_URL}{id}"), Err(status));
        self
    }
}

impl Transport for MockTransport {
    fn get_text(&mut self, url: &str) -> Result<String, StreamError> {
        self.calls.push(url.to_string());
        match self.documents.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(StreamError::Http {
                status: Some(*status),
                message: "mock failure".to_string(),
            }),
            None => Err(StreamError::Http {
                status: None,
                message: format!("no mock for {url}"),
            }),
        }
    }
}

fn config(cache: Option<&TempDir>) -> Config {
    Config {
        base_url: BASE_URL.to_string(),
        cache_dir: cache.map(|d| d.path().join("cache")),
        pace_delays: false,
        ..Default::default()
    }
}

fn fetcher(config: Config, transport: MockTransport) -> BatchFetcher<MockTransport> {
    BatchFetcher::with_transport(config, transport)
        .unwrap()
        .with_stop_flag(&NEVER)
}

/// Small well-formed document for `id` citing `refs`
fn article(id: Pmid, refs: &[Pmid]) -> String {
    let references: String = refs
        .iter()
        .map(|r| {
            format!(
                r#"<Reference><ArticleIdList><ArticleId IdType="pubmed">{r}</ArticleId></ArticleIdList></Reference>"#
            )
        })
        .collect();
    format!(
        r#"
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation><PMID Version="1">{id}</PMID>
      <Article><ArticleTitle>Article {id}</ArticleTitle></Article>
    </MedlineCitation>
    <PubmedData>
      <PublicationStatus>ppublish</PublicationStatus>
      <ArticleIdList><ArticleId IdType="pubmed">{id}</ArticleId></ArticleIdList>
      <ReferenceList>{references}</ReferenceList>
    </PubmedData>
  </PubmedArticle>
</PubmedArticleSet>
"#
    )
}

#[test]
fn first_fails_second_succeeds() {
    let transport = MockTransport::default()
        .fail(1, 500)
        .serve(12187484, FIXTURE);
    let mut f = fetcher(config(None), transport);

    let summary = f.populate(&[1, 12187484], &ProgressBar::hidden());
    let tables = f.tables();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.populated, 1);
    assert_eq!(tables.nodes.len(), 1);
    assert_eq!(tables.nodes.get(0, "id"), Some(&Cell::Int(12187484)));
    // title + three abstract paragraphs
    assert_eq!(tables.texts.len(), 4);
    // both cited PMIDs are outside the batch
    assert!(tables.edges.is_empty());
}

#[test]
fn first_fails_extraction_second_succeeds() {
    // 1 answers with the wrong article, 2 with an error document
    let transport = MockTransport::default()
        .serve(1, article(3, &[]))
        .serve(2, "<eFetchResult><ERROR>UID=2: cannot get document summary</ERROR></eFetchResult>")
        .serve(12187484, FIXTURE);
    let mut f = fetcher(config(None), transport);

    let summary = f.populate(&[1, 2, 12187484], &ProgressBar::hidden());
    let tables = f.tables();

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.populated, 1);
    assert_eq!(tables.nodes.len(), 1);
    assert_eq!(tables.nodes.get(0, "id"), Some(&Cell::Int(12187484)));
}

#[test]
fn cache_round_trip_makes_no_network_calls() {
    let dir = TempDir::new().unwrap();

    let transport = MockTransport::default().serve(12187484, FIXTURE);
    let mut first = fetcher(config(Some(&dir)), transport);
    let first_tables = first.run(&[12187484]);
    assert_eq!(first.transport().calls.len(), 1);
    assert!(dir.path().join("cache/12187484.xml").exists());

    let mut second = fetcher(config(Some(&dir)), MockTransport::default());
    let summary = second.populate(&[12187484], &ProgressBar::hidden());

    assert!(second.transport().calls.is_empty());
    assert_eq!(summary.cached, 1);
    assert_eq!(summary.fetched, 0);
    assert_eq!(second.tables(), first_tables);
}

#[test]
fn cache_written_even_when_parsing_fails() {
    let dir = TempDir::new().unwrap();
    let transport = MockTransport::default().serve(5, "\n<eSearchResult><ERROR>bad</ERROR></eSearchResult>\n");
    let mut f = fetcher(config(Some(&dir)), transport);

    let summary = f.populate(&[5], &ProgressBar::hidden());
    assert_eq!(summary.failed, 1);

    let cached = std::fs::read_to_string(dir.path().join("cache/5.xml")).unwrap();
    assert_eq!(cached, "<eSearchResult><ERROR>bad</ERROR></eSearchResult>");
}

#[test]
fn identifier_mismatch_leaves_record_unpopulated() {
    // Server answers id 7 with the document for another article
    let transport = MockTransport::default().serve(7, FIXTURE);
    let mut f = fetcher(config(None), transport);

    let tables = f.run(&[7]);

    assert!(!f.record(7).unwrap().is_populated());
    assert!(tables.nodes.is_empty());
}

#[test]
fn populated_ids_not_refetched() {
    let transport = MockTransport::default().serve(1, article(1, &[]));
    let mut f = fetcher(config(None), transport);

    f.populate(&[1], &ProgressBar::hidden());
    let summary = f.populate(&[1, 1], &ProgressBar::hidden());

    assert_eq!(summary.skipped, 2);
    assert_eq!(f.transport().calls.len(), 1);
}

#[test]
fn edges_kept_between_batch_members() {
    let transport = MockTransport::default()
        .serve(1, article(1, &[2, 99]))
        .serve(2, article(2, &[4]))
        .serve(3, article(3, &[1]));
    let mut f = fetcher(config(None), transport);

    let tables = f.run(&[1, 2, 3]);
    let edges: Vec<(u64, u64)> = tables
        .edges
        .rows()
        .iter()
        .map(|r| (r[0].as_int().unwrap(), r[1].as_int().unwrap()))
        .collect();

    assert_eq!(edges, [(1, 2), (3, 1)]);
}

#[test]
fn pacing_disabled_is_fast() {
    let ids: Vec<Pmid> = (1..=20).collect();
    let transport = ids
        .iter()
        .fold(MockTransport::default(), |t, &id| t.serve(id, article(id, &[])));
    let mut f = fetcher(config(None), transport);

    let summary = f.populate(&ids, &ProgressBar::hidden());

    assert_eq!(summary.populated, 20);
    assert!(summary.elapsed.as_secs_f64() < 2.0, "took {:?}", summary.elapsed);
}

#[test]
fn tables_written_to_output_dir() {
    let dir = TempDir::new().unwrap();
    let transport = MockTransport::default()
        .serve(1, article(1, &[2]))
        .serve(2, article(2, &[]));
    let mut f = fetcher(config(None), transport);

    f.run(&[1, 2]).write(dir.path()).unwrap();

    for name in [NODE_FILE, TEXT_FILE, EDGE_FILE] {
        assert!(dir.path().join(name).exists(), "{name} missing");
    }
    let graph = std::fs::read_to_string(dir.path().join(EDGE_FILE)).unwrap();
    let lines: Vec<_> = graph.lines().collect();
    assert_eq!(lines, ["source\ttarget", "1\t2"]);

    let back = BatchTables::read(dir.path()).unwrap();
    assert_eq!(back.nodes.len(), 2);
    assert_eq!(back.texts.get(1, "content"), Some(&Cell::from("Article 2")));
}

/// Fetch one real article from E-utilities
#[test]
#[ignore]
fn fetch_live_article() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        cache_dir: Some(dir.path().join("cache")),
        pace_delays: false,
        ..Default::default()
    };

    let mut fetcher = BatchFetcher::new(config).expect("Fetcher should build");
    let tables = fetcher.run(&[12187484]);

    assert_eq!(tables.nodes.len(), 1);
    assert!(!tables.texts.is_empty());
}
