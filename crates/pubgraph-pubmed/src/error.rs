//! Error types for record extraction and per-identifier fetches

use pubgraph_core::StreamError;

use crate::record::Pmid;

/// Why a raw document could not be turned into a record.
#[derive(Debug)]
pub enum ExtractError {
    /// Not well-formed XML
    Xml(quick_xml::Error),
    /// Mandatory skeleton violated: root shape, identifier mismatch,
    /// missing mandatory sibling
    Malformed { reason: String },
    /// Any other broken assumption about element contents
    Validation { reason: String },
}

impl ExtractError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xml(e) => write!(f, "XML parse error: {e}"),
            Self::Malformed { reason } => write!(f, "malformed document: {reason}"),
            Self::Validation { reason } => write!(f, "unexpected document content: {reason}"),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Xml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for ExtractError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e)
    }
}

/// Failure to populate one identifier (transport, cache or extraction).
#[derive(Debug)]
pub enum FetchError {
    Stream(StreamError),
    Cache { id: Pmid, source: std::io::Error },
    Extract(ExtractError),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream(e) => write!(f, "{e}"),
            Self::Cache { id, source } => write!(f, "cache entry {id}: {source}"),
            Self::Extract(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<StreamError> for FetchError {
    fn from(e: StreamError) -> Self {
        Self::Stream(e)
    }
}

impl From<ExtractError> for FetchError {
    fn from(e: ExtractError) -> Self {
        Self::Extract(e)
    }
}
