//! Searchers: named providers that resolve free-text queries to map
//! locations.
//!
//! A searcher is an external asynchronous producer. The reducer hands
//! it the input and a [`SearchResultSink`]; the implementation delivers
//! results whenever they are ready (typically from its own network
//! task), and the widget runtime re-enters them into the pipeline as a
//! `SearchResultsReceived` internal sub-message. The reducer itself
//! never waits on a search.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::element::{Extent, Geometry};

/// A free-text search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchInput {
    pub text: String,
}

/// One hit from one searcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Name of the searcher that produced this hit.
    pub searcher: String,
    pub label: String,
    pub geometry: Option<Geometry>,
    pub extent: Option<Extent>,
}

/// The full answer of one searcher to one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub searcher: String,
    pub results: Vec<SearchResult>,
}

/// Delivery channel for search results, cloneable per searcher.
///
/// Delivery is fire-and-forget: if the widget has shut down the results
/// are silently dropped.
#[derive(Debug, Clone)]
pub struct SearchResultSink {
    tx: mpsc::UnboundedSender<SearchResults>,
}

impl SearchResultSink {
    /// Create a sink and the receiving end the widget runtime drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SearchResults>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// A sink whose deliveries go nowhere. Used by models constructed
    /// outside a running widget (tests, one-shot reductions).
    pub fn disconnected() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        Self { tx }
    }

    /// Deliver a batch of results.
    pub fn deliver(&self, results: SearchResults) {
        if self.tx.send(results).is_err() {
            tracing::debug!("search results dropped: widget gone");
        }
    }
}

/// A named search provider.
///
/// `search` must not block: long-running work belongs in a task the
/// implementation spawns itself, delivering through the sink when done.
pub trait Searcher: Send {
    /// Unique provider name, the key used by `VoegZoekerToe` /
    /// `VerwijderZoeker` / `Zoek`.
    fn name(&self) -> &str;

    /// Start resolving `input`, delivering results through `sink`.
    fn search(&self, input: &SearchInput, sink: SearchResultSink);
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;

    /// A searcher that synchronously answers with one canned hit.
    pub(crate) struct EchoSearcher {
        pub name: String,
    }

    impl Searcher for EchoSearcher {
        fn name(&self) -> &str {
            &self.name
        }

        fn search(&self, input: &SearchInput, sink: SearchResultSink) {
            sink.deliver(SearchResults {
                searcher: self.name.clone(),
                results: vec![SearchResult {
                    searcher: self.name.clone(),
                    label: input.text.clone(),
                    geometry: Some(Geometry::Point([100.0, 200.0])),
                    extent: None,
                }],
            });
        }
    }
}
