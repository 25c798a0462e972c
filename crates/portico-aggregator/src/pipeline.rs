//! The per-request aggregation pass.

use futures_util::stream::{FuturesUnordered, StreamExt};
use portico_spec::{parse_raw, ApiDocument};
use serde::{Deserialize, Serialize};

use crate::fetcher::{DocumentFetcher, HttpFetcher};
use crate::merger::{merge, MergedInfo};
use crate::registry::{SourceRegistry, SourceSpec};

/// Order in which successfully parsed sources are handed to the merger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeOrder {
    /// Fetch completion order. Collision outcomes depend on network timing.
    #[default]
    Completion,
    /// Configured source order. Collision outcomes are stable across runs.
    Configured,
}

/// Fetches, parses and merges all configured sources.
///
/// Holds only immutable state, so one instance serves concurrent requests;
/// each call to [`Self::aggregate`] is an independent pass.
pub struct Aggregator<F = HttpFetcher> {
    registry: SourceRegistry,
    fetcher: F,
    order: MergeOrder,
    info: MergedInfo,
}

impl<F: DocumentFetcher> Aggregator<F> {
    pub fn new(registry: SourceRegistry, fetcher: F) -> Self {
        Self {
            registry,
            fetcher,
            order: MergeOrder::default(),
            info: MergedInfo::default(),
        }
    }

    pub fn with_merge_order(mut self, order: MergeOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_info(mut self, info: MergedInfo) -> Self {
        self.info = info;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Run one aggregation pass.
    ///
    /// Never fails: unreachable or unparseable sources are simply missing
    /// from the result. Dropping the returned future cancels in-flight fetches.
    pub async fn aggregate(&self) -> ApiDocument {
        let mut outcomes = self.collect().await;

        if self.order == MergeOrder::Configured {
            outcomes.sort_by_key(|(index, _, _)| *index);
        }

        let merged_count = outcomes.len();
        let merged = merge(
            outcomes.into_iter().map(|(_, source, doc)| (source, doc)),
            &self.info,
        );

        portico_telemetry::log_document_merged!(
            sources_total = self.registry.len(),
            sources_merged = merged_count,
            paths = merged.paths.len(),
            tags = merged.tags.len(),
            "aggregated upstream documents"
        );

        merged
    }

    /// Fetch and parse every source concurrently.
    ///
    /// Returns `(configured index, source, document)` for each success, in
    /// completion order. Resolves only once every source has an outcome.
    async fn collect(&self) -> Vec<(usize, SourceSpec, ApiDocument)> {
        let mut pending: FuturesUnordered<_> = self
            .registry
            .sources()
            .iter()
            .enumerate()
            .map(|(index, source)| async move {
                let raw = self.fetcher.fetch(source).await?;
                let doc = parse_raw(&raw)?;
                Some((index, source.clone(), doc))
            })
            .collect();

        let mut outcomes = Vec::with_capacity(self.registry.len());
        while let Some(outcome) = pending.next().await {
            if let Some(outcome) = outcome {
                outcomes.push(outcome);
            }
        }
        outcomes
    }
}
