//! PageRank algorithms
//!
//! This module provides the random-surfer transition model, a Markov-chain
//! sampling estimator built on it, and an iterative fixed-point solver.
//! The free functions [`transition`], [`sample`] and [`solve`] cover the
//! common case; the estimator types expose the remaining knobs.

pub mod iterative;
pub mod sampling;
pub mod transition;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::csr::CorpusGraph;

pub use iterative::{IterativeSolver, SolveReport};
pub use sampling::{DiscreteSampler, SamplingEstimator};
pub use transition::TransitionDistribution;

/// Enter a tracing span for one ranking run (when the `tracing` feature is
/// enabled). When disabled, this is a no-op and the compiler eliminates it.
macro_rules! trace_run {
    ($name:expr, $pages:expr) => {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("pagerank", algorithm = $name, pages = $pages).entered();
    };
}
pub(crate) use trace_run;

/// Page name -> rank, ordered by page name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankMap {
    ranks: BTreeMap<String, f64>,
}

impl RankMap {
    /// Attach names to a score vector indexed by page ID
    pub fn from_scores(graph: &CorpusGraph, scores: &[f64]) -> Self {
        let ranks = graph
            .names()
            .iter()
            .zip(scores)
            .map(|(name, &score)| (name.clone(), score))
            .collect();
        Self { ranks }
    }

    /// Scores in page-ID order, or `None` if the pages don't match the graph
    pub(crate) fn to_scores(&self, graph: &CorpusGraph) -> Option<Vec<f64>> {
        if self.ranks.len() != graph.len() {
            return None;
        }
        graph.names().iter().map(|name| self.get(name)).collect()
    }

    /// Get the rank of a page
    pub fn get(&self, page: &str) -> Option<f64> {
        self.ranks.get(page).copied()
    }

    /// Iterate over (page, rank) in ascending page order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.ranks.iter().map(|(page, &rank)| (page.as_str(), rank))
    }

    /// Sum of all ranks
    pub fn total(&self) -> f64 {
        self.ranks.values().sum()
    }

    /// Get the top N pages by rank, ties broken by page name
    pub fn top_n(&self, n: usize) -> Vec<(&str, f64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(n);
        ranked
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, f64> {
        self.ranks
    }
}

impl FromIterator<(String, f64)> for RankMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            ranks: iter.into_iter().collect(),
        }
    }
}

/// One-step distribution of the random surfer leaving `page`
pub fn transition<'g>(
    graph: &'g CorpusGraph,
    page: &str,
    damping: f64,
) -> Result<TransitionDistribution<'g>> {
    TransitionDistribution::for_page(graph, page, damping)
}

/// Estimate ranks from a single random-surfer chain of `n` visits
pub fn sample(graph: &CorpusGraph, damping: f64, n: usize) -> Result<RankMap> {
    SamplingEstimator::new()
        .with_damping(damping)
        .with_samples(n)
        .run(graph)
}

/// Iterate ranks to a fixed point within `tolerance`
pub fn solve(graph: &CorpusGraph, damping: f64, tolerance: f64) -> Result<RankMap> {
    IterativeSolver::new()
        .with_damping(damping)
        .with_tolerance(tolerance)
        .run(graph)
        .map(|report| report.ranks)
}
