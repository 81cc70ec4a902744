//! Random-surfer transition model
//!
//! From a page with links, the surfer follows one of them uniformly with
//! probability `damping` and otherwise jumps to any page uniformly. From a
//! dangling page every page is equally likely, whatever the damping.

use super::RankMap;
use crate::error::{check_damping, Result};
use crate::graph::csr::CorpusGraph;
use crate::graph::PageId;

/// Probability of each page being visited next, indexed by page ID
#[derive(Debug, Clone)]
pub struct TransitionDistribution<'g> {
    graph: &'g CorpusGraph,
    probs: Vec<f64>,
}

impl<'g> TransitionDistribution<'g> {
    /// Distribution for the page named `page`
    pub fn for_page(graph: &'g CorpusGraph, page: &str, damping: f64) -> Result<Self> {
        check_damping(damping)?;
        let id = graph.require(page)?;
        Ok(Self::for_id(graph, id, damping))
    }

    /// Distribution for a page ID already known to be in `graph`
    ///
    /// `damping` must already be validated.
    ///
    /// # Panics
    /// Panics if `page` is not an ID of `graph`.
    pub fn for_id(graph: &'g CorpusGraph, page: PageId, damping: f64) -> Self {
        Self {
            graph,
            probs: transition_probs(graph, page, damping),
        }
    }

    /// Probability of moving to the named page
    pub fn get(&self, page: &str) -> Option<f64> {
        self.graph.page_id(page).map(|id| self.probs[id as usize])
    }

    /// Probability of moving to a page by ID
    pub fn probability(&self, page: PageId) -> f64 {
        self.probs[page as usize]
    }

    /// Probabilities in page-ID order
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }

    /// Iterate over (page, probability) in page-ID order
    pub fn iter(&self) -> impl Iterator<Item = (&'g str, f64)> + '_ {
        let graph = self.graph;
        self.probs
            .iter()
            .enumerate()
            .map(move |(id, &p)| (graph.name(id as PageId), p))
    }

    pub fn total(&self) -> f64 {
        self.probs.iter().sum()
    }

    /// Detach from the graph as a name-keyed map
    pub fn to_rank_map(&self) -> RankMap {
        RankMap::from_scores(self.graph, &self.probs)
    }
}

/// Raw transition vector for `page`
pub(crate) fn transition_probs(graph: &CorpusGraph, page: PageId, damping: f64) -> Vec<f64> {
    let n = graph.len() as f64;
    let links = graph.links(page);

    if links.is_empty() {
        return vec![1.0 / n; graph.len()];
    }

    let teleport = (1.0 - damping) / n;
    let follow = damping / links.len() as f64;

    let mut probs = vec![teleport; graph.len()];
    for &target in links {
        probs[target as usize] += follow;
    }
    probs
}
