//! Iterative PageRank
//!
//! Synchronous fixed-point iteration over incoming links:
//!
//! `new[p] = (1 - d) / N + d * sum(old[i] / out(i) for i linking to p)`
//!
//! Every sweep reads only the previous buffer and writes only the next one,
//! so the result does not depend on page order and large sweeps can be
//! split across threads.

use rayon::prelude::*;

use super::{trace_run, RankMap};
use crate::config::{DanglingPolicy, RankConfig, DEFAULT_DAMPING, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::error::{check_at_least_one, check_damping, check_tolerance, RankError, Result};
use crate::graph::csr::CorpusGraph;
use crate::graph::reverse::ReverseIndex;
use crate::graph::PageId;

/// Graphs with at least this many pages sweep in parallel
const PARALLEL_THRESHOLD: usize = 1024;

/// Result of a converged solve
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// Ranks from the final sweep
    pub ranks: RankMap,
    /// Number of sweeps performed
    pub iterations: usize,
    /// Largest per-page change in the final sweep
    pub delta: f64,
}

/// Iterative PageRank solver
#[derive(Debug, Clone)]
pub struct IterativeSolver {
    /// Damping factor (typically 0.85)
    pub damping: f64,
    /// Convergence threshold on the per-page change
    pub tolerance: f64,
    /// Maximum number of sweeps
    pub max_iterations: usize,
    /// Treatment of rank held by dangling pages
    pub dangling: DanglingPolicy,
}

impl Default for IterativeSolver {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            dangling: DanglingPolicy::Ignore,
        }
    }
}

impl IterativeSolver {
    /// Create a new IterativeSolver with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from the solver fields of a [`RankConfig`]
    pub fn with_config(config: &RankConfig) -> Self {
        Self {
            damping: config.damping,
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
            dangling: config.dangling,
        }
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the convergence threshold
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the maximum number of sweeps
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the dangling-page policy
    pub fn with_dangling(mut self, dangling: DanglingPolicy) -> Self {
        self.dangling = dangling;
        self
    }

    /// Solve starting from the uniform distribution
    pub fn run(&self, graph: &CorpusGraph) -> Result<SolveReport> {
        self.validate()?;
        let n = graph.len();
        self.iterate(graph, vec![1.0 / n as f64; n])
    }

    /// Solve starting from a previous result
    ///
    /// `initial` must rank exactly the pages of `graph`.
    pub fn run_from(&self, graph: &CorpusGraph, initial: &RankMap) -> Result<SolveReport> {
        self.validate()?;
        let scores = initial.to_scores(graph).ok_or_else(|| {
            RankError::invalid("initial", "initial ranks must cover exactly the corpus pages")
        })?;
        self.iterate(graph, scores)
    }

    fn validate(&self) -> Result<()> {
        check_damping(self.damping)?;
        check_tolerance(self.tolerance)?;
        check_at_least_one("max_iterations", self.max_iterations)?;
        Ok(())
    }

    fn iterate(&self, graph: &CorpusGraph, mut scores: Vec<f64>) -> Result<SolveReport> {
        let n = graph.len();
        trace_run!("iterative", n);

        let index = ReverseIndex::build(graph);
        let dangling_pages = graph.dangling_pages();
        let teleport = (1.0 - self.damping) / n as f64;

        let mut new_scores = vec![0.0; n];
        let mut outflow = vec![0.0; n];
        let mut iterations = 0;

        loop {
            if iterations == self.max_iterations {
                let delta = max_delta(&scores, &new_scores);
                #[cfg(feature = "tracing")]
                tracing::warn!(iterations, delta, "sweep cap reached before convergence");
                return Err(RankError::DidNotConverge { iterations, delta });
            }
            iterations += 1;

            // Share each linking page passes along each of its links
            for (page, share) in outflow.iter_mut().enumerate() {
                let degree = graph.out_degree(page as PageId);
                *share = if degree > 0 {
                    scores[page] / degree as f64
                } else {
                    0.0
                };
            }

            let base = match self.dangling {
                DanglingPolicy::Ignore => teleport,
                DanglingPolicy::Redistribute => {
                    let dangling_mass: f64 =
                        dangling_pages.iter().map(|&d| scores[d as usize]).sum();
                    teleport + self.damping * dangling_mass / n as f64
                }
            };

            let relax = |(page, slot): (usize, &mut f64)| {
                let incoming: f64 = index
                    .incoming(page as PageId)
                    .iter()
                    .map(|&source| outflow[source as usize])
                    .sum();
                *slot = base + self.damping * incoming;
            };

            if n >= PARALLEL_THRESHOLD {
                new_scores.par_iter_mut().enumerate().for_each(relax);
            } else {
                new_scores.iter_mut().enumerate().for_each(relax);
            }

            let delta = max_delta(&scores, &new_scores);
            std::mem::swap(&mut scores, &mut new_scores);

            #[cfg(feature = "tracing")]
            tracing::trace!(iteration = iterations, delta, "sweep");

            if delta <= self.tolerance {
                #[cfg(feature = "tracing")]
                tracing::debug!(iterations, delta, "converged");
                return Ok(SolveReport {
                    ranks: RankMap::from_scores(graph, &scores),
                    iterations,
                    delta,
                });
            }
        }
    }
}

/// Largest absolute per-page change between two sweeps
fn max_delta(old: &[f64], new: &[f64]) -> f64 {
    old.iter()
        .zip(new)
        .map(|(o, n)| (o - n).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_triangle_graph() -> CorpusGraph {
        CorpusGraph::from_adjacency(vec![("a", vec!["b"]), ("b", vec!["c"]), ("c", vec!["a"])])
            .unwrap()
    }

    fn build_star_graph() -> CorpusGraph {
        // Three spokes all linking to the hub, hub linking back to one
        CorpusGraph::from_adjacency(vec![
            ("hub", vec!["s1"]),
            ("s1", vec!["hub"]),
            ("s2", vec!["hub"]),
            ("s3", vec!["hub"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_triangle_graph_equal_scores() {
        let graph = build_triangle_graph();
        let report = IterativeSolver::new().run(&graph).unwrap();

        let expected = 1.0 / 3.0;
        for (_, score) in report.ranks.iter() {
            assert!((score - expected).abs() < 0.001);
        }
    }

    #[test]
    fn test_symmetric_pair_is_half() {
        let graph =
            CorpusGraph::from_adjacency(vec![("1.html", vec!["2.html"]), ("2.html", vec!["1.html"])])
                .unwrap();
        let report = IterativeSolver::new().run(&graph).unwrap();

        assert_eq!(report.iterations, 1);
        assert!((report.ranks.get("1.html").unwrap() - 0.5).abs() < 1e-12);
        assert!((report.ranks.get("2.html").unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_star_graph_hub_highest() {
        let graph = build_star_graph();
        let report = IterativeSolver::new().run(&graph).unwrap();

        let hub = report.ranks.get("hub").unwrap();
        for spoke in ["s1", "s2", "s3"] {
            assert!(hub > report.ranks.get(spoke).unwrap());
        }
        assert_eq!(report.ranks.top_n(1)[0].0, "hub");
    }

    #[test]
    fn test_scores_sum_to_one() {
        let graph = build_star_graph();
        let solver = IterativeSolver::new().with_tolerance(1e-8);
        let report = solver.run(&graph).unwrap();

        assert!((report.ranks.total() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_max_iterations_is_an_error() {
        let graph = build_star_graph();
        let err = IterativeSolver::new()
            .with_max_iterations(1)
            .with_tolerance(1e-15)
            .run(&graph)
            .unwrap_err();

        assert!(matches!(err, RankError::DidNotConverge { iterations: 1, .. }));
    }

    #[test]
    fn test_damping_factor() {
        let graph = build_star_graph();

        // Lower damping = more teleportation = more uniform scores
        let low = IterativeSolver::new().with_damping(0.5).run(&graph).unwrap();
        let high = IterativeSolver::new().with_damping(0.95).run(&graph).unwrap();

        let advantage = |r: &SolveReport| r.ranks.get("hub").unwrap() - r.ranks.get("s2").unwrap();
        assert!(advantage(&high) > advantage(&low));
    }

    #[test]
    fn test_dangling_mass_not_redistributed_by_default() {
        let graph = CorpusGraph::from_adjacency(vec![("a", vec![]), ("b", vec!["a"])]).unwrap();
        let report = IterativeSolver::new().run(&graph).unwrap();

        // b only ever gets the teleport share; a gets that plus b's link
        assert!((report.ranks.get("b").unwrap() - 0.075).abs() < 1e-9);
        assert!(report.ranks.total() < 1.0);
    }

    #[test]
    fn test_redistribute_keeps_mass() {
        let graph = CorpusGraph::from_adjacency(vec![("a", vec![]), ("b", vec!["a"])]).unwrap();
        let report = IterativeSolver::new()
            .with_dangling(DanglingPolicy::Redistribute)
            .with_tolerance(1e-10)
            .run(&graph)
            .unwrap();

        assert!((report.ranks.total() - 1.0).abs() < 1e-8);
        assert!(report.ranks.get("a").unwrap() > report.ranks.get("b").unwrap());
    }

    #[test]
    fn test_restart_from_solution_converges_immediately() {
        let graph = build_triangle_graph();
        let solver = IterativeSolver::new();
        let first = solver.run(&graph).unwrap();
        let second = solver.run_from(&graph, &first.ranks).unwrap();

        assert_eq!(second.iterations, 1);
    }

    #[test]
    fn test_run_from_rejects_foreign_ranks() {
        let graph = build_triangle_graph();
        let foreign: RankMap = vec![("x".to_string(), 1.0)].into_iter().collect();
        let err = IterativeSolver::new().run_from(&graph, &foreign).unwrap_err();

        assert!(matches!(err, RankError::InvalidParameter { name: "initial", .. }));
    }

    #[test]
    fn test_zero_tolerance_rejected() {
        let graph = build_triangle_graph();
        let err = IterativeSolver::new().with_tolerance(0.0).run(&graph).unwrap_err();

        assert!(matches!(err, RankError::InvalidParameter { name: "tolerance", .. }));
    }

    #[test]
    fn test_large_ring_sweeps_in_parallel() {
        let n = PARALLEL_THRESHOLD + 10;
        let names: Vec<String> = (0..n).map(|i| format!("p{i:05}")).collect();
        let adjacency = (0..n).map(|i| (names[i].clone(), vec![names[(i + 1) % n].clone()]));
        let graph = CorpusGraph::from_adjacency(adjacency).unwrap();

        let report = IterativeSolver::new().run(&graph).unwrap();
        let expected = 1.0 / n as f64;
        for (_, score) in report.ranks.iter() {
            assert!((score - expected).abs() < 1e-9);
        }
    }
}
