//! Random-surfer sampling estimator
//!
//! Simulates a Markov chain over the corpus using the transition model and
//! reports each page's share of visits. Draws go through a
//! [`DiscreteSampler`], a cumulative-weight table searched by bisection, so
//! a step costs O(log k) for a page with k links once its table exists.
//! A table holds one slot per link plus one teleport slot, so the tables of
//! a chain take O(E) memory in total. Tables are built the first time a page
//! is visited and reused for the rest of the chain.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::{trace_run, RankMap};
use crate::config::{RankConfig, DEFAULT_DAMPING, DEFAULT_SAMPLES};
use crate::error::{check_at_least_one, check_damping, RankError, Result};
use crate::graph::csr::CorpusGraph;
use crate::graph::PageId;

/// Weighted choice over `0..len` via a cumulative table
#[derive(Debug, Clone)]
pub struct DiscreteSampler {
    cumulative: Vec<f64>,
}

impl DiscreteSampler {
    /// Build from non-negative weights; they need not sum to 1
    pub fn new(weights: &[f64]) -> Result<Self> {
        if weights.is_empty() {
            return Err(RankError::invalid("weights", "no outcomes to choose from"));
        }

        let mut cumulative = Vec::with_capacity(weights.len());
        let mut running = 0.0;
        for &w in weights {
            if !(w.is_finite() && w >= 0.0) {
                return Err(RankError::invalid(
                    "weights",
                    format!("weights must be finite and non-negative, got {w}"),
                ));
            }
            running += w;
            cumulative.push(running);
        }

        if running <= 0.0 {
            return Err(RankError::invalid("weights", "total weight must be positive"));
        }

        Ok(Self { cumulative })
    }

    /// Draw an index with probability proportional to its weight
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let total = self.cumulative[self.cumulative.len() - 1];
        let u = rng.gen::<f64>() * total;
        // First slot whose cumulative weight exceeds u; zero-weight slots
        // never qualify. Rounding can push u onto the last boundary.
        let idx = self.cumulative.partition_point(|&c| c <= u);
        idx.min(self.last_positive())
    }

    fn last_positive(&self) -> usize {
        let total = self.cumulative[self.cumulative.len() - 1];
        self.cumulative.partition_point(|&c| c < total)
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }
}

/// Lazily built transition tables, one per page with links
///
/// Slot `i < k` follows the page's `i`-th link with weight `damping / k`;
/// slot `k` teleports to a uniform page with weight `1 - damping`. Dangling
/// pages always teleport and get no table.
struct TransitionTables<'g> {
    graph: &'g CorpusGraph,
    damping: f64,
    tables: Vec<Option<DiscreteSampler>>,
}

impl<'g> TransitionTables<'g> {
    fn new(graph: &'g CorpusGraph, damping: f64) -> Self {
        Self {
            graph,
            damping,
            tables: vec![None; graph.len()],
        }
    }

    fn step<R: Rng + ?Sized>(&mut self, from: PageId, rng: &mut R) -> Result<PageId> {
        let links = self.graph.links(from);
        if links.is_empty() {
            return Ok(self.teleport(rng));
        }

        let slot = &mut self.tables[from as usize];
        if slot.is_none() {
            let follow = self.damping / links.len() as f64;
            let mut weights = vec![follow; links.len() + 1];
            weights[links.len()] = 1.0 - self.damping;
            *slot = Some(DiscreteSampler::new(&weights)?);
        }
        let choice = match slot {
            Some(table) => table.sample(rng),
            None => unreachable!("table filled above"),
        };

        match links.get(choice) {
            Some(&target) => Ok(target),
            None => Ok(self.teleport(rng)),
        }
    }

    fn teleport<R: Rng + ?Sized>(&self, rng: &mut R) -> PageId {
        rng.gen_range(0..self.graph.len()) as PageId
    }

    fn built(&self) -> usize {
        self.tables.iter().filter(|t| t.is_some()).count()
    }
}

/// Monte Carlo PageRank from random-surfer visit counts
#[derive(Debug, Clone)]
pub struct SamplingEstimator {
    /// Damping factor (typically 0.85)
    pub damping: f64,
    /// Visits recorded per chain, including the starting page
    pub samples: usize,
    /// Independent chains, pooled
    pub chains: usize,
    /// Seed for reproducible runs
    seed: Option<u64>,
}

impl Default for SamplingEstimator {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            samples: DEFAULT_SAMPLES,
            chains: 1,
            seed: None,
        }
    }
}

impl SamplingEstimator {
    /// Create a new SamplingEstimator with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from the sampling fields of a [`RankConfig`]
    pub fn with_config(config: &RankConfig) -> Self {
        Self {
            damping: config.damping,
            samples: config.samples,
            chains: config.chains,
            seed: config.seed,
        }
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the number of visits per chain
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Set the number of independent chains
    pub fn with_chains(mut self, chains: usize) -> Self {
        self.chains = chains;
        self
    }

    /// Fix the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run the estimator
    ///
    /// Chain `i` is seeded with `seed + i`. Chains run in parallel when
    /// there is more than one; their visit counts are pooled.
    pub fn run(&self, graph: &CorpusGraph) -> Result<RankMap> {
        let pooled = self.validate()?;
        trace_run!("sampling", graph.len());

        let base_seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());

        let visits = if self.chains == 1 {
            let mut rng = StdRng::seed_from_u64(base_seed);
            self.walk(graph, &mut rng)?
        } else {
            (0..self.chains)
                .into_par_iter()
                .map(|chain| {
                    let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(chain as u64));
                    self.walk(graph, &mut rng)
                })
                .try_reduce(
                    || vec![0u64; graph.len()],
                    |mut acc, visits| {
                        for (a, v) in acc.iter_mut().zip(visits) {
                            *a += v;
                        }
                        Ok(acc)
                    },
                )?
        };

        Ok(self.to_ranks(graph, &visits, pooled))
    }

    /// Run a single chain driven by a caller-supplied random source
    pub fn run_with_rng<R: Rng + ?Sized>(&self, graph: &CorpusGraph, rng: &mut R) -> Result<RankMap> {
        self.validate()?;
        trace_run!("sampling", graph.len());

        let visits = self.walk(graph, rng)?;
        Ok(self.to_ranks(graph, &visits, self.samples))
    }

    /// Check parameters; returns the pooled visit count over all chains
    fn validate(&self) -> Result<usize> {
        check_damping(self.damping)?;
        check_at_least_one("samples", self.samples)?;
        check_at_least_one("chains", self.chains)?;
        self.samples
            .checked_mul(self.chains)
            .ok_or_else(|| RankError::invalid("chains", "samples × chains overflows"))
    }

    /// One chain: uniform start, then `samples - 1` transitions
    fn walk<R: Rng + ?Sized>(&self, graph: &CorpusGraph, rng: &mut R) -> Result<Vec<u64>> {
        let mut visits = vec![0u64; graph.len()];
        let mut tables = TransitionTables::new(graph, self.damping);

        let mut current = rng.gen_range(0..graph.len()) as PageId;
        visits[current as usize] += 1;

        for _ in 1..self.samples {
            current = tables.step(current, rng)?;
            visits[current as usize] += 1;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            samples = self.samples,
            tables = tables.built(),
            "chain finished"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = tables.built();

        Ok(visits)
    }

    fn to_ranks(&self, graph: &CorpusGraph, visits: &[u64], total: usize) -> RankMap {
        let total = total as f64;
        let scores: Vec<f64> = visits.iter().map(|&v| v as f64 / total).collect();
        RankMap::from_scores(graph, &scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagerank::transition::transition_probs;

    fn pair() -> CorpusGraph {
        CorpusGraph::from_adjacency(vec![("1.html", vec!["2.html"]), ("2.html", vec!["1.html"])])
            .unwrap()
    }

    #[test]
    fn test_discrete_sampler_skips_zero_weights() {
        let sampler = DiscreteSampler::new(&[0.0, 1.0, 0.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..1000 {
            assert_eq!(sampler.sample(&mut rng), 1);
        }
    }

    #[test]
    fn test_discrete_sampler_frequencies() {
        let sampler = DiscreteSampler::new(&[1.0, 3.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let hits = (0..20_000).filter(|_| sampler.sample(&mut rng) == 1).count();
        let share = hits as f64 / 20_000.0;
        assert!((share - 0.75).abs() < 0.02, "share was {share}");
    }

    #[test]
    fn test_discrete_sampler_rejects_bad_weights() {
        assert!(DiscreteSampler::new(&[]).is_err());
        assert!(DiscreteSampler::new(&[0.0, 0.0]).is_err());
        assert!(DiscreteSampler::new(&[1.0, -0.5]).is_err());
        assert!(DiscreteSampler::new(&[f64::NAN]).is_err());
    }

    #[test]
    fn test_step_frequencies_match_transition_model() {
        let graph = CorpusGraph::from_adjacency(vec![
            ("a", vec!["b", "c"]),
            ("b", vec![]),
            ("c", vec![]),
            ("d", vec![]),
        ])
        .unwrap();
        let mut tables = TransitionTables::new(&graph, 0.8);
        let mut rng = StdRng::seed_from_u64(13);

        let draws = 40_000;
        let mut counts = vec![0usize; graph.len()];
        for _ in 0..draws {
            counts[tables.step(0, &mut rng).unwrap() as usize] += 1;
        }

        let expected = transition_probs(&graph, 0, 0.8);
        for (page, (&hits, &p)) in counts.iter().zip(&expected).enumerate() {
            let share = hits as f64 / draws as f64;
            assert!((share - p).abs() < 0.015, "page {page}: {share} vs {p}");
        }
    }

    #[test]
    fn test_tables_sized_by_out_degree() {
        let graph = CorpusGraph::from_adjacency(vec![
            ("a", vec!["b", "c"]),
            ("b", vec!["a"]),
            ("c", vec![]),
        ])
        .unwrap();
        let mut tables = TransitionTables::new(&graph, 0.85);
        let mut rng = StdRng::seed_from_u64(2);

        for page in graph.page_ids() {
            tables.step(page, &mut rng).unwrap();
        }

        // dangling "c" teleports without a table
        assert_eq!(tables.built(), 2);
        assert_eq!(tables.tables[0].as_ref().map(DiscreteSampler::len), Some(3));
        assert_eq!(tables.tables[1].as_ref().map(DiscreteSampler::len), Some(2));
        assert!(tables.tables[2].is_none());
    }

    #[test]
    fn test_full_damping_never_teleports_from_linked_page() {
        let graph = pair();
        let mut tables = TransitionTables::new(&graph, 1.0);
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..1000 {
            assert_eq!(tables.step(0, &mut rng).unwrap(), 1);
        }
    }

    #[test]
    fn test_single_sample_is_one_visit() {
        let graph = pair();
        let ranks = SamplingEstimator::new()
            .with_samples(1)
            .with_seed(3)
            .run(&graph)
            .unwrap();

        let mut values: Vec<f64> = ranks.iter().map(|(_, r)| r).collect();
        values.sort_by(f64::total_cmp);
        assert_eq!(values, vec![0.0, 1.0]);
    }

    #[test]
    fn test_symmetric_pair_near_half() {
        let graph = pair();
        let ranks = SamplingEstimator::new().with_seed(42).run(&graph).unwrap();

        assert!((ranks.get("1.html").unwrap() - 0.5).abs() < 0.05);
        assert!((ranks.get("2.html").unwrap() - 0.5).abs() < 0.05);
        assert!((ranks.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_seed_reproducible() {
        let graph = CorpusGraph::from_adjacency(vec![
            ("a", vec!["b"]),
            ("b", vec!["a", "c"]),
            ("c", vec![]),
        ])
        .unwrap();
        let estimator = SamplingEstimator::new().with_samples(500).with_seed(9);

        assert_eq!(estimator.run(&graph).unwrap(), estimator.run(&graph).unwrap());
    }

    #[test]
    fn test_multiple_chains_pool_visits() {
        let graph = pair();
        let ranks = SamplingEstimator::new()
            .with_samples(2_000)
            .with_chains(4)
            .with_seed(11)
            .run(&graph)
            .unwrap();

        assert!((ranks.total() - 1.0).abs() < 1e-12);
        assert!((ranks.get("1.html").unwrap() - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_run_with_rng() {
        let graph = pair();
        let mut rng = StdRng::seed_from_u64(5);
        let ranks = SamplingEstimator::new()
            .with_samples(100)
            .run_with_rng(&graph, &mut rng)
            .unwrap();

        assert_eq!(ranks.len(), 2);
        assert!((ranks.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_samples_rejected() {
        let graph = pair();
        let err = SamplingEstimator::new().with_samples(0).run(&graph).unwrap_err();

        assert!(matches!(err, RankError::InvalidParameter { name: "samples", .. }));
    }

    #[test]
    fn test_pooled_visit_overflow_rejected() {
        let graph = pair();
        let err = SamplingEstimator::new()
            .with_samples(usize::MAX)
            .with_chains(2)
            .with_seed(1)
            .run(&graph)
            .unwrap_err();

        assert!(matches!(err, RankError::InvalidParameter { name: "chains", .. }));
    }
}
