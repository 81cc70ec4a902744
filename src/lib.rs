//! PageRank for a corpus of linked pages.
//!
//! Two estimators share one random-surfer model:
//!
//! - [`pagerank::sample`] walks a Markov chain over the corpus and reports
//!   how often each page was visited.
//! - [`pagerank::solve`] iterates the rank equations until no page moves by
//!   more than a tolerance.
//!
//! ```rust
//! use corpus_rank::graph::csr::CorpusGraph;
//! use corpus_rank::pagerank;
//!
//! let graph = CorpusGraph::from_adjacency(vec![
//!     ("1.html", vec!["2.html"]),
//!     ("2.html", vec!["1.html"]),
//! ])?;
//!
//! let ranks = pagerank::solve(&graph, 0.85, 0.001)?;
//! assert!((ranks.get("1.html").unwrap() - 0.5).abs() < 1e-9);
//! # Ok::<(), corpus_rank::RankError>(())
//! ```

pub mod config;
pub mod corpus;
pub mod error;
pub mod graph;
pub mod pagerank;
pub mod report;

pub use config::{DanglingPolicy, RankConfig};
pub use error::{RankError, Result};
pub use graph::builder::CorpusBuilder;
pub use graph::csr::CorpusGraph;
pub use graph::PageId;
pub use pagerank::{IterativeSolver, RankMap, SamplingEstimator, SolveReport, TransitionDistribution};
