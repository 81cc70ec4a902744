//! Ranking configuration.
//!
//! A [`RankConfig`] carries every tunable of a ranking run. It is passed
//! explicitly to the estimators; nothing reads module-level constants.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "damping": 0.85,
//!   "samples": 10000,
//!   "tolerance": 0.001,
//!   "max_iterations": 1000,
//!   "seed": 42,
//!   "chains": 1,
//!   "dangling": "ignore"
//! }
//! ```
//!
//! Every field is optional and falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{check_at_least_one, check_damping, check_tolerance, RankError, Result};

pub const DEFAULT_DAMPING: f64 = 0.85;
pub const DEFAULT_SAMPLES: usize = 10_000;
pub const DEFAULT_TOLERANCE: f64 = 0.001;
pub const DEFAULT_MAX_ITERATIONS: usize = 1_000;

/// What the iterative solver does with rank held by pages without links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DanglingPolicy {
    /// Dangling pages contribute nothing to any page. Total rank can fall
    /// below 1 when the corpus has dangling pages.
    #[default]
    Ignore,
    /// Dangling rank is spread uniformly over every page, matching how the
    /// random surfer teleports from a dangling page.
    Redistribute,
}

/// Parameters shared by the sampling estimator and the iterative solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankConfig {
    /// Probability of following a link rather than teleporting.
    pub damping: f64,
    /// Steps in each sampled chain.
    pub samples: usize,
    /// Largest per-page change still counted as converged.
    pub tolerance: f64,
    /// Sweep cap for the iterative solver.
    pub max_iterations: usize,
    /// Seed for the sampler; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Independent chains pooled by the sampler.
    pub chains: usize,
    pub dangling: DanglingPolicy,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            samples: DEFAULT_SAMPLES,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
            chains: 1,
            dangling: DanglingPolicy::Ignore,
        }
    }
}

impl RankConfig {
    /// Parse a config from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| RankError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        Self::from_json_str(&raw)
    }

    /// Check every parameter, reporting the first one out of range.
    pub fn validate(&self) -> Result<()> {
        check_damping(self.damping)?;
        check_at_least_one("samples", self.samples)?;
        check_tolerance(self.tolerance)?;
        check_at_least_one("max_iterations", self.max_iterations)?;
        check_at_least_one("chains", self.chains)?;
        Ok(())
    }
}
