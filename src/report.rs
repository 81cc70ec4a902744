//! Rendering of rank maps for people and for machines.

use serde::Serialize;

use crate::pagerank::RankMap;

/// A title line followed by one `  page: rank` line per page, ascending by
/// page name, ranks to four decimal places.
pub fn render_text(title: &str, ranks: &RankMap) -> String {
    let mut out = String::with_capacity(title.len() + 1 + ranks.len() * 24);
    out.push_str(title);
    out.push('\n');
    for (page, rank) in ranks.iter() {
        out.push_str(&format!("  {page}: {rank:.4}\n"));
    }
    out
}

/// Both estimates of a run, as emitted by `--format json`.
#[derive(Debug, Clone, Serialize)]
pub struct RankReport<'a> {
    pub damping: f64,
    pub sampling: SamplingSection<'a>,
    pub iteration: IterationSection<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SamplingSection<'a> {
    pub samples: usize,
    pub chains: usize,
    pub ranks: &'a RankMap,
}

#[derive(Debug, Clone, Serialize)]
pub struct IterationSection<'a> {
    pub iterations: usize,
    pub delta: f64,
    pub ranks: &'a RankMap,
}

impl RankReport<'_> {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranks() -> RankMap {
        vec![
            ("2.html".to_string(), 0.42861),
            ("1.html".to_string(), 0.22),
            ("3.html".to_string(), 0.35139),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_render_text_sorted_four_places() {
        let text = render_text("PageRank Results from Iteration", &ranks());

        assert_eq!(
            text,
            "PageRank Results from Iteration\n  1.html: 0.2200\n  2.html: 0.4286\n  3.html: 0.3514\n"
        );
    }

    #[test]
    fn test_json_report_shape() {
        let sampled = ranks();
        let iterated = ranks();
        let report = RankReport {
            damping: 0.85,
            sampling: SamplingSection {
                samples: 10_000,
                chains: 1,
                ranks: &sampled,
            },
            iteration: IterationSection {
                iterations: 12,
                delta: 0.0004,
                ranks: &iterated,
            },
        };

        let value: serde_json::Value =
            serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["sampling"]["samples"], 10_000);
        assert_eq!(value["iteration"]["iterations"], 12);
        assert_eq!(value["iteration"]["ranks"]["1.html"], 0.22);
    }
}
