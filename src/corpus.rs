//! Corpus loading from a directory of HTML pages.
//!
//! Each `*.html` file directly inside the directory is a page named by its
//! file name. Links are the `href` targets of `<a>` tags; targets that are
//! not pages of the corpus (external URLs, missing files) and self-links
//! are dropped.

use std::fs;
use std::path::Path;

use regex::Regex;
use walkdir::WalkDir;

use crate::error::{RankError, Result};
use crate::graph::builder::CorpusBuilder;
use crate::graph::csr::CorpusGraph;

const LINK_PATTERN: &str = r#"<a\s+(?:[^>]*?)href="([^"]*)""#;

/// Extracts anchor targets from HTML text.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    pattern: Regex,
}

impl LinkExtractor {
    /// # Errors
    /// Returns error if the link pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(LINK_PATTERN)?,
        })
    }

    /// `href` values of every `<a>` tag, in document order.
    pub fn links<'s, 't>(&'s self, html: &'t str) -> impl Iterator<Item = &'t str> + 's
    where
        't: 's,
    {
        self.pattern
            .captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Loads the corpus in `dir` into a graph.
///
/// # Errors
/// Returns [`RankError::Io`] if the directory or a page cannot be read and
/// [`RankError::EmptyCorpus`] if there are no HTML pages.
pub fn crawl(dir: &Path) -> Result<CorpusGraph> {
    let extractor = LinkExtractor::new()?;
    let pages = read_pages(dir)?;

    let mut builder = CorpusBuilder::with_capacity(pages.len());
    for (name, _) in &pages {
        builder.add_page(name);
    }
    for (name, html) in &pages {
        for link in extractor.links(html) {
            builder.add_link(name, link);
        }
    }

    #[cfg(feature = "tracing")]
    tracing::info!(dir = %dir.display(), pages = pages.len(), "corpus loaded");

    builder.build()
}

/// (file name, contents) of each HTML page, sorted by name.
fn read_pages(dir: &Path) -> Result<Vec<(String, String)>> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    let mut pages = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".html") {
            continue;
        }
        let html = fs::read_to_string(entry.path()).map_err(|source| RankError::Io {
            source,
            path: entry.path().to_path_buf(),
        })?;
        pages.push((name, html));
    }
    Ok(pages)
}
