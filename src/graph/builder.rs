//! Corpus graph builder
//!
//! This module provides a mutable builder that interns page names into
//! dense ids with an FxHashMap and collects outbound links before they
//! are frozen into a [`CorpusGraph`](super::csr::CorpusGraph).

use super::csr::CorpusGraph;
use super::PageId;
use crate::error::Result;
use rustc_hash::{FxHashMap, FxHashSet};

/// A page in the graph builder
#[derive(Debug, Clone)]
pub struct BuilderPage {
    /// The page name
    pub name: String,
    /// Outbound link targets, by name. Targets may be declared after the link.
    pub links: FxHashSet<String>,
}

impl BuilderPage {
    /// Create a new page with no links
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: FxHashSet::default(),
        }
    }
}

/// A mutable corpus builder
///
/// Links are recorded by target name and resolved at build time, so a loader
/// can add links in any order. Links to names that never become pages are
/// dropped when the graph is frozen, as are self-links.
#[derive(Debug)]
pub struct CorpusBuilder {
    /// Maps page name -> page ID
    name_to_id: FxHashMap<String, PageId>,
    /// Page storage, indexed by ID
    pages: Vec<BuilderPage>,
}

impl Default for CorpusBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusBuilder {
    /// Create a new empty builder
    pub fn new() -> Self {
        Self {
            name_to_id: FxHashMap::default(),
            pages: Vec::new(),
        }
    }

    /// Create a builder with pre-allocated capacity
    pub fn with_capacity(page_capacity: usize) -> Self {
        Self {
            name_to_id: FxHashMap::with_capacity_and_hasher(page_capacity, Default::default()),
            pages: Vec::with_capacity(page_capacity),
        }
    }

    /// Build a graph from an adjacency mapping of page -> linked pages.
    ///
    /// Pages are numbered in ascending name order so that the same mapping
    /// always yields the same graph, whatever the iteration order of the input.
    pub fn from_adjacency<I, K, L, T>(adjacency: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        K: AsRef<str>,
        L: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut entries: Vec<(String, Vec<String>)> = adjacency
            .into_iter()
            .map(|(page, links)| {
                let links = links.into_iter().map(|l| l.as_ref().to_string()).collect();
                (page.as_ref().to_string(), links)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut builder = Self::with_capacity(entries.len());
        for (page, _) in &entries {
            builder.add_page(page);
        }
        for (page, links) in &entries {
            for target in links {
                builder.add_link(page, target);
            }
        }
        builder
    }

    /// Get or create a page for the given name, returning its ID
    pub fn add_page(&mut self, name: &str) -> PageId {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }

        let id = self.pages.len() as PageId;
        self.name_to_id.insert(name.to_string(), id);
        self.pages.push(BuilderPage::new(name));
        id
    }

    /// Record a link from `from` to `to`
    ///
    /// `from` becomes a page if it isn't one yet; `to` does not.
    pub fn add_link(&mut self, from: &str, to: &str) {
        if from == to {
            return; // No self-links
        }
        let id = self.add_page(from);
        self.pages[id as usize].links.insert(to.to_string());
    }

    /// Get the number of pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a page by ID
    pub fn get_page(&self, id: PageId) -> Option<&BuilderPage> {
        self.pages.get(id as usize)
    }

    /// Get a page ID by name
    pub fn get_page_id(&self, name: &str) -> Option<PageId> {
        self.name_to_id.get(name).copied()
    }

    /// Iterate over all pages
    pub fn pages(&self) -> impl Iterator<Item = (PageId, &BuilderPage)> {
        self.pages.iter().enumerate().map(|(i, p)| (i as PageId, p))
    }

    /// Check if no page has been added
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Freeze the builder into an immutable graph
    pub fn build(&self) -> Result<CorpusGraph> {
        CorpusGraph::from_builder(self)
    }
}
