//! Compressed Sparse Row (CSR) corpus graph
//!
//! CSR stores each page's outbound links contiguously, which is what both
//! the random surfer and the reverse-index construction iterate over.

use super::builder::CorpusBuilder;
use super::PageId;
use crate::error::{RankError, Result};
use rustc_hash::FxHashMap;

/// An immutable directed link graph in Compressed Sparse Row format
///
/// Invariants established by [`CorpusGraph::from_builder`]:
/// - at least one page
/// - every link target is a page of the graph
/// - no page links to itself, and no link appears twice
#[derive(Debug, Clone)]
pub struct CorpusGraph {
    /// Number of pages
    num_pages: usize,
    /// Row pointers: page i's links are at indices row_ptr[i]..row_ptr[i+1]
    row_ptr: Vec<usize>,
    /// Link targets, sorted within each row
    col_idx: Vec<PageId>,
    /// Page names, indexed by ID
    names: Vec<String>,
    /// Page name -> ID
    name_to_id: FxHashMap<String, PageId>,
}

impl CorpusGraph {
    /// Freeze a [`CorpusBuilder`] into CSR format
    ///
    /// Link targets that are not pages of the builder are dropped.
    pub fn from_builder(builder: &CorpusBuilder) -> Result<Self> {
        let num_pages = builder.page_count();
        if num_pages == 0 {
            return Err(RankError::EmptyCorpus);
        }

        let mut row_ptr = Vec::with_capacity(num_pages + 1);
        let mut col_idx = Vec::new();
        let mut names = Vec::with_capacity(num_pages);
        let mut name_to_id = FxHashMap::with_capacity_and_hasher(num_pages, Default::default());
        let mut dropped = 0usize;

        row_ptr.push(0);

        for (id, page) in builder.pages() {
            names.push(page.name.clone());
            name_to_id.insert(page.name.clone(), id);

            // Resolve and sort targets for deterministic iteration
            let mut targets: Vec<PageId> = Vec::with_capacity(page.links.len());
            for link in &page.links {
                match builder.get_page_id(link) {
                    Some(target) if target != id => targets.push(target),
                    _ => dropped += 1,
                }
            }
            targets.sort_unstable();

            col_idx.extend(targets);
            row_ptr.push(col_idx.len());
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            pages = num_pages,
            links = col_idx.len(),
            dropped,
            "corpus graph frozen"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = dropped;

        Ok(Self {
            num_pages,
            row_ptr,
            col_idx,
            names,
            name_to_id,
        })
    }

    /// Build a graph straight from a page -> links mapping
    pub fn from_adjacency<I, K, L, T>(adjacency: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, L)>,
        K: AsRef<str>,
        L: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        CorpusBuilder::from_adjacency(adjacency).build()
    }

    /// Outbound links of a page
    ///
    /// # Panics
    /// Panics if `page` is not an ID of this graph.
    pub fn links(&self, page: PageId) -> &[PageId] {
        let start = self.row_ptr[page as usize];
        let end = self.row_ptr[page as usize + 1];
        &self.col_idx[start..end]
    }

    /// Outbound links of a page, by name
    pub fn outbound(&self, name: &str) -> Result<impl Iterator<Item = &str> + '_> {
        let id = self.require(name)?;
        Ok(self.links(id).iter().map(move |&t| self.name(t)))
    }

    /// Get the out-degree of a page
    ///
    /// # Panics
    /// Panics if `page` is not an ID of this graph.
    pub fn out_degree(&self, page: PageId) -> usize {
        self.row_ptr[page as usize + 1] - self.row_ptr[page as usize]
    }

    /// Whether a page has no outbound links
    pub fn is_dangling(&self, page: PageId) -> bool {
        self.out_degree(page) == 0
    }

    /// Find dangling pages (pages with no outbound links)
    pub fn dangling_pages(&self) -> Vec<PageId> {
        (0..self.num_pages as PageId)
            .filter(|&p| self.is_dangling(p))
            .collect()
    }

    /// Get the name of a page
    ///
    /// # Panics
    /// Panics if `page` is not an ID of this graph.
    pub fn name(&self, page: PageId) -> &str {
        &self.names[page as usize]
    }

    /// Page names in ID order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Look up a page ID by name
    pub fn page_id(&self, name: &str) -> Option<PageId> {
        self.name_to_id.get(name).copied()
    }

    /// Look up a page ID by name, failing with [`RankError::InvalidPage`]
    pub fn require(&self, name: &str) -> Result<PageId> {
        self.page_id(name)
            .ok_or_else(|| RankError::InvalidPage(name.to_string()))
    }

    /// Check if a name is a page of this graph
    pub fn contains(&self, name: &str) -> bool {
        self.name_to_id.contains_key(name)
    }

    /// Iterate over page IDs
    pub fn page_ids(&self) -> impl Iterator<Item = PageId> {
        0..self.num_pages as PageId
    }

    /// Number of pages
    pub fn len(&self) -> usize {
        self.num_pages
    }

    /// Always false for a constructed graph; provided for API symmetry
    pub fn is_empty(&self) -> bool {
        self.num_pages == 0
    }

    /// Get the total number of links
    pub fn num_links(&self) -> usize {
        self.col_idx.len()
    }
}
