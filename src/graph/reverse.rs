//! Reverse adjacency (incoming links) for a corpus graph
//!
//! Built with a counting pass and a fill pass over the CSR links, so
//! construction is linear in pages plus links.

use super::csr::CorpusGraph;
use super::PageId;

/// For each page, the pages that link to it, in CSR layout
#[derive(Debug, Clone)]
pub struct ReverseIndex {
    row_ptr: Vec<usize>,
    sources: Vec<PageId>,
}

impl ReverseIndex {
    /// Transpose the graph's adjacency
    pub fn build(graph: &CorpusGraph) -> Self {
        let n = graph.len();

        // Count incoming links per page
        let mut row_ptr = vec![0usize; n + 1];
        for page in graph.page_ids() {
            for &target in graph.links(page) {
                row_ptr[target as usize + 1] += 1;
            }
        }
        for i in 0..n {
            row_ptr[i + 1] += row_ptr[i];
        }

        // Fill. Sources come out sorted since pages are visited in ID order.
        let mut cursor = row_ptr.clone();
        let mut sources = vec![0 as PageId; graph.num_links()];
        for page in graph.page_ids() {
            for &target in graph.links(page) {
                let slot = &mut cursor[target as usize];
                sources[*slot] = page;
                *slot += 1;
            }
        }

        Self { row_ptr, sources }
    }

    /// Pages linking to `page`
    pub fn incoming(&self, page: PageId) -> &[PageId] {
        &self.sources[self.row_ptr[page as usize]..self.row_ptr[page as usize + 1]]
    }

    /// Number of pages linking to `page`
    pub fn in_degree(&self, page: PageId) -> usize {
        self.incoming(page).len()
    }

    /// Number of pages covered by the index
    pub fn len(&self) -> usize {
        self.row_ptr.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
