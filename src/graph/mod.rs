//! Corpus graph construction and representation
//!
//! Pages are interned to dense IDs by the builder, frozen into a CSR
//! adjacency, and optionally inverted into a reverse index for the
//! iterative solver.

pub mod builder;
pub mod csr;
pub mod reverse;

/// Dense page identifier assigned by [`builder::CorpusBuilder`]
pub type PageId = u32;
