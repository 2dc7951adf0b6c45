//! Common test utilities for embedcheck integration tests
//!
//! Graph generators, embeddings built by construction, and mock solvers
//! standing in for a real randomized embedder.

#![allow(dead_code)]

pub mod graphs;
pub mod solvers;

pub use graphs::{complete, cycle, grid, grown_embedding, path, quotient};
pub use solvers::{FlakySolver, IdentitySolver, OverlappingSolver};
