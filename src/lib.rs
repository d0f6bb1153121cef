//! # rematch
//!
//! A library for repeatedly drawing a **random maximum-weight perfect
//! assignment** over `N` items under hard forbidden-pair constraints, with a
//! memory that reshapes the weights between rounds so the same assignment is
//! unlikely to recur soon.
//!
//! The motivating scenario is a rotating gift exchange: every participant
//! offers one gift and receives one gift, spouses never draw each other, and
//! the draw should not hand anyone the same recipient two years in a row.
//! The engine itself is domain-neutral.
//!
//! This crate provides:
//! - A directed [constraint graph](constraint) with integer penalties and an
//!   infinite-cost sentinel for permanently forbidden pairs, plus a strict
//!   byte-exact textual serialization.
//! - A derived [bipartite view](bipartite) where each item owns a source half
//!   and a target half, and candidate matches are scored edges between halves.
//! - A [Hungarian solver](solver) producing a maximum-score perfect matching
//!   in O(n³), randomized uniformly across equally-scored optima.
//! - A [constraint evolution rule](constraint::ConstraintGraph::evolve) that
//!   penalizes just-used pairs and decays old penalties, bounding the
//!   anti-repetition memory at roughly `N` rounds.
//! - A [single-call facade](api) chaining parse, convert, solve, validate,
//!   evolve, and serialize behind a result code that never panics.
//!
//! ## Quick Start
//!
//! ```
//! use rematch::api::{find_best_perfect_matching, ResultCode};
//!
//! // Two couples; spouses (0,1) and (2,3) never draw each other.
//! let text = "nv 4\nv 0 1(4294967295)\nv 1 0(4294967295)\nv 2 3(4294967295)\nv 3 2(4294967295)\n";
//! let (code, matching, next_text) = find_best_perfect_matching(text);
//! assert_eq!(code, ResultCode::Success);
//! assert_eq!(matching.len(), 4);
//! // Feed `next_text` into the next call to keep the rotation going.
//! assert!(next_text.starts_with("nv 4\n"));
//! ```
//!
//! ## Working with the Graphs Directly
//!
//! ```
//! use rematch::constraint::{ConstraintGraph, INFINITE_COST};
//! use rematch::convert::to_assignment_graph;
//!
//! let mut graph = ConstraintGraph::new(3);
//! graph.add_undirected_edge(0, 1, INFINITE_COST);
//! graph.add_directed_edge(0, 2, 2);
//!
//! let bipartite = to_assignment_graph(&graph);
//! assert_eq!(bipartite.number_cliques(), 3);
//! // The forbidden pair is simply absent from the candidate edges.
//! assert_eq!(bipartite.edges().len(), 4);
//! ```
//!
//! ## Modules
//!
//! - [`constraint`]: constraint graph, textual format, evolution rule.
//! - [`bipartite`]: bipartite assignment graph with half-vertex incidences.
//! - [`convert`]: lossless translation between the two views.
//! - [`solver`]: randomized Hungarian maximum-score perfect matching.
//! - [`api`]: the result-code entry point tying everything together.
//!
//! ## Concurrency
//!
//! One call runs to completion on the calling thread; the only shared state
//! is the random generator, which callers either own (`_with_rng` variants)
//! or get freshly seeded per call. Independent graphs may be solved from
//! independent threads.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::many_single_char_names)] // Mathematical variable names
#![allow(clippy::needless_range_loop)] // Often clearer for id-indexed arrays

pub mod api;
pub mod bipartite;
pub mod constraint;
pub mod convert;
mod scan;
pub mod solver;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::api::{check_perfect_matching_validity, find_best_perfect_matching, ResultCode};
    pub use crate::bipartite::{AssignmentGraph, MatchEdge, FORBIDDEN_SCORE};
    pub use crate::constraint::{ConstraintEdge, ConstraintGraph, INFINITE_COST};
    pub use crate::convert::{to_assignment_graph, to_constraint_graph, to_generic_matching};
    pub use crate::solver::{find_random_perfect_matching, SolveError};
}
