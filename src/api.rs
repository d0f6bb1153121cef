//! Public entry point: one call takes a constraint graph in textual form and
//! returns a fresh random assignment plus the evolved graph text to feed into
//! the next call.
//!
//! The pipeline is parse, convert, solve, validate, evolve, serialize. Every
//! outcome is reported through a [`ResultCode`]; the entry point never
//! panics.

use crate::bipartite::AssignmentGraph;
use crate::constraint::ConstraintGraph;
use crate::convert::{to_assignment_graph, to_generic_matching};
use crate::solver::{find_random_perfect_matching, SolveError};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Outcome of a [`find_best_perfect_matching`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultCode {
    /// A matching was produced and the graph text was updated.
    Success,
    /// The input text is not a valid constraint graph, or the graph state
    /// contradicts itself.
    InvalidGraph,
    /// The constraints admit no perfect matching; retry after relaxing them.
    MatchingFailure,
    /// An internal invariant was violated; this indicates a bug.
    InvalidMatching,
    /// A domain error was caught at the boundary; the third tuple element
    /// carries its message.
    KnownException,
    /// An unexpected condition escaped the inner handlers.
    UnknownException,
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultCode::Success => "success",
            ResultCode::InvalidGraph => "invalid graph",
            ResultCode::MatchingFailure => "matching failure",
            ResultCode::InvalidMatching => "invalid matching",
            ResultCode::KnownException => "known exception",
            ResultCode::UnknownException => "unknown exception",
        };
        f.write_str(name)
    }
}

/// Checks that `matching` assigns every clique exactly once as a source and
/// exactly once as a target.
pub fn check_perfect_matching_validity(ncliques: usize, matching: &[usize]) -> bool {
    if matching.len() != ncliques {
        return false;
    }
    let mut is_source = vec![false; ncliques];
    let mut is_target = vec![false; ncliques];
    for (source, &target) in matching.iter().enumerate() {
        if target >= ncliques || is_source[source] || is_target[target] {
            return false;
        }
        is_source[source] = true;
        is_target[target] = true;
    }
    is_source.iter().all(|&s| s) && is_target.iter().all(|&t| t)
}

/// Computes a random maximum-score perfect assignment for `graph_text` and
/// evolves the constraints for the next round.
///
/// On success the returned permutation maps each source id to its assigned
/// target id, and the returned string is the evolved graph text to pass into
/// the next call. On failure the permutation is empty and the string is empty
/// except for [`ResultCode::KnownException`], where it carries the
/// diagnostic message.
///
/// Ties between equally-scored assignments are broken with a generator
/// freshly seeded from OS entropy; successive calls on the same input may
/// legitimately differ.
pub fn find_best_perfect_matching(graph_text: &str) -> (ResultCode, Vec<usize>, String) {
    let mut rng = SmallRng::from_os_rng();
    find_best_perfect_matching_with_rng(graph_text, &mut rng)
}

/// Same as [`find_best_perfect_matching`] but drawing randomness from the
/// caller's generator.
pub fn find_best_perfect_matching_with_rng<R: Rng>(
    graph_text: &str,
    rng: &mut R,
) -> (ResultCode, Vec<usize>, String) {
    match panic::catch_unwind(AssertUnwindSafe(|| run_pipeline(graph_text, rng))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = if let Some(msg) = payload.downcast_ref::<&str>() {
                Some((*msg).to_string())
            } else {
                payload.downcast_ref::<String>().cloned()
            };
            match message {
                Some(msg) => (ResultCode::KnownException, Vec::new(), msg),
                None => (ResultCode::UnknownException, Vec::new(), String::new()),
            }
        }
    }
}

fn run_pipeline<R: Rng>(graph_text: &str, rng: &mut R) -> (ResultCode, Vec<usize>, String) {
    let failure = |code| (code, Vec::new(), String::new());

    let Ok(mut constraint_graph) = graph_text.parse::<ConstraintGraph>() else {
        return failure(ResultCode::InvalidGraph);
    };

    let assignment_graph: AssignmentGraph = to_assignment_graph(&constraint_graph);
    let matching_edges = match find_random_perfect_matching(&assignment_graph, rng) {
        Ok(edges) => edges,
        Err(SolveError::InconsistentGraph) => return failure(ResultCode::InvalidGraph),
        Err(SolveError::NoPerfectMatching) => return failure(ResultCode::MatchingFailure),
        Err(SolveError::BrokenInvariant(_)) => return failure(ResultCode::InvalidMatching),
    };

    let matching = to_generic_matching(&assignment_graph, &matching_edges);
    if !check_perfect_matching_validity(assignment_graph.number_cliques(), &matching) {
        return failure(ResultCode::InvalidMatching);
    }

    if let Err(e) = constraint_graph.evolve(&matching, true) {
        return (ResultCode::KnownException, Vec::new(), e.to_string());
    }

    (ResultCode::Success, matching, constraint_graph.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::INFINITE_COST;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    /// Graph text with one mutually forbidden pair per couple: `npairs * 2`
    /// participants, participant `2i` and `2i+1` can never draw each other.
    fn paired_graph_text(npairs: usize) -> String {
        let mut text = format!("nv {}\n", npairs * 2);
        for i in 0..npairs {
            text.push_str(&format!("v {} {}({INFINITE_COST})\n", 2 * i, 2 * i + 1));
            text.push_str(&format!("v {} {}({INFINITE_COST})\n", 2 * i + 1, 2 * i));
        }
        text
    }

    #[test]
    fn success_path_produces_valid_matching_and_parsable_update() {
        let text = "nv 5\nv 0 4(4294967295) 2(4294967295) 3(1)\nv 1 3(4294967295) 2(1)\nv 2 0(4294967295) 4(1)\nv 3 1(4294967295) 0(1)\nv 4 0(4294967295) 1(1)\n";
        let mut rng = XorShiftRng::seed_from_u64(0xFACADE);
        let (code, matching, updated) = find_best_perfect_matching_with_rng(text, &mut rng);
        assert_eq!(code, ResultCode::Success);
        assert!(check_perfect_matching_validity(5, &matching));
        // Forbidden pairs are never used.
        let original: ConstraintGraph = text.parse().unwrap();
        for (source, &target) in matching.iter().enumerate() {
            assert_ne!(original.cost(source, target), Some(INFINITE_COST));
        }
        // The updated text parses and preserves the forbidden pairs.
        let evolved: ConstraintGraph = updated.parse().unwrap();
        for (a, b) in [(0, 4), (4, 0), (0, 2), (2, 0), (1, 3), (3, 1)] {
            assert_eq!(evolved.cost(a, b), Some(INFINITE_COST));
        }
    }

    #[test]
    fn invalid_text_reports_invalid_graph() {
        let mut rng = XorShiftRng::seed_from_u64(1);
        for text in ["", "garbage", "nv 2\nv 0\n", "nv 1\nv 0 0(1)\n"] {
            let (code, matching, updated) = find_best_perfect_matching_with_rng(text, &mut rng);
            assert_eq!(code, ResultCode::InvalidGraph, "input: {text:?}");
            assert!(matching.is_empty());
            assert!(updated.is_empty());
        }
    }

    #[test]
    fn unsatisfiable_constraints_report_matching_failure() {
        // Two participants who cannot draw each other leave no assignment.
        let mut rng = XorShiftRng::seed_from_u64(2);
        let (code, ..) = find_best_perfect_matching_with_rng(&paired_graph_text(1), &mut rng);
        assert_eq!(code, ResultCode::MatchingFailure);
        // A single participant cannot draw anyone either.
        let (code, ..) = find_best_perfect_matching_with_rng("nv 1\nv 0\n", &mut rng);
        assert_eq!(code, ResultCode::MatchingFailure);
    }

    #[test]
    fn validity_check_accepts_permutations_only() {
        assert!(check_perfect_matching_validity(3, &[1, 2, 0]));
        assert!(!check_perfect_matching_validity(3, &[1, 2]));
        assert!(!check_perfect_matching_validity(3, &[1, 1, 0]));
        assert!(!check_perfect_matching_validity(3, &[1, 2, 3]));
        assert!(check_perfect_matching_validity(0, &[]));
    }

    #[test]
    fn ten_successive_matchings_all_succeed() {
        let mut text = "nv 5\nv 0 2(4294967295) 4(4294967295)\nv 1 3(4294967295)\nv 2 0(4294967295)\nv 3 1(4294967295)\nv 4 0(4294967295)\n".to_string();
        let mut rng = XorShiftRng::seed_from_u64(0x10);
        for round in 0..10 {
            let (code, matching, updated) = find_best_perfect_matching_with_rng(&text, &mut rng);
            assert_eq!(code, ResultCode::Success, "round {round}");
            assert!(check_perfect_matching_validity(5, &matching));
            text = updated;
        }
    }

    #[test]
    fn facade_does_not_panic_on_hostile_input() {
        let mut rng = XorShiftRng::seed_from_u64(3);
        for text in [
            "nv 4294967295\n",
            "nv 2\nv 0 1(4294967295) 1(4294967295)\nv 1\n",
            "nv 3\nv 2\nv 1\nv 0\n",
            "\u{0}\u{0}\u{0}",
        ] {
            // Only the result code matters: no panic may escape.
            let (code, ..) = find_best_perfect_matching_with_rng(text, &mut rng);
            assert_ne!(code, ResultCode::Success, "input: {text:?}");
        }
    }

    // -------------------------------------------------------------------------
    // Statistical behavior of the solve-evolve loop
    // -------------------------------------------------------------------------

    #[test]
    fn initial_matching_takes_long_to_recur() {
        // 4 couples; over repeated rounds the average number of steps before
        // the very first assignment recurs must exceed the participant count,
        // otherwise the anti-repetition memory is not doing its job.
        let nvertices = 8;
        let initial_text = paired_graph_text(nvertices / 2);
        let mut rng = XorShiftRng::seed_from_u64(0x7E57);
        let runs = 100;
        let mut total_steps = 0usize;
        for _ in 0..runs {
            let (code, initial, mut text) =
                find_best_perfect_matching_with_rng(&initial_text, &mut rng);
            assert_eq!(code, ResultCode::Success);
            let mut steps = 0usize;
            loop {
                let (code, matching, updated) =
                    find_best_perfect_matching_with_rng(&text, &mut rng);
                assert_eq!(code, ResultCode::Success);
                text = updated;
                if matching == initial {
                    break;
                }
                steps += 1;
                assert!(steps < 10_000, "matching never recurred");
            }
            total_steps += steps;
        }
        let average = total_steps as f64 / runs as f64;
        assert!(
            average > nvertices as f64,
            "average return time {average} is not above {nvertices}"
        );
    }

    #[test]
    fn successive_matchings_are_empirically_uniform() {
        // 5 couples, 1000 successive rounds: every admissible pair must be
        // drawn with frequency 1/(N-2) up to 1e-3, and forbidden or self
        // pairs must never be drawn. The evolve feedback makes the empirical
        // distribution much tighter than independent sampling would.
        let nvertices = 10usize;
        let rounds = 1000usize;
        let mut text = paired_graph_text(nvertices / 2);
        let mut rng = XorShiftRng::seed_from_u64(0x04B1A5);
        let mut histogram = vec![0usize; nvertices * nvertices];
        for round in 0..rounds {
            let (code, matching, updated) = find_best_perfect_matching_with_rng(&text, &mut rng);
            assert_eq!(code, ResultCode::Success, "round {round}");
            for (source, &target) in matching.iter().enumerate() {
                histogram[source * nvertices + target] += 1;
            }
            text = updated;
        }
        let expected = 1.0 / (nvertices as f64 - 2.0);
        for source in 0..nvertices {
            let partner = source ^ 1;
            for target in 0..nvertices {
                let count = histogram[source * nvertices + target];
                if target == source || target == partner {
                    assert_eq!(count, 0, "inadmissible pair {source}->{target} was drawn");
                } else {
                    let frequency = count as f64 / rounds as f64;
                    assert!(
                        (frequency - expected).abs() <= 1e-3,
                        "biased pair {source}->{target}: frequency {frequency}, expected {expected}"
                    );
                }
            }
        }
    }
}
