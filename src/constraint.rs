//! Constraint graph: which pairs must not (or should rather not) be matched.
//!
//! Each vertex owns an ordered list of outgoing constraint edges. A finite
//! cost penalizes the pair for that many upcoming rounds; [`INFINITE_COST`]
//! forbids the pair permanently. A missing edge means "no penalty".
//!
//! The graph round-trips byte-exactly through its textual form:
//!
//! ```text
//! nv <N>
//! v <id> [<target>(<cost>)]*      (one line per vertex, in id order)
//! ```

use crate::scan::{ScanError, Scanner};
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::str::FromStr;

/// Cost sentinel marking a permanently forbidden pair.
pub const INFINITE_COST: u32 = u32::MAX;

// ============================================================================
// Graph representation
// ============================================================================

/// One outgoing constraint: matching `source -> target` costs `cost`.
///
/// The source vertex is implicit (edges are stored per vertex); `cost` is
/// either a positive penalty or [`INFINITE_COST`]. Zero is never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstraintEdge {
    /// Target vertex id.
    pub target: usize,
    /// Penalty for matching the pair, or [`INFINITE_COST`].
    pub cost: u32,
}

/// Directed graph of non-matching constraints over `N` dense vertex ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintGraph {
    constraints: Vec<Vec<ConstraintEdge>>,
}

impl ConstraintGraph {
    /// Creates a graph with `nvertices` isolated vertices.
    pub fn new(nvertices: usize) -> Self {
        Self {
            constraints: vec![Vec::new(); nvertices],
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn number_vertices(&self) -> usize {
        self.constraints.len()
    }

    /// Returns the outgoing constraints of vertex `id`, in storage order.
    #[inline]
    pub fn constraints(&self, id: usize) -> &[ConstraintEdge] {
        &self.constraints[id]
    }

    /// Returns the stored cost for the pair `(source, target)`, if any.
    pub fn cost(&self, source: usize, target: usize) -> Option<u32> {
        self.constraints[source]
            .iter()
            .find(|e| e.target == target)
            .map(|e| e.cost)
    }

    /// Adds one directed constraint edge.
    ///
    /// # Panics
    /// Panics in debug builds when `source == target`, either id is out of
    /// range, the cost is zero, or the pair already has an edge.
    pub fn add_directed_edge(&mut self, source: usize, target: usize, cost: u32) {
        debug_assert!(source < self.constraints.len(), "source id out of range");
        debug_assert!(target < self.constraints.len(), "target id out of range");
        debug_assert!(source != target, "self-edges are not allowed");
        debug_assert!(cost != 0, "zero-cost constraints are not stored");
        debug_assert!(
            self.cost(source, target).is_none(),
            "duplicate constraint ({source}, {target})"
        );
        self.constraints[source].push(ConstraintEdge { target, cost });
    }

    /// Adds a constraint in both directions.
    ///
    /// # Panics
    /// Same preconditions as [`Self::add_directed_edge`].
    pub fn add_undirected_edge(&mut self, a: usize, b: usize, cost: u32) {
        self.add_directed_edge(a, b, cost);
        self.add_directed_edge(b, a, cost);
    }

    // ------------------------------------------------------------------------
    // Evolution
    // ------------------------------------------------------------------------

    /// Reshapes the constraints after `matching` has been used, so that the
    /// next solves statistically avoid repeating it.
    ///
    /// Three passes run per vertex:
    /// 1. Finite costs decay by one; edges reaching zero are removed.
    ///    Infinite edges are untouched.
    /// 2. The just-used pair `(i, matching[i])` is (re)penalized with cost
    ///    `N`, so it stays unattractive for roughly `N` rounds.
    /// 3. With `avoid_deterministic` set, a vertex left with `N-1`
    ///    constraints (its next match would be forced) sheds every edge with
    ///    cost at most `2N/3`, reintroducing slack.
    ///
    /// # Errors
    /// Fails without touching invariants if `matching` is not a fixed-point
    /// free map into `[0, N)` of length `N`, or if a matched pair carries an
    /// infinite constraint (the solver never selects those).
    pub fn evolve(
        &mut self,
        matching: &[usize],
        avoid_deterministic: bool,
    ) -> Result<(), EvolveError> {
        let nvertices = self.constraints.len();
        if matching.len() != nvertices {
            return Err(EvolveError::LengthMismatch {
                expected: nvertices,
                got: matching.len(),
            });
        }
        for (id, &target) in matching.iter().enumerate() {
            if target >= nvertices {
                return Err(EvolveError::TargetOutOfRange {
                    source: id,
                    target,
                    nvertices,
                });
            }
            if target == id {
                return Err(EvolveError::SelfMatch { id });
            }
            if self.cost(id, target) == Some(INFINITE_COST) {
                return Err(EvolveError::ForbiddenPairMatched { source: id, target });
            }
        }

        let high_cost = nvertices as u32;
        for (id, &matched) in matching.iter().enumerate() {
            let edges = &mut self.constraints[id];
            // Decay pass: expired penalties disappear, infinite edges persist.
            edges.retain_mut(|e| {
                if e.cost <= 1 {
                    return false;
                }
                if e.cost != INFINITE_COST {
                    e.cost -= 1;
                }
                true
            });
            // Penalize the pair that was just used.
            match edges.iter_mut().find(|e| e.target == matched) {
                Some(e) => e.cost = high_cost,
                None => edges.push(ConstraintEdge {
                    target: matched,
                    cost: high_cost,
                }),
            }
            // A vertex with only one unconstrained target left would make the
            // next solve deterministic; drop its cheap penalties.
            if avoid_deterministic && edges.len() == nvertices - 1 {
                let threshold = high_cost * 2 / 3;
                edges.retain(|e| e.cost > threshold);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // I/O
    // ------------------------------------------------------------------------

    /// Writes the textual form to a writer.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        write!(w, "{self}")
    }

    /// Saves the textual form to a file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut f = File::create(path)?;
        self.write_to(&mut f)
    }

    /// Loads a graph from a file containing the textual form.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the text is malformed.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConstraintParseError> {
        let mut text = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut text))
            .map_err(|e| ConstraintParseError::Io(e.to_string()))?;
        text.parse()
    }
}

impl fmt::Display for ConstraintGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nv {}", self.constraints.len())?;
        for (id, edges) in self.constraints.iter().enumerate() {
            write!(f, "v {id}")?;
            for e in edges {
                write!(f, " {}({})", e.target, e.cost)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Errors encountered while parsing or validating a constraint graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstraintParseError {
    /// The input deviates from the grammar.
    Syntax {
        /// What the parser expected to find.
        expected: &'static str,
        /// Byte offset of the deviation.
        at: usize,
    },
    /// A vertex or target id is not below the declared vertex count.
    IdOutOfRange {
        /// The offending id.
        id: usize,
        /// Declared number of vertices.
        nvertices: usize,
    },
    /// A `v` line is out of place: the lines must appear in id order, so a
    /// duplicate or missing id shows up as an unexpected one.
    VertexOutOfOrder {
        /// The id the line should carry.
        expected: usize,
        /// The id it actually carries.
        got: usize,
    },
    /// A vertex lists itself as a constraint target.
    SelfEdge {
        /// The offending vertex.
        id: usize,
    },
    /// A constraint carries cost zero, which is never stored.
    ZeroCost {
        /// Source vertex of the constraint.
        source: usize,
        /// Target vertex of the constraint.
        target: usize,
    },
    /// The same (source, target) pair appears twice on one line.
    DuplicateEdge {
        /// Source vertex of the constraint.
        source: usize,
        /// Target vertex of the constraint.
        target: usize,
    },
    /// I/O error (file not found, etc.).
    Io(String),
}

impl fmt::Display for ConstraintParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintParseError::Syntax { expected, at } => {
                write!(f, "expected {expected} at byte {at}")
            }
            ConstraintParseError::IdOutOfRange { id, nvertices } => {
                write!(f, "vertex id {id} is out of range (nv {nvertices})")
            }
            ConstraintParseError::VertexOutOfOrder { expected, got } => {
                write!(f, "vertex line carries id {got}, expected {expected}")
            }
            ConstraintParseError::SelfEdge { id } => {
                write!(f, "vertex {id} constrains itself")
            }
            ConstraintParseError::ZeroCost { source, target } => {
                write!(f, "constraint ({source}, {target}) has cost 0")
            }
            ConstraintParseError::DuplicateEdge { source, target } => {
                write!(f, "constraint ({source}, {target}) appears twice")
            }
            ConstraintParseError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for ConstraintParseError {}

impl From<ScanError> for ConstraintParseError {
    fn from(e: ScanError) -> Self {
        ConstraintParseError::Syntax {
            expected: e.expected,
            at: e.at,
        }
    }
}

impl FromStr for ConstraintGraph {
    type Err = ConstraintParseError;

    /// Parses the strict line-oriented form. Any stray character, missing
    /// newline, out-of-range id, duplicate vertex line, self-edge, zero cost,
    /// duplicate pair, or trailing input is an error.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut s = Scanner::new(text);
        s.expect("nv ")?;
        let nvertices = s.parse_u32()? as usize;
        s.expect("\n")?;
        // Every vertex line takes at least four bytes, so a count larger than
        // the input itself cannot possibly be honored; reject it before
        // sizing any allocation after it.
        if nvertices > text.len() {
            return Err(ConstraintParseError::Syntax {
                expected: "a vertex line per declared vertex",
                at: s.pos(),
            });
        }

        let mut graph = ConstraintGraph::new(nvertices);
        for expected_id in 0..nvertices {
            s.expect("v ")?;
            let id = s.parse_u32()? as usize;
            if id >= nvertices {
                return Err(ConstraintParseError::IdOutOfRange { id, nvertices });
            }
            if id != expected_id {
                return Err(ConstraintParseError::VertexOutOfOrder {
                    expected: expected_id,
                    got: id,
                });
            }
            loop {
                match s.peek() {
                    Some(b'\n') => {
                        s.bump();
                        break;
                    }
                    Some(b' ') => {
                        s.bump();
                        let target = s.parse_u32()? as usize;
                        if target >= nvertices {
                            return Err(ConstraintParseError::IdOutOfRange {
                                id: target,
                                nvertices,
                            });
                        }
                        if target == id {
                            return Err(ConstraintParseError::SelfEdge { id });
                        }
                        s.expect("(")?;
                        let cost = s.parse_u32()?;
                        s.expect(")")?;
                        if cost == 0 {
                            return Err(ConstraintParseError::ZeroCost { source: id, target });
                        }
                        if graph.cost(id, target).is_some() {
                            return Err(ConstraintParseError::DuplicateEdge { source: id, target });
                        }
                        graph.constraints[id].push(ConstraintEdge { target, cost });
                    }
                    _ => {
                        return Err(ConstraintParseError::Syntax {
                            expected: "a constraint or newline",
                            at: s.pos(),
                        })
                    }
                }
            }
        }
        s.expect_end()?;
        Ok(graph)
    }
}

// ============================================================================
// Evolution errors
// ============================================================================

/// Errors produced by [`ConstraintGraph::evolve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvolveError {
    /// The matching does not cover exactly the graph's vertices.
    LengthMismatch {
        /// Number of vertices in the graph.
        expected: usize,
        /// Length of the supplied matching.
        got: usize,
    },
    /// A matching entry points outside the graph.
    TargetOutOfRange {
        /// Source vertex of the entry.
        source: usize,
        /// The out-of-range target.
        target: usize,
        /// Number of vertices in the graph.
        nvertices: usize,
    },
    /// A vertex is matched with itself.
    SelfMatch {
        /// The offending vertex.
        id: usize,
    },
    /// A matched pair carries an infinite constraint.
    ForbiddenPairMatched {
        /// Source vertex of the pair.
        source: usize,
        /// Target vertex of the pair.
        target: usize,
    },
}

impl fmt::Display for EvolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvolveError::LengthMismatch { expected, got } => {
                write!(f, "matching has length {got}, expected {expected}")
            }
            EvolveError::TargetOutOfRange {
                source,
                target,
                nvertices,
            } => write!(
                f,
                "matching sends {source} to {target}, out of range (nv {nvertices})"
            ),
            EvolveError::SelfMatch { id } => {
                write!(f, "matching sends {id} to itself")
            }
            EvolveError::ForbiddenPairMatched { source, target } => {
                write!(
                    f,
                    "matched pair ({source}, {target}) carries an infinite constraint"
                )
            }
        }
    }
}

impl std::error::Error for EvolveError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "nv 5\nv 0 4(4294967295) 2(4294967295) 3(1)\nv 1 3(4294967295) 2(1)\nv 2 0(4294967295) 4(1)\nv 3 1(4294967295) 0(1)\nv 4 0(4294967295) 1(1)\n";

    fn sample_graph() -> ConstraintGraph {
        SAMPLE.parse().unwrap()
    }

    #[test]
    fn direct_creation_serializes_in_insertion_order() {
        let mut g = ConstraintGraph::new(5);
        g.add_undirected_edge(0, 4, INFINITE_COST);
        g.add_undirected_edge(0, 2, INFINITE_COST);
        g.add_undirected_edge(1, 3, INFINITE_COST);
        g.add_directed_edge(4, 1, 1);
        g.add_directed_edge(1, 2, 1);
        g.add_directed_edge(2, 4, 1);
        g.add_directed_edge(3, 0, 1);
        g.add_directed_edge(0, 3, 1);
        assert_eq!(g.to_string(), SAMPLE);
    }

    #[test]
    fn parse_serialize_roundtrip_is_byte_exact() {
        assert_eq!(sample_graph().to_string(), SAMPLE);
    }

    #[test]
    fn empty_graph_roundtrip() {
        let text = "nv 0\n";
        let g: ConstraintGraph = text.parse().unwrap();
        assert_eq!(g.number_vertices(), 0);
        assert_eq!(g.to_string(), text);
    }

    #[test]
    fn isolated_vertices_roundtrip() {
        let text = "nv 3\nv 0\nv 1\nv 2\n";
        let g: ConstraintGraph = text.parse().unwrap();
        assert_eq!(g.to_string(), text);
    }

    #[test]
    fn cost_lookup() {
        let g = sample_graph();
        assert_eq!(g.cost(0, 4), Some(INFINITE_COST));
        assert_eq!(g.cost(0, 3), Some(1));
        assert_eq!(g.cost(0, 1), None);
    }

    #[test]
    fn parse_rejects_bad_header() {
        assert!("nc 5\n".parse::<ConstraintGraph>().is_err());
        assert!("nv5\n".parse::<ConstraintGraph>().is_err());
        assert!("nv 5".parse::<ConstraintGraph>().is_err());
    }

    #[test]
    fn parse_rejects_missing_vertex_lines() {
        assert!("nv 2\nv 0\n".parse::<ConstraintGraph>().is_err());
    }

    #[test]
    fn parse_rejects_trailing_input() {
        let text = format!("{SAMPLE}x");
        assert!(text.parse::<ConstraintGraph>().is_err());
        let text = format!("{SAMPLE}\n");
        assert!(text.parse::<ConstraintGraph>().is_err());
    }

    #[test]
    fn parse_rejects_id_out_of_range() {
        let err = "nv 2\nv 0 5(1)\nv 1\n".parse::<ConstraintGraph>().unwrap_err();
        assert_eq!(
            err,
            ConstraintParseError::IdOutOfRange { id: 5, nvertices: 2 }
        );
        let err = "nv 2\nv 3\nv 1\n".parse::<ConstraintGraph>().unwrap_err();
        assert_eq!(
            err,
            ConstraintParseError::IdOutOfRange { id: 3, nvertices: 2 }
        );
    }

    #[test]
    fn parse_rejects_duplicate_and_out_of_order_vertex_lines() {
        let err = "nv 2\nv 0\nv 0\n".parse::<ConstraintGraph>().unwrap_err();
        assert_eq!(
            err,
            ConstraintParseError::VertexOutOfOrder { expected: 1, got: 0 }
        );
        let err = "nv 2\nv 1\nv 0\n".parse::<ConstraintGraph>().unwrap_err();
        assert_eq!(
            err,
            ConstraintParseError::VertexOutOfOrder { expected: 0, got: 1 }
        );
    }

    #[test]
    fn parse_rejects_absurd_vertex_counts() {
        assert!("nv 4294967295\n".parse::<ConstraintGraph>().is_err());
    }

    #[test]
    fn parse_rejects_self_edge() {
        let err = "nv 2\nv 0 0(1)\nv 1\n".parse::<ConstraintGraph>().unwrap_err();
        assert_eq!(err, ConstraintParseError::SelfEdge { id: 0 });
    }

    #[test]
    fn parse_rejects_zero_cost() {
        let err = "nv 2\nv 0 1(0)\nv 1\n".parse::<ConstraintGraph>().unwrap_err();
        assert_eq!(err, ConstraintParseError::ZeroCost { source: 0, target: 1 });
    }

    #[test]
    fn parse_rejects_duplicate_pair() {
        let err = "nv 3\nv 0 1(2) 1(3)\nv 1\nv 2\n"
            .parse::<ConstraintGraph>()
            .unwrap_err();
        assert_eq!(err, ConstraintParseError::DuplicateEdge { source: 0, target: 1 });
    }

    #[test]
    fn parse_rejects_malformed_constraint_token() {
        assert!("nv 2\nv 0 1(2\nv 1\n".parse::<ConstraintGraph>().is_err());
        assert!("nv 2\nv 0 1 2\nv 1\n".parse::<ConstraintGraph>().is_err());
        assert!("nv 2\nv 0  1(2)\nv 1\n".parse::<ConstraintGraph>().is_err());
    }

    #[test]
    fn write_to_matches_display() {
        let g = sample_graph();
        let mut buf = Vec::new();
        g.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), SAMPLE);
    }

    // -------------------------------------------------------------------------
    // Evolution
    // -------------------------------------------------------------------------

    /// Bounds that must hold after any `evolve` call.
    fn assert_evolution_bounds(g: &ConstraintGraph, matching: &[usize]) {
        let n = g.number_vertices() as u32;
        for id in 0..g.number_vertices() {
            for e in g.constraints(id) {
                assert!(e.cost > 0, "zero cost stored on ({id}, {})", e.target);
                assert!(
                    e.cost == INFINITE_COST || e.cost <= n,
                    "finite cost {} exceeds {n}",
                    e.cost
                );
            }
            let used = g.cost(id, matching[id]);
            assert!(used.is_some_and(|c| c >= 1), "used pair not penalized");
        }
    }

    #[test]
    fn evolve_penalizes_used_pairs_with_high_cost() {
        let mut g = ConstraintGraph::new(4);
        let matching = [1, 0, 3, 2];
        g.evolve(&matching, false).unwrap();
        for (id, &m) in matching.iter().enumerate() {
            assert_eq!(g.cost(id, m), Some(4));
        }
        assert_evolution_bounds(&g, &matching);
    }

    #[test]
    fn evolve_decays_and_expires_finite_costs() {
        let mut g = ConstraintGraph::new(4);
        g.add_directed_edge(0, 2, 1); // expires this round
        g.add_directed_edge(0, 3, 3); // decays to 2
        g.evolve(&[1, 0, 3, 2], false).unwrap();
        assert_eq!(g.cost(0, 2), None);
        assert_eq!(g.cost(0, 3), Some(2));
    }

    #[test]
    fn evolve_preserves_infinite_edges_exactly() {
        let mut g = ConstraintGraph::new(4);
        g.add_undirected_edge(0, 1, INFINITE_COST);
        g.add_undirected_edge(2, 3, INFINITE_COST);
        let matching = [2, 3, 1, 0];
        for _ in 0..20 {
            g.evolve(&matching, true).unwrap();
            assert_eq!(g.cost(0, 1), Some(INFINITE_COST));
            assert_eq!(g.cost(1, 0), Some(INFINITE_COST));
            assert_eq!(g.cost(2, 3), Some(INFINITE_COST));
            assert_eq!(g.cost(3, 2), Some(INFINITE_COST));
            assert_evolution_bounds(&g, &matching);
        }
    }

    #[test]
    fn evolve_reuses_existing_edge_for_used_pair() {
        let mut g = ConstraintGraph::new(4);
        g.add_directed_edge(0, 1, 3);
        g.evolve(&[1, 2, 3, 0], false).unwrap();
        assert_eq!(g.cost(0, 1), Some(4));
        assert_eq!(g.constraints(0).len(), 1);
    }

    #[test]
    fn evolve_purges_cheap_edges_when_vertex_saturates() {
        // After penalizing 0->3, vertex 0 holds constraints towards 1, 2 and 3:
        // saturation (nv - 1 = 3) triggers the purge of costs <= 2*4/3 = 2.
        let mut g = ConstraintGraph::new(4);
        g.add_directed_edge(0, 1, 3); // decays to 2, purged
        g.add_directed_edge(0, 2, 4); // decays to 3, survives
        g.evolve(&[3, 0, 1, 2], true).unwrap();
        assert_eq!(g.cost(0, 1), None);
        assert_eq!(g.cost(0, 2), Some(3));
        assert_eq!(g.cost(0, 3), Some(4));
    }

    #[test]
    fn evolve_keeps_saturated_vertex_intact_without_flag() {
        let mut g = ConstraintGraph::new(4);
        g.add_directed_edge(0, 1, 3);
        g.add_directed_edge(0, 2, 4);
        g.evolve(&[3, 0, 1, 2], false).unwrap();
        assert_eq!(g.cost(0, 1), Some(2));
        assert_eq!(g.cost(0, 2), Some(3));
        assert_eq!(g.cost(0, 3), Some(4));
    }

    #[test]
    fn evolve_rejects_bad_matchings() {
        let mut g = ConstraintGraph::new(3);
        assert_eq!(
            g.evolve(&[1, 0], false),
            Err(EvolveError::LengthMismatch { expected: 3, got: 2 })
        );
        assert_eq!(
            g.evolve(&[1, 0, 7], false),
            Err(EvolveError::TargetOutOfRange {
                source: 2,
                target: 7,
                nvertices: 3
            })
        );
        assert_eq!(
            g.evolve(&[0, 2, 1], false),
            Err(EvolveError::SelfMatch { id: 0 })
        );
    }

    #[test]
    fn evolve_rejects_matching_through_forbidden_pair() {
        let mut g = ConstraintGraph::new(3);
        g.add_directed_edge(0, 1, INFINITE_COST);
        let err = g.evolve(&[1, 2, 0], false).unwrap_err();
        assert_eq!(err, EvolveError::ForbiddenPairMatched { source: 0, target: 1 });
        // The graph is untouched on failure.
        assert_eq!(g.cost(0, 1), Some(INFINITE_COST));
        assert_eq!(g.constraints(0).len(), 1);
    }

    #[test]
    fn evolve_memory_horizon_is_bounded() {
        // Repeatedly evolving with rotating matchings never drives a finite
        // cost above N and never stores more than N-1 constraints per vertex.
        let mut g = ConstraintGraph::new(5);
        let rotations = [[1, 2, 3, 4, 0], [2, 3, 4, 0, 1], [3, 4, 0, 1, 2], [4, 0, 1, 2, 3]];
        for round in 0..40 {
            let matching = rotations[round % rotations.len()];
            g.evolve(&matching, true).unwrap();
            assert_evolution_bounds(&g, &matching);
            for id in 0..5 {
                assert!(g.constraints(id).len() <= 4);
            }
        }
    }
}
