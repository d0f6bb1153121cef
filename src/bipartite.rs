//! Bipartite assignment graph: the solver's view of the matching problem.
//!
//! Every item becomes a *clique* owning two half-vertices: a source half
//! (offerer side) and a target half (receiver side). Edges run from the
//! source half of one clique to the target half of a different clique and
//! carry an integer score; [`FORBIDDEN_SCORE`] marks an edge no admissible
//! matching may use.
//!
//! The graph owns its edges in one contiguous array; the per-clique incidence
//! lists hold plain indices into it.

use crate::scan::{ScanError, Scanner};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Score sentinel marking a forbidden edge.
pub const FORBIDDEN_SCORE: i32 = i32::MIN;

/// One directed edge `source.source_half -> target.target_half`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchEdge {
    /// Clique whose source half the edge leaves.
    pub source: usize,
    /// Clique whose target half the edge enters.
    pub target: usize,
    /// Interest of matching the pair; higher is better.
    pub score: i32,
}

/// Set of cliques plus the candidate-match edges between their halves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssignmentGraph {
    edges: Vec<MatchEdge>,
    /// Per clique: indices of edges leaving its source half, insertion order.
    outgoing: Vec<Vec<usize>>,
    /// Per clique: indices of edges entering its target half, insertion order.
    incoming: Vec<Vec<usize>>,
}

impl AssignmentGraph {
    /// Creates a graph with `ncliques` cliques and no edges.
    pub fn new(ncliques: usize) -> Self {
        Self {
            edges: Vec::new(),
            outgoing: vec![Vec::new(); ncliques],
            incoming: vec![Vec::new(); ncliques],
        }
    }

    /// Returns the number of cliques.
    #[inline]
    pub fn number_cliques(&self) -> usize {
        self.outgoing.len()
    }

    /// Returns the number of half-vertices (two per clique).
    #[inline]
    pub fn number_half_vertices(&self) -> usize {
        2 * self.outgoing.len()
    }

    /// Returns all edges in insertion order.
    #[inline]
    pub fn edges(&self) -> &[MatchEdge] {
        &self.edges
    }

    /// Returns the edge with the given handle.
    #[inline]
    pub fn edge(&self, id: usize) -> MatchEdge {
        self.edges[id]
    }

    /// Edge handles leaving the source half of `clique`, in insertion order.
    #[inline]
    pub fn outgoing_edges(&self, clique: usize) -> &[usize] {
        &self.outgoing[clique]
    }

    /// Edge handles entering the target half of `clique`, in insertion order.
    #[inline]
    pub fn incoming_edges(&self, clique: usize) -> &[usize] {
        &self.incoming[clique]
    }

    /// Appends one edge and links it into both incidence lists.
    ///
    /// # Panics
    /// Panics in debug builds when `source == target` or either clique id is
    /// out of range.
    pub fn add_directed_edge(&mut self, source: usize, target: usize, score: i32) {
        debug_assert!(source < self.outgoing.len(), "source clique out of range");
        debug_assert!(target < self.outgoing.len(), "target clique out of range");
        debug_assert!(source != target, "a clique cannot be matched to itself");
        let id = self.edges.len();
        self.edges.push(MatchEdge {
            source,
            target,
            score,
        });
        self.outgoing[source].push(id);
        self.incoming[target].push(id);
    }

    /// Returns all clique ids in a fresh uniformly random order.
    pub fn cliques_in_random_order<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let mut ids: Vec<usize> = (0..self.number_cliques()).collect();
        ids.shuffle(rng);
        ids
    }

    /// Returns all edge handles in a fresh uniformly random order.
    pub fn edges_in_random_order<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let mut ids: Vec<usize> = (0..self.edges.len()).collect();
        ids.shuffle(rng);
        ids
    }
}

impl fmt::Display for AssignmentGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nc {}", self.number_cliques())?;
        writeln!(f, "ne {}", self.edges.len())?;
        for e in &self.edges {
            writeln!(f, "e {} {} {}", e.source, e.target, e.score)?;
        }
        Ok(())
    }
}

/// Errors encountered while parsing an assignment graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssignmentParseError {
    /// The input deviates from the grammar.
    Syntax {
        /// What the parser expected to find.
        expected: &'static str,
        /// Byte offset of the deviation.
        at: usize,
    },
    /// An edge endpoint is not below the declared clique count.
    CliqueOutOfRange {
        /// The offending clique id.
        id: usize,
        /// Declared number of cliques.
        ncliques: usize,
    },
    /// An edge links a clique to itself.
    SelfEdge {
        /// The offending clique.
        id: usize,
    },
}

impl fmt::Display for AssignmentParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentParseError::Syntax { expected, at } => {
                write!(f, "expected {expected} at byte {at}")
            }
            AssignmentParseError::CliqueOutOfRange { id, ncliques } => {
                write!(f, "clique id {id} is out of range (nc {ncliques})")
            }
            AssignmentParseError::SelfEdge { id } => {
                write!(f, "edge links clique {id} to itself")
            }
        }
    }
}

impl std::error::Error for AssignmentParseError {}

impl From<ScanError> for AssignmentParseError {
    fn from(e: ScanError) -> Self {
        AssignmentParseError::Syntax {
            expected: e.expected,
            at: e.at,
        }
    }
}

impl FromStr for AssignmentGraph {
    type Err = AssignmentParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut s = Scanner::new(text);
        s.expect("nc ")?;
        let ncliques = s.parse_u32()? as usize;
        s.expect("\n")?;
        s.expect("ne ")?;
        let nedges = s.parse_u32()? as usize;
        s.expect("\n")?;
        // Each edge line takes at least eight bytes; counts beyond the input
        // length cannot be honored, so reject them before sizing anything.
        if ncliques > text.len() || nedges > text.len() {
            return Err(AssignmentParseError::Syntax {
                expected: "an edge line per declared edge",
                at: s.pos(),
            });
        }

        let mut graph = AssignmentGraph::new(ncliques);
        for _ in 0..nedges {
            s.expect("e ")?;
            let source = s.parse_u32()? as usize;
            s.expect(" ")?;
            let target = s.parse_u32()? as usize;
            s.expect(" ")?;
            let score = s.parse_i32()?;
            s.expect("\n")?;
            for id in [source, target] {
                if id >= ncliques {
                    return Err(AssignmentParseError::CliqueOutOfRange { id, ncliques });
                }
            }
            if source == target {
                return Err(AssignmentParseError::SelfEdge { id: source });
            }
            graph.add_directed_edge(source, target, score);
        }
        s.expect_end()?;
        Ok(graph)
    }
}
