//! Maximum-score perfect matching via the Hungarian (Kuhn–Munkres) algorithm.
//!
//! The solver maintains a feasible vertex labeling `l` with
//! `l(s) + l(t) >= w(s, t)` for every edge; a perfect matching inside the
//! induced equality subgraph (`l(s) + l(t) == w(s, t)`) is a maximum-score
//! perfect matching of the whole graph. Each of the `N` rounds grows the
//! matching by one edge along an augmenting path, found by alternating a
//! breadth-first search of the equality subgraph with labeling updates driven
//! by a slack array; the slack bookkeeping keeps the whole solve in O(n^3).
//!
//! Randomness enters in exactly one place: the exposed source vertex used as
//! the root of each alternating tree is drawn uniformly at random. Everything
//! else is deterministic in storage order, which keeps the distribution over
//! equally-scored optima unbiased.

use crate::bipartite::{AssignmentGraph, FORBIDDEN_SCORE};
use rand::Rng;
use std::collections::VecDeque;
use std::fmt;

/// Errors produced by the matching solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveError {
    /// The graph is inconsistent (an exposed source should exist but none
    /// was found).
    InconsistentGraph,
    /// The graph admits no perfect matching on its admissible edges.
    NoPerfectMatching,
    /// An internal invariant was violated; this indicates a bug.
    BrokenInvariant(&'static str),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::InconsistentGraph => write!(f, "graph is inconsistent"),
            SolveError::NoPerfectMatching => write!(f, "no perfect matching exists"),
            SolveError::BrokenInvariant(what) => write!(f, "solver invariant violated: {what}"),
        }
    }
}

impl std::error::Error for SolveError {}

/// Finds a maximum-score perfect matching, chosen at random among the optima.
///
/// Returns the edge handles of the `N` matching edges. Edges carrying
/// [`FORBIDDEN_SCORE`] are ignored throughout; a clique whose source half has
/// no admissible outgoing edge (or whose target half has no admissible
/// incoming edge) makes the solve fail immediately.
///
/// # Errors
/// [`SolveError::NoPerfectMatching`] when the admissible edges admit no
/// perfect matching, [`SolveError::InconsistentGraph`] when the graph state
/// contradicts itself, [`SolveError::BrokenInvariant`] on internal bugs.
pub fn find_random_perfect_matching<R: Rng>(
    graph: &AssignmentGraph,
    rng: &mut R,
) -> Result<Vec<usize>, SolveError> {
    let ncliques = graph.number_cliques();
    for cid in 0..ncliques {
        let has_out = graph
            .outgoing_edges(cid)
            .iter()
            .any(|&eid| graph.edge(eid).score != FORBIDDEN_SCORE);
        let has_in = graph
            .incoming_edges(cid)
            .iter()
            .any(|&eid| graph.edge(eid).score != FORBIDDEN_SCORE);
        if !has_out || !has_in {
            return Err(SolveError::NoPerfectMatching);
        }
    }

    let mut labeling = VertexLabeling::new(graph);
    let mut matching = Matching::new(ncliques);
    for _ in 0..ncliques {
        augment(graph, &mut matching, &mut labeling, rng)?;
    }
    debug_assert_eq!(matching.len(), ncliques);
    Ok(matching.into_edges())
}

// ============================================================================
// Matching
// ============================================================================

/// Partial matching over the cliques, indexed from both sides.
struct Matching {
    /// Per source clique: the matched target clique, if any.
    source_match: Vec<Option<usize>>,
    /// Per source clique: the matching edge handle, if any.
    source_edge: Vec<Option<usize>>,
    /// Per target clique: the matched source clique, if any.
    target_match: Vec<Option<usize>>,
    /// Per target clique: the matching edge handle, if any.
    target_edge: Vec<Option<usize>>,
    /// All edge handles currently in the matching.
    edges: Vec<usize>,
}

impl Matching {
    fn new(ncliques: usize) -> Self {
        Self {
            source_match: vec![None; ncliques],
            source_edge: vec![None; ncliques],
            target_match: vec![None; ncliques],
            target_edge: vec![None; ncliques],
            edges: Vec::with_capacity(ncliques),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    fn is_source(&self, cid: usize) -> bool {
        self.source_match[cid].is_some()
    }

    #[inline]
    fn is_target(&self, cid: usize) -> bool {
        self.target_match[cid].is_some()
    }

    #[inline]
    fn edge_from_target(&self, cid: usize) -> Option<usize> {
        self.target_edge[cid]
    }

    fn add_edge(&mut self, graph: &AssignmentGraph, eid: usize) {
        let e = graph.edge(eid);
        debug_assert!(!self.is_source(e.source), "source already matched");
        debug_assert!(!self.is_target(e.target), "target already matched");
        self.edges.push(eid);
        self.source_match[e.source] = Some(e.target);
        self.source_edge[e.source] = Some(eid);
        self.target_match[e.target] = Some(e.source);
        self.target_edge[e.target] = Some(eid);
    }

    fn remove_edge(&mut self, graph: &AssignmentGraph, eid: usize) {
        let Some(pos) = self.edges.iter().position(|&e| e == eid) else {
            return;
        };
        self.edges.remove(pos);
        let e = graph.edge(eid);
        if self.source_edge[e.source] == Some(eid) {
            self.source_match[e.source] = None;
            self.source_edge[e.source] = None;
        }
        if self.target_edge[e.target] == Some(eid) {
            self.target_match[e.target] = None;
            self.target_edge[e.target] = None;
        }
    }

    fn into_edges(self) -> Vec<usize> {
        self.edges
    }
}

// ============================================================================
// Vertex labeling
// ============================================================================

/// Feasible labeling over the half-vertices.
///
/// Labels are kept in `i64` so `l(s) + l(t) - w(s, t)` never overflows even
/// for extreme `i32` scores.
struct VertexLabeling {
    source: Vec<i64>,
    target: Vec<i64>,
}

impl VertexLabeling {
    /// Trivially feasible start: each source half gets the maximum score of
    /// its admissible outgoing edges, each target half gets zero.
    fn new(graph: &AssignmentGraph) -> Self {
        let ncliques = graph.number_cliques();
        let mut source = vec![0i64; ncliques];
        for (cid, label) in source.iter_mut().enumerate() {
            *label = graph
                .outgoing_edges(cid)
                .iter()
                .map(|&eid| graph.edge(eid).score)
                .filter(|&s| s != FORBIDDEN_SCORE)
                .max()
                .map_or(0, i64::from);
        }
        Self {
            source,
            target: vec![0i64; ncliques],
        }
    }

    #[inline]
    fn slack_of(&self, graph: &AssignmentGraph, eid: usize) -> i64 {
        let e = graph.edge(eid);
        self.source[e.source] + self.target[e.target] - i64::from(e.score)
    }

    /// Shifts the labels by `delta` across the alternating tree, preserving
    /// feasibility while tightening at least one new edge.
    fn update(&mut self, delta: i64, tree: &AlternatingTree) {
        for (cid, label) in self.source.iter_mut().enumerate() {
            if tree.in_s[cid] {
                *label -= delta;
            }
        }
        for (cid, label) in self.target.iter_mut().enumerate() {
            if tree.in_t[cid] {
                *label += delta;
            }
        }
    }
}

// ============================================================================
// Slack array
// ============================================================================

/// For each target half `t`, the minimum of `l(s) + l(t) - w(s, t)` over the
/// sources `s` currently in the alternating tree, plus the witness source and
/// edge achieving it. Maintaining this incrementally is what brings the solve
/// down to O(n^3).
struct SlackArray {
    min_slack: Vec<i64>,
    witness: Vec<Option<usize>>,
    edge: Vec<Option<usize>>,
}

impl SlackArray {
    fn new(ncliques: usize) -> Self {
        Self {
            min_slack: vec![i64::MAX; ncliques],
            witness: vec![None; ncliques],
            edge: vec![None; ncliques],
        }
    }

    /// Folds the admissible outgoing edges of a source newly added to the
    /// tree into the per-target minima.
    fn absorb_source(&mut self, graph: &AssignmentGraph, labeling: &VertexLabeling, source: usize) {
        for &eid in graph.outgoing_edges(source) {
            let e = graph.edge(eid);
            if e.score == FORBIDDEN_SCORE {
                continue;
            }
            let slack = labeling.slack_of(graph, eid);
            if slack < self.min_slack[e.target] {
                self.min_slack[e.target] = slack;
                self.witness[e.target] = Some(source);
                self.edge[e.target] = Some(eid);
            }
        }
    }

    /// Computes the global minimum slack over targets outside the tree and
    /// reduces those entries by it.
    ///
    /// # Errors
    /// `NoPerfectMatching` when no target outside the tree is reachable at
    /// all (only forbidden connectivity remains).
    fn reduce(&mut self, tree: &AlternatingTree) -> Result<i64, SolveError> {
        let mut delta = i64::MAX;
        for (t, &slack) in self.min_slack.iter().enumerate() {
            if self.witness[t].is_some() && !tree.in_t[t] {
                delta = delta.min(slack);
            }
        }
        if delta == i64::MAX {
            return Err(SolveError::NoPerfectMatching);
        }
        for (t, slack) in self.min_slack.iter_mut().enumerate() {
            if self.witness[t].is_some() && !tree.in_t[t] {
                *slack -= delta;
            }
        }
        Ok(delta)
    }
}

// ============================================================================
// Alternating tree
// ============================================================================

/// Tree rooted at an exposed source, with back-pointers for rebuilding the
/// augmenting path once an exposed target is reached.
struct AlternatingTree {
    in_s: Vec<bool>,
    in_t: Vec<bool>,
    /// Per source: the previous target along the tree.
    source_prev: Vec<Option<usize>>,
    source_prev_edge: Vec<Option<usize>>,
    /// Per target: the previous source along the tree.
    target_prev: Vec<Option<usize>>,
    target_prev_edge: Vec<Option<usize>>,
    root: usize,
    end_target: Option<usize>,
}

impl AlternatingTree {
    fn new(ncliques: usize, root: usize) -> Self {
        let mut tree = Self {
            in_s: vec![false; ncliques],
            in_t: vec![false; ncliques],
            source_prev: vec![None; ncliques],
            source_prev_edge: vec![None; ncliques],
            target_prev: vec![None; ncliques],
            target_prev_edge: vec![None; ncliques],
            root,
            end_target: None,
        };
        tree.in_s[root] = true;
        tree
    }

    #[inline]
    fn path_found(&self) -> bool {
        self.end_target.is_some()
    }

    /// Extends the tree with `(s1, t)` and the matched edge `(t, s2)`.
    fn add_two_edges(&mut self, s1: usize, t: usize, s2: usize, edge_s1_t: usize, edge_t_s2: usize) {
        debug_assert!(self.in_s[s1], "tree edge from a source outside S");
        self.in_t[t] = true;
        self.in_s[s2] = true;
        self.source_prev[s2] = Some(t);
        self.source_prev_edge[s2] = Some(edge_t_s2);
        self.target_prev[t] = Some(s1);
        self.target_prev_edge[t] = Some(edge_s1_t);
    }

    /// Extends the tree with `(s1, t)` alone; `t`'s matched source is already
    /// in the tree.
    fn add_single_edge(&mut self, s1: usize, t: usize, edge_s1_t: usize) {
        debug_assert!(self.in_s[s1], "tree edge from a source outside S");
        self.in_t[t] = true;
        self.target_prev[t] = Some(s1);
        self.target_prev_edge[t] = Some(edge_s1_t);
    }

    /// Records the exposed target ending the augmenting path.
    fn set_end(&mut self, s1: usize, t: usize, edge_s1_t: usize) {
        self.end_target = Some(t);
        self.target_prev[t] = Some(s1);
        self.target_prev_edge[t] = Some(edge_s1_t);
    }

    /// Toggles the matching along the augmenting path: tree edges join it,
    /// the matched edges between them leave it. Grows the matching by one.
    fn apply(&self, graph: &AssignmentGraph, matching: &mut Matching) -> Result<(), SolveError> {
        let end = self
            .end_target
            .ok_or(SolveError::BrokenInvariant("augmenting path not found"))?;
        debug_assert!(!matching.is_source(self.root), "root is not exposed");
        debug_assert!(!matching.is_target(end), "end target is not exposed");
        let before = matching.len();

        let mut to_add = Vec::new();
        let mut to_remove = Vec::new();
        let mut t = end;
        loop {
            let eid = self.target_prev_edge[t]
                .ok_or(SolveError::BrokenInvariant("target without tree edge"))?;
            let s = self.target_prev[t]
                .ok_or(SolveError::BrokenInvariant("target without predecessor"))?;
            to_add.push(eid);
            match self.source_prev[s] {
                None => break,
                Some(prev_t) => {
                    let matched_eid = self.source_prev_edge[s]
                        .ok_or(SolveError::BrokenInvariant("source without tree edge"))?;
                    to_remove.push(matched_eid);
                    t = prev_t;
                }
            }
        }
        for eid in to_remove {
            matching.remove_edge(graph, eid);
        }
        for eid in to_add {
            matching.add_edge(graph, eid);
        }
        if matching.len() != before + 1 {
            return Err(SolveError::BrokenInvariant(
                "augmenting path did not grow the matching",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Augmentation rounds
// ============================================================================

/// Picks the root for the next alternating tree: a uniformly random exposed
/// source. This is the solver's only source of randomness.
fn find_exposed_source<R: Rng>(
    graph: &AssignmentGraph,
    matching: &Matching,
    rng: &mut R,
) -> Option<usize> {
    graph
        .cliques_in_random_order(rng)
        .into_iter()
        .find(|&cid| !matching.is_source(cid))
}

/// Breadth-first search of the equality subgraph from the queued sources.
fn search_equality_subgraph(
    graph: &AssignmentGraph,
    queue: &mut VecDeque<usize>,
    tree: &mut AlternatingTree,
    slack: &mut SlackArray,
    matching: &Matching,
    labeling: &VertexLabeling,
) -> Result<(), SolveError> {
    while !tree.path_found() {
        let Some(s) = queue.pop_front() else { break };
        for &eid in graph.outgoing_edges(s) {
            let e = graph.edge(eid);
            if e.score == FORBIDDEN_SCORE || tree.in_t[e.target] {
                continue;
            }
            if labeling.slack_of(graph, eid) != 0 {
                continue;
            }
            let t = e.target;
            if !matching.is_target(t) {
                tree.set_end(s, t, eid);
                break;
            }
            let matched_eid = matching
                .edge_from_target(t)
                .ok_or(SolveError::BrokenInvariant("matched target without edge"))?;
            let s2 = graph.edge(matched_eid).source;
            queue.push_back(s2);
            tree.add_two_edges(s, t, s2, eid, matched_eid);
            slack.absorb_source(graph, labeling, s2);
        }
    }
    Ok(())
}

/// After a labeling update, scans for targets whose slack just reached zero
/// and folds them into the tree (or ends the path on an exposed one).
fn search_newly_tight_targets(
    graph: &AssignmentGraph,
    queue: &mut VecDeque<usize>,
    tree: &mut AlternatingTree,
    slack: &mut SlackArray,
    matching: &Matching,
    labeling: &VertexLabeling,
) -> Result<(), SolveError> {
    for t in 0..graph.number_cliques() {
        if tree.path_found() {
            break;
        }
        if tree.in_t[t] || slack.min_slack[t] != 0 {
            continue;
        }
        let s = slack.witness[t]
            .ok_or(SolveError::BrokenInvariant("tight target without witness"))?;
        let eid = slack.edge[t]
            .ok_or(SolveError::BrokenInvariant("tight target without edge"))?;
        if !matching.is_target(t) {
            tree.set_end(s, t, eid);
            break;
        }
        let matched_eid = matching
            .edge_from_target(t)
            .ok_or(SolveError::BrokenInvariant("matched target without edge"))?;
        let s2 = graph.edge(matched_eid).source;
        if tree.in_s[s2] {
            tree.add_single_edge(s, t, eid);
        } else {
            queue.push_back(s2);
            tree.add_two_edges(s, t, s2, eid, matched_eid);
            slack.absorb_source(graph, labeling, s2);
        }
    }
    Ok(())
}

/// One augmentation round: grows the matching by exactly one edge.
fn augment<R: Rng>(
    graph: &AssignmentGraph,
    matching: &mut Matching,
    labeling: &mut VertexLabeling,
    rng: &mut R,
) -> Result<(), SolveError> {
    let ncliques = graph.number_cliques();
    let root =
        find_exposed_source(graph, matching, rng).ok_or(SolveError::InconsistentGraph)?;

    let mut tree = AlternatingTree::new(ncliques, root);
    let mut slack = SlackArray::new(ncliques);
    slack.absorb_source(graph, labeling, root);
    let mut queue = VecDeque::with_capacity(ncliques);
    queue.push_back(root);

    loop {
        search_equality_subgraph(graph, &mut queue, &mut tree, &mut slack, matching, labeling)?;
        if tree.path_found() {
            break;
        }
        // The equality subgraph is exhausted; relax the labeling just enough
        // to tighten at least one new edge.
        let delta = slack.reduce(&tree)?;
        if delta == 0 {
            return Err(SolveError::NoPerfectMatching);
        }
        labeling.update(delta, &tree);
        search_newly_tight_targets(graph, &mut queue, &mut tree, &mut slack, matching, labeling)?;
        if tree.path_found() {
            break;
        }
    }
    tree.apply(graph, matching)
}

// ============================================================================
// Tests
// ============================================================================
