//! Lossless translation between the constraint view and the bipartite view.
//!
//! A finite constraint cost `c` becomes the edge score `-c`; an infinite
//! constraint (or the self pair) means the candidate edge is not emitted at
//! all. Inverting the mapping, a *missing* bipartite edge is an infinite
//! constraint and score `0` is "no constraint".

use crate::bipartite::{AssignmentGraph, MatchEdge, FORBIDDEN_SCORE};
use crate::constraint::{ConstraintGraph, INFINITE_COST};

#[inline]
fn score_from_cost(cost: u32) -> i32 {
    if cost == INFINITE_COST {
        FORBIDDEN_SCORE
    } else {
        -(cost as i32)
    }
}

#[inline]
fn cost_from_score(score: i32) -> u32 {
    if score == FORBIDDEN_SCORE {
        INFINITE_COST
    } else {
        score.wrapping_neg() as u32
    }
}

/// Projects a constraint graph onto its bipartite matching view.
///
/// For every ordered pair `(i, j)` of distinct cliques, exactly one candidate
/// edge `i.source -> j.target` is emitted unless the pair carries an infinite
/// constraint: score `-c` for a finite constraint `c`, score `0` otherwise.
/// Candidate edges are emitted in `(i, j)` lexicographic order, which the
/// serialized forms rely on.
pub fn to_assignment_graph(graph: &ConstraintGraph) -> AssignmentGraph {
    let ncliques = graph.number_vertices();
    let mut out = AssignmentGraph::new(ncliques);
    let mut scores = vec![0i32; ncliques];
    for id in 0..ncliques {
        scores.fill(0);
        scores[id] = FORBIDDEN_SCORE;
        for e in graph.constraints(id) {
            scores[e.target] = score_from_cost(e.cost);
        }
        for (cid, &score) in scores.iter().enumerate() {
            if score != FORBIDDEN_SCORE {
                out.add_directed_edge(id, cid, score);
            }
        }
    }
    out
}

/// Rebuilds the constraint graph implied by a bipartite matching view.
///
/// Missing candidate edges invert to infinite constraints; score `0` edges
/// invert to no constraint at all. Each constraint is emitted once, from the
/// smaller-indexed endpoint's scan, so the output order is canonical: for
/// clique `c`, first the constraints `c -> j` then the constraints `j -> c`,
/// both for `j > c` in ascending order.
pub fn to_constraint_graph(graph: &AssignmentGraph) -> ConstraintGraph {
    let nvertices = graph.number_cliques();
    let mut out = ConstraintGraph::new(nvertices);
    let mut costs = vec![0u32; nvertices];
    for cid in 0..nvertices {
        // Source half of `cid`: constraints cid -> j.
        costs.fill(INFINITE_COST);
        for &eid in graph.outgoing_edges(cid) {
            let e = graph.edge(eid);
            costs[e.target] = cost_from_score(e.score);
        }
        for (j, &cost) in costs.iter().enumerate().skip(cid + 1) {
            if cost != 0 {
                out.add_directed_edge(cid, j, cost);
            }
        }
        // Target half of `cid`: constraints j -> cid.
        costs.fill(INFINITE_COST);
        for &eid in graph.incoming_edges(cid) {
            let e = graph.edge(eid);
            costs[e.source] = cost_from_score(e.score);
        }
        for (j, &cost) in costs.iter().enumerate().skip(cid + 1) {
            if cost != 0 {
                out.add_directed_edge(j, cid, cost);
            }
        }
    }
    out
}

/// Projects a bipartite matching (edge handles) onto the generic array form:
/// entry `i` holds the target clique matched to source clique `i`.
pub fn to_generic_matching(graph: &AssignmentGraph, matching: &[usize]) -> Vec<usize> {
    let mut generic = vec![usize::MAX; matching.len()];
    for &eid in matching {
        let MatchEdge { source, target, .. } = graph.edge(eid);
        debug_assert!(source < generic.len(), "matching is not perfect");
        generic[source] = target;
    }
    debug_assert!(
        generic.iter().all(|&t| t != usize::MAX),
        "matching leaves a source unmatched"
    );
    generic
}

/// Renders a generic matching as a comma-separated target list (`"1,2,0"`).
pub fn to_string_matching(matching: &[usize]) -> String {
    let mut out = String::new();
    for (i, target) in matching.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&target.to_string());
    }
    out
}
