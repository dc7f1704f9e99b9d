//! Breadth-first feature propagation from every root of a post's reply tree.

use crate::date::elapsed_floor;
use crate::tree::ConversationTree;
use std::collections::VecDeque;
use std::time::Duration;

/// Where a node sits relative to its root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub root: usize,
    pub depth: u32,
    pub time_since_root: Option<Duration>,
}

/// Assign root, depth and time since root to every node.
///
/// Each root is traversed outward along child edges; a node keeps the first
/// placement it receives and is never re-traversed. A node no root reaches
/// either sits on a parent cycle or descends from one. For each such node, in
/// input order, its parent chain is walked to the first repeated node; that
/// cycle member is promoted to a root and traversed from there, so every node
/// ends up placed and exactly one edge is cut per cycle.
pub fn propagate(tree: &mut ConversationTree<'_>, group_key: &str) -> Vec<Placement> {
    let n = tree.len();
    let mut placed: Vec<Option<Placement>> = vec![None; n];
    let mut queue: VecDeque<usize> = VecDeque::new();

    let declared = tree.roots().to_vec();
    for root in declared {
        traverse(tree, root, &mut placed, &mut queue);
    }

    let mut walked = vec![false; n];
    for node in 0..n {
        if placed[node].is_some() {
            continue;
        }
        let entry = cycle_entry(tree, node, &mut walked);
        tracing::warn!("post {}: comment {} is on a reply cycle; promoting to root", group_key, tree.id(entry));
        tree.promote_root(entry);
        traverse(tree, entry, &mut placed, &mut queue);
    }

    let out: Vec<Placement> = placed.into_iter().flatten().collect();
    debug_assert_eq!(out.len(), n);
    out
}

/// Follow parent links up from an unplaced node until one repeats. Every
/// unplaced node's ancestors are unplaced too, so the chain ends on a cycle.
fn cycle_entry(tree: &ConversationTree<'_>, start: usize, walked: &mut [bool]) -> usize {
    let mut node = start;
    loop {
        if walked[node] {
            return node;
        }
        walked[node] = true;
        match tree.parent(node) {
            Some(p) => node = p,
            None => return node,
        }
    }
}

fn traverse(
    tree: &ConversationTree<'_>,
    root: usize,
    placed: &mut [Option<Placement>],
    queue: &mut VecDeque<usize>,
) {
    if placed[root].is_some() {
        return;
    }
    let root_time = tree.comment(root).comment_date;
    placed[root] = Some(Placement {
        root,
        depth: 0,
        time_since_root: root_time.map(|_| Duration::ZERO),
    });

    queue.clear();
    queue.push_back(root);
    while let Some(node) = queue.pop_front() {
        let depth = placed[node].map(|p| p.depth).unwrap_or(0) + 1;
        for &child in tree.children(node) {
            if placed[child].is_some() {
                continue;
            }
            let time_since_root = match (root_time, tree.comment(child).comment_date) {
                (Some(r), Some(c)) => Some(elapsed_floor(r, c)),
                _ => None,
            };
            placed[child] = Some(Placement { root, depth, time_since_root });
            queue.push_back(child);
        }
    }
}
