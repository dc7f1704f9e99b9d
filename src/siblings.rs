use crate::tree::ConversationTree;

/// Peers per node: other roots of the group for a root, other children of the
/// same parent otherwise. Call after propagation so promoted roots are counted.
pub fn count_siblings(tree: &ConversationTree<'_>) -> Vec<u32> {
    let root_peers = tree.roots().len().saturating_sub(1) as u32;
    (0..tree.len())
        .map(|node| match tree.parent(node) {
            Some(p) => tree.children(p).len().saturating_sub(1) as u32,
            None => root_peers,
        })
        .collect()
}
