//! Per-group reply tree. Nodes are positions into the group's comment slice;
//! edges run parent → child and only exist for in-group, non-self parents.

use crate::record::Comment;
use crate::summary::RunSummary;
use ahash::AHashMap;

/// How a comment's `parent_id` resolves inside its own group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParentLink {
    /// Sentinel parent: a top-level comment.
    Missing,
    /// Parent is present in the group, at this node index.
    Valid(usize),
    /// Parent id does not match any comment in the group.
    Dangling,
    /// Comment names itself as its parent.
    SelfRef,
}

impl ParentLink {
    pub fn parent(self) -> Option<usize> {
        match self {
            ParentLink::Valid(p) => Some(p),
            _ => None,
        }
    }
}

/// Classify one comment's parent reference against the group's id index. O(1).
pub fn classify_parent(comment: &Comment, index: &AHashMap<&str, usize>) -> ParentLink {
    let Some(pid) = comment.parent_id.as_deref() else {
        return ParentLink::Missing;
    };
    if pid == comment.id {
        return ParentLink::SelfRef;
    }
    match index.get(pid) {
        Some(&p) => ParentLink::Valid(p),
        None => ParentLink::Dangling,
    }
}

pub struct ConversationTree<'a> {
    comments: &'a [Comment],
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    /// `dangling_parents`, `self_parents`, `duplicate_ids`, `cycle_breaks`.
    pub stats: RunSummary,
}

impl<'a> ConversationTree<'a> {
    /// Build the tree for one post group in a single pass.
    /// Missing, dangling and self-referencing parents all make the comment a root.
    /// When an id repeats, parent lookups resolve to its first row.
    pub fn build(group_key: &str, comments: &'a [Comment]) -> Self {
        let n = comments.len();
        let mut stats = RunSummary::default();

        let mut index: AHashMap<&str, usize> = AHashMap::with_capacity(n);
        for (i, c) in comments.iter().enumerate() {
            if index.insert(c.id.as_str(), i).is_some() {
                stats.duplicate_ids += 1;
            }
        }
        // insert() keeps the last row; re-point duplicates at their first occurrence
        if stats.duplicate_ids > 0 {
            for (i, c) in comments.iter().enumerate().rev() {
                index.insert(c.id.as_str(), i);
            }
            tracing::warn!("post {}: {} duplicate comment id(s)", group_key, stats.duplicate_ids);
        }

        let mut parent = vec![None; n];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut roots = Vec::new();

        for (i, c) in comments.iter().enumerate() {
            match classify_parent(c, &index) {
                ParentLink::Valid(p) => {
                    parent[i] = Some(p);
                    children[p].push(i);
                }
                ParentLink::Missing => roots.push(i),
                ParentLink::Dangling => {
                    stats.dangling_parents += 1;
                    tracing::debug!("post {}: comment {} replies to absent {:?}; treating as root", group_key, c.id, c.parent_id);
                    roots.push(i);
                }
                ParentLink::SelfRef => {
                    stats.self_parents += 1;
                    tracing::warn!("post {}: comment {} lists itself as parent; treating as root", group_key, c.id);
                    roots.push(i);
                }
            }
        }

        if stats.dangling_parents > 0 {
            tracing::warn!(
                "post {}: {} comment(s) reply to a parent outside the group; treated as roots",
                group_key,
                stats.dangling_parents
            );
        }

        Self { comments, parent, children, roots, stats }
    }

    pub fn len(&self) -> usize { self.comments.len() }
    pub fn is_empty(&self) -> bool { self.comments.is_empty() }
    pub fn comment(&self, node: usize) -> &'a Comment { &self.comments[node] }
    pub fn id(&self, node: usize) -> &'a str { self.comments[node].id.as_str() }
    pub fn parent(&self, node: usize) -> Option<usize> { self.parent[node] }
    pub fn children(&self, node: usize) -> &[usize] { &self.children[node] }
    pub fn roots(&self) -> &[usize] { &self.roots }
    pub fn is_root(&self, node: usize) -> bool { self.parent[node].is_none() }

    /// Turn a node on an unreached parent cycle into a root, cutting the edge
    /// from its in-cycle parent.
    pub(crate) fn promote_root(&mut self, node: usize) {
        if let Some(p) = self.parent[node].take() {
            self.children[p].retain(|&c| c != node);
        }
        self.roots.push(node);
        self.stats.cycle_breaks += 1;
    }
}
