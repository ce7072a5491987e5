//! Forest indexing for parent-linked entities.
//!
//! Bosses and tasks self-reference through optional parent ids. Rather
//! than walking the flat list recursively at every use site, callers build
//! a `ChildIndex` once per read and query it.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// Children-by-parent index over a flat entity list.
#[derive(Debug, Clone)]
pub struct ChildIndex<Id> {
    children: HashMap<Id, Vec<Id>>,
    roots: Vec<Id>,
}

impl<Id: Copy + Eq + Hash> ChildIndex<Id> {
    /// Build from `(id, parent_id)` pairs. Entities whose parent is absent
    /// from the input count as roots.
    pub fn build(items: impl IntoIterator<Item = (Id, Option<Id>)>) -> Self {
        let pairs: Vec<(Id, Option<Id>)> = items.into_iter().collect();
        let known: HashSet<Id> = pairs.iter().map(|(id, _)| *id).collect();

        let mut children: HashMap<Id, Vec<Id>> = HashMap::new();
        let mut roots = Vec::new();
        for (id, parent) in pairs {
            match parent.filter(|p| known.contains(p)) {
                Some(parent) => children.entry(parent).or_default().push(id),
                None => roots.push(id),
            }
        }
        Self { children, roots }
    }

    /// Direct children of a node.
    pub fn children(&self, id: Id) -> &[Id] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entities with no (known) parent.
    pub fn roots(&self) -> &[Id] {
        &self.roots
    }

    /// All transitive descendants of `root`, excluding `root` itself.
    pub fn descendants(&self, root: Id) -> Vec<Id> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([root]);
        let mut queue: VecDeque<Id> = self.children(root).iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            queue.extend(self.children(id).iter().copied());
            out.push(id);
        }
        out
    }
}

/// Whether re-parenting `node` under `new_parent` would make `node` its own
/// ancestor. Walks the parent chain from `new_parent`; a pre-existing cycle
/// in the chain also counts.
pub fn would_create_cycle<Id: Copy + Eq + Hash>(
    node: Id,
    new_parent: Id,
    parent_of: &HashMap<Id, Id>,
) -> bool {
    let mut seen = HashSet::new();
    let mut current = Some(new_parent);
    while let Some(id) = current {
        if id == node || !seen.insert(id) {
            return true;
        }
        current = parent_of.get(&id).copied();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_children_and_roots() {
        // 1 -> {2, 3}, 2 -> {4}
        let index = ChildIndex::build([(1, None), (2, Some(1)), (3, Some(1)), (4, Some(2))]);
        assert_eq!(index.roots(), &[1]);
        assert_eq!(index.children(1), &[2, 3]);
        assert_eq!(index.children(4), &[] as &[i32]);
    }

    #[test]
    fn unknown_parent_counts_as_root() {
        let index = ChildIndex::build([(1, Some(99)), (2, Some(1))]);
        assert_eq!(index.roots(), &[1]);
        assert_eq!(index.children(1), &[2]);
    }

    #[test]
    fn descendants_are_transitive_and_exclusive() {
        let index = ChildIndex::build([
            (1, None),
            (2, Some(1)),
            (3, Some(2)),
            (4, Some(3)),
            (5, None),
        ]);
        let mut descendants = index.descendants(1);
        descendants.sort();
        assert_eq!(descendants, vec![2, 3, 4]);
        assert!(index.descendants(5).is_empty());
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let parent_of = HashMap::new();
        assert!(would_create_cycle(1, 1, &parent_of));
    }

    #[test]
    fn ancestor_cycle_detected() {
        // 3 -> 2 -> 1; making 1 a child of 3 closes the loop
        let parent_of = HashMap::from([(2, 1), (3, 2)]);
        assert!(would_create_cycle(1, 3, &parent_of));
        // Making 3 a child of an unrelated node is fine
        assert!(!would_create_cycle(3, 4, &parent_of));
    }

    #[test]
    fn preexisting_cycle_in_chain_detected() {
        let parent_of = HashMap::from([(2, 3), (3, 2)]);
        assert!(would_create_cycle(1, 2, &parent_of));
    }
}
