use std::collections::{HashMap, HashSet};

use shared::{
    domain::{CategoryId, CategoryType},
    protocol::CategoryRecord,
};
use tracing::warn;

/// One category with its children replaced by ids into the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: CategoryId,
    pub title: String,
    pub alias: String,
    pub kind: CategoryType,
    pub level: u32,
    pub parent_id: Option<CategoryId>,
    pub children: Vec<CategoryId>,
}

impl CategoryNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Arena view of the nested category list, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: HashMap<CategoryId, CategoryNode>,
    roots: Vec<CategoryId>,
}

impl CategoryTree {
    /// Flattens nested records into the arena, keeping sibling order.
    ///
    /// A node whose id was already seen is dropped together with its subtree,
    /// so every id appears once and has at most one parent.
    pub fn from_records(records: &[CategoryRecord]) -> Self {
        let mut tree = Self::default();
        // (record, parent) pairs; parent None for roots
        let mut stack: Vec<(&CategoryRecord, Option<CategoryId>)> =
            records.iter().rev().map(|record| (record, None)).collect();

        while let Some((record, parent)) = stack.pop() {
            if tree.nodes.contains_key(&record.id) {
                warn!(id = %record.id, "duplicate category id in listing; skipping subtree");
                continue;
            }
            match parent {
                Some(parent_id) => {
                    if let Some(parent_node) = tree.nodes.get_mut(&parent_id) {
                        parent_node.children.push(record.id);
                    }
                }
                None => tree.roots.push(record.id),
            }
            tree.nodes.insert(
                record.id,
                CategoryNode {
                    id: record.id,
                    title: record.title.clone(),
                    alias: record.alias.clone(),
                    kind: record.kind,
                    level: record.level,
                    parent_id: record.parent_id.or(parent),
                    children: Vec::new(),
                },
            );
            for child in record.children().iter().rev() {
                stack.push((child, Some(record.id)));
            }
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[CategoryId] {
        &self.roots
    }

    pub fn node(&self, id: CategoryId) -> Option<&CategoryNode> {
        self.nodes.get(&id)
    }

    /// Pre-order walk from the roots, calling `visit` with each node and its
    /// depth. `descend` decides whether a node's children are visited.
    fn walk(
        &self,
        mut descend: impl FnMut(&CategoryNode) -> bool,
        mut visit: impl FnMut(&CategoryNode, usize),
    ) {
        let mut stack: Vec<(CategoryId, usize)> =
            self.roots.iter().rev().map(|id| (*id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            visit(node, depth);
            if node.has_children() && descend(node) {
                for child in node.children.iter().rev() {
                    stack.push((*child, depth + 1));
                }
            }
        }
    }

    /// Ids of every node with at least one child, in pre-order.
    pub fn parent_ids(&self) -> Vec<CategoryId> {
        let mut ids = Vec::new();
        self.walk(
            |_| true,
            |node, _| {
                if node.has_children() {
                    ids.push(node.id);
                }
            },
        );
        ids
    }

    /// Rows currently on screen: a subtree is shown only below a parent that
    /// is in `expansion`.
    pub fn visible_rows(&self, expansion: &ExpansionSet) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        self.walk(
            |node| expansion.contains(node.id),
            |node, depth| {
                rows.push(TreeRow {
                    id: node.id,
                    title: node.title.clone(),
                    alias: node.alias.clone(),
                    kind: node.kind,
                    depth,
                    has_children: node.has_children(),
                    expanded: node.has_children() && expansion.contains(node.id),
                });
            },
        );
        rows
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: CategoryId,
    pub title: String,
    pub alias: String,
    pub kind: CategoryType,
    pub depth: usize,
    /// Whether an expand/collapse control belongs on this row.
    pub has_children: bool,
    pub expanded: bool,
}

/// Ids of the categories currently shown expanded.
///
/// Kept apart from the tree so that collapsing a parent leaves its
/// descendants' own flags alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionSet {
    ids: HashSet<CategoryId>,
}

impl ExpansionSet {
    pub fn contains(&self, id: CategoryId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn expand_all(&mut self, tree: &CategoryTree) {
        self.ids.extend(tree.parent_ids());
    }

    pub fn collapse_all(&mut self) {
        self.ids.clear();
    }

    /// Flips `id`. Leaves and unknown ids have no control, so this is a no-op
    /// for them. Returns whether the set changed.
    pub fn toggle(&mut self, tree: &CategoryTree, id: CategoryId) -> bool {
        if !tree.node(id).is_some_and(CategoryNode::has_children) {
            return false;
        }
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
        true
    }
}

#[cfg(test)]
#[path = "tests/tree_tests.rs"]
mod tests;
