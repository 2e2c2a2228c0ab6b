use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{Category, CategoryId, CategoryNode, DisplayRow};
use crate::domain::error::{DomainError, TreeResult};

/// Tree node in the arena-based category forest.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Category payload for this node
    pub data: Category,
    /// Index of parent node in the arena, None for top-level nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in display order
    pub children: Vec<Index>,
}

/// Read-only view of one category and its placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeView<'a> {
    pub category: &'a Category,
    pub parent_id: Option<CategoryId>,
    pub child_ids: Vec<CategoryId>,
}

/// One step of a pre-order walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit<'a> {
    pub category: &'a Category,
    pub parent_id: Option<CategoryId>,
    pub level: usize,
}

/// Top-level category with its children, detached from any arena.
pub(crate) type Group = (Category, Vec<Category>);

/// Arena-based category forest, indexed by category id.
///
/// Holds at most two levels: top-level categories and their direct children.
/// Values are never edited in place by the reorder engine; every structural
/// change or order rewrite builds a fresh `Forest`.
#[derive(Debug, Clone)]
pub struct Forest {
    /// Arena storage for all nodes
    arena: Arena<TreeNode>,
    /// Category id to arena slot
    ids: HashMap<CategoryId, Index>,
    /// Top-level nodes, in display order
    roots: Vec<Index>,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Forest {
    fn eq(&self, other: &Self) -> bool {
        self.to_nodes() == other.to_nodes()
    }
}

impl Eq for Forest {}

impl Forest {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            ids: HashMap::new(),
            roots: Vec::new(),
        }
    }

    /// Build a forest from nested wire records, validating the two-level shape.
    #[instrument(level = "debug", skip(nodes), fields(count = nodes.len()))]
    pub fn from_nodes(nodes: &[CategoryNode]) -> TreeResult<Self> {
        let mut forest = Self::new();
        for node in nodes {
            if node.parent_id.is_some() {
                return Err(DomainError::ParentMismatch {
                    id: node.id,
                    declared: node.parent_id,
                    actual: None,
                });
            }
            let root_idx = forest.insert_node(Category::from(node), None)?;
            for child in &node.children {
                if let Some(grandchild) = child.children.first() {
                    return Err(DomainError::DepthExceeded {
                        id: grandchild.id,
                        parent: child.id,
                    });
                }
                if child.parent_id != Some(node.id) {
                    return Err(DomainError::ParentMismatch {
                        id: child.id,
                        declared: child.parent_id,
                        actual: Some(node.id),
                    });
                }
                forest.insert_node(Category::from(child), Some(root_idx))?;
            }
        }
        Ok(forest)
    }

    /// Nested wire records, `parent_id` derived from position.
    pub fn to_nodes(&self) -> Vec<CategoryNode> {
        self.roots
            .iter()
            .filter_map(|&idx| self.arena.get(idx))
            .map(|root| {
                let children = root
                    .children
                    .iter()
                    .filter_map(|&c| self.arena.get(c))
                    .map(|child| self.to_wire(child, Some(root.data.id), Vec::new()))
                    .collect();
                self.to_wire(root, None, children)
            })
            .collect()
    }

    fn to_wire(
        &self,
        node: &TreeNode,
        parent_id: Option<CategoryId>,
        children: Vec<CategoryNode>,
    ) -> CategoryNode {
        CategoryNode {
            id: node.data.id,
            name: node.data.name.clone(),
            parent_id,
            order: node.data.order,
            is_active: node.data.is_active,
            children,
        }
    }

    /// Checked insert used when loading external data.
    #[instrument(level = "trace", skip(self))]
    fn insert_node(&mut self, data: Category, parent: Option<Index>) -> TreeResult<Index> {
        if self.ids.contains_key(&data.id) {
            return Err(DomainError::DuplicateId(data.id));
        }
        if let Some(parent_idx) = parent {
            let parent_node = self
                .arena
                .get(parent_idx)
                .ok_or(DomainError::UnknownParent(data.id))?;
            if parent_node.parent.is_some() {
                return Err(DomainError::DepthExceeded {
                    id: data.id,
                    parent: parent_node.data.id,
                });
            }
        }
        Ok(self.push(data, parent))
    }

    fn push(&mut self, data: Category, parent: Option<Index>) -> Index {
        let id = data.id;
        let node_idx = self.arena.insert(TreeNode {
            data,
            parent,
            children: Vec::new(),
        });
        self.ids.insert(id, node_idx);

        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_node) => parent_node.children.push(node_idx),
            None => self.roots.push(node_idx),
        }
        node_idx
    }

    /// Detach every top-level node with its children, in display order.
    pub(crate) fn groups(&self) -> Vec<Group> {
        self.roots
            .iter()
            .filter_map(|&idx| self.arena.get(idx))
            .map(|root| {
                let children = root
                    .children
                    .iter()
                    .filter_map(|&c| self.arena.get(c))
                    .map(|c| c.data.clone())
                    .collect();
                (root.data.clone(), children)
            })
            .collect()
    }

    /// Build a fresh forest from detached groups. Ids are unique by construction.
    pub(crate) fn from_groups(groups: Vec<Group>) -> Self {
        let mut forest = Self::new();
        for (root, children) in groups {
            let root_idx = forest.push(root, None);
            for child in children {
                forest.push(child, Some(root_idx));
            }
        }
        forest
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.ids.contains_key(&id)
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.node(id).map(|n| &n.data)
    }

    fn node(&self, id: CategoryId) -> Option<&TreeNode> {
        self.ids.get(&id).and_then(|&idx| self.arena.get(idx))
    }

    fn id_of(&self, idx: Index) -> Option<CategoryId> {
        self.arena.get(idx).map(|n| n.data.id)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn entry(&self, id: CategoryId) -> Option<NodeView<'_>> {
        let node = self.node(id)?;
        Some(NodeView {
            category: &node.data,
            parent_id: node.parent.and_then(|p| self.id_of(p)),
            child_ids: node
                .children
                .iter()
                .filter_map(|&c| self.id_of(c))
                .collect(),
        })
    }

    /// True if the category exists and sits at the top level.
    pub fn is_top_level(&self, id: CategoryId) -> bool {
        self.node(id).is_some_and(|n| n.parent.is_none())
    }

    pub fn has_children(&self, id: CategoryId) -> bool {
        self.node(id).is_some_and(|n| !n.children.is_empty())
    }

    pub fn roots(&self) -> Vec<CategoryId> {
        self.roots.iter().filter_map(|&idx| self.id_of(idx)).collect()
    }

    pub fn children_of(&self, id: CategoryId) -> Vec<CategoryId> {
        self.node(id)
            .map(|n| n.children.iter().filter_map(|&c| self.id_of(c)).collect())
            .unwrap_or_default()
    }

    /// Number of levels: 0 when empty, 1 when flat, 2 when any node has children.
    pub fn depth(&self) -> usize {
        self.iter().map(|v| v.level + 1).max().unwrap_or(0)
    }

    /// Pre-order walk: each top-level node followed by its children.
    pub fn iter(&self) -> ForestIter<'_> {
        ForestIter::new(self)
    }

    /// Flat rows for list rendering, in pre-order.
    pub fn rows(&self) -> Vec<DisplayRow> {
        self.iter()
            .map(|v| DisplayRow {
                id: v.category.id,
                name: v.category.name.clone(),
                level: v.level,
                is_active: v.category.is_active,
            })
            .collect()
    }

    /// True if every sibling group carries orders `1..=n` in display order.
    pub fn orders_are_dense(&self) -> bool {
        self.sparse_groups().is_empty()
    }

    /// Sibling groups whose orders are not `1..=n`, named by parent
    /// (`None` for the top level).
    pub fn sparse_groups(&self) -> Vec<Option<CategoryId>> {
        let dense = |group: &[Index]| {
            group.iter().enumerate().all(|(pos, &idx)| {
                self.arena
                    .get(idx)
                    .is_some_and(|n| n.data.order as usize == pos + 1)
            })
        };
        let mut sparse = Vec::new();
        if !dense(&self.roots) {
            sparse.push(None);
        }
        sparse.extend(
            self.roots
                .iter()
                .filter_map(|&idx| self.arena.get(idx))
                .filter(|root| !dense(&root.children))
                .map(|root| Some(root.data.id)),
        );
        sparse
    }

    /// Copy of this forest with `order` replaced for the given ids.
    pub(crate) fn with_orders(&self, orders: &HashMap<CategoryId, u32>) -> Self {
        let stamp = |mut c: Category| {
            if let Some(&order) = orders.get(&c.id) {
                c.order = order;
            }
            c
        };
        let groups = self
            .groups()
            .into_iter()
            .map(|(root, children)| (stamp(root), children.into_iter().map(stamp).collect()))
            .collect();
        Self::from_groups(groups)
    }
}

impl fmt::Display for Forest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for visit in self.iter() {
            writeln!(f, "{}{}", "  ".repeat(visit.level), visit.category)?;
        }
        Ok(())
    }
}

pub struct ForestIter<'a> {
    forest: &'a Forest,
    stack: Vec<(Index, usize)>,
}

impl<'a> ForestIter<'a> {
    fn new(forest: &'a Forest) -> Self {
        // Reverse so the first root is popped first
        let stack = forest.roots.iter().rev().map(|&idx| (idx, 0)).collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for ForestIter<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, level)) = self.stack.pop() {
            if let Some(node) = self.forest.arena.get(current_idx) {
                for &child in node.children.iter().rev() {
                    self.stack.push((child, level + 1));
                }
                return Some(Visit {
                    category: &node.data,
                    parent_id: node.parent.and_then(|p| self.forest.id_of(p)),
                    level,
                });
            }
        }
        None
    }
}
