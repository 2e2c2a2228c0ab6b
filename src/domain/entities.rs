//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Identifier of a category, assigned by the remote store.
pub type CategoryId = i64;

/// Prefix used by drag sources for an explicit parent drop zone.
pub const CONTAINER_PREFIX: &str = "parent-";

/// Identifier of the drop zone that promotes a node to the top level.
pub const TOP_LEVEL_ZONE: &str = "root";

/// Category record in the nested wire shape served by `GET categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub children: Vec<CategoryNode>,
}

fn default_active() -> bool {
    true
}

impl CategoryNode {
    /// Active top-level record without children.
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
            order: 0,
            is_active: true,
            children: Vec::new(),
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Attach children, stamping their `parent_id` with this node's id.
    pub fn with_children(mut self, children: Vec<CategoryNode>) -> Self {
        let id = self.id;
        self.children = children
            .into_iter()
            .map(|mut c| {
                c.parent_id = Some(id);
                c
            })
            .collect();
        self
    }
}

/// Payload stored per arena slot. Placement (parent, children) lives in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub order: u32,
    pub is_active: bool,
}

impl From<&CategoryNode> for Category {
    fn from(node: &CategoryNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            order: node.order,
            is_active: node.is_active,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{}, order {})", self.name, self.id, self.order)
    }
}

/// One entry of the flattened change-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderItem {
    pub id: CategoryId,
    pub parent_id: Option<CategoryId>,
    pub order: u32,
}

/// Body of `POST categories/reorder`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub items: Vec<ReorderItem>,
}

/// Where a dragged node was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropTarget {
    /// Explicit drop zone of a top-level category (`parent-<id>`).
    Container(CategoryId),
    /// Another category row (`<id>`).
    Node(CategoryId),
    /// Top-level drop zone (`root`).
    TopLevel,
}

impl FromStr for DropTarget {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == TOP_LEVEL_ZONE {
            return Ok(DropTarget::TopLevel);
        }
        let invalid = || DomainError::InvalidDropTarget(s.to_string());
        match s.strip_prefix(CONTAINER_PREFIX) {
            Some(rest) => rest
                .parse::<CategoryId>()
                .map(DropTarget::Container)
                .map_err(|_| invalid()),
            None => s
                .parse::<CategoryId>()
                .map(DropTarget::Node)
                .map_err(|_| invalid()),
        }
    }
}

impl fmt::Display for DropTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropTarget::Container(id) => write!(f, "{CONTAINER_PREFIX}{id}"),
            DropTarget::Node(id) => write!(f, "{id}"),
            DropTarget::TopLevel => f.write_str(TOP_LEVEL_ZONE),
        }
    }
}

/// Drag-end event as delivered by the drag source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragEnd {
    pub dragged: CategoryId,
    /// `None` when the node was released outside any drop target.
    pub over: Option<DropTarget>,
}

impl DragEnd {
    pub fn new(dragged: CategoryId, over: Option<DropTarget>) -> Self {
        Self { dragged, over }
    }

    /// Decode the raw string ids a drag library hands out.
    pub fn from_ids(active: &str, over: Option<&str>) -> Result<Self, DomainError> {
        let dragged = active
            .trim()
            .parse::<CategoryId>()
            .map_err(|_| DomainError::InvalidDropTarget(active.to_string()))?;
        let over = over.map(str::parse::<DropTarget>).transpose()?;
        Ok(Self { dragged, over })
    }

    /// Released outside any target, or onto its own row or drop zone.
    pub fn is_noop(&self) -> bool {
        match self.over {
            None => true,
            Some(DropTarget::Node(id)) | Some(DropTarget::Container(id)) => id == self.dragged,
            Some(DropTarget::TopLevel) => false,
        }
    }
}

/// Flat row for list/table rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub id: CategoryId,
    pub name: String,
    /// 0 for top level, 1 for children.
    pub level: usize,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_container_id_when_parsing_then_yields_container() {
        assert_eq!(
            "parent-12".parse::<DropTarget>().unwrap(),
            DropTarget::Container(12)
        );
        assert_eq!("7".parse::<DropTarget>().unwrap(), DropTarget::Node(7));
        assert_eq!("root".parse::<DropTarget>().unwrap(), DropTarget::TopLevel);
    }

    #[test]
    fn given_garbage_when_parsing_then_invalid_drop_target() {
        assert_eq!(
            "parent-x".parse::<DropTarget>(),
            Err(DomainError::InvalidDropTarget("parent-x".into()))
        );
        assert!("".parse::<DropTarget>().is_err());
    }

    #[test]
    fn given_drop_target_when_displayed_then_round_trips_through_parse() {
        for target in [DropTarget::Container(3), DropTarget::Node(4), DropTarget::TopLevel] {
            assert_eq!(target.to_string().parse::<DropTarget>().unwrap(), target);
        }
    }

    #[test]
    fn given_drop_outside_or_on_self_when_checking_then_noop() {
        assert!(DragEnd::from_ids("5", None).unwrap().is_noop());
        assert!(DragEnd::from_ids("5", Some("5")).unwrap().is_noop());
        assert!(DragEnd::from_ids("5", Some("parent-5")).unwrap().is_noop());
        assert!(!DragEnd::from_ids("5", Some("root")).unwrap().is_noop());
        assert!(!DragEnd::from_ids("5", Some("6")).unwrap().is_noop());
    }

    #[test]
    fn given_record_without_optional_fields_when_deserializing_then_defaults_apply() {
        let node: CategoryNode = serde_json::from_str(r#"{"id": 1, "name": "A"}"#).unwrap();
        assert_eq!(node.parent_id, None);
        assert_eq!(node.order, 0);
        assert!(node.is_active);
        assert!(node.children.is_empty());
    }

    #[test]
    fn given_top_level_item_when_serializing_then_parent_id_is_null() {
        let item = ReorderItem {
            id: 1,
            parent_id: None,
            order: 1,
        };
        assert_eq!(
            serde_json::to_string(&item).unwrap(),
            r#"{"id":1,"parent_id":null,"order":1}"#
        );
    }
}
