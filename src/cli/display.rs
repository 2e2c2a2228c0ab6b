//! Terminal tree rendering of a category forest

use termtree::Tree;
use tracing::instrument;

use crate::domain::{Category, Forest};

pub trait ForestDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

impl ForestDisplay for Forest {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let mut tree = Tree::new(if self.is_empty() {
            "Empty tree".to_string()
        } else {
            "categories".to_string()
        });
        for root_id in self.roots() {
            let Some(root) = self.get(root_id) else {
                continue;
            };
            let leaves: Vec<_> = self
                .children_of(root_id)
                .into_iter()
                .filter_map(|id| self.get(id))
                .map(|child| Tree::new(label(child)))
                .collect();
            tree.push(Tree::new(label(root)).with_leaves(leaves));
        }
        tree
    }
}

fn label(category: &Category) -> String {
    if category.is_active {
        category.to_string()
    } else {
        format!("{category} [inactive]")
    }
}
