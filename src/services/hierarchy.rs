use std::collections::{HashMap, HashSet};

use uuid::Uuid;

/// Parent/child view over all systems.
///
/// Nodes live in a flat arena and refer to each other by index; the parent
/// link is the only stored edge, children are derived. Parents that are not
/// part of the arena are treated as absent.
#[derive(Debug, Default)]
pub struct SystemTree {
    nodes: Vec<TreeNode>,
    index: HashMap<Uuid, usize>,
}

#[derive(Debug)]
struct TreeNode {
    id: Uuid,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl SystemTree {
    /// Build from `(system_id, parent_system_id)` pairs.
    pub fn build<I>(links: I) -> Self
    where
        I: IntoIterator<Item = (Uuid, Option<Uuid>)>,
    {
        let links: Vec<(Uuid, Option<Uuid>)> = links.into_iter().collect();
        let mut tree = SystemTree::default();

        for (id, _) in &links {
            if tree.index.contains_key(id) {
                continue;
            }
            tree.index.insert(*id, tree.nodes.len());
            tree.nodes.push(TreeNode {
                id: *id,
                parent: None,
                children: Vec::new(),
            });
        }

        for (id, parent) in &links {
            let (Some(&child), Some(parent)) = (tree.index.get(id), parent) else {
                continue;
            };
            if let Some(&parent) = tree.index.get(parent) {
                tree.nodes[child].parent = Some(parent);
                tree.nodes[parent].children.push(child);
            }
        }

        tree
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent_of(&self, id: Uuid) -> Option<Uuid> {
        let node = &self.nodes[*self.index.get(&id)?];
        node.parent.map(|parent| self.nodes[parent].id)
    }

    /// Direct children in insertion order.
    pub fn children_of(&self, id: Uuid) -> Vec<Uuid> {
        match self.index.get(&id) {
            Some(&idx) => self.nodes[idx]
                .children
                .iter()
                .map(|&child| self.nodes[child].id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Ancestors nearest first. Stops if stored data already contains a loop.
    pub fn ancestors(&self, id: Uuid) -> Vec<Uuid> {
        let mut result = Vec::new();
        let Some(&start) = self.index.get(&id) else {
            return result;
        };

        let mut visited = HashSet::from([start]);
        let mut current = self.nodes[start].parent;
        while let Some(idx) = current {
            if !visited.insert(idx) {
                break;
            }
            result.push(self.nodes[idx].id);
            current = self.nodes[idx].parent;
        }
        result
    }

    /// Whether making `new_parent` the parent of `child` would close a loop.
    pub fn would_create_cycle(&self, child: Uuid, new_parent: Uuid) -> bool {
        child == new_parent || self.ancestors(new_parent).contains(&child)
    }
}
