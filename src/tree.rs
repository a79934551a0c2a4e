use std::collections::BTreeMap;

use crate::gcp::Instance;

/// A node in the two-level instance hierarchy.
///
/// Groups sit at depth 0 and own their member instances; instances either
/// belong to a group (depth 1) or stand alone at the top level (depth 0).
/// Depth is fixed at construction; only `expanded` ever changes, and only
/// on groups.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Group {
        name: String,
        expanded: bool,
        children: Vec<TreeNode>,
    },
    Instance {
        name: String,
        group: String,
        vm: Instance,
        depth: usize,
    },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Group { name, .. } => name,
            TreeNode::Instance { name, .. } => name,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, TreeNode::Group { .. })
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self, TreeNode::Group { expanded: true, .. })
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Group { .. } => 0,
            TreeNode::Instance { depth, .. } => *depth,
        }
    }

    fn grouped_instance(vm: Instance, group: &str) -> Self {
        TreeNode::Instance {
            name: vm.name.clone(),
            group: group.to_string(),
            vm,
            depth: 1,
        }
    }

    fn ungrouped_instance(vm: Instance) -> Self {
        TreeNode::Instance {
            name: vm.name.clone(),
            group: String::new(),
            vm,
            depth: 0,
        }
    }
}

/// The canonical instance hierarchy for the selected project.
///
/// This is the single authoritative model; filtered views are derived
/// copies and expansion toggles always resolve back here by group name.
#[derive(Debug, Clone, Default)]
pub struct InstanceTree {
    nodes: Vec<TreeNode>,
}

impl InstanceTree {
    /// Build the hierarchy from an inventory listing, replacing any prior
    /// state. Group nodes come first, sorted by name ascending; instances
    /// keep the order the inventory returned them in, with ungrouped ones
    /// trailing after all groups.
    pub fn build(instances: Vec<Instance>) -> Self {
        let mut groups: BTreeMap<String, Vec<Instance>> = BTreeMap::new();
        let mut ungrouped = Vec::new();

        for vm in instances {
            match vm.instance_group().map(str::to_string) {
                Some(group) => groups.entry(group).or_default().push(vm),
                None => ungrouped.push(vm),
            }
        }

        let mut nodes = Vec::new();
        for (name, members) in groups {
            let children = members
                .into_iter()
                .map(|vm| TreeNode::grouped_instance(vm, &name))
                .collect();
            nodes.push(TreeNode::Group {
                name,
                expanded: false,
                children,
            });
        }
        nodes.extend(ungrouped.into_iter().map(TreeNode::ungrouped_instance));

        Self { nodes }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Flip the expansion state of the group with the given name.
    ///
    /// Lookup is by name so callers holding a row from a derived (filtered)
    /// projection still mutate the canonical node. Returns false for
    /// instances and unknown names.
    pub fn toggle(&mut self, target: &str) -> bool {
        for node in &mut self.nodes {
            if let TreeNode::Group { name, expanded, .. } = node {
                if name == target {
                    *expanded = !*expanded;
                    return true;
                }
            }
        }
        false
    }
}

/// Flatten a node list into the ordered display sequence: every top-level
/// node, and the children of a group directly after it only while that
/// group is expanded.
pub fn flatten(nodes: &[TreeNode]) -> Vec<TreeNode> {
    let mut rows = Vec::new();
    for node in nodes {
        rows.push(node.clone());
        if let TreeNode::Group {
            expanded: true,
            children,
            ..
        } = node
        {
            rows.extend(children.iter().cloned());
        }
    }
    rows
}
