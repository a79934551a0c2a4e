use crate::tree::TreeNode;

/// Derive a view-restricted copy of the hierarchy for a filter query.
///
/// Matching is a case-insensitive substring test against node names only.
/// A group whose own name matches is kept whole; otherwise it is reduced to
/// its matching children, or dropped when none match. Every group in the
/// result has `expanded` forced on so its surviving children are visible.
/// The returned nodes are a derived copy and are never written back into
/// the canonical tree.
pub fn filter(nodes: &[TreeNode], query: &str) -> Vec<TreeNode> {
    if query.is_empty() {
        return nodes.to_vec();
    }

    let needle = query.to_lowercase();
    let matches = |name: &str| name.to_lowercase().contains(&needle);

    let mut filtered = Vec::new();
    for node in nodes {
        match node {
            TreeNode::Group { name, children, .. } => {
                let kept = if matches(name) {
                    children.clone()
                } else {
                    children
                        .iter()
                        .filter(|child| matches(child.name()))
                        .cloned()
                        .collect()
                };
                if matches(name) || !kept.is_empty() {
                    filtered.push(TreeNode::Group {
                        name: name.clone(),
                        expanded: true,
                        children: kept,
                    });
                }
            }
            TreeNode::Instance { name, .. } => {
                if matches(name) {
                    filtered.push(node.clone());
                }
            }
        }
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcp::{Instance, InstanceStatus, Metadata, MetadataItem};
    use crate::tree::{flatten, InstanceTree};
    use proptest::prelude::*;

    fn grouped(name: &str, group: &str) -> Instance {
        Instance {
            name: name.to_string(),
            zone: "zones/us-central1-a".to_string(),
            status: InstanceStatus::Running,
            metadata: Metadata {
                items: vec![MetadataItem {
                    key: "created-by".to_string(),
                    value: format!("projects/1/zones/us-central1-a/instanceGroupManagers/{group}"),
                }],
            },
        }
    }

    fn standalone(name: &str) -> Instance {
        Instance {
            name: name.to_string(),
            zone: "zones/us-central1-a".to_string(),
            status: InstanceStatus::Running,
            metadata: Metadata::default(),
        }
    }

    fn sample_tree() -> InstanceTree {
        InstanceTree::build(vec![
            grouped("web-1", "web-fleet"),
            grouped("web-2", "web-fleet"),
            grouped("worker-1", "batch"),
            standalone("db-1"),
        ])
    }

    fn names(nodes: &[TreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name()).collect()
    }

    #[test]
    fn empty_query_is_identity() {
        let tree = sample_tree();
        assert_eq!(filter(tree.nodes(), ""), tree.nodes());
    }

    #[test]
    fn group_name_match_keeps_entire_group_expanded() {
        let tree = sample_tree();
        let result = filter(tree.nodes(), "fleet");

        assert_eq!(names(&result), vec!["web-fleet"]);
        let TreeNode::Group { expanded, children, .. } = &result[0] else {
            panic!("expected group node");
        };
        assert!(*expanded);
        assert_eq!(names(children), vec!["web-1", "web-2"]);
    }

    #[test]
    fn child_match_keeps_only_matching_children() {
        let tree = sample_tree();
        let result = filter(tree.nodes(), "web-2");

        assert_eq!(names(&result), vec!["web-fleet"]);
        let TreeNode::Group { expanded, children, .. } = &result[0] else {
            panic!("expected group node");
        };
        assert!(*expanded);
        assert_eq!(names(children), vec!["web-2"]);
    }

    #[test]
    fn group_without_any_match_is_omitted() {
        let tree = sample_tree();
        let result = filter(tree.nodes(), "db");
        assert_eq!(names(&result), vec!["db-1"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let tree = sample_tree();
        assert_eq!(names(&filter(tree.nodes(), "WEB")), vec!["web-fleet"]);
        assert_eq!(names(&filter(tree.nodes(), "Db-1")), vec!["db-1"]);
    }

    #[test]
    fn matching_never_looks_at_zone_or_status() {
        let tree = sample_tree();
        // Every fixture lives in us-central1-a; the zone must not match.
        assert!(filter(tree.nodes(), "central").is_empty());
        assert!(filter(tree.nodes(), "running").is_empty());
    }

    #[test]
    fn result_preserves_input_ordering() {
        let tree = sample_tree();
        let result = filter(tree.nodes(), "-1");
        assert_eq!(names(&result), vec!["batch", "web-fleet", "db-1"]);
    }

    #[test]
    fn filtered_projection_matches_end_to_end_scenario() {
        let mut tree = InstanceTree::build(vec![
            grouped("web-1", "web-fleet"),
            grouped("web-2", "web-fleet"),
            standalone("db-1"),
        ]);
        tree.toggle("web-fleet");

        let web = filter(tree.nodes(), "web");
        assert_eq!(names(&flatten(&web)), vec!["web-fleet", "web-1", "web-2"]);

        let db = filter(tree.nodes(), "db");
        assert_eq!(names(&flatten(&db)), vec!["db-1"]);
    }

    proptest! {
        #[test]
        fn filtering_is_idempotent(
            groups in prop::collection::vec(("[a-z]{1,8}", "[a-z]{1,8}"), 0..12),
            loose in prop::collection::vec("[a-z]{1,8}", 0..6),
            query in "[a-z]{0,4}",
        ) {
            let mut instances: Vec<Instance> =
                groups.iter().map(|(vm, g)| grouped(vm, g)).collect();
            instances.extend(loose.iter().map(|vm| standalone(vm)));
            let tree = InstanceTree::build(instances);

            let once = filter(tree.nodes(), &query);
            let twice = filter(&once, &query);
            prop_assert_eq!(&once, &twice);
        }

        #[test]
        fn every_filtered_group_is_expanded(
            groups in prop::collection::vec(("[a-z]{1,8}", "[a-z]{1,8}"), 0..12),
            query in "[a-z]{1,4}",
        ) {
            let instances: Vec<Instance> =
                groups.iter().map(|(vm, g)| grouped(vm, g)).collect();
            let tree = InstanceTree::build(instances);

            for node in filter(tree.nodes(), &query) {
                if node.is_group() {
                    prop_assert!(node.is_expanded());
                }
            }
        }
    }
}
