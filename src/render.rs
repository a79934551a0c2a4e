use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::theme::Theme;
use crate::tree::TreeNode;

const EXPANDED_MARKER: &str = "▼";
const COLLAPSED_MARKER: &str = "▶";

/// Project a flattened node sequence into display rows. Pure: the only
/// inputs are the rows themselves and the theme.
pub fn project(nodes: &[TreeNode], theme: &Theme) -> Vec<Line<'static>> {
    nodes.iter().map(|node| render_node(node, theme)).collect()
}

pub fn render_node(node: &TreeNode, theme: &Theme) -> Line<'static> {
    let indent = "  ".repeat(node.depth());

    match node {
        TreeNode::Group {
            name,
            expanded,
            children,
        } => {
            let (marker, marker_color) = if *expanded {
                (EXPANDED_MARKER, theme.expanded_marker)
            } else {
                (COLLAPSED_MARKER, theme.collapsed_marker)
            };
            Line::from(vec![
                Span::raw(indent),
                Span::styled(marker.to_string(), Style::default().fg(marker_color)),
                Span::raw(" "),
                Span::styled(name.clone(), Style::default().fg(theme.group_name)),
                Span::styled(
                    format!(" ({} instances)", children.len()),
                    Style::default().fg(theme.text_default),
                ),
            ])
        }
        TreeNode::Instance { name, vm, .. } => Line::from(vec![
            Span::raw(indent),
            Span::styled(
                format!("[{}]", vm.status.badge()),
                Style::default().fg(theme.status_color(vm.status)),
            ),
            Span::raw(" "),
            Span::styled(name.clone(), Style::default().fg(theme.text_default)),
        ]),
    }
}
