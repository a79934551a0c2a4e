use ratatui::style::Color;

use crate::gcp::InstanceStatus;

/// Presentation parameters for the list projection. Carries no behavior;
/// threaded explicitly into rendering rather than living in a global.
#[derive(Debug, Clone)]
pub struct Theme {
    // Instance status badges
    pub running: Color,
    pub terminated: Color,
    pub provisioning: Color,
    pub stopping: Color,
    pub status_unknown: Color,

    // Tree rows
    pub group_name: Color,
    pub expanded_marker: Color,
    pub collapsed_marker: Color,

    // Chrome
    pub selected_fg: Color,
    pub title: Color,
    pub filter_label: Color,
    pub help: Color,
    pub error: Color,
    pub text_default: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            running: Color::Green,
            terminated: Color::DarkGray,
            provisioning: Color::Yellow,
            stopping: Color::Red,
            status_unknown: Color::Reset,

            group_name: Color::Blue,
            expanded_marker: Color::Cyan,
            collapsed_marker: Color::Blue,

            selected_fg: Color::Indexed(170),
            title: Color::Gray,
            filter_label: Color::Green,
            help: Color::Gray,
            error: Color::Red,
            text_default: Color::Reset,
        }
    }
}

impl Theme {
    pub fn status_color(&self, status: InstanceStatus) -> Color {
        match status {
            InstanceStatus::Running => self.running,
            InstanceStatus::Terminated => self.terminated,
            InstanceStatus::Provisioning => self.provisioning,
            InstanceStatus::Stopping => self.stopping,
            InstanceStatus::Unknown => self.status_unknown,
        }
    }
}
