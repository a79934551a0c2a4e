use ratatui::widgets::ListState;

use crate::filter;
use crate::gcp::{Instance, Project};
use crate::tree::{flatten, InstanceTree, TreeNode};

/// Rows of chrome around the list: title, filter line, margins, help text.
pub const UI_OVERHEAD: u16 = 7;
pub const MIN_LIST_HEIGHT: u16 = 5;
pub const DEFAULT_LIST_HEIGHT: u16 = 14;

/// The controller's state machine. Linear progression with one backward
/// edge (`SelectingVM` back to `SelectingProject`); `Quitting` is reachable
/// from everywhere. `ReadyToConnect` and `Quitting` end the interactive
/// loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    LoadingProjects,
    SelectingProject,
    LoadingVMs,
    SelectingVM,
    ReadyToConnect,
    Quitting,
}

pub struct App {
    pub state: AppState,

    // Data
    pub projects: Vec<Project>,
    pub selected_project: Option<String>,
    pub selected_vm: Option<Instance>,
    pub error: Option<String>,

    // Canonical hierarchy and the cached projection currently on screen.
    // `displayed` is rebuilt on every mutation that can change row count or
    // order; row indices are only ever resolved against it.
    pub tree: InstanceTree,
    pub displayed: Vec<TreeNode>,

    // Filtering sub-mode
    pub filtering: bool,
    pub filter_text: String,

    // List viewport
    pub list_state: ListState,
    pub viewport_height: u16,
    pub viewport_width: u16,
}

impl App {
    /// A starting project short-circuits project selection entirely.
    pub fn new(starting_project: Option<String>) -> Self {
        let state = if starting_project.is_some() {
            AppState::LoadingVMs
        } else {
            AppState::LoadingProjects
        };

        Self {
            state,
            projects: Vec::new(),
            selected_project: starting_project,
            selected_vm: None,
            error: None,
            tree: InstanceTree::default(),
            displayed: Vec::new(),
            filtering: false,
            filter_text: String::new(),
            list_state: ListState::default(),
            viewport_height: DEFAULT_LIST_HEIGHT,
            viewport_width: 0,
        }
    }

    /// The interactive loop ends on these; what happens next depends on
    /// which one we landed in.
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, AppState::ReadyToConnect | AppState::Quitting)
    }

    pub fn quit(&mut self) {
        self.state = AppState::Quitting;
    }

    /// Number of selectable rows in the projection currently displayed.
    pub fn row_count(&self) -> usize {
        match self.state {
            AppState::SelectingProject => self.projects.len(),
            AppState::SelectingVM => self.displayed.len(),
            _ => 0,
        }
    }

    /// Rebuild the cached display projection from the canonical tree,
    /// passing it through the filter engine while a query is active. The
    /// highlighted row is clamped so it never goes stale.
    pub fn refresh_displayed(&mut self) {
        let visible = if self.filtering && !self.filter_text.is_empty() {
            filter::filter(self.tree.nodes(), &self.filter_text)
        } else {
            self.tree.nodes().to_vec()
        };
        self.displayed = flatten(&visible);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let rows = self.row_count();
        if rows == 0 {
            self.list_state.select(None);
        } else {
            let selected = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(selected.min(rows - 1)));
        }
    }

    /// The row under the cursor, resolved against whichever projection is
    /// on screen.
    pub fn current_node(&self) -> Option<&TreeNode> {
        self.displayed.get(self.list_state.selected()?)
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.projects.get(self.list_state.selected()?)
    }

    // List-navigation sub-behavior; shared by project and VM selection.

    pub fn select_next(&mut self) {
        self.move_selection(1);
    }

    pub fn select_previous(&mut self) {
        self.move_selection(-1);
    }

    pub fn page_down(&mut self) {
        self.move_selection(self.viewport_height as isize);
    }

    pub fn page_up(&mut self) {
        self.move_selection(-(self.viewport_height as isize));
    }

    pub fn select_first(&mut self) {
        if self.row_count() > 0 {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let rows = self.row_count();
        if rows > 0 {
            self.list_state.select(Some(rows - 1));
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let rows = self.row_count();
        if rows == 0 {
            self.list_state.select(None);
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, rows as isize - 1);
        self.list_state.select(Some(next as usize));
    }

    // Tree mutations. All of them resolve the highlighted row back to the
    // canonical group by name before toggling, then rebuild the projection.

    pub fn expand_current(&mut self) {
        if let Some(TreeNode::Group {
            name,
            expanded: false,
            ..
        }) = self.current_node()
        {
            let name = name.clone();
            self.tree.toggle(&name);
            self.refresh_displayed();
        }
    }

    pub fn collapse_current(&mut self) {
        if let Some(TreeNode::Group {
            name,
            expanded: true,
            ..
        }) = self.current_node()
        {
            let name = name.clone();
            self.tree.toggle(&name);
            self.refresh_displayed();
        }
    }

    pub fn toggle_current(&mut self) {
        if let Some(TreeNode::Group { name, .. }) = self.current_node() {
            let name = name.clone();
            self.tree.toggle(&name);
            self.refresh_displayed();
        }
    }

    /// Record the highlighted instance as the final selection. Returns
    /// false when the cursor is not on an instance row.
    pub fn select_current_instance(&mut self) -> bool {
        if let Some(TreeNode::Instance { vm, .. }) = self.current_node() {
            let vm = vm.clone();
            self.selected_vm = Some(vm);
            self.state = AppState::ReadyToConnect;
            true
        } else {
            false
        }
    }

    // Filtering sub-mode

    pub fn start_filtering(&mut self) {
        if !self.filtering {
            self.filtering = true;
            self.filter_text.clear();
            self.refresh_displayed();
        }
    }

    pub fn stop_filtering(&mut self) {
        self.filtering = false;
        self.filter_text.clear();
        self.refresh_displayed();
    }

    pub fn push_filter_char(&mut self, c: char) {
        if is_filter_char(c) {
            self.filter_text.push(c);
            self.refresh_displayed();
        }
    }

    pub fn pop_filter_char(&mut self) {
        if self.filter_text.pop().is_some() {
            self.refresh_displayed();
        }
    }

    /// Backward edge: drop the instance view and return to the project
    /// list. The displayed-node cache is cleared, never left stale.
    pub fn back_to_project_selection(&mut self) {
        self.state = AppState::SelectingProject;
        self.displayed.clear();
        self.filtering = false;
        self.filter_text.clear();
        self.list_state
            .select(if self.projects.is_empty() { None } else { Some(0) });
    }

    /// Resize only adjusts the viewport; it is never a state transition.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport_width = width;
        self.viewport_height = height.saturating_sub(UI_OVERHEAD).max(MIN_LIST_HEIGHT);
    }
}

/// Characters accepted into the filter query: letters, digits, hyphen,
/// underscore and space. Nothing else.
pub fn is_filter_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' ')
}
