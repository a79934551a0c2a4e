use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, AppState};
use crate::render;
use crate::theme::Theme;

pub fn draw(frame: &mut Frame, app: &mut App, theme: &Theme) {
    // A recorded load error replaces whatever the state would show.
    if let Some(ref message) = app.error {
        let error = Paragraph::new(vec![
            Line::raw(""),
            Line::styled(format!("  Error: {message}"), Style::default().fg(theme.error)),
            Line::raw(""),
            Line::styled("  Press 'q' to quit.", Style::default().fg(theme.help)),
        ]);
        frame.render_widget(error, frame.area());
        return;
    }

    match app.state {
        AppState::LoadingProjects => {
            draw_splash(frame, "Loading GCP projects...", theme);
        }
        AppState::LoadingVMs => {
            let project = app.selected_project.as_deref().unwrap_or("?");
            draw_splash(frame, &format!("Loading VMs for project: {project}"), theme);
        }
        AppState::SelectingProject => draw_project_list(frame, app, theme),
        AppState::SelectingVM => draw_vm_list(frame, app, theme),
        AppState::ReadyToConnect => {
            let name = app
                .selected_vm
                .as_ref()
                .map(|vm| vm.name.as_str())
                .unwrap_or("?");
            draw_splash(frame, &format!("Connecting to {name}..."), theme);
        }
        AppState::Quitting => draw_splash(frame, "Goodbye!", theme),
    }
}

fn draw_splash(frame: &mut Frame, message: &str, theme: &Theme) {
    let splash = Paragraph::new(vec![
        Line::raw(""),
        Line::styled(
            format!("  {message}"),
            Style::default().fg(theme.text_default),
        ),
    ]);
    frame.render_widget(splash, frame.area());
}

fn split_chrome(area: Rect, title_height: u16) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(title_height),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

fn draw_project_list(frame: &mut Frame, app: &mut App, theme: &Theme) {
    let (title_area, list_area, help_area) = split_chrome(frame.area(), 2);

    let title = Paragraph::new(Line::styled(
        "  Select GCP Project",
        Style::default().fg(theme.title),
    ));
    frame.render_widget(title, title_area);

    if app.projects.is_empty() {
        let empty = Paragraph::new("  No active projects found")
            .style(Style::default().fg(theme.help));
        frame.render_widget(empty, list_area);
    } else {
        let items: Vec<ListItem> = app
            .projects
            .iter()
            .map(|p| ListItem::new(format!("{} ({})", p.project_id, p.name)))
            .collect();
        let list = list_widget(items, theme);
        frame.render_stateful_widget(list, list_area, &mut app.list_state);
    }

    let help = Paragraph::new(Line::styled(
        "  Press Enter to select, 'q' to quit",
        Style::default().fg(theme.help),
    ));
    frame.render_widget(help, help_area);
}

fn draw_vm_list(frame: &mut Frame, app: &mut App, theme: &Theme) {
    let title_height = if app.filtering { 3 } else { 2 };
    let (title_area, list_area, help_area) = split_chrome(frame.area(), title_height);

    let project = app.selected_project.as_deref().unwrap_or("?");
    let mut title_lines = vec![Line::styled(
        format!("  Select VM from project: {project}"),
        Style::default().fg(theme.title),
    )];
    if app.filtering {
        title_lines.push(Line::from(vec![
            Span::styled("  Filter:", Style::default().fg(theme.filter_label)),
            Span::raw(format!(" {}", app.filter_text)),
        ]));
    }
    frame.render_widget(Paragraph::new(title_lines), title_area);

    if app.displayed.is_empty() {
        let message = if app.filtering && !app.filter_text.is_empty() {
            "  No instances match the filter"
        } else {
            "  No instances found"
        };
        let empty = Paragraph::new(message).style(Style::default().fg(theme.help));
        frame.render_widget(empty, list_area);
    } else {
        let items: Vec<ListItem> = render::project(&app.displayed, theme)
            .into_iter()
            .map(ListItem::new)
            .collect();
        let list = list_widget(items, theme);
        frame.render_stateful_widget(list, list_area, &mut app.list_state);
    }

    let help_text = if app.filtering {
        "  Press Enter to connect, Backspace to edit, Esc to clear filter, 'q' to quit"
    } else {
        "  Enter select/expand, → expand, ← collapse, Space toggle, '/' filter, Esc back, 'q' quit"
    };
    let help = Paragraph::new(Line::styled(help_text, Style::default().fg(theme.help)));
    frame.render_widget(help, help_area);
}

fn list_widget<'a>(items: Vec<ListItem<'a>>, theme: &Theme) -> List<'a> {
    List::new(items)
        .highlight_style(
            Style::default()
                .fg(theme.selected_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ")
}
