use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::app::{App, AppState};
use crate::async_task::{Task, TaskResult};
use crate::error::Result;
use crate::tree::InstanceTree;

/// Feed one terminal event through the state machine.
pub fn handle_event(event: Event, app: &mut App, task_sender: &mpsc::Sender<Task>) -> Result<()> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(key, app, task_sender),
        Event::Resize(width, height) => {
            // Viewport geometry only; never a state transition.
            app.resize(width, height);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Apply an async load completion. These flow through the same transition
/// logic as key presses; nothing special-cases "this came from a
/// background task".
pub fn handle_task_result(app: &mut App, result: TaskResult) {
    match result {
        TaskResult::ProjectsLoaded { projects } => {
            app.projects = projects;
            app.state = AppState::SelectingProject;
            app.list_state
                .select(if app.projects.is_empty() { None } else { Some(0) });
        }
        TaskResult::InstancesLoaded { instances } => {
            app.tree = InstanceTree::build(instances);
            app.filtering = false;
            app.filter_text.clear();
            app.state = AppState::SelectingVM;
            app.list_state.select(Some(0));
            app.refresh_displayed();
        }
        TaskResult::Error { message } => {
            log::warn!("load failed: {}", message);
            app.error = Some(message);
        }
    }
}

fn handle_key(key: KeyEvent, app: &mut App, task_sender: &mpsc::Sender<Task>) -> Result<()> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return Ok(());
    }

    // A recorded load error leaves only the quit affordance; there is no
    // in-place retry.
    if app.error.is_some() {
        if key.code == KeyCode::Char('q') {
            app.quit();
        }
        return Ok(());
    }

    if is_navigation_key(&key, app) {
        handle_navigation(key.code, app);
        return Ok(());
    }

    match app.state {
        AppState::SelectingVM if app.filtering => handle_filtering_key(key, app),
        AppState::SelectingVM => handle_vm_key(key.code, app),
        AppState::SelectingProject => handle_project_key(key.code, app, task_sender),
        AppState::LoadingProjects | AppState::LoadingVMs => {
            if key.code == KeyCode::Char('q') {
                app.quit();
            }
        }
        AppState::ReadyToConnect | AppState::Quitting => {}
    }
    Ok(())
}

fn is_navigation_key(key: &KeyEvent, app: &App) -> bool {
    if !matches!(
        app.state,
        AppState::SelectingProject | AppState::SelectingVM
    ) {
        return false;
    }
    match key.code {
        KeyCode::Up
        | KeyCode::Down
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Home
        | KeyCode::End => true,
        // Vim aliases, except while typing a filter query where k/j are
        // ordinary printable input.
        KeyCode::Char('k') | KeyCode::Char('j') => !app.filtering,
        _ => false,
    }
}

fn handle_navigation(code: KeyCode, app: &mut App) {
    match code {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        _ => {}
    }
}

fn handle_vm_key(code: KeyCode, app: &mut App) {
    match code {
        KeyCode::Right => app.expand_current(),
        KeyCode::Left => app.collapse_current(),
        KeyCode::Char(' ') => app.toggle_current(),
        KeyCode::Enter => {
            // An instance row ends the loop with a selection; a group row
            // just toggles.
            if !app.select_current_instance() {
                app.toggle_current();
            }
        }
        KeyCode::Char('/') => app.start_filtering(),
        KeyCode::Esc => app.back_to_project_selection(),
        KeyCode::Char('q') => app.quit(),
        _ => {}
    }
}

fn handle_filtering_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.stop_filtering(),
        KeyCode::Backspace => app.pop_filter_char(),
        KeyCode::Char('h') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.pop_filter_char()
        }
        KeyCode::Enter => {
            if !app.select_current_instance() {
                // Toggling a filtered group targets the canonical tree and
                // refreshes the filtered projection.
                app.toggle_current();
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.push_filter_char(c)
        }
        _ => {}
    }
}

fn handle_project_key(code: KeyCode, app: &mut App, task_sender: &mpsc::Sender<Task>) {
    match code {
        KeyCode::Enter => {
            if let Some(project) = app.current_project() {
                let project_id = project.project_id.clone();
                app.selected_project = Some(project_id.clone());
                app.state = AppState::LoadingVMs;
                dispatch(
                    task_sender,
                    Task::LoadInstances {
                        project: project_id,
                    },
                );
            }
        }
        KeyCode::Char('q') => app.quit(),
        _ => {}
    }
}

fn dispatch(task_sender: &mpsc::Sender<Task>, task: Task) {
    // At most one load is ever in flight, so the channel cannot be full in
    // practice; a send failure is logged rather than surfaced.
    if let Err(e) = task_sender.try_send(task) {
        log::error!("failed to dispatch task: {}", e);
    }
}
