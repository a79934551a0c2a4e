use assert_matches::assert_matches;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tokio_test::assert_ok;

use vmssh::app::{App, AppState};
use vmssh::async_task::{Task, TaskResult};
use vmssh::event::{handle_event, handle_task_result};
use vmssh::gcp::{Instance, InstanceStatus, Metadata, MetadataItem, Project};

fn project(id: &str, name: &str) -> Project {
    Project {
        project_id: id.to_string(),
        name: name.to_string(),
        lifecycle_state: "ACTIVE".to_string(),
    }
}

fn grouped(name: &str, group: &str) -> Instance {
    Instance {
        name: name.to_string(),
        zone: "https://compute.googleapis.com/v1/projects/p/zones/us-central1-a".to_string(),
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
        zone: "https://compute.googleapis.com/v1/projects/p/zones/us-central1-a".to_string(),
        status: InstanceStatus::Terminated,
        metadata: Metadata::default(),
    }
}

fn fixture_instances() -> Vec<Instance> {
    vec![
        grouped("web-1", "web-fleet"),
        grouped("web-2", "web-fleet"),
        standalone("db-1"),
    ]
}

fn press(app: &mut App, sender: &mpsc::Sender<Task>, code: KeyCode) {
    let event = Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
    assert_ok!(handle_event(event, app, sender));
}

fn displayed_names(app: &App) -> Vec<&str> {
    app.displayed.iter().map(|n| n.name()).collect()
}

#[test]
fn full_selection_flow_from_projects_to_connect() {
    let mut app = App::new(None);
    let (sender, mut receiver) = mpsc::channel::<Task>(32);
    assert_eq!(app.state, AppState::LoadingProjects);

    // Projects arrive; the second one gets picked.
    handle_task_result(
        &mut app,
        TaskResult::ProjectsLoaded {
            projects: vec![project("staging", "Staging"), project("prod", "Production")],
        },
    );
    assert_eq!(app.state, AppState::SelectingProject);

    press(&mut app, &sender, KeyCode::Down);
    press(&mut app, &sender, KeyCode::Enter);
    assert_eq!(app.state, AppState::LoadingVMs);
    assert_matches!(receiver.try_recv(), Ok(Task::LoadInstances { project }) if project == "prod");

    // Instances arrive; one group, one ungrouped, group collapsed.
    handle_task_result(
        &mut app,
        TaskResult::InstancesLoaded {
            instances: fixture_instances(),
        },
    );
    assert_eq!(app.state, AppState::SelectingVM);
    assert_eq!(displayed_names(&app), vec!["web-fleet", "db-1"]);

    // Expand, walk down to the first member and connect.
    press(&mut app, &sender, KeyCode::Char(' '));
    assert_eq!(
        displayed_names(&app),
        vec!["web-fleet", "web-1", "web-2", "db-1"]
    );

    press(&mut app, &sender, KeyCode::Down);
    press(&mut app, &sender, KeyCode::Enter);

    assert_eq!(app.state, AppState::ReadyToConnect);
    assert!(app.is_terminal());
    assert_eq!(
        app.selected_vm.as_ref().map(|vm| vm.name.as_str()),
        Some("web-1")
    );
    assert_eq!(app.selected_project.as_deref(), Some("prod"));
}

#[test]
fn starting_project_flag_skips_project_selection() {
    let mut app = App::new(Some("prod".to_string()));
    assert_eq!(app.state, AppState::LoadingVMs);

    handle_task_result(
        &mut app,
        TaskResult::InstancesLoaded {
            instances: fixture_instances(),
        },
    );
    assert_eq!(app.state, AppState::SelectingVM);
    assert!(app.projects.is_empty());
}

#[test]
fn filter_web_returns_group_with_both_children_and_omits_db() {
    let mut app = App::new(Some("prod".to_string()));
    let (sender, _receiver) = mpsc::channel::<Task>(32);
    handle_task_result(
        &mut app,
        TaskResult::InstancesLoaded {
            instances: fixture_instances(),
        },
    );

    // Expand first so the filter provably works on the canonical model,
    // not on whatever was displayed.
    press(&mut app, &sender, KeyCode::Char(' '));
    press(&mut app, &sender, KeyCode::Char('/'));
    for c in ['w', 'e', 'b'] {
        press(&mut app, &sender, KeyCode::Char(c));
    }

    assert_eq!(displayed_names(&app), vec!["web-fleet", "web-1", "web-2"]);
}

#[test]
fn filter_db_returns_only_the_ungrouped_instance() {
    let mut app = App::new(Some("prod".to_string()));
    let (sender, _receiver) = mpsc::channel::<Task>(32);
    handle_task_result(
        &mut app,
        TaskResult::InstancesLoaded {
            instances: fixture_instances(),
        },
    );

    press(&mut app, &sender, KeyCode::Char('/'));
    for c in ['d', 'b'] {
        press(&mut app, &sender, KeyCode::Char(c));
    }

    assert_eq!(displayed_names(&app), vec!["db-1"]);
}

#[test]
fn back_action_allows_choosing_a_different_project() {
    let mut app = App::new(None);
    let (sender, mut receiver) = mpsc::channel::<Task>(32);

    handle_task_result(
        &mut app,
        TaskResult::ProjectsLoaded {
            projects: vec![project("staging", "Staging"), project("prod", "Production")],
        },
    );
    press(&mut app, &sender, KeyCode::Enter);
    let _ = receiver.try_recv();
    handle_task_result(
        &mut app,
        TaskResult::InstancesLoaded {
            instances: fixture_instances(),
        },
    );

    press(&mut app, &sender, KeyCode::Esc);
    assert_eq!(app.state, AppState::SelectingProject);
    assert!(app.displayed.is_empty());

    press(&mut app, &sender, KeyCode::Down);
    press(&mut app, &sender, KeyCode::Enter);
    assert_eq!(app.state, AppState::LoadingVMs);
    assert_matches!(receiver.try_recv(), Ok(Task::LoadInstances { project }) if project == "prod");
}

#[test]
fn inventory_failure_is_terminal_for_the_load_but_not_the_program() {
    let mut app = App::new(None);
    let (sender, _receiver) = mpsc::channel::<Task>(32);

    handle_task_result(
        &mut app,
        TaskResult::Error {
            message: "inventory query failed: transport".to_string(),
        },
    );
    assert_eq!(app.state, AppState::LoadingProjects);
    assert!(app.error.is_some());

    // No retry affordance: a later Enter changes nothing.
    press(&mut app, &sender, KeyCode::Enter);
    assert_eq!(app.state, AppState::LoadingProjects);

    press(&mut app, &sender, KeyCode::Char('q'));
    assert_eq!(app.state, AppState::Quitting);
    assert!(app.is_terminal());
}

#[test]
fn toggle_through_filtered_view_survives_into_unfiltered_view() {
    let mut app = App::new(Some("prod".to_string()));
    let (sender, _receiver) = mpsc::channel::<Task>(32);
    handle_task_result(
        &mut app,
        TaskResult::InstancesLoaded {
            instances: fixture_instances(),
        },
    );

    press(&mut app, &sender, KeyCode::Char('/'));
    press(&mut app, &sender, KeyCode::Char('w'));
    press(&mut app, &sender, KeyCode::Enter); // toggle web-fleet via the derived copy
    press(&mut app, &sender, KeyCode::Esc); // drop the filter

    assert_eq!(
        displayed_names(&app),
        vec!["web-fleet", "web-1", "web-2", "db-1"]
    );
}

#[test]
fn reload_replaces_model_wholesale() {
    let mut app = App::new(Some("prod".to_string()));
    handle_task_result(
        &mut app,
        TaskResult::InstancesLoaded {
            instances: fixture_instances(),
        },
    );
    assert_eq!(displayed_names(&app), vec!["web-fleet", "db-1"]);

    handle_task_result(
        &mut app,
        TaskResult::InstancesLoaded {
            instances: vec![standalone("cache-1")],
        },
    );
    assert_eq!(displayed_names(&app), vec!["cache-1"]);
}
