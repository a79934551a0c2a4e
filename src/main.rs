use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, time::Duration};
use tokio::sync::mpsc;

use vmssh::app::{App, AppState};
use vmssh::async_task::{self, Task, TaskResult};
use vmssh::cli::Cli;
use vmssh::error::{Result, VmSshError};
use vmssh::event;
use vmssh::gcp;
use vmssh::theme::Theme;
use vmssh::ui;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logger only if VMSSH_LOG names a log file; writing log
    // lines to the terminal would fight the TUI for the screen.
    if let Ok(log_file) = std::env::var("VMSSH_LOG") {
        env_logger::Builder::new()
            .target(env_logger::Target::Pipe(Box::new(
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&log_file)?,
            )))
            .filter_level(log::LevelFilter::Debug)
            .init();
        log::info!("vmssh starting up");
    }

    let cli = Cli::parse();

    // The inventory source and the session launcher are the same binary;
    // fail before any UI comes up if it is missing.
    which::which(gcp::GCLOUD)
        .map_err(|_| VmSshError::StartupDependencyMissing(gcp::GCLOUD.to_string()))?;

    let app = run_interactive(cli.project).await?;

    // The interactive loop has exited; hand off to the launcher if it
    // ended with a selection. There is no path back into the loop.
    if app.state == AppState::ReadyToConnect {
        if let (Some(project), Some(vm)) =
            (app.selected_project.as_deref(), app.selected_vm.as_ref())
        {
            println!("Connecting to {} in project {}...", vm.name, project);
            gcp::connect_ssh(project, &vm.name, &vm.zone)?;
        }
    }

    Ok(())
}

async fn run_interactive(starting_project: Option<String>) -> Result<App> {
    let mut app = App::new(starting_project);
    let theme = Theme::default();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    app.resize(size.width, size.height);

    // Setup async task channels and the background worker
    let (task_sender, task_receiver) = mpsc::channel::<Task>(32);
    let (result_sender, mut result_receiver) = mpsc::channel::<TaskResult>(32);
    let worker_handle = tokio::spawn(async_task::run_worker(task_receiver, result_sender));

    // Kick off the load matching the starting state.
    let initial = match &app.selected_project {
        Some(project) => Task::LoadInstances {
            project: project.clone(),
        },
        None => Task::LoadProjects,
    };
    if let Err(e) = task_sender.send(initial).await {
        log::error!("failed to dispatch initial load: {}", e);
    }

    // Main application loop: one event at a time, async completions fed
    // through the same transition function as key presses.
    let tick_rate = Duration::from_millis(250);
    loop {
        terminal.draw(|frame| ui::draw(frame, &mut app, &theme))?;

        if crossterm::event::poll(tick_rate)? {
            let ev = crossterm::event::read()?;
            event::handle_event(ev, &mut app, &task_sender)?;
        }

        while let Ok(result) = result_receiver.try_recv() {
            event::handle_task_result(&mut app, result);
        }

        if app.is_terminal() {
            break;
        }
    }

    // Cleanup
    worker_handle.abort();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(app)
}
