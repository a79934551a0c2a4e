use tokio::sync::mpsc;

use crate::gcp::{self, Instance, Project};

/// An out-of-band inventory request. The controller dispatches at most one
/// at a time and never cancels it.
#[derive(Debug, Clone)]
pub enum Task {
    LoadProjects,
    LoadInstances { project: String },
}

/// Completion message fed back into the same event queue as user input.
#[derive(Debug, Clone)]
pub enum TaskResult {
    ProjectsLoaded { projects: Vec<Project> },
    InstancesLoaded { instances: Vec<Instance> },
    Error { message: String },
}

/// Background worker: executes inventory queries without blocking the
/// input loop and reports completions over the result channel.
pub async fn run_worker(
    mut task_receiver: mpsc::Receiver<Task>,
    result_sender: mpsc::Sender<TaskResult>,
) {
    while let Some(task) = task_receiver.recv().await {
        log::debug!("worker: executing {:?}", task);

        let result = match task {
            Task::LoadProjects => match gcp::list_projects().await {
                Ok(projects) => TaskResult::ProjectsLoaded { projects },
                Err(e) => TaskResult::Error {
                    message: e.to_string(),
                },
            },
            Task::LoadInstances { project } => match gcp::list_instances(&project).await {
                Ok(instances) => TaskResult::InstancesLoaded { instances },
                Err(e) => TaskResult::Error {
                    message: e.to_string(),
                },
            },
        };

        if result_sender.send(result).await.is_err() {
            // Main loop has dropped the receiver, exit worker
            break;
        }
    }
}
