use serde::Deserialize;
use tokio::process::Command;

use crate::error::{Result, VmSshError};

/// The external binary that serves as both inventory source and SSH launcher.
pub const GCLOUD: &str = "gcloud";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    #[serde(default)]
    pub name: String,
    pub lifecycle_state: String,
}

/// A compute instance as returned by the inventory source. Immutable once
/// loaded for a given project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Instance {
    pub name: String,
    pub zone: String,
    pub status: InstanceStatus,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub items: Vec<MetadataItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetadataItem {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Running,
    Terminated,
    Provisioning,
    Stopping,
    #[serde(other)]
    Unknown,
}

impl InstanceStatus {
    /// Single-letter badge shown in front of instance rows. Statuses we
    /// don't know about degrade to `?` rather than failing.
    pub fn badge(self) -> char {
        match self {
            InstanceStatus::Running => 'R',
            InstanceStatus::Terminated => 'T',
            InstanceStatus::Provisioning => 'P',
            InstanceStatus::Stopping => 'S',
            InstanceStatus::Unknown => '?',
        }
    }
}

impl Instance {
    /// Extract the managed-instance-group name from metadata, if any.
    ///
    /// The group is not reported directly; it is inferred from a
    /// `created-by` entry whose value contains a path segment
    /// `instanceGroupManagers/<name>`.
    pub fn instance_group(&self) -> Option<&str> {
        for item in &self.metadata.items {
            if item.key != "created-by" {
                continue;
            }
            let mut parts = item.value.split('/');
            while let Some(part) = parts.next() {
                if part == "instanceGroupManagers" {
                    return parts.next().filter(|name| !name.is_empty());
                }
            }
        }
        None
    }
}

/// Zones arrive as full resource URLs; the launcher wants the short form.
pub fn zone_short(zone: &str) -> &str {
    zone.rsplit('/').next().unwrap_or(zone)
}

/// List projects visible to the operator, keeping only ACTIVE ones.
pub async fn list_projects() -> Result<Vec<Project>> {
    let raw = run_inventory_query(&[
        "projects",
        "list",
        "--format",
        "json(projectId,name,lifecycleState)",
    ])
    .await?;
    parse_projects(&raw)
}

/// List compute instances in the given project.
pub async fn list_instances(project: &str) -> Result<Vec<Instance>> {
    let raw = run_inventory_query(&[
        "compute",
        "instances",
        "list",
        "--project",
        project,
        "--format",
        "json(name,zone,status,metadata.items)",
    ])
    .await?;
    parse_instances(&raw)
}

async fn run_inventory_query(args: &[&str]) -> Result<Vec<u8>> {
    log::debug!("inventory query: {} {}", GCLOUD, args.join(" "));

    let output = Command::new(GCLOUD)
        .args(args)
        .output()
        .await
        .map_err(|e| VmSshError::InventoryQuery(format!("failed to run {}: {}", GCLOUD, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VmSshError::InventoryQuery(
            stderr.lines().next().unwrap_or("unknown error").to_string(),
        ));
    }

    Ok(output.stdout)
}

fn parse_projects(raw: &[u8]) -> Result<Vec<Project>> {
    let projects: Vec<Project> = serde_json::from_slice(raw)?;
    Ok(projects
        .into_iter()
        .filter(|p| p.lifecycle_state == "ACTIVE")
        .collect())
}

fn parse_instances(raw: &[u8]) -> Result<Vec<Instance>> {
    Ok(serde_json::from_slice(raw)?)
}

/// Hand the terminal over to an interactive SSH session.
///
/// On Unix this replaces the current process image and only ever returns on
/// failure; the launcher's own exit code then governs. Elsewhere we run the
/// session to completion and forward its exit status.
pub fn connect_ssh(project: &str, instance: &str, zone: &str) -> Result<()> {
    let launcher =
        which::which(GCLOUD).map_err(|_| VmSshError::LauncherNotFound(GCLOUD.to_string()))?;

    let mut cmd = std::process::Command::new(&launcher);
    cmd.args([
        "compute",
        "ssh",
        instance,
        "--project",
        project,
        "--zone",
        zone_short(zone),
    ]);

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let err = cmd.exec();
        Err(VmSshError::LauncherExec {
            launcher: launcher.display().to_string(),
            source: err,
        })
    }

    #[cfg(not(unix))]
    {
        let status = cmd.status().map_err(|e| VmSshError::LauncherExec {
            launcher: launcher.display().to_string(),
            source: e,
        })?;
        std::process::exit(status.code().unwrap_or(1));
    }
}
