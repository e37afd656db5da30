//! Local fallback store.
//!
//! A JSON file per team and per data kind under the configured data
//! directory, plus one device-global registration record. Used as the
//! sole persistence mechanism when offline and as the write-through
//! mirror after every in-memory state change, so a reload before the
//! next successful pull still shows the last known state. Entries
//! never expire.
//!
//! Layout:
//! ```text
//! <data_dir>/current_team.json          device-global registration
//! <data_dir>/teams/<team_id>/tasks.json
//! <data_dir>/teams/<team_id>/employees.json
//! <data_dir>/teams/<team_id>/counter.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use taskmatrix_core::error::Result;
use taskmatrix_core::model::{Employee, Snapshot, Task, TeamId};

use crate::registry::TeamRegistration;

/// Namespaced key-value persistence for team snapshots.
#[derive(Debug, Clone)]
pub struct TeamStore {
    data_dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct DisplayCounter {
    next: u32,
}

impl TeamStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn team_dir(&self, team_id: &str) -> PathBuf {
        self.data_dir.join("teams").join(team_id)
    }

    fn registration_path(&self) -> PathBuf {
        self.data_dir.join("current_team.json")
    }

    /// Persist the full snapshot for a team. Distinct teams on the
    /// same device never cross-contaminate state.
    pub fn save_snapshot(&self, team_id: &str, snapshot: &Snapshot) -> Result<()> {
        let dir = self.team_dir(team_id);
        fs::create_dir_all(&dir)?;

        write_json(&dir.join("tasks.json"), &snapshot.tasks)?;
        write_json(&dir.join("employees.json"), &snapshot.employees)?;
        Ok(())
    }

    /// Load the last persisted snapshot for a team, if any.
    pub fn load_snapshot(&self, team_id: &str) -> Result<Option<Snapshot>> {
        let dir = self.team_dir(team_id);
        let tasks_path = dir.join("tasks.json");
        let employees_path = dir.join("employees.json");

        if !tasks_path.exists() && !employees_path.exists() {
            return Ok(None);
        }

        let tasks: Vec<Task> = read_json_or_default(&tasks_path)?;
        let employees: Vec<Employee> = read_json_or_default(&employees_path)?;
        Ok(Some(Snapshot { tasks, employees }))
    }

    /// Persist the device-global "current team" record.
    pub fn save_registration(&self, registration: &TeamRegistration) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        write_json(&self.registration_path(), registration)
    }

    /// Read the registration record. Absence means onboarding
    /// (create/join) must run.
    pub fn load_registration(&self) -> Result<Option<TeamRegistration>> {
        let path = self.registration_path();
        if !path.exists() {
            return Ok(None);
        }
        let registration = serde_json::from_str(&fs::read_to_string(path)?)?;
        Ok(Some(registration))
    }

    /// Allocate the next team-scoped display id and persist the
    /// counter in the same step.
    ///
    /// `floor` is the lowest id still free according to the
    /// authoritative snapshot. The allocation takes the max of it and
    /// the persisted counter, so numbers strictly increase and are
    /// never handed out twice — including on a device that joined
    /// after the team already numbered tasks and whose local counter
    /// starts fresh.
    pub fn next_display_id(&self, team_id: &str, floor: u32) -> Result<u32> {
        let dir = self.team_dir(team_id);
        fs::create_dir_all(&dir)?;
        let path = dir.join("counter.json");

        let counter: DisplayCounter = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            DisplayCounter { next: 1 }
        };

        let allocated = counter.next.max(floor);
        write_json(&path, &DisplayCounter {
            next: allocated + 1,
        })?;
        Ok(allocated)
    }

    /// List team ids with locally persisted state.
    pub fn known_teams(&self) -> Result<Vec<TeamId>> {
        let teams_dir = self.data_dir.join("teams");
        if !teams_dir.exists() {
            return Ok(Vec::new());
        }

        let mut teams = Vec::new();
        for entry in fs::read_dir(teams_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                teams.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        teams.sort();
        Ok(teams)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_json_or_default<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}
