pub mod board;
pub mod config;
pub mod goal;
pub mod plan;
pub mod play;
pub mod project;
pub mod schedule;
pub mod system;
pub mod template;

use lifeplan_core::{Config, Planner, Snapshot, WeekKey};
use serde::Serialize;
use tracing::debug;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Planner snapshot plus config for the duration of one command.
pub struct Session {
    snapshot: Snapshot,
    pub config: Config,
    pub planner: Planner,
}

impl Session {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let snapshot = Snapshot::default_location()?;
        let mut planner = snapshot.load()?;
        planner.set_settings(config.settings());
        debug!(path = %snapshot.path().display(), goals = planner.goals().len(), "opened snapshot");
        Ok(Self {
            snapshot,
            config,
            planner,
        })
    }

    pub fn save(&self) -> CommandResult {
        self.snapshot.save(&self.planner)?;
        Ok(())
    }

    /// The named week, else the configured default, else this week.
    pub fn week(&self, week: Option<&str>) -> Result<WeekKey, Box<dyn std::error::Error>> {
        match week.or(self.config.planner.default_week.as_deref()) {
            Some(text) => Ok(text.parse()?),
            None => Ok(WeekKey::current()),
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
