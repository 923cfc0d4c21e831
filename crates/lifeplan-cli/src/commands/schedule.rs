use clap::Subcommand;
use lifeplan_core::OwnerRef;

use super::{CommandResult, Session};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Place a system's templates into a week
    System {
        /// System ID
        id: String,
        #[arg(long)]
        week: Option<String>,
    },
    /// Place a project step's templates into a week
    Project {
        /// Project ID
        project: String,
        /// Step ID
        step: String,
        #[arg(long)]
        week: Option<String>,
    },
}

pub fn run(action: ScheduleAction) -> CommandResult {
    let mut session = Session::open()?;

    let (owner, week) = match action {
        ScheduleAction::System { id, week } => (OwnerRef::system(id), week),
        ScheduleAction::Project {
            project,
            step,
            week,
        } => (OwnerRef::project_step(project, step), week),
    };
    let week = session.week(week.as_deref())?;
    let created = session.planner.schedule_to_week(&owner, Some(week))?;
    session.save()?;
    println!("Scheduled {created} occurrence(s) for {owner} in {week}");
    Ok(())
}
