//! Weekly plan commands.

use clap::Subcommand;
use lifeplan_core::{ClockTime, DayOfWeek, MoveOutcome, MoveRejection, Occurrence, SearchDirection};

use super::{print_json, CommandResult, Session};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Regenerate goal actions for a week
    Generate {
        /// Week key, e.g. "2026-W42" (default: configured or current week)
        #[arg(long)]
        week: Option<String>,
    },
    /// Show a week's occurrences
    Show {
        #[arg(long)]
        week: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move an occurrence to another day/start within its week
    Move {
        /// Occurrence ID
        id: String,
        /// Day (0-6 or mon..sun)
        day: String,
        /// Start (HH:MM)
        start: String,
    },
    /// Remove an occurrence
    Remove {
        /// Occurrence ID
        id: String,
    },
    /// Find the nearest free start on a day
    Slot {
        /// Day (0-6 or mon..sun)
        day: String,
        /// Requested start (HH:MM)
        start: String,
        /// Duration in minutes
        minutes: u16,
        /// Search earlier in the day instead of later
        #[arg(long)]
        up: bool,
        #[arg(long)]
        week: Option<String>,
        /// Occurrence to ignore, e.g. the one being moved
        #[arg(long)]
        exclude: Option<String>,
    },
}

fn print_occurrence(occ: &Occurrence) {
    let when = match (occ.start, occ.end()) {
        (Some(start), Some(end)) => format!("{start}-{end}"),
        _ => "floating".to_string(),
    };
    let pin = if occ.fixed { " *" } else { "" };
    println!(
        "  {:<11} {}{pin}  [{}] {}  {}",
        when,
        occ.label,
        occ.source.as_str(),
        occ.owner,
        occ.id
    );
}

pub fn run(action: PlanAction) -> CommandResult {
    let mut session = Session::open()?;

    match action {
        PlanAction::Generate { week } => {
            let week = session.week(week.as_deref())?;
            let report = session.planner.generate_for_week(Some(week));
            session.save()?;
            println!(
                "Week {week}: {} desired, {} kept, {} placed, {} dropped",
                report.desired, report.kept, report.placed, report.dropped
            );
        }
        PlanAction::Show { week, json } => {
            let week = session.week(week.as_deref())?;
            let mut occurrences: Vec<&Occurrence> =
                session.planner.occurrences_for_week(week).collect();
            occurrences.sort_by_key(|o| (o.day, o.start));
            if json {
                print_json(&occurrences)?;
                return Ok(());
            }
            println!("Week {week} (from {})", week.week_start());
            for day in DayOfWeek::ALL {
                let todays: Vec<_> = occurrences.iter().filter(|o| o.day == day).collect();
                if todays.is_empty() {
                    continue;
                }
                println!("{day} {}", week.date_of(day));
                for occ in todays {
                    print_occurrence(occ);
                }
            }
        }
        PlanAction::Move { id, day, start } => {
            let day: DayOfWeek = day.parse()?;
            let start: ClockTime = start.parse()?;
            match session.planner.move_occurrence(&id, day, start) {
                MoveOutcome::Moved => {
                    session.save()?;
                    println!("Moved {id} to {day} {start}");
                }
                MoveOutcome::Rejected {
                    reason: MoveRejection::NotFound,
                } => return Err(format!("unknown occurrence: {id}").into()),
                MoveOutcome::Rejected {
                    reason: MoveRejection::SlotTaken,
                } => return Err(format!("{day} {start} is already taken").into()),
            }
        }
        PlanAction::Remove { id } => {
            if !session.planner.remove_occurrence(&id) {
                return Err(format!("unknown occurrence: {id}").into());
            }
            session.save()?;
            println!("Removed {id}");
        }
        PlanAction::Slot {
            day,
            start,
            minutes,
            up,
            week,
            exclude,
        } => {
            let week = session.week(week.as_deref())?;
            let day: DayOfWeek = day.parse()?;
            let start: ClockTime = start.parse()?;
            let direction = if up {
                SearchDirection::Up
            } else {
                SearchDirection::Down
            };
            let found = session.planner.find_next_free(
                week,
                day,
                start,
                minutes,
                direction,
                exclude.as_deref(),
            );
            let free = session
                .planner
                .is_free(week, day, found, minutes, exclude.as_deref());
            if free {
                println!("{found}");
            } else {
                println!("{found} (best effort, still overlaps)");
            }
        }
    }
    Ok(())
}
