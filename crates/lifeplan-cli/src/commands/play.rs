//! Pure-play items and token bookings.

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use lifeplan_core::pureplay::TOKENS_PER_CYCLE;
use lifeplan_core::{Booking, ClockTime, DayOfWeek, PurePlayItem};

use super::{print_json, CommandResult, Session};

#[derive(Subcommand)]
pub enum PlayAction {
    /// Register a pure-play item
    Add {
        /// Item label
        label: String,
        /// Duration in minutes
        #[arg(long)]
        minutes: u16,
    },
    /// Book an item into an exact slot, spending a token
    Book {
        /// Item ID
        id: String,
        /// Day (0-6 or mon..sun)
        day: String,
        /// Start (HH:MM)
        start: String,
        #[arg(long)]
        week: Option<String>,
    },
    /// Show remaining tokens
    Tokens,
    /// List items as JSON
    List,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn run(action: PlayAction) -> CommandResult {
    let mut session = Session::open()?;

    match action {
        PlayAction::Add { label, minutes } => {
            let id = session
                .planner
                .add_pure_play_item(PurePlayItem::new(label, minutes));
            session.save()?;
            println!("Pure-play item created: {id}");
        }
        PlayAction::Book {
            id,
            day,
            start,
            week,
        } => {
            let week = session.week(week.as_deref())?;
            let day: DayOfWeek = day.parse()?;
            let start: ClockTime = start.parse()?;
            match session.planner.book_pure_play(&id, week, day, start, today()) {
                Booking::Booked { occurrence_id } => {
                    session.save()?;
                    println!("Booked: {occurrence_id}");
                }
                Booking::Rejected { reason } => return Err(reason.message().into()),
            }
        }
        PlayAction::Tokens => {
            let today = today();
            let cycle = session.planner.token_cycle();
            println!(
                "{}/{TOKENS_PER_CYCLE} tokens left, resets on {}",
                cycle.remaining(today),
                cycle.resets_on(today)
            );
        }
        PlayAction::List => print_json(session.planner.pure_play_items())?,
    }
    Ok(())
}
