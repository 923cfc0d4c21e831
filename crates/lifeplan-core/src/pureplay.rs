//! Pure-play token cycle.
//!
//! A rolling window of `CYCLE_DAYS` days grants `TOKENS_PER_CYCLE` bookings.
//! Each pure-play booking spends one token and pins a `pureplay` occurrence
//! into the requested slot. Refusals are reported as values, not errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::goal::PurePlayItem;
use crate::planner::{Occurrence, OccurrenceSource, OwnerRef};
use crate::slots::DayGrid;
use crate::time::{add_days, days_between, ClockTime, DayOfWeek, WeekKey};

pub const CYCLE_DAYS: i64 = 7;
pub const TOKENS_PER_CYCLE: u32 = 3;

/// Template key stamped on pure-play occurrences.
pub const PURE_PLAY_KEY: &str = "pureplay";

/// Token usage within the current window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCycle {
    /// First day of the current window; `None` before the first booking.
    #[serde(default)]
    pub started_on: Option<NaiveDate>,
    #[serde(default)]
    pub used: u32,
}

impl TokenCycle {
    /// Start of the window that contains `today`, keeping the original cadence.
    fn window_start(&self, today: NaiveDate) -> NaiveDate {
        match self.started_on {
            Some(start) => {
                let elapsed = days_between(start, today);
                if elapsed < CYCLE_DAYS {
                    start
                } else {
                    add_days(start, elapsed - elapsed % CYCLE_DAYS)
                }
            }
            None => today,
        }
    }

    fn is_current(&self, today: NaiveDate) -> bool {
        self.started_on == Some(self.window_start(today))
    }

    /// Tokens still available on `today`.
    pub fn remaining(&self, today: NaiveDate) -> u32 {
        if self.is_current(today) {
            TOKENS_PER_CYCLE.saturating_sub(self.used)
        } else {
            TOKENS_PER_CYCLE
        }
    }

    /// Day the next window begins.
    pub fn resets_on(&self, today: NaiveDate) -> NaiveDate {
        add_days(self.window_start(today), CYCLE_DAYS)
    }

    /// Spend one token, rolling the window forward first if it has elapsed.
    pub fn try_consume(&mut self, today: NaiveDate) -> bool {
        if !self.is_current(today) {
            self.started_on = Some(self.window_start(today));
            self.used = 0;
        }
        if self.used >= TOKENS_PER_CYCLE {
            return false;
        }
        self.used += 1;
        true
    }
}

/// Why a booking was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NoTokensRemaining,
    SlotTaken,
    UnknownItem,
}

impl RejectReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoTokensRemaining => "no tokens remaining",
            Self::SlotTaken => "requested slot already taken",
            Self::UnknownItem => "unknown pure-play item",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Booking {
    Booked { occurrence_id: String },
    Rejected { reason: RejectReason },
}

/// A pure-play booking request.
#[derive(Debug, Clone, Copy)]
pub struct BookingRequest {
    pub week: WeekKey,
    pub day: DayOfWeek,
    pub start: ClockTime,
    pub today: NaiveDate,
}

/// Book `item` into an exact slot, spending a token.
pub fn book(
    cycle: &mut TokenCycle,
    item: &PurePlayItem,
    occurrences: &mut Vec<Occurrence>,
    request: BookingRequest,
) -> Booking {
    if cycle.remaining(request.today) == 0 {
        debug!(item = %item.id, "pure-play booking refused: no tokens");
        return Booking::Rejected {
            reason: RejectReason::NoTokensRemaining,
        };
    }
    let grid = DayGrid::for_day(occurrences.iter(), request.week, request.day);
    if !grid.is_free(request.start, item.duration_minutes, None) {
        debug!(item = %item.id, start = %request.start, "pure-play booking refused: slot taken");
        return Booking::Rejected {
            reason: RejectReason::SlotTaken,
        };
    }
    if !cycle.try_consume(request.today) {
        return Booking::Rejected {
            reason: RejectReason::NoTokensRemaining,
        };
    }

    let occurrence = Occurrence {
        id: uuid::Uuid::new_v4().to_string(),
        week: request.week,
        owner: OwnerRef::pure_play(item.id.clone()),
        template_key: PURE_PLAY_KEY.to_string(),
        ordinal: 0,
        label: item.label.clone(),
        day: request.day,
        origin_day: None,
        duration_minutes: item.duration_minutes,
        start: Some(request.start),
        fixed: true,
        source: OccurrenceSource::PurePlay,
    };
    let occurrence_id = occurrence.id.clone();
    occurrences.push(occurrence);
    Booking::Booked { occurrence_id }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(start: &str, today: NaiveDate) -> BookingRequest {
        BookingRequest {
            week: WeekKey::from_date(today),
            day: DayOfWeek::SAT,
            start: ClockTime::parse(start).unwrap(),
            today,
        }
    }

    #[test]
    fn fresh_cycle_has_all_tokens() {
        let cycle = TokenCycle::default();
        assert_eq!(cycle.remaining(day(2026, 10, 12)), TOKENS_PER_CYCLE);
    }

    #[test]
    fn tokens_run_out_within_window() {
        let mut cycle = TokenCycle::default();
        let today = day(2026, 10, 12);
        for _ in 0..TOKENS_PER_CYCLE {
            assert!(cycle.try_consume(today));
        }
        assert!(!cycle.try_consume(add_days(today, 6)));
        assert_eq!(cycle.remaining(add_days(today, 6)), 0);
    }

    #[test]
    fn window_rolls_over_on_cadence() {
        let mut cycle = TokenCycle::default();
        let start = day(2026, 10, 12);
        for _ in 0..TOKENS_PER_CYCLE {
            cycle.try_consume(start);
        }
        let later = add_days(start, 16);
        assert_eq!(cycle.remaining(later), TOKENS_PER_CYCLE);
        assert!(cycle.try_consume(later));
        assert_eq!(cycle.started_on, Some(add_days(start, 14)));
        assert_eq!(cycle.resets_on(later), add_days(start, 21));
    }

    #[test]
    fn booking_pins_a_pureplay_occurrence() {
        let mut cycle = TokenCycle::default();
        let item = PurePlayItem::new("Pottery", 120);
        let mut occurrences = Vec::new();
        let today = day(2026, 10, 15);

        let booking = book(&mut cycle, &item, &mut occurrences, request("14:00", today));
        assert!(matches!(booking, Booking::Booked { .. }));
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].source, OccurrenceSource::PurePlay);
        assert!(occurrences[0].fixed);
        assert_eq!(cycle.used, 1);
    }

    #[test]
    fn taken_slot_is_refused_without_spending() {
        let mut cycle = TokenCycle::default();
        let item = PurePlayItem::new("Climbing", 90);
        let mut occurrences = Vec::new();
        let today = day(2026, 10, 15);

        book(&mut cycle, &item, &mut occurrences, request("10:00", today));
        let second = book(&mut cycle, &item, &mut occurrences, request("11:00", today));
        assert_eq!(
            second,
            Booking::Rejected {
                reason: RejectReason::SlotTaken
            }
        );
        assert_eq!(cycle.used, 1);
    }

    #[test]
    fn empty_cycle_refuses() {
        let today = day(2026, 10, 15);
        let mut cycle = TokenCycle {
            started_on: Some(today),
            used: TOKENS_PER_CYCLE,
        };
        let item = PurePlayItem::new("Dance", 60);
        let mut occurrences = Vec::new();
        let booking = book(&mut cycle, &item, &mut occurrences, request("18:00", today));
        assert_eq!(
            booking,
            Booking::Rejected {
                reason: RejectReason::NoTokensRemaining
            }
        );
        assert!(occurrences.is_empty());
    }
}
