//! Slot resolution on a single planner day.
//!
//! The grid only knows placed occurrences: anything with a null start is
//! floating and never blocks. Searches are confined to the 05:00..23:00
//! window and snap to a fixed minute increment.
//!
//! `find_next_free` is a bump-and-rescan search, not an exact free-interval
//! computation. It always answers, but in a dense day the answer can still
//! collide; callers that need a guarantee re-check with `is_free`.

use serde::{Deserialize, Serialize};

use crate::planner::Occurrence;
use crate::time::{snap_down, snap_up, ClockTime, DayOfWeek, WeekKey};

/// Earliest start the search will propose (05:00).
pub const WINDOW_START: i32 = 5 * 60;

/// End of the searchable day (23:00). The upper clamp is this minus the snap.
pub const WINDOW_END: i32 = 23 * 60;

/// Default start hint for unplaced occurrences.
pub fn window_start() -> ClockTime {
    ClockTime::saturating_from(WINDOW_START)
}

/// Which way `find_next_free` walks when the requested start is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDirection {
    /// Later in the day.
    Down,
    /// Earlier in the day.
    Up,
}

#[derive(Debug, Clone)]
struct Busy {
    id: String,
    start: i32,
    end: i32,
}

/// Placed intervals of one (week, day).
#[derive(Debug, Clone, Default)]
pub struct DayGrid {
    busy: Vec<Busy>,
}

fn overlaps(start: i32, end: i32, other_start: i32, other_end: i32) -> bool {
    !(end <= other_start || start >= other_end)
}

fn clamp_to_window(minutes: i32, snap: i32) -> i32 {
    let upper = (WINDOW_END - snap).max(WINDOW_START);
    minutes.clamp(WINDOW_START, upper)
}

impl DayGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid of every placed occurrence on `day` of `week`.
    pub fn for_day<'a>(
        occurrences: impl IntoIterator<Item = &'a Occurrence>,
        week: WeekKey,
        day: DayOfWeek,
    ) -> Self {
        let mut grid = Self::new();
        for occ in occurrences {
            if occ.week != week || occ.day != day {
                continue;
            }
            if let Some(start) = occ.start {
                grid.occupy(occ.id.clone(), start, occ.duration_minutes);
            }
        }
        grid
    }

    pub fn occupy(&mut self, id: impl Into<String>, start: ClockTime, duration_minutes: u16) {
        let start = i32::from(start.minutes());
        self.busy.push(Busy {
            id: id.into(),
            start,
            end: start + i32::from(duration_minutes),
        });
    }

    pub fn len(&self) -> usize {
        self.busy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.busy.is_empty()
    }

    /// True when `[start, start + duration)` overlaps no placed interval
    /// other than `exclude`.
    pub fn is_free(&self, start: ClockTime, duration_minutes: u16, exclude: Option<&str>) -> bool {
        self.is_free_at(
            i32::from(start.minutes()),
            i32::from(duration_minutes),
            exclude,
        )
    }

    fn is_free_at(&self, start: i32, duration: i32, exclude: Option<&str>) -> bool {
        let end = start + duration;
        self.busy
            .iter()
            .filter(|b| Some(b.id.as_str()) != exclude)
            .all(|b| !overlaps(start, end, b.start, b.end))
    }

    /// Nearest start at or after (`Down`) or before (`Up`) `start`.
    ///
    /// Returns `start` untouched if it is already free. Otherwise bumps past
    /// each colliding interval in time order, snapping and clamping after
    /// every bump, and rescans until a pass changes nothing. The result is
    /// best effort and may still collide.
    pub fn find_next_free(
        &self,
        start: ClockTime,
        duration_minutes: u16,
        direction: SearchDirection,
        snap_minutes: u16,
        exclude: Option<&str>,
    ) -> ClockTime {
        let duration = i32::from(duration_minutes);
        if self.is_free_at(i32::from(start.minutes()), duration, exclude) {
            return start;
        }

        let snap = i32::from(snap_minutes.max(1));
        let mut blockers: Vec<(i32, i32)> = self
            .busy
            .iter()
            .filter(|b| Some(b.id.as_str()) != exclude)
            .map(|b| (b.start, b.end))
            .collect();
        blockers.sort_unstable();

        let mut candidate = clamp_to_window(i32::from(start.minutes()), snap);
        for _ in 0..=blockers.len() {
            let before = candidate;
            let mut bumped = false;
            match direction {
                SearchDirection::Down => {
                    for &(s, e) in &blockers {
                        if overlaps(candidate, candidate + duration, s, e) {
                            candidate = clamp_to_window(snap_up(e, snap), snap);
                            bumped = true;
                        }
                    }
                }
                SearchDirection::Up => {
                    for &(s, e) in blockers.iter().rev() {
                        if overlaps(candidate, candidate + duration, s, e) {
                            candidate = clamp_to_window(snap_down(s - duration, snap), snap);
                            bumped = true;
                        }
                    }
                }
            }
            if !bumped || candidate == before || self.is_free_at(candidate, duration, exclude) {
                break;
            }
        }

        ClockTime::saturating_from(candidate)
    }
}
