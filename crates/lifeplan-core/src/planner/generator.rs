//! Weekly action generation.
//!
//! Expands templates into desired occurrences, reconciles goal-sourced
//! occurrences already stored for the week, and places whatever is new
//! through the slot resolver.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{BoardEntry, Tier};
use crate::goal::{ActionTemplate, Goal, Placement, MAX_TIMES_PER_WEEK};
use crate::slots::{window_start, DayGrid, SearchDirection};
use crate::time::{ClockTime, DayOfWeek, WeekKey};

use super::{Occurrence, OccurrenceSource, OwnerRef, Signature};

/// Day order used when a frequency template names no preferred days.
pub const DEFAULT_DAY_ROTATION: [DayOfWeek; 7] = [
    DayOfWeek::MON,
    DayOfWeek::WED,
    DayOfWeek::FRI,
    DayOfWeek::SUN,
    DayOfWeek::TUE,
    DayOfWeek::THU,
    DayOfWeek::SAT,
];

/// An occurrence the week should contain, before placement.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredOccurrence {
    pub owner: OwnerRef,
    pub template_key: String,
    pub ordinal: u8,
    pub label: String,
    pub day: DayOfWeek,
    pub duration_minutes: u16,
    /// Start to try first when placing.
    pub hint: Option<ClockTime>,
    /// Specific-mode template with an explicit start.
    pub fixed: bool,
}

impl DesiredOccurrence {
    pub fn signature(&self) -> Signature {
        (
            self.owner.clone(),
            self.template_key.clone(),
            self.day,
            self.ordinal,
        )
    }

    fn place(&self, week: WeekKey, start: ClockTime, source: OccurrenceSource) -> Occurrence {
        Occurrence {
            id: uuid::Uuid::new_v4().to_string(),
            week,
            owner: self.owner.clone(),
            template_key: self.template_key.clone(),
            ordinal: self.ordinal,
            label: self.label.clone(),
            day: self.day,
            origin_day: None,
            duration_minutes: self.duration_minutes,
            start: Some(start),
            fixed: self.fixed,
            source,
        }
    }
}

/// Summary of one `generate_for_week` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub desired: usize,
    pub kept: usize,
    pub placed: usize,
    pub dropped: usize,
}

/// Expand an owner's templates into the occurrences one week should hold.
/// Templates that cannot be expanded are skipped.
pub fn expand_templates(owner: &OwnerRef, templates: &[ActionTemplate]) -> Vec<DesiredOccurrence> {
    let mut desired = Vec::new();
    for template in templates {
        let desire = |day: DayOfWeek, ordinal: u8, hint: Option<ClockTime>, fixed: bool| {
            DesiredOccurrence {
                owner: owner.clone(),
                template_key: template.key.clone(),
                ordinal,
                label: template.label.clone(),
                day,
                duration_minutes: template.duration_minutes,
                hint,
                fixed,
            }
        };

        match &template.placement {
            Placement::Specific { day: None, .. } => {
                debug!(%owner, key = %template.key, "specific template has no day, skipping");
            }
            Placement::Specific {
                day: Some(day),
                start,
            } => desired.push(desire(*day, 0, *start, start.is_some())),
            Placement::Frequency {
                times_per_week,
                preferred_days,
                preferred_start,
            } => {
                let count = if times_per_week.is_finite() && *times_per_week > 0.0 {
                    times_per_week.round().min(MAX_TIMES_PER_WEEK) as usize
                } else {
                    0
                };
                if count == 0 {
                    debug!(%owner, key = %template.key, times_per_week, "non-positive frequency, skipping");
                    continue;
                }
                let days: &[DayOfWeek] = if preferred_days.is_empty() {
                    &DEFAULT_DAY_ROTATION
                } else {
                    preferred_days
                };
                let mut per_day = [0u8; 7];
                for pick in 0..count {
                    let day = days[pick % days.len()];
                    let ordinal = &mut per_day[usize::from(day.index())];
                    desired.push(desire(day, *ordinal, *preferred_start, false));
                    *ordinal += 1;
                }
            }
        }
    }
    desired
}

/// Desired occurrences for every active near-term goal on the board.
pub fn desired_for_goals(goals: &[Goal], board: &[BoardEntry]) -> Vec<DesiredOccurrence> {
    board
        .iter()
        .filter(|e| e.partition.is_near_term() && e.tier == Tier::Active)
        .filter_map(|e| goals.iter().find(|g| g.id == e.goal_id))
        .filter(|g| !g.templates.is_empty())
        .flat_map(|g| expand_templates(&OwnerRef::goal(g.id.clone()), &g.templates))
        .collect()
}

/// Place desired occurrences one after another, each seeing the ones
/// placed before it.
fn place_all(
    desired: &[DesiredOccurrence],
    grids: &mut [DayGrid; 7],
    week: WeekKey,
    snap_minutes: u16,
    source: OccurrenceSource,
) -> Vec<Occurrence> {
    desired
        .iter()
        .map(|d| {
            let grid = &mut grids[usize::from(d.day.index())];
            let hint = d.hint.unwrap_or_else(window_start);
            let start = grid.find_next_free(
                hint,
                d.duration_minutes,
                SearchDirection::Down,
                snap_minutes,
                None,
            );
            let occurrence = d.place(week, start, source);
            grid.occupy(occurrence.id.clone(), start, occurrence.duration_minutes);
            occurrence
        })
        .collect()
}

fn grids_for<'a>(occurrences: impl IntoIterator<Item = &'a Occurrence>, week: WeekKey) -> [DayGrid; 7] {
    let mut grids: [DayGrid; 7] = Default::default();
    for occ in occurrences {
        if occ.week != week {
            continue;
        }
        if let Some(start) = occ.start {
            grids[usize::from(occ.day.index())].occupy(occ.id.clone(), start, occ.duration_minutes);
        }
    }
    grids
}

/// Regenerate the goal-sourced occurrences of `week`.
///
/// Returns the full replacement occurrence collection. Occurrences of other
/// weeks and non-goal sources are carried over unchanged and in order;
/// matching goal occurrences keep their id and placement.
pub fn generate_for_week(
    goals: &[Goal],
    board: &[BoardEntry],
    occurrences: &[Occurrence],
    week: WeekKey,
    snap_minutes: u16,
) -> (Vec<Occurrence>, GenerationReport) {
    let desired = desired_for_goals(goals, board);

    let is_regenerated = |o: &Occurrence| o.week == week && o.source == OccurrenceSource::Goal;
    let mut existing: HashMap<Signature, &Occurrence> = HashMap::new();
    for occ in occurrences.iter().filter(|o| is_regenerated(o)) {
        existing.entry(occ.signature()).or_insert(occ);
    }

    let mut kept = Vec::new();
    let mut fresh = Vec::new();
    for d in &desired {
        match existing.remove(&d.signature()) {
            Some(occ) => {
                let mut occ = occ.clone();
                occ.label = d.label.clone();
                occ.duration_minutes = d.duration_minutes;
                kept.push(occ);
            }
            None => fresh.push(d.clone()),
        }
    }

    let untouched: Vec<Occurrence> = occurrences
        .iter()
        .filter(|o| !is_regenerated(o))
        .cloned()
        .collect();

    let mut grids = grids_for(untouched.iter().chain(kept.iter()), week);
    let placed = place_all(&fresh, &mut grids, week, snap_minutes, OccurrenceSource::Goal);

    let report = GenerationReport {
        desired: desired.len(),
        kept: kept.len(),
        placed: placed.len(),
        dropped: existing.len(),
    };
    info!(
        %week,
        desired = report.desired,
        kept = report.kept,
        placed = report.placed,
        dropped = report.dropped,
        "generated weekly actions"
    );

    let mut next = untouched;
    next.extend(kept);
    next.extend(placed);
    (next, report)
}

/// Expand and place an owner's templates into `week` as `manual`
/// occurrences. No reconciliation: every call appends fresh ones.
pub fn schedule_templates(
    owner: &OwnerRef,
    templates: &[ActionTemplate],
    occurrences: &[Occurrence],
    week: WeekKey,
    snap_minutes: u16,
) -> Vec<Occurrence> {
    let desired = expand_templates(owner, templates);
    let mut grids = grids_for(occurrences, week);
    let placed = place_all(&desired, &mut grids, week, snap_minutes, OccurrenceSource::Manual);
    info!(%owner, %week, created = placed.len(), "scheduled templates");
    placed
}
