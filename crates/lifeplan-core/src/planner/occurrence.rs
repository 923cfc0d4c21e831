//! Calendar occurrence records and their owners.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::{ClockTime, DayOfWeek, WeekKey};

/// Who an occurrence was expanded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OwnerRef {
    Goal { id: String },
    System { id: String },
    ProjectStep { project: String, step: String },
    PurePlayItem { id: String },
}

impl OwnerRef {
    pub fn goal(id: impl Into<String>) -> Self {
        Self::Goal { id: id.into() }
    }

    pub fn system(id: impl Into<String>) -> Self {
        Self::System { id: id.into() }
    }

    pub fn project_step(project: impl Into<String>, step: impl Into<String>) -> Self {
        Self::ProjectStep {
            project: project.into(),
            step: step.into(),
        }
    }

    pub fn pure_play(id: impl Into<String>) -> Self {
        Self::PurePlayItem { id: id.into() }
    }

    pub fn goal_id(&self) -> Option<&str> {
        match self {
            Self::Goal { id } => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Goal { id } => write!(f, "goal:{id}"),
            Self::System { id } => write!(f, "system:{id}"),
            Self::ProjectStep { project, step } => write!(f, "project:{project}/{step}"),
            Self::PurePlayItem { id } => write!(f, "pureplay:{id}"),
        }
    }
}

/// Which generator produced an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceSource {
    /// Weekly goal generation; regenerated on every run.
    Goal,
    /// Systems, projects and hand-placed entries; never touched by regeneration.
    Manual,
    /// Pure-play bookings.
    PurePlay,
}

impl OccurrenceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goal => "goal",
            Self::Manual => "manual",
            Self::PurePlay => "pureplay",
        }
    }
}

/// Reconciliation identity: owner, template, day and the pick's ordinal on
/// that day.
pub type Signature = (OwnerRef, String, DayOfWeek, u8);

/// One concrete placement in one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: String,
    pub week: WeekKey,
    pub owner: OwnerRef,
    pub template_key: String,
    /// Distinguishes repeated picks of the same template on the same day.
    #[serde(default)]
    pub ordinal: u8,
    pub label: String,
    pub day: DayOfWeek,
    /// Day the generator expanded this occurrence for, when a move has since
    /// put it on another day. Reconciliation matches on this day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_day: Option<DayOfWeek>,
    pub duration_minutes: u16,
    /// `None` while floating.
    #[serde(default)]
    pub start: Option<ClockTime>,
    #[serde(default)]
    pub fixed: bool,
    pub source: OccurrenceSource,
}

impl Occurrence {
    pub fn signature(&self) -> Signature {
        (
            self.owner.clone(),
            self.template_key.clone(),
            self.origin_day(),
            self.ordinal,
        )
    }

    /// Day the occurrence was generated for, regardless of later moves.
    pub fn origin_day(&self) -> DayOfWeek {
        self.origin_day.unwrap_or(self.day)
    }

    /// Move to another day, remembering the generated day once.
    pub fn relocate(&mut self, day: DayOfWeek, start: ClockTime) {
        if day != self.day && self.origin_day.is_none() {
            self.origin_day = Some(self.day);
        }
        if self.origin_day == Some(day) {
            self.origin_day = None;
        }
        self.day = day;
        self.start = Some(start);
    }

    /// `[start, end)` in minutes of the day, if placed.
    pub fn interval(&self) -> Option<(u16, u16)> {
        self.start
            .map(|s| (s.minutes(), s.minutes().saturating_add(self.duration_minutes)))
    }

    pub fn end(&self) -> Option<ClockTime> {
        self.interval()
            .and_then(|(_, end)| ClockTime::from_minutes(end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_refs_compare_structurally() {
        assert_eq!(OwnerRef::goal("g1"), OwnerRef::goal("g1"));
        assert_ne!(OwnerRef::goal("g1"), OwnerRef::system("g1"));
        assert_ne!(
            OwnerRef::project_step("p", "s1"),
            OwnerRef::project_step("p", "s2")
        );
        assert_eq!(OwnerRef::project_step("p", "s").to_string(), "project:p/s");
    }

    #[test]
    fn occurrence_json_shape() {
        let occ = Occurrence {
            id: "o1".to_string(),
            week: "2026-W42".parse().unwrap(),
            owner: OwnerRef::goal("g1"),
            template_key: "run".to_string(),
            ordinal: 0,
            label: "Run".to_string(),
            day: DayOfWeek::WED,
            origin_day: None,
            duration_minutes: 30,
            start: ClockTime::parse("07:00"),
            fixed: false,
            source: OccurrenceSource::PurePlay,
        };
        let json = serde_json::to_value(&occ).unwrap();
        assert_eq!(json["week"], "2026-W42");
        assert_eq!(json["owner"]["kind"], "goal");
        assert_eq!(json["day"], 2);
        assert_eq!(json["start"], "07:00");
        assert_eq!(json["source"], "pureplay");
        let back: Occurrence = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, occ);
        assert_eq!(back.end().map(|t| t.to_string()).as_deref(), Some("07:30"));
        assert!(json.get("origin_day").is_none());
    }

    fn sample(day: DayOfWeek) -> Occurrence {
        Occurrence {
            id: "o1".to_string(),
            week: "2026-W42".parse().unwrap(),
            owner: OwnerRef::goal("g1"),
            template_key: "walk".to_string(),
            ordinal: 0,
            label: "Walk".to_string(),
            day,
            origin_day: None,
            duration_minutes: 30,
            start: ClockTime::parse("05:00"),
            fixed: false,
            source: OccurrenceSource::Goal,
        }
    }

    #[test]
    fn relocation_keeps_the_generated_signature() {
        let mut occ = sample(DayOfWeek::MON);
        let signature = occ.signature();

        occ.relocate(DayOfWeek::THU, ClockTime::parse("12:00").unwrap());
        assert_eq!(occ.day, DayOfWeek::THU);
        assert_eq!(occ.origin_day, Some(DayOfWeek::MON));
        assert_eq!(occ.signature(), signature);

        occ.relocate(DayOfWeek::FRI, ClockTime::parse("12:00").unwrap());
        assert_eq!(occ.signature(), signature);

        occ.relocate(DayOfWeek::MON, ClockTime::parse("08:00").unwrap());
        assert_eq!(occ.origin_day, None);
        assert_eq!(occ.signature(), signature);
    }

    #[test]
    fn oversized_duration_saturates() {
        let mut occ = sample(DayOfWeek::MON);
        occ.duration_minutes = u16::MAX;
        assert_eq!(occ.interval(), Some((300, u16::MAX)));
        assert_eq!(occ.end(), None);
    }
}
