//! The planner aggregate.
//!
//! [`Planner`] owns every collection the engine works over and is the only
//! way callers mutate them. Each operation reads the collections it needs
//! and writes back whole replacements, so the board and the calendar are
//! always consistent with the goals between calls.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{self, BoardEntry, PartitionKey};
use crate::error::{Result, ValidationError};
use crate::goal::{validate_templates, ActionTemplate, Category, Goal, Project, PurePlayItem, System};
use crate::planner::{self, GenerationReport, Occurrence, OwnerRef};
use crate::pureplay::{self, Booking, BookingRequest, RejectReason, TokenCycle};
use crate::slots::{DayGrid, SearchDirection};
use crate::time::{ClockTime, DayOfWeek, WeekKey};

pub const DEFAULT_SNAP_MINUTES: u16 = 15;

fn default_snap_minutes() -> u16 {
    DEFAULT_SNAP_MINUTES
}

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Minute increment placed starts are rounded to.
    #[serde(default = "default_snap_minutes")]
    pub snap_minutes: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snap_minutes: DEFAULT_SNAP_MINUTES,
        }
    }
}

/// Why a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveRejection {
    NotFound,
    SlotTaken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved,
    Rejected { reason: MoveRejection },
}

/// All planner state: goals, template owners, boards, calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Planner {
    #[serde(default)]
    goals: Vec<Goal>,
    #[serde(default)]
    systems: Vec<System>,
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    pure_play: Vec<PurePlayItem>,
    #[serde(default)]
    board: Vec<BoardEntry>,
    #[serde(default)]
    occurrences: Vec<Occurrence>,
    #[serde(default)]
    tokens: TokenCycle,
    #[serde(default)]
    settings: Settings,
}

impl Planner {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn systems(&self) -> &[System] {
        &self.systems
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn pure_play_items(&self) -> &[PurePlayItem] {
        &self.pure_play
    }

    pub fn board(&self) -> &[BoardEntry] {
        &self.board
    }

    pub fn board_entry(&self, goal_id: &str) -> Option<&BoardEntry> {
        self.board.iter().find(|e| e.goal_id == goal_id)
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    pub fn occurrences_for_week(&self, week: WeekKey) -> impl Iterator<Item = &Occurrence> {
        self.occurrences.iter().filter(move |o| o.week == week)
    }

    pub fn token_cycle(&self) -> &TokenCycle {
        &self.tokens
    }

    // ---- goal tree ----

    /// Create a root goal. It starts unclassified, so it is not on a board.
    pub fn add_root_goal(
        &mut self,
        title: impl Into<String>,
        category: Category,
        direction: impl Into<String>,
    ) -> String {
        let goal = Goal::new(title, category, direction);
        let id = goal.id.clone();
        self.goals.push(goal);
        id
    }

    /// Create a child goal inheriting the parent's category and direction.
    pub fn add_child_goal(&mut self, parent_id: &str, title: impl Into<String>) -> Result<String> {
        let parent = self
            .goal(parent_id)
            .ok_or_else(|| ValidationError::UnknownGoal(parent_id.to_string()))?;
        let mut goal = Goal::new(title, parent.category, parent.direction.clone());
        goal.parent_id = Some(parent_id.to_string());
        let id = goal.id.clone();
        self.goals.push(goal);
        Ok(id)
    }

    /// Insert a fully formed goal and project it onto its board.
    pub fn insert_goal(&mut self, goal: Goal) -> Result<()> {
        if self.goal(&goal.id).is_some() {
            return Err(ValidationError::InvalidValue {
                field: "id".to_string(),
                message: format!("goal {} already exists", goal.id),
            }
            .into());
        }
        if let Some(parent) = goal.parent_id.as_deref() {
            if self.goal(parent).is_none() {
                return Err(ValidationError::UnknownGoal(parent.to_string()).into());
            }
        }
        validate_templates(&goal.id, &goal.templates)?;
        let id = goal.id.clone();
        self.goals.push(goal);
        self.upsert_board_for_goal(&id);
        Ok(())
    }

    /// Edit a goal in place. The board is only refreshed when title,
    /// category, horizon or rubric changed. Edits leaving invalid templates
    /// are rolled back.
    pub fn update_goal(&mut self, id: &str, edit: impl FnOnce(&mut Goal)) -> Result<()> {
        let goal = self
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| ValidationError::UnknownGoal(id.to_string()))?;

        let original = goal.clone();
        edit(goal);
        goal.id = original.id.clone();
        goal.parent_id = original.parent_id.clone();
        if let Err(err) = validate_templates(&goal.id, &goal.templates) {
            *goal = original;
            return Err(err.into());
        }

        if goal.board_fields() != original.board_fields() {
            self.upsert_board_for_goal(id);
        }
        Ok(())
    }

    pub fn add_goal_template(&mut self, goal_id: &str, template: ActionTemplate) -> Result<()> {
        self.update_goal(goal_id, |g| g.templates.push(template))
    }

    /// Delete a goal and its whole subtree, with every board entry and
    /// occurrence owned by any of them. Returns the removed goal ids.
    pub fn delete_goal(&mut self, id: &str) -> Result<Vec<String>> {
        if self.goal(id).is_none() {
            return Err(ValidationError::UnknownGoal(id.to_string()).into());
        }

        let mut removed = vec![id.to_string()];
        let mut cursor = 0;
        while cursor < removed.len() {
            let parent = removed[cursor].clone();
            removed.extend(
                self.goals
                    .iter()
                    .filter(|g| g.parent_id.as_deref() == Some(parent.as_str()))
                    .map(|g| g.id.clone()),
            );
            cursor += 1;
        }
        let doomed: HashSet<&str> = removed.iter().map(String::as_str).collect();

        let touched: HashSet<PartitionKey> = self
            .board
            .iter()
            .filter(|e| doomed.contains(e.goal_id.as_str()))
            .map(|e| e.partition)
            .collect();

        self.goals.retain(|g| !doomed.contains(g.id.as_str()));
        self.board.retain(|e| !doomed.contains(e.goal_id.as_str()));
        self.occurrences
            .retain(|o| !o.owner.goal_id().is_some_and(|g| doomed.contains(g)));
        for partition in touched {
            board::rebalance(&mut self.board, partition);
        }

        info!(goal_id = id, removed = removed.len(), "deleted goal subtree");
        Ok(removed)
    }

    // ---- boards ----

    /// Insert, replace or drop the goal's board entry, then rebalance.
    pub fn upsert_board_for_goal(&mut self, goal_id: &str) {
        let goal = self.goals.iter().find(|g| g.id == goal_id);
        board::upsert_for_goal(&mut self.board, goal_id, goal);
    }

    pub fn rebalance(&mut self, partition: PartitionKey) -> usize {
        board::rebalance(&mut self.board, partition)
    }

    // ---- weekly generation ----

    /// Regenerate goal-sourced occurrences for `week` (default: this week).
    pub fn generate_for_week(&mut self, week: Option<WeekKey>) -> GenerationReport {
        let week = week.unwrap_or_else(WeekKey::current);
        let (next, report) = planner::generate_for_week(
            &self.goals,
            &self.board,
            &self.occurrences,
            week,
            self.settings.snap_minutes,
        );
        self.occurrences = next;
        report
    }

    /// Append fresh `manual` occurrences for a system or project step.
    /// Returns how many were created.
    pub fn schedule_to_week(&mut self, owner: &OwnerRef, week: Option<WeekKey>) -> Result<usize> {
        let week = week.unwrap_or_else(WeekKey::current);
        let templates = self.templates_of(owner)?;
        let created = planner::schedule_templates(
            owner,
            templates,
            &self.occurrences,
            week,
            self.settings.snap_minutes,
        );
        let count = created.len();
        self.occurrences.extend(created);
        Ok(count)
    }

    fn templates_of(&self, owner: &OwnerRef) -> Result<&[ActionTemplate]> {
        let unknown = || ValidationError::UnknownOwner(owner.to_string());
        let templates = match owner {
            OwnerRef::System { id } => self
                .systems
                .iter()
                .find(|s| &s.id == id)
                .map(|s| s.templates.as_slice()),
            OwnerRef::ProjectStep { project, step } => self
                .projects
                .iter()
                .find(|p| &p.id == project)
                .and_then(|p| p.step(step))
                .map(|s| s.templates.as_slice()),
            OwnerRef::Goal { .. } | OwnerRef::PurePlayItem { .. } => None,
        };
        templates.ok_or_else(|| unknown().into())
    }

    // ---- slots ----

    fn grid(&self, week: WeekKey, day: DayOfWeek) -> DayGrid {
        DayGrid::for_day(&self.occurrences, week, day)
    }

    pub fn is_free(
        &self,
        week: WeekKey,
        day: DayOfWeek,
        start: ClockTime,
        duration_minutes: u16,
        exclude: Option<&str>,
    ) -> bool {
        self.grid(week, day).is_free(start, duration_minutes, exclude)
    }

    /// Best-effort nearest start; see [`DayGrid::find_next_free`].
    pub fn find_next_free(
        &self,
        week: WeekKey,
        day: DayOfWeek,
        start: ClockTime,
        duration_minutes: u16,
        direction: SearchDirection,
        exclude: Option<&str>,
    ) -> ClockTime {
        self.grid(week, day).find_next_free(
            start,
            duration_minutes,
            direction,
            self.settings.snap_minutes,
            exclude,
        )
    }

    // ---- occurrences ----

    /// Add an externally created occurrence (typically `manual`).
    pub fn add_occurrence(&mut self, occurrence: Occurrence) {
        self.occurrences.push(occurrence);
    }

    pub fn remove_occurrence(&mut self, id: &str) -> bool {
        let before = self.occurrences.len();
        self.occurrences.retain(|o| o.id != id);
        self.occurrences.len() != before
    }

    /// Move an occurrence within its week, pinning it on success.
    pub fn move_occurrence(&mut self, id: &str, day: DayOfWeek, start: ClockTime) -> MoveOutcome {
        let Some(current) = self.occurrences.iter().find(|o| o.id == id) else {
            return MoveOutcome::Rejected {
                reason: MoveRejection::NotFound,
            };
        };
        if !self.is_free(current.week, day, start, current.duration_minutes, Some(id)) {
            debug!(occurrence = id, %day, %start, "move refused: slot taken");
            return MoveOutcome::Rejected {
                reason: MoveRejection::SlotTaken,
            };
        }
        if let Some(occ) = self.occurrences.iter_mut().find(|o| o.id == id) {
            occ.relocate(day, start);
            occ.fixed = true;
        }
        MoveOutcome::Moved
    }

    // ---- systems, projects, pure play ----

    pub fn add_system(&mut self, system: System) -> Result<String> {
        validate_templates(&system.id, &system.templates)?;
        let id = system.id.clone();
        self.systems.push(system);
        Ok(id)
    }

    pub fn add_project(&mut self, project: Project) -> Result<String> {
        for step in &project.steps {
            validate_templates(&step.id, &step.templates)?;
        }
        let id = project.id.clone();
        self.projects.push(project);
        Ok(id)
    }

    pub fn add_pure_play_item(&mut self, item: PurePlayItem) -> String {
        let id = item.id.clone();
        self.pure_play.push(item);
        id
    }

    /// Book a pure-play item into an exact slot, spending a token.
    pub fn book_pure_play(
        &mut self,
        item_id: &str,
        week: WeekKey,
        day: DayOfWeek,
        start: ClockTime,
        today: NaiveDate,
    ) -> Booking {
        let Some(item) = self.pure_play.iter().find(|i| i.id == item_id) else {
            return Booking::Rejected {
                reason: RejectReason::UnknownItem,
            };
        };
        let request = BookingRequest {
            week,
            day,
            start,
            today,
        };
        pureplay::book(&mut self.tokens, item, &mut self.occurrences, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Tier;
    use crate::goal::Horizon;
    use crate::planner::OccurrenceSource;
    use crate::scoring::RubricFamily;

    fn week() -> WeekKey {
        "2026-W42".parse().unwrap()
    }

    #[test]
    fn child_goal_inherits_category() {
        let mut planner = Planner::default();
        let root = planner.add_root_goal("Health", Category::Play, "body");
        let child = planner.add_child_goal(&root, "Swim weekly").unwrap();
        let child = planner.goal(&child).unwrap();
        assert_eq!(child.category, Category::Play);
        assert_eq!(child.direction, "body");
        assert_eq!(child.parent_id.as_deref(), Some(root.as_str()));
        assert!(planner.add_child_goal("missing", "x").is_err());
    }

    #[test]
    fn classifying_a_goal_puts_it_on_the_board() {
        let mut planner = Planner::default();
        let id = planner.add_root_goal("Learn piano", Category::Passion, "music");
        assert!(planner.board().is_empty());

        planner
            .update_goal(&id, |g| g.horizon = Horizon::NearTerm)
            .unwrap();
        let entry = planner.board_entry(&id).unwrap();
        assert_eq!(entry.tier, Tier::Active);
        assert_eq!(entry.rubric_label, "IART+G");
        assert!(entry.score.is_none());

        planner
            .update_goal(&id, |g| {
                let mut rubric = RubricFamily::Iartg.empty();
                for field in ["I", "A", "R", "T"] {
                    rubric.set_field(field, Some(4.0)).unwrap();
                }
                g.rubric = Some(rubric);
            })
            .unwrap();
        assert_eq!(planner.board_entry(&id).unwrap().score, Some(4.0));
    }

    #[test]
    fn invalid_template_edit_is_rolled_back() {
        let mut planner = Planner::default();
        let id = planner.add_root_goal("Read", Category::Passion, "mind");
        let bad = ActionTemplate::frequency("read", "Read", 30, 9.0, vec![]);
        assert!(planner.add_goal_template(&id, bad).is_err());
        assert!(planner.goal(&id).unwrap().templates.is_empty());
    }

    #[test]
    fn move_checks_against_other_occurrences() {
        let mut planner = Planner::default();
        let system = System {
            id: "sys".to_string(),
            name: "Mornings".to_string(),
            templates: vec![
                ActionTemplate::specific("a", "A", 60, DayOfWeek::MON, ClockTime::parse("09:00")),
                ActionTemplate::specific("b", "B", 60, DayOfWeek::MON, ClockTime::parse("11:00")),
            ],
        };
        planner.add_system(system).unwrap();
        assert_eq!(planner.schedule_to_week(&OwnerRef::system("sys"), Some(week())).unwrap(), 2);

        let ids: Vec<String> = planner.occurrences().iter().map(|o| o.id.clone()).collect();
        let taken = planner.move_occurrence(&ids[0], DayOfWeek::MON, ClockTime::parse("10:30").unwrap());
        assert_eq!(
            taken,
            MoveOutcome::Rejected {
                reason: MoveRejection::SlotTaken
            }
        );
        // Overlapping its own old slot is fine.
        let nudged = planner.move_occurrence(&ids[0], DayOfWeek::MON, ClockTime::parse("09:30").unwrap());
        assert_eq!(nudged, MoveOutcome::Moved);
        assert!(planner.occurrences()[0].fixed);
        assert_eq!(
            planner.move_occurrence("nope", DayOfWeek::MON, ClockTime::MIDNIGHT),
            MoveOutcome::Rejected {
                reason: MoveRejection::NotFound
            }
        );
    }

    #[test]
    fn schedule_to_week_appends_every_call() {
        let mut planner = Planner::default();
        let mut project = Project::new("Kitchen");
        let mut step = crate::goal::ProjectStep::new("Pick tiles");
        step.templates
            .push(ActionTemplate::frequency("shop", "Visit shops", 60, 2.0, vec![]));
        let step_id = step.id.clone();
        project.steps.push(step);
        let project_id = planner.add_project(project).unwrap();

        let owner = OwnerRef::project_step(project_id, step_id);
        assert_eq!(planner.schedule_to_week(&owner, Some(week())).unwrap(), 2);
        assert_eq!(planner.schedule_to_week(&owner, Some(week())).unwrap(), 2);
        assert_eq!(planner.occurrences().len(), 4);
        assert!(planner
            .occurrences()
            .iter()
            .all(|o| o.source == OccurrenceSource::Manual));

        assert!(planner
            .schedule_to_week(&OwnerRef::system("ghost"), Some(week()))
            .is_err());
    }

    #[test]
    fn unknown_pure_play_item_is_rejected() {
        let mut planner = Planner::default();
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let booking = planner.book_pure_play("nope", week(), DayOfWeek::SAT, ClockTime::MIDNIGHT, today);
        assert_eq!(
            booking,
            Booking::Rejected {
                reason: RejectReason::UnknownItem
            }
        );
    }
}
