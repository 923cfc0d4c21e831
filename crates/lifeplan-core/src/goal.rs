//! Goal tree and action-template types.
//!
//! Goals form a strict tree scoped to a category and a direction. Near-term
//! goals, systems and project steps own action templates, which the weekly
//! generator expands into calendar occurrences.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::scoring::{Rubric, RubricFamily};
use crate::time::{ClockTime, DayOfWeek};

/// Longest template a single occurrence can hold.
pub const MAX_DURATION_MINUTES: u16 = 24 * 60;

/// Upper bound on weekly frequency.
pub const MAX_TIMES_PER_WEEK: f64 = 7.0;

/// Life area a goal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Passion,
    Person,
    Play,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Passion, Category::Person, Category::Play];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passion => "passion",
            Self::Person => "person",
            Self::Play => "play",
        }
    }

    /// Rubric family a new goal in this category starts with.
    pub fn default_rubric(&self) -> RubricFamily {
        match self {
            Self::Passion => RubricFamily::Iartg,
            Self::Person => RubricFamily::Bond,
            Self::Play => RubricFamily::Joy,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| invalid("category", "expected passion, person or play"))
    }
}

/// Time frame classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Horizon {
    LongTerm,
    NearTerm,
    #[default]
    Unclassified,
}

impl Horizon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LongTerm => "long-term",
            Self::NearTerm => "near-term",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Horizon {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long-term" | "long" => Ok(Self::LongTerm),
            "near-term" | "near" => Ok(Self::NearTerm),
            "unclassified" | "none" => Ok(Self::Unclassified),
            _ => Err(invalid("horizon", "expected long-term, near-term or unclassified")),
        }
    }
}

/// How a template lands on the week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Placement {
    /// Fixed day, optional fixed clock time.
    Specific {
        #[serde(default)]
        day: Option<DayOfWeek>,
        #[serde(default)]
        start: Option<ClockTime>,
    },
    /// N times per week on preferred days.
    Frequency {
        times_per_week: f64,
        #[serde(default)]
        preferred_days: Vec<DayOfWeek>,
        #[serde(default)]
        preferred_start: Option<ClockTime>,
    },
}

/// Reusable recurrence/placement rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionTemplate {
    /// Unique within the owning goal, system or step.
    pub key: String,
    pub label: String,
    pub duration_minutes: u16,
    pub placement: Placement,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl ActionTemplate {
    pub fn specific(
        key: impl Into<String>,
        label: impl Into<String>,
        duration_minutes: u16,
        day: DayOfWeek,
        start: Option<ClockTime>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            duration_minutes,
            placement: Placement::Specific {
                day: Some(day),
                start,
            },
            rationale: None,
        }
    }

    pub fn frequency(
        key: impl Into<String>,
        label: impl Into<String>,
        duration_minutes: u16,
        times_per_week: f64,
        preferred_days: Vec<DayOfWeek>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            duration_minutes,
            placement: Placement::Frequency {
                times_per_week,
                preferred_days,
                preferred_start: None,
            },
            rationale: None,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// Checks the editing-layer invariants. The generator does not call this;
    /// it skips whatever it cannot expand.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key.trim().is_empty() {
            return Err(invalid("key", "must not be empty"));
        }
        if self.duration_minutes == 0 || self.duration_minutes > MAX_DURATION_MINUTES {
            return Err(invalid("duration_minutes", "must be 1..=1440"));
        }
        match &self.placement {
            Placement::Specific { day: None, .. } => {
                Err(invalid("day", "specific placement requires a day"))
            }
            Placement::Specific { .. } => Ok(()),
            Placement::Frequency { times_per_week, .. } => {
                if !(times_per_week.is_finite()
                    && *times_per_week > 0.0
                    && *times_per_week <= MAX_TIMES_PER_WEEK)
                {
                    return Err(invalid("times_per_week", "must be greater than 0 and at most 7"));
                }
                Ok(())
            }
        }
    }
}

fn invalid(field: &str, message: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Validate every template and the uniqueness of their keys.
pub fn validate_templates(owner: &str, templates: &[ActionTemplate]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for template in templates {
        template.validate()?;
        if !seen.insert(template.key.as_str()) {
            return Err(ValidationError::DuplicateTemplateKey {
                owner: owner.to_string(),
                key: template.key.clone(),
            });
        }
    }
    Ok(())
}

/// A node in the goal tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub category: Category,
    #[serde(default)]
    pub direction: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub horizon: Horizon,
    #[serde(default)]
    pub rubric: Option<Rubric>,
    /// Only meaningful for near-term goals.
    #[serde(default)]
    pub templates: Vec<ActionTemplate>,
    #[serde(default)]
    pub milestones: Vec<String>,
    #[serde(default)]
    pub reflection: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(title: impl Into<String>, category: Category, direction: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            category,
            direction: direction.into(),
            parent_id: None,
            horizon: Horizon::Unclassified,
            rubric: None,
            templates: Vec::new(),
            milestones: Vec::new(),
            reflection: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_horizon(mut self, horizon: Horizon) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_rubric(mut self, rubric: Rubric) -> Self {
        self.rubric = Some(rubric);
        self
    }

    pub fn with_template(mut self, template: ActionTemplate) -> Self {
        self.templates.push(template);
        self
    }

    /// Family of the goal's rubric, falling back to the category default.
    pub fn rubric_family(&self) -> RubricFamily {
        self.rubric
            .as_ref()
            .map(Rubric::family)
            .unwrap_or_else(|| self.category.default_rubric())
    }

    pub(crate) fn board_fields(&self) -> BoardFields {
        BoardFields {
            title: self.title.clone(),
            category: self.category,
            horizon: self.horizon,
            rubric: self.rubric.clone(),
        }
    }
}

/// Snapshot of the fields a board entry is derived from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BoardFields {
    title: String,
    category: Category,
    horizon: Horizon,
    rubric: Option<Rubric>,
}

/// A recurring routine that owns templates outside the goal tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub templates: Vec<ActionTemplate>,
}

impl System {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            templates: Vec::new(),
        }
    }
}

/// One step of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStep {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub templates: Vec<ActionTemplate>,
}

impl ProjectStep {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            done: false,
            templates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub steps: Vec<ProjectStep>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn step(&self, step_id: &str) -> Option<&ProjectStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }
}

/// A "pure play" activity booked against the token cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurePlayItem {
    pub id: String,
    pub label: String,
    pub duration_minutes: u16,
}

impl PurePlayItem {
    pub fn new(label: impl Into<String>, duration_minutes: u16) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.into(),
            duration_minutes,
        }
    }
}
