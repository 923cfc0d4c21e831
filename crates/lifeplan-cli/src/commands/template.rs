//! Action template commands for goals.

use clap::{Args, Subcommand};
use lifeplan_core::{ActionTemplate, ClockTime, DayOfWeek, Placement};

use super::{print_json, CommandResult, Session};

/// Template fields shared by goal, system and project commands.
#[derive(Args)]
pub struct TemplateSpec {
    /// Key, unique within the owner
    #[arg(long)]
    pub key: String,
    /// Display label
    #[arg(long)]
    pub label: String,
    /// Duration in minutes
    #[arg(long)]
    pub minutes: u16,
    /// Fixed day for a specific-mode template (0-6 or mon..sun)
    #[arg(long, conflicts_with_all = ["times", "days"])]
    pub day: Option<String>,
    /// Times per week for a frequency-mode template
    #[arg(long)]
    pub times: Option<f64>,
    /// Preferred days for a frequency template, comma separated
    #[arg(long, value_delimiter = ',')]
    pub days: Vec<String>,
    /// Start time (HH:MM)
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub rationale: Option<String>,
}

impl TemplateSpec {
    pub fn into_template(self) -> Result<ActionTemplate, Box<dyn std::error::Error>> {
        let start = self
            .start
            .as_deref()
            .map(str::parse::<ClockTime>)
            .transpose()?;
        let placement = match (self.day, self.times) {
            (Some(day), _) => Placement::Specific {
                day: Some(day.parse::<DayOfWeek>()?),
                start,
            },
            (None, Some(times_per_week)) => Placement::Frequency {
                times_per_week,
                preferred_days: self
                    .days
                    .iter()
                    .map(|d| d.parse::<DayOfWeek>())
                    .collect::<Result<_, _>>()?,
                preferred_start: start,
            },
            (None, None) => return Err("either --day or --times is required".into()),
        };
        let template = ActionTemplate {
            key: self.key,
            label: self.label,
            duration_minutes: self.minutes,
            placement,
            rationale: self.rationale,
        };
        template.validate()?;
        Ok(template)
    }
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// Add a template to a goal
    Add {
        /// Goal ID
        goal: String,
        #[command(flatten)]
        spec: TemplateSpec,
    },
    /// Remove a template from a goal
    Remove {
        /// Goal ID
        goal: String,
        /// Template key
        key: String,
    },
    /// List a goal's templates as JSON
    List {
        /// Goal ID
        goal: String,
    },
}

pub fn run(action: TemplateAction) -> CommandResult {
    let mut session = Session::open()?;

    match action {
        TemplateAction::Add { goal, spec } => {
            let template = spec.into_template()?;
            let key = template.key.clone();
            session.planner.add_goal_template(&goal, template)?;
            session.save()?;
            println!("Template added: {key}");
        }
        TemplateAction::Remove { goal, key } => {
            let mut found = false;
            session.planner.update_goal(&goal, |g| {
                let before = g.templates.len();
                g.templates.retain(|t| t.key != key);
                found = g.templates.len() != before;
            })?;
            if !found {
                return Err(format!("goal {goal} has no template '{key}'").into());
            }
            session.save()?;
            println!("Template removed: {key}");
        }
        TemplateAction::List { goal } => {
            let goal = session
                .planner
                .goal(&goal)
                .ok_or_else(|| format!("unknown goal: {goal}"))?;
            print_json(&goal.templates)?;
        }
    }
    Ok(())
}
