//! Goal tree commands.

use clap::Subcommand;
use lifeplan_core::{Category, Horizon, RubricFamily};

use super::{print_json, CommandResult, Session};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Create a root goal
    Add {
        /// Goal title
        title: String,
        /// passion, person or play
        #[arg(long)]
        category: String,
        /// Life direction the goal serves
        #[arg(long, default_value = "")]
        direction: String,
        /// long-term, near-term or unclassified
        #[arg(long)]
        horizon: Option<String>,
    },
    /// Create a child goal under an existing one
    Child {
        /// Parent goal ID
        parent: String,
        /// Goal title
        title: String,
    },
    /// Edit a goal
    Edit {
        /// Goal ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        direction: Option<String>,
        /// long-term, near-term or unclassified
        #[arg(long)]
        horizon: Option<String>,
        /// Switch rubric family (iartg, bond, joy); clears its inputs
        #[arg(long)]
        rubric: Option<String>,
        /// Rubric input as FIELD=VALUE, e.g. "I=4" (repeatable)
        #[arg(long = "score")]
        scores: Vec<String>,
        /// Add a milestone (repeatable)
        #[arg(long = "milestone")]
        milestones: Vec<String>,
        #[arg(long)]
        reflection: Option<String>,
    },
    /// Delete a goal and its whole subtree
    Delete {
        /// Goal ID
        id: String,
    },
    /// List goals
    List {
        /// Only goals of this category
        #[arg(long)]
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_family(text: &str) -> Result<RubricFamily, String> {
    match text.trim().to_ascii_lowercase().as_str() {
        "iartg" | "iart+g" => Ok(RubricFamily::Iartg),
        "bond" => Ok(RubricFamily::Bond),
        "joy" => Ok(RubricFamily::Joy),
        other => Err(format!("unknown rubric family: {other}")),
    }
}

fn parse_score(text: &str) -> Result<(String, Option<f64>), String> {
    let (field, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{text}'"))?;
    let value = value.trim();
    if value.is_empty() {
        return Ok((field.trim().to_string(), None));
    }
    let value = value
        .parse::<f64>()
        .map_err(|_| format!("'{value}' is not a number"))?;
    Ok((field.trim().to_string(), Some(value)))
}

pub fn run(action: GoalAction) -> CommandResult {
    let mut session = Session::open()?;

    match action {
        GoalAction::Add {
            title,
            category,
            direction,
            horizon,
        } => {
            let category: Category = category.parse()?;
            let id = session.planner.add_root_goal(title, category, direction);
            if let Some(horizon) = horizon {
                let horizon: Horizon = horizon.parse()?;
                session.planner.update_goal(&id, |g| g.horizon = horizon)?;
            }
            session.save()?;
            println!("Goal created: {id}");
        }
        GoalAction::Child { parent, title } => {
            let id = session.planner.add_child_goal(&parent, title)?;
            session.save()?;
            println!("Goal created: {id}");
        }
        GoalAction::Edit {
            id,
            title,
            direction,
            horizon,
            rubric,
            scores,
            milestones,
            reflection,
        } => {
            let horizon = horizon.map(|h| h.parse::<Horizon>()).transpose()?;
            let family = rubric.as_deref().map(parse_family).transpose()?;
            let scores = scores
                .iter()
                .map(|s| parse_score(s))
                .collect::<Result<Vec<_>, _>>()?;

            // Apply rubric inputs up front so a bad field name fails the edit.
            let current = session
                .planner
                .goal(&id)
                .ok_or_else(|| format!("unknown goal: {id}"))?;
            let mut next_rubric = match family {
                Some(family) => Some(family.empty()),
                None => current.rubric.clone(),
            };
            if !scores.is_empty() {
                let rubric =
                    next_rubric.get_or_insert_with(|| current.rubric_family().empty());
                for (field, value) in &scores {
                    rubric.set_field(field, *value)?;
                }
            }

            session.planner.update_goal(&id, |g| {
                if let Some(title) = title {
                    g.title = title;
                }
                if let Some(direction) = direction {
                    g.direction = direction;
                }
                if let Some(horizon) = horizon {
                    g.horizon = horizon;
                }
                g.rubric = next_rubric;
                g.milestones.extend(milestones);
                if let Some(reflection) = reflection {
                    g.reflection = Some(reflection);
                }
            })?;
            session.save()?;
            println!("Goal updated: {id}");
        }
        GoalAction::Delete { id } => {
            let removed = session.planner.delete_goal(&id)?;
            session.save()?;
            println!("Deleted {} goal(s)", removed.len());
        }
        GoalAction::List { category, json } => {
            let category = category.map(|c| c.parse::<Category>()).transpose()?;
            let goals: Vec<_> = session
                .planner
                .goals()
                .iter()
                .filter(|g| category.map_or(true, |c| g.category == c))
                .collect();
            if json {
                print_json(&goals)?;
            } else if goals.is_empty() {
                println!("No goals.");
            } else {
                for goal in goals {
                    let parent = goal.parent_id.as_deref().unwrap_or("-");
                    println!(
                        "{}  [{} / {}]  {}  (parent: {parent})",
                        goal.id, goal.category, goal.horizon, goal.title
                    );
                }
            }
        }
    }
    Ok(())
}
