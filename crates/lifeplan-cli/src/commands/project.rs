//! Project management commands.

use clap::Subcommand;
use lifeplan_core::{Project, ProjectStep};

use super::template::TemplateSpec;
use super::{print_json, CommandResult, Session};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project with a single step carrying one template
    Add {
        /// Project name
        name: String,
        /// Title of the first step
        #[arg(long)]
        step: String,
        #[command(flatten)]
        spec: TemplateSpec,
    },
    /// List all projects
    List,
}

pub fn run(action: ProjectAction) -> CommandResult {
    let mut session = Session::open()?;

    match action {
        ProjectAction::Add { name, step, spec } => {
            let mut first = ProjectStep::new(step);
            first.templates.push(spec.into_template()?);
            let step_id = first.id.clone();

            let mut project = Project::new(name);
            project.steps.push(first);
            let id = session.planner.add_project(project)?;
            session.save()?;
            println!("Project created: {id}");
            println!("Step: {step_id}");
        }
        ProjectAction::List => print_json(session.planner.projects())?,
    }
    Ok(())
}
