use clap::Subcommand;
use lifeplan_core::System;

use super::template::TemplateSpec;
use super::{print_json, CommandResult, Session};

#[derive(Subcommand)]
pub enum SystemAction {
    /// Create a system with one template
    Add {
        /// System name
        name: String,
        #[command(flatten)]
        spec: TemplateSpec,
    },
    /// List systems as JSON
    List,
}

pub fn run(action: SystemAction) -> CommandResult {
    let mut session = Session::open()?;

    match action {
        SystemAction::Add { name, spec } => {
            let mut system = System::new(name);
            system.templates.push(spec.into_template()?);
            let id = session.planner.add_system(system)?;
            session.save()?;
            println!("System created: {id}");
        }
        SystemAction::List => print_json(session.planner.systems())?,
    }
    Ok(())
}
