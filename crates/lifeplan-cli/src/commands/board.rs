use clap::Subcommand;
use lifeplan_core::board::rank;
use lifeplan_core::{BoardEntry, PartitionKey};

use super::{print_json, CommandResult, Session};

#[derive(Subcommand)]
pub enum BoardAction {
    /// Show board entries grouped by partition
    Show {
        /// Only this partition, e.g. "passion/near-term"
        #[arg(long)]
        partition: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-apply tier capacity to one partition
    Rebalance {
        /// Partition, e.g. "play/near-term"
        partition: String,
    },
}

fn print_entry(entry: &BoardEntry) {
    let score = entry
        .score
        .map_or_else(|| "-".to_string(), |s| format!("{s:.1}"));
    let tie_break = entry
        .tie_break
        .map(|g| format!(" (G {g:.1})"))
        .unwrap_or_default();
    println!(
        "  {:<10} {:>4} {}{tie_break}  {}  {}",
        entry.tier.as_str(),
        score,
        entry.rubric_label,
        entry.title,
        entry.goal_id
    );
}

pub fn run(action: BoardAction) -> CommandResult {
    let mut session = Session::open()?;

    match action {
        BoardAction::Show { partition, json } => {
            let filter = partition.map(|p| p.parse::<PartitionKey>()).transpose()?;
            let mut entries: Vec<&BoardEntry> = session
                .planner
                .board()
                .iter()
                .filter(|e| filter.map_or(true, |p| e.partition == p))
                .collect();
            entries.sort_by(|a, b| {
                a.partition
                    .to_string()
                    .cmp(&b.partition.to_string())
                    .then_with(|| rank(a, b))
            });

            if json {
                print_json(&entries)?;
                return Ok(());
            }
            if entries.is_empty() {
                println!("Board is empty.");
                return Ok(());
            }
            let mut current = None;
            for entry in entries {
                if current != Some(entry.partition) {
                    println!("{}", entry.partition);
                    current = Some(entry.partition);
                }
                print_entry(entry);
            }
        }
        BoardAction::Rebalance { partition } => {
            let partition: PartitionKey = partition.parse()?;
            let changed = session.planner.rebalance(partition);
            session.save()?;
            println!("Rebalanced {partition}: {changed} tier change(s)");
        }
    }
    Ok(())
}
