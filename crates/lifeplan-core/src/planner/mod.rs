//! Weekly planner: occurrence records and the generator that fills them.
//!
//! Goal-sourced occurrences are owned by the generator and rebuilt on every
//! run for a week. Manual and pure-play occurrences are never rewritten by
//! regeneration; they only constrain where new occurrences can go.

mod generator;
mod occurrence;

pub use generator::{
    desired_for_goals, expand_templates, generate_for_week, schedule_templates,
    DesiredOccurrence, GenerationReport, DEFAULT_DAY_ROTATION,
};
pub use occurrence::{Occurrence, OccurrenceSource, OwnerRef, Signature};
