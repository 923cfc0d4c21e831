//! # Lifeplan Core Library
//!
//! Planning engine for a single-user life planner. Goals are triaged onto
//! scored boards, near-term goals carry action templates, and the weekly
//! generator places those actions into a seven-day calendar without
//! overlaps, leaving hand-placed entries alone.
//!
//! ## Architecture
//!
//! - **Time**: `HH:MM` clock times, weekday indices and ISO week keys
//! - **Scoring**: closed set of rubric families, mean-of-inputs score
//! - **Board**: per-partition ranking and tier capacity
//! - **Slots**: day-grid occupancy and best-effort free-slot search
//! - **Planner**: template expansion, reconciliation and placement
//! - **Pure play**: rolling token window for pure-play bookings
//! - **Storage**: TOML configuration and a JSON snapshot for the CLI
//!
//! ## Key Components
//!
//! - [`Planner`]: the aggregate every operation goes through
//! - [`DayGrid`]: slot resolver for one day of one week
//! - [`Config`]: application configuration management

pub mod board;
pub mod engine;
pub mod error;
pub mod goal;
pub mod planner;
pub mod pureplay;
pub mod scoring;
pub mod slots;
pub mod storage;
pub mod time;

pub use board::{BoardEntry, BoardHorizon, PartitionKey, Tier};
pub use engine::{MoveOutcome, MoveRejection, Planner, Settings};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use goal::{ActionTemplate, Category, Goal, Horizon, Placement, Project, ProjectStep, PurePlayItem, System};
pub use planner::{GenerationReport, Occurrence, OccurrenceSource, OwnerRef};
pub use pureplay::{Booking, RejectReason, TokenCycle};
pub use scoring::{score, Rubric, RubricFamily};
pub use slots::{DayGrid, SearchDirection};
pub use storage::{Config, Snapshot};
pub use time::{ClockTime, DayOfWeek, WeekKey};
