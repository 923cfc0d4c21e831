//! Triage boards: one per (category, horizon) partition.
//!
//! Board entries are projections of classified goals. Each partition listed
//! in the capacity table is ranked by score and capped into active and
//! incubating tiers; everything else is dormant.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::goal::{Category, Goal, Horizon};
use crate::scoring;

/// Board tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Active,
    Incubating,
    Dormant,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Incubating => "incubating",
            Self::Dormant => "dormant",
        }
    }
}

/// Horizons that have boards. Unclassified goals never appear on one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoardHorizon {
    LongTerm,
    NearTerm,
}

impl BoardHorizon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LongTerm => "long-term",
            Self::NearTerm => "near-term",
        }
    }
}

/// One independently capped board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    pub category: Category,
    pub horizon: BoardHorizon,
}

impl PartitionKey {
    pub fn new(category: Category, horizon: BoardHorizon) -> Self {
        Self { category, horizon }
    }

    /// Partition a goal belongs to, or `None` when it is not on any board.
    /// `person` goals have no long-term board.
    pub fn for_goal(category: Category, horizon: Horizon) -> Option<Self> {
        let horizon = match horizon {
            Horizon::LongTerm => BoardHorizon::LongTerm,
            Horizon::NearTerm => BoardHorizon::NearTerm,
            Horizon::Unclassified => return None,
        };
        if category == Category::Person && horizon == BoardHorizon::LongTerm {
            return None;
        }
        Some(Self { category, horizon })
    }

    pub fn is_near_term(&self) -> bool {
        self.horizon == BoardHorizon::NearTerm
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.horizon.as_str())
    }
}

impl FromStr for PartitionKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidValue {
            field: "partition".to_string(),
            message: format!("'{s}' is not <category>/<long-term|near-term>"),
        };
        let (category, horizon) = s.split_once('/').ok_or_else(invalid)?;
        let category = match category {
            "passion" => Category::Passion,
            "person" => Category::Person,
            "play" => Category::Play,
            _ => return Err(invalid()),
        };
        let horizon = match horizon {
            "long-term" => BoardHorizon::LongTerm,
            "near-term" => BoardHorizon::NearTerm,
            _ => return Err(invalid()),
        };
        Ok(Self { category, horizon })
    }
}

/// Tier caps for one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub active: usize,
    pub incubating: usize,
}

/// Fixed capacity table. Partitions without a row are never rebalanced.
pub fn capacity(partition: PartitionKey) -> Option<Capacity> {
    use BoardHorizon::*;
    use Category::*;

    match (partition.category, partition.horizon) {
        (Passion, LongTerm) => Some(Capacity {
            active: 1,
            incubating: 3,
        }),
        (Passion, NearTerm) | (Person, NearTerm) | (Play, NearTerm) => Some(Capacity {
            active: 3,
            incubating: 3,
        }),
        (Person, LongTerm) | (Play, LongTerm) => None,
    }
}

/// A goal's projection onto a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardEntry {
    pub goal_id: String,
    pub partition: PartitionKey,
    pub tier: Tier,
    /// Absent when the rubric inputs are incomplete.
    #[serde(default)]
    pub score: Option<f64>,
    pub rubric_label: String,
    /// Extra rubric value reported next to the score, not used for ranking.
    #[serde(default)]
    pub tie_break: Option<f64>,
    pub title: String,
}

impl BoardEntry {
    /// Fresh entry for `goal` in `partition`, parked in `Dormant`.
    pub fn for_goal(goal: &Goal, partition: PartitionKey) -> Self {
        let rubric_label = goal.rubric_family().label().to_string();
        Self {
            goal_id: goal.id.clone(),
            partition,
            tier: Tier::Dormant,
            score: goal.rubric.as_ref().and_then(scoring::score),
            rubric_label,
            tie_break: goal.rubric.as_ref().and_then(|r| r.tie_break()),
            title: goal.title.clone(),
        }
    }
}

/// Score descending (unscored last), then title ascending, case-sensitive.
pub fn rank(a: &BoardEntry, b: &BoardEntry) -> Ordering {
    let by_score = match (a.score, b.score) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_score.then_with(|| a.title.cmp(&b.title))
}

/// Reassign tiers within one partition. Returns how many entries changed
/// tier; a partition missing from the capacity table is left untouched.
pub fn rebalance(entries: &mut [BoardEntry], partition: PartitionKey) -> usize {
    let Some(cap) = capacity(partition) else {
        debug!(%partition, "no capacity row, skipping rebalance");
        return 0;
    };

    let mut members: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.partition == partition)
        .map(|(i, _)| i)
        .collect();
    members.sort_by(|&a, &b| rank(&entries[a], &entries[b]));

    let mut changed = 0;
    for (position, &index) in members.iter().enumerate() {
        let tier = if position < cap.active {
            Tier::Active
        } else if position < cap.active + cap.incubating {
            Tier::Incubating
        } else {
            Tier::Dormant
        };
        if entries[index].tier != tier {
            entries[index].tier = tier;
            changed += 1;
        }
    }

    debug!(%partition, members = members.len(), changed, "rebalanced board");
    changed
}

/// Bring the board in line with one goal: drop its entry when the goal is
/// gone, unclassified or excluded, otherwise insert or replace it and
/// rebalance. The partition the goal left, if any, is rebalanced too.
pub fn upsert_for_goal(entries: &mut Vec<BoardEntry>, goal_id: &str, goal: Option<&Goal>) {
    let previous = entries
        .iter()
        .find(|e| e.goal_id == goal_id)
        .map(|e| e.partition);
    let target = goal.and_then(|g| PartitionKey::for_goal(g.category, g.horizon).map(|p| (g, p)));

    let Some((goal, partition)) = target else {
        entries.retain(|e| e.goal_id != goal_id);
        if let Some(previous) = previous {
            debug!(goal_id, %previous, "removed board entry");
            rebalance(entries, previous);
        }
        return;
    };

    let entry = BoardEntry::for_goal(goal, partition);
    match entries.iter_mut().find(|e| e.goal_id == goal_id) {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }

    rebalance(entries, partition);
    if let Some(previous) = previous.filter(|p| *p != partition) {
        rebalance(entries, previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Rubric;

    fn passion_near() -> PartitionKey {
        PartitionKey::new(Category::Passion, BoardHorizon::NearTerm)
    }

    fn entry(title: &str, score: Option<f64>, partition: PartitionKey) -> BoardEntry {
        BoardEntry {
            goal_id: format!("id-{title}"),
            partition,
            tier: Tier::Dormant,
            score,
            rubric_label: "IART+G".to_string(),
            tie_break: None,
            title: title.to_string(),
        }
    }

    fn tiers(entries: &[BoardEntry]) -> Vec<(&str, Tier)> {
        entries.iter().map(|e| (e.title.as_str(), e.tier)).collect()
    }

    fn scored_goal(title: &str, horizon: Horizon, value: f64) -> Goal {
        Goal::new(title, Category::Passion, "craft")
            .with_id(title)
            .with_horizon(horizon)
            .with_rubric(Rubric::Iartg {
                i: Some(value),
                a: Some(value),
                r: Some(value),
                t: Some(value),
                g: None,
            })
    }

    #[test]
    fn person_long_term_is_excluded() {
        assert!(PartitionKey::for_goal(Category::Person, Horizon::LongTerm).is_none());
        assert!(PartitionKey::for_goal(Category::Play, Horizon::Unclassified).is_none());
        assert!(PartitionKey::for_goal(Category::Person, Horizon::NearTerm).is_some());
    }

    #[test]
    fn partition_key_round_trips_through_text() {
        let key: PartitionKey = "play/near-term".parse().unwrap();
        assert_eq!(key, PartitionKey::new(Category::Play, BoardHorizon::NearTerm));
        assert_eq!(key.to_string(), "play/near-term");
        assert!("play/someday".parse::<PartitionKey>().is_err());
    }

    #[test]
    fn caps_active_and_incubating() {
        let p = passion_near();
        let mut entries: Vec<_> = (0..8)
            .map(|i| entry(&format!("g{i}"), Some(f64::from(i)), p))
            .collect();
        rebalance(&mut entries, p);

        let active: Vec<_> = entries.iter().filter(|e| e.tier == Tier::Active).collect();
        let incubating = entries.iter().filter(|e| e.tier == Tier::Incubating).count();
        assert_eq!(active.len(), 3);
        assert_eq!(incubating, 3);
        assert!(active.iter().all(|e| e.score.unwrap() >= 5.0));
    }

    #[test]
    fn unscored_sort_last_and_titles_break_ties() {
        let p = PartitionKey::new(Category::Passion, BoardHorizon::LongTerm);
        let mut entries = vec![
            entry("unscored", None, p),
            entry("beta", Some(3.0), p),
            entry("Zeta", Some(3.0), p),
            entry("alpha", Some(2.0), p),
            entry("gamma", Some(1.0), p),
        ];
        rebalance(&mut entries, p);
        // "Zeta" < "beta" in a case-sensitive comparison.
        assert_eq!(
            tiers(&entries),
            vec![
                ("unscored", Tier::Dormant),
                ("beta", Tier::Incubating),
                ("Zeta", Tier::Active),
                ("alpha", Tier::Incubating),
                ("gamma", Tier::Incubating),
            ]
        );
    }

    #[test]
    fn rebalance_is_idempotent() {
        let p = passion_near();
        let mut entries: Vec<_> = ["d", "c", "b", "a", "e", "f", "g"]
            .iter()
            .map(|t| entry(t, Some(2.0), p))
            .collect();
        rebalance(&mut entries, p);
        let first = entries.clone();
        assert_eq!(rebalance(&mut entries, p), 0);
        assert_eq!(entries, first);
    }

    #[test]
    fn partition_without_capacity_is_left_alone() {
        let p = PartitionKey::new(Category::Play, BoardHorizon::LongTerm);
        let mut entries = vec![entry("a", Some(5.0), p), entry("b", Some(4.0), p)];
        entries[1].tier = Tier::Active;
        assert_eq!(rebalance(&mut entries, p), 0);
        assert_eq!(entries[0].tier, Tier::Dormant);
        assert_eq!(entries[1].tier, Tier::Active);
    }

    #[test]
    fn other_partitions_are_not_touched() {
        let mut entries = vec![
            entry("near", Some(1.0), passion_near()),
            entry(
                "person",
                Some(1.0),
                PartitionKey::new(Category::Person, BoardHorizon::NearTerm),
            ),
        ];
        rebalance(&mut entries, passion_near());
        assert_eq!(entries[0].tier, Tier::Active);
        assert_eq!(entries[1].tier, Tier::Dormant);
    }

    #[test]
    fn upsert_inserts_then_replaces() {
        let mut entries = Vec::new();
        let mut goal = scored_goal("novel", Horizon::NearTerm, 4.0);
        upsert_for_goal(&mut entries, "novel", Some(&goal));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].tier, Tier::Active);
        assert_eq!(entries[0].score, Some(4.0));

        goal.title = "Novel draft".to_string();
        upsert_for_goal(&mut entries, "novel", Some(&goal));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Novel draft");
        assert_eq!(entries[0].tier, Tier::Active);
    }

    #[test]
    fn upsert_removes_when_unclassified_or_missing() {
        let mut entries = Vec::new();
        let mut goal = scored_goal("novel", Horizon::NearTerm, 4.0);
        upsert_for_goal(&mut entries, "novel", Some(&goal));
        goal.horizon = Horizon::Unclassified;
        upsert_for_goal(&mut entries, "novel", Some(&goal));
        assert!(entries.is_empty());

        goal.horizon = Horizon::LongTerm;
        upsert_for_goal(&mut entries, "novel", Some(&goal));
        upsert_for_goal(&mut entries, "novel", None);
        assert!(entries.is_empty());
    }

    #[test]
    fn leaving_a_partition_promotes_the_next_goal() {
        let mut entries = Vec::new();
        let top = scored_goal("top", Horizon::LongTerm, 5.0);
        let next = scored_goal("next", Horizon::LongTerm, 4.0);
        upsert_for_goal(&mut entries, "top", Some(&top));
        upsert_for_goal(&mut entries, "next", Some(&next));
        assert_eq!(entries[1].tier, Tier::Incubating);

        let moved = top.clone().with_horizon(Horizon::NearTerm);
        upsert_for_goal(&mut entries, "top", Some(&moved));
        let next_entry = entries.iter().find(|e| e.goal_id == "next").unwrap();
        assert_eq!(next_entry.tier, Tier::Active);
    }
}
