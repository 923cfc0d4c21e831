//! Rubric scoring for board triage.
//!
//! A goal carries at most one rubric. Each family fixes its required inputs;
//! the score is their mean rounded to one decimal, or `None` when any input
//! is missing. Unscored goals sort after every scored goal on a board.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The three rubric families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RubricFamily {
    /// Impact, Alignment, Readiness, Time (+ Gut as tie-break)
    Iartg,
    /// Closeness, Reciprocity, Energy
    Bond,
    /// Delight, Restoration, Novelty
    Joy,
}

impl RubricFamily {
    pub fn label(self) -> &'static str {
        match self {
            Self::Iartg => "IART+G",
            Self::Bond => "BOND",
            Self::Joy => "JOY",
        }
    }

    /// Field names averaged into the score.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Iartg => &["I", "A", "R", "T"],
            Self::Bond => &["closeness", "reciprocity", "energy"],
            Self::Joy => &["delight", "restoration", "novelty"],
        }
    }

    /// Rubric of this family with no inputs filled in.
    pub fn empty(self) -> Rubric {
        match self {
            Self::Iartg => Rubric::Iartg {
                i: None,
                a: None,
                r: None,
                t: None,
                g: None,
            },
            Self::Bond => Rubric::Bond {
                closeness: None,
                reciprocity: None,
                energy: None,
            },
            Self::Joy => Rubric::Joy {
                delight: None,
                restoration: None,
                novelty: None,
            },
        }
    }
}

/// Raw rubric inputs, one variant per family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Rubric {
    Iartg {
        #[serde(rename = "I", default)]
        i: Option<f64>,
        #[serde(rename = "A", default)]
        a: Option<f64>,
        #[serde(rename = "R", default)]
        r: Option<f64>,
        #[serde(rename = "T", default)]
        t: Option<f64>,
        /// Reported for tie-breaking only, never averaged.
        #[serde(rename = "G", default)]
        g: Option<f64>,
    },
    Bond {
        #[serde(default)]
        closeness: Option<f64>,
        #[serde(default)]
        reciprocity: Option<f64>,
        #[serde(default)]
        energy: Option<f64>,
    },
    Joy {
        #[serde(default)]
        delight: Option<f64>,
        #[serde(default)]
        restoration: Option<f64>,
        #[serde(default)]
        novelty: Option<f64>,
    },
}

impl Rubric {
    pub fn family(&self) -> RubricFamily {
        match self {
            Self::Iartg { .. } => RubricFamily::Iartg,
            Self::Bond { .. } => RubricFamily::Bond,
            Self::Joy { .. } => RubricFamily::Joy,
        }
    }

    pub fn label(&self) -> &'static str {
        self.family().label()
    }

    /// Values of the required fields, in `required_fields` order.
    pub fn required_values(&self) -> Vec<Option<f64>> {
        match *self {
            Self::Iartg { i, a, r, t, .. } => vec![i, a, r, t],
            Self::Bond {
                closeness,
                reciprocity,
                energy,
            } => vec![closeness, reciprocity, energy],
            Self::Joy {
                delight,
                restoration,
                novelty,
            } => vec![delight, restoration, novelty],
        }
    }

    /// Extra field reported alongside the score, if the family has one.
    pub fn tie_break(&self) -> Option<f64> {
        match *self {
            Self::Iartg { g, .. } => g,
            Self::Bond { .. } | Self::Joy { .. } => None,
        }
    }

    /// Set one input by its field name (case-insensitive).
    pub fn set_field(&mut self, field: &str, value: Option<f64>) -> Result<(), ValidationError> {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: "must be a finite number".to_string(),
                });
            }
        }
        let name = field.to_ascii_lowercase();
        let slot = match (self, name.as_str()) {
            (Self::Iartg { i, .. }, "i") => i,
            (Self::Iartg { a, .. }, "a") => a,
            (Self::Iartg { r, .. }, "r") => r,
            (Self::Iartg { t, .. }, "t") => t,
            (Self::Iartg { g, .. }, "g") => g,
            (Self::Bond { closeness, .. }, "closeness") => closeness,
            (Self::Bond { reciprocity, .. }, "reciprocity") => reciprocity,
            (Self::Bond { energy, .. }, "energy") => energy,
            (Self::Joy { delight, .. }, "delight") => delight,
            (Self::Joy { restoration, .. }, "restoration") => restoration,
            (Self::Joy { novelty, .. }, "novelty") => novelty,
            (rubric, _) => {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: format!("not a {} field", rubric.label()),
                })
            }
        };
        *slot = value;
        Ok(())
    }
}

/// Mean of the required inputs rounded to one decimal, or `None` if any is
/// missing or not finite.
pub fn score(rubric: &Rubric) -> Option<f64> {
    let values = rubric.required_values();
    let mut sum = 0.0;
    for value in &values {
        match value {
            Some(v) if v.is_finite() => sum += v,
            _ => return None,
        }
    }
    let mean = sum / values.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iartg(i: f64, a: f64, r: f64, t: f64) -> Rubric {
        Rubric::Iartg {
            i: Some(i),
            a: Some(a),
            r: Some(r),
            t: Some(t),
            g: None,
        }
    }

    #[test]
    fn uniform_inputs_score_their_value() {
        assert_eq!(score(&iartg(4.0, 4.0, 4.0, 4.0)), Some(4.0));
    }

    #[test]
    fn mean_is_rounded_to_one_decimal() {
        // 13 / 4 = 3.25 -> 3.3
        assert_eq!(score(&iartg(4.0, 3.0, 3.0, 3.0)), Some(3.3));
        // 10 / 3 = 3.333 -> 3.3
        let bond = Rubric::Bond {
            closeness: Some(5.0),
            reciprocity: Some(3.0),
            energy: Some(2.0),
        };
        assert_eq!(score(&bond), Some(3.3));
    }

    #[test]
    fn missing_field_is_unscored() {
        let rubric = Rubric::Iartg {
            i: Some(4.0),
            a: Some(4.0),
            r: None,
            t: Some(4.0),
            g: Some(5.0),
        };
        assert_eq!(score(&rubric), None);
        assert_eq!(score(&RubricFamily::Joy.empty()), None);
    }

    #[test]
    fn gut_is_not_averaged() {
        let mut rubric = iartg(2.0, 2.0, 2.0, 2.0);
        rubric.set_field("G", Some(5.0)).unwrap();
        assert_eq!(score(&rubric), Some(2.0));
        assert_eq!(rubric.tie_break(), Some(5.0));
    }

    #[test]
    fn set_field_rejects_foreign_names() {
        let mut rubric = RubricFamily::Bond.empty();
        assert!(rubric.set_field("I", Some(1.0)).is_err());
        assert!(rubric.set_field("energy", Some(f64::NAN)).is_err());
        rubric.set_field("Energy", Some(3.0)).unwrap();
        assert_eq!(rubric.required_values()[2], Some(3.0));
    }

    #[test]
    fn serde_uses_family_tag() {
        let json = r#"{"family":"iartg","I":4,"A":4,"R":4,"T":4}"#;
        let rubric: Rubric = serde_json::from_str(json).unwrap();
        assert_eq!(rubric.family(), RubricFamily::Iartg);
        assert_eq!(score(&rubric), Some(4.0));
    }
}
