//! Protocol configuration table.
//!
//! One immutable `ProtocolConfig` value holds every threshold, per-kg rate
//! and safety ceiling the calculation engine consults. It is injected into
//! each evaluation pass rather than read from a global, so tests and
//! deployments can substitute alternate threshold tables.
//!
//! `ProtocolConfig::default()` carries the canonical protocol constants.
//! All absolute ceilings follow from a 75 kg maximum working weight.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tolerance when matching a derived key (deficit percentage, insulin rate
/// option) against the configured tables. Keys come from a small discrete
/// set; this only guards against serialization jitter.
pub const KEY_EPSILON: f64 = 1e-9;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Half-open pH range `[lower, upper)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PhRange {
    pub lower: f64,
    pub upper: f64,
}

impl PhRange {
    /// True when `ph` falls inside `[lower, upper)`. The upper bound is
    /// excluded so adjacent tiers never overlap at the boundary.
    pub fn contains(&self, ph: f64) -> bool {
        ph >= self.lower && ph < self.upper
    }
}

/// Thresholds for one severity tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierThresholds {
    /// pH range that places the patient in this tier.
    pub ph_range: PhRange,
    /// Bicarbonate (mmol/L) below this value also places the patient in
    /// this tier, independently of pH.
    pub bicarbonate_below: f64,
    /// Fluid deficit assumed for this tier, as a percentage of body weight.
    pub deficit_percentage: f64,
}

/// A weight-based quantity: per-kg rate plus an absolute ceiling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PerKgCap {
    pub ml_per_kg: f64,
    pub ceiling_ml: f64,
}

/// Absolute deficit-volume ceiling for one deficit percentage.
///
/// Keyed by percentage value, not by tier name: two tiers sharing a
/// percentage share a ceiling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeficitCeiling {
    pub percentage: f64,
    pub ceiling_ml: f64,
}

/// One allowed insulin infusion rate option.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InsulinOption {
    pub units_per_kg_hour: f64,
    pub ceiling_units_per_hour: f64,
}

/// The full protocol table consulted by one calculation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    pub severe: TierThresholds,
    pub moderate: TierThresholds,
    pub mild: TierThresholds,
    /// Initial resuscitation bolus.
    pub bolus: PerKgCap,
    /// Glucose correction bolus.
    pub glucose_bolus: PerKgCap,
    /// Hyperosmolar hyperglycaemic state bolus.
    pub hhs_bolus: PerKgCap,
    /// Deficit-volume ceilings, keyed by deficit percentage.
    pub deficit_ceilings: Vec<DeficitCeiling>,
    /// Hours over which the fluid deficit is replaced.
    pub deficit_replacement_hours: f64,
    /// Ceiling on the daily maintenance volume, all weight tiers.
    pub maintenance_ceiling_ml: f64,
    /// The discrete insulin rate options a clinician may select.
    pub insulin_options: Vec<InsulinOption>,
}

// ═══════════════════════════════════════════════════════════
// Canonical protocol
// ═══════════════════════════════════════════════════════════

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            severe: TierThresholds {
                ph_range: PhRange { lower: 6.5, upper: 7.1 },
                bicarbonate_below: 5.0,
                deficit_percentage: 10.0,
            },
            moderate: TierThresholds {
                ph_range: PhRange { lower: 7.1, upper: 7.2 },
                bicarbonate_below: 10.0,
                deficit_percentage: 5.0,
            },
            mild: TierThresholds {
                ph_range: PhRange { lower: 7.2, upper: 7.4 },
                bicarbonate_below: 15.0,
                deficit_percentage: 5.0,
            },
            bolus: PerKgCap { ml_per_kg: 10.0, ceiling_ml: 750.0 },
            glucose_bolus: PerKgCap { ml_per_kg: 2.0, ceiling_ml: 150.0 },
            hhs_bolus: PerKgCap { ml_per_kg: 20.0, ceiling_ml: 1500.0 },
            deficit_ceilings: vec![
                DeficitCeiling { percentage: 5.0, ceiling_ml: 3750.0 },
                DeficitCeiling { percentage: 10.0, ceiling_ml: 7500.0 },
            ],
            deficit_replacement_hours: 48.0,
            maintenance_ceiling_ml: 2600.0,
            insulin_options: vec![
                InsulinOption { units_per_kg_hour: 0.05, ceiling_units_per_hour: 3.75 },
                InsulinOption { units_per_kg_hour: 0.1, ceiling_units_per_hour: 7.5 },
            ],
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Loading and lookups
// ═══════════════════════════════════════════════════════════

impl ProtocolConfig {
    /// Load and validate a protocol table from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Deficit-volume ceiling for a deficit percentage, if one is configured.
    pub fn deficit_ceiling_for(&self, percentage: f64) -> Option<f64> {
        self.deficit_ceilings
            .iter()
            .find(|c| (c.percentage - percentage).abs() < KEY_EPSILON)
            .map(|c| c.ceiling_ml)
    }

    /// Ceiling for a selected insulin rate option, if the option is allowed.
    pub fn insulin_ceiling_for(&self, units_per_kg_hour: f64) -> Option<f64> {
        self.insulin_options
            .iter()
            .find(|o| (o.units_per_kg_hour - units_per_kg_hour).abs() < KEY_EPSILON)
            .map(|o| o.ceiling_units_per_hour)
    }

    /// Structural sanity checks, run once at load time.
    ///
    /// Guarantees the engine's lookups cannot fail for config-shaped
    /// reasons: every tier percentage has a ceiling, tier pH ranges are
    /// contiguous from most to least severe, and every rate, ceiling and
    /// duration is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tiers = [
            ("severe", &self.severe),
            ("moderate", &self.moderate),
            ("mild", &self.mild),
        ];

        for (name, tier) in &tiers {
            if tier.ph_range.lower >= tier.ph_range.upper {
                return Err(ConfigError::Invalid(format!(
                    "{name} tier pH range is empty ({} >= {})",
                    tier.ph_range.lower, tier.ph_range.upper
                )));
            }
            if tier.deficit_percentage <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} tier deficit percentage must be positive"
                )));
            }
            if self.deficit_ceiling_for(tier.deficit_percentage).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "{name} tier deficit percentage {}% has no deficit ceiling",
                    tier.deficit_percentage
                )));
            }
        }

        for window in tiers.windows(2) {
            let (worse_name, worse) = window[0];
            let (better_name, better) = window[1];
            if (worse.ph_range.upper - better.ph_range.lower).abs() > KEY_EPSILON {
                return Err(ConfigError::Invalid(format!(
                    "{worse_name} tier pH upper bound {} does not meet {better_name} tier lower bound {}",
                    worse.ph_range.upper, better.ph_range.lower
                )));
            }
            if worse.bicarbonate_below >= better.bicarbonate_below {
                return Err(ConfigError::Invalid(format!(
                    "{worse_name} tier bicarbonate cutoff must be below the {better_name} tier's"
                )));
            }
        }

        for (name, q) in [
            ("bolus", &self.bolus),
            ("glucose bolus", &self.glucose_bolus),
            ("HHS bolus", &self.hhs_bolus),
        ] {
            if q.ml_per_kg <= 0.0 || q.ceiling_ml <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} rate and ceiling must be positive"
                )));
            }
        }

        if self.deficit_replacement_hours <= 0.0 {
            return Err(ConfigError::Invalid(
                "deficit replacement duration must be positive".into(),
            ));
        }
        if self.maintenance_ceiling_ml <= 0.0 {
            return Err(ConfigError::Invalid(
                "maintenance ceiling must be positive".into(),
            ));
        }
        if self.insulin_options.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one insulin rate option is required".into(),
            ));
        }
        for option in &self.insulin_options {
            if option.units_per_kg_hour <= 0.0 || option.ceiling_units_per_hour <= 0.0 {
                return Err(ConfigError::Invalid(
                    "insulin rate options must be positive".into(),
                ));
            }
        }

        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
