//! Severity classification from pH and bicarbonate.
//!
//! Tiers are tested in fixed priority order severe → moderate → mild so a
//! severe presentation can never be under-classified by a wider,
//! lower-priority band that also happens to match. A tier matches when pH
//! falls in its half-open range `[lower, upper)` OR bicarbonate (when
//! reported) is below the tier's cutoff — bicarbonate alone can elevate
//! severity even when pH does not.

use crate::config::{ProtocolConfig, TierThresholds};

use super::format;
use super::types::{SeverityAssessment, SeverityTier};
use super::ErrorLog;

fn tier_matches(thresholds: &TierThresholds, ph: f64, bicarbonate: Option<f64>) -> bool {
    let ph_in_range = thresholds.ph_range.contains(ph);
    let bicarbonate_low = bicarbonate.is_some_and(|b| b < thresholds.bicarbonate_below);
    ph_in_range || bicarbonate_low
}

/// Classify one presentation. No tier matching yields `Undetermined` and
/// exactly one accumulated error quoting the offered values.
pub(crate) fn classify(
    config: &ProtocolConfig,
    ph: f64,
    bicarbonate: Option<f64>,
    errors: &mut ErrorLog,
) -> SeverityAssessment {
    let tiers = [
        (SeverityTier::Severe, &config.severe),
        (SeverityTier::Moderate, &config.moderate),
        (SeverityTier::Mild, &config.mild),
    ];

    for (tier, thresholds) in tiers {
        if tier_matches(thresholds, ph, bicarbonate) {
            return SeverityAssessment {
                tier,
                formula: format!(
                    "pH {} to {} (excl.) or bicarbonate below {} mmol/L",
                    thresholds.ph_range.lower,
                    thresholds.ph_range.upper,
                    thresholds.bicarbonate_below,
                ),
                working: format!(
                    "pH {} with bicarbonate {} → {tier}",
                    format::ph(ph),
                    format::bicarbonate(bicarbonate),
                ),
            };
        }
    }

    errors.push(format!(
        "Unable to determine severity: pH {} with bicarbonate {} matches no tier",
        format::ph(ph),
        format::bicarbonate(bicarbonate),
    ));

    SeverityAssessment {
        tier: SeverityTier::Undetermined,
        formula: "tiers tested in order severe → moderate → mild".to_string(),
        working: format!(
            "pH {} with bicarbonate {} → undetermined",
            format::ph(ph),
            format::bicarbonate(bicarbonate),
        ),
    }
}
