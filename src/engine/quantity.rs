//! Capped weight-based quantities.
//!
//! The shared shape behind the resuscitation bolus, the glucose bolus,
//! the HHS bolus and the insulin rate: `weight × per-kg rate`, held to an
//! absolute safety ceiling. Total over every positive weight — weight and
//! the rate/ceiling pair are always present, so these never error.

use crate::config::{PerKgCap, ProtocolConfig};

use super::format;
use super::types::DerivedQuantity;

/// Build a capped per-kg quantity node.
///
/// The working string always shows the uncapped arithmetic, with weight
/// at 1 decimal place, and appends "(exceeds limit)" when the ceiling
/// bites. That annotation is cosmetic; `value` is the capped figure.
pub(crate) fn capped_per_kg(
    weight_kg: f64,
    rate_per_kg: f64,
    ceiling: f64,
    formula: &str,
    limit_text: String,
    fmt_result: fn(f64) -> String,
    unit: &str,
) -> DerivedQuantity {
    let uncapped = weight_kg * rate_per_kg;
    let is_capped = uncapped > ceiling;
    let value = if is_capped { ceiling } else { uncapped };

    let mut working = format!(
        "{rate_per_kg} × {} = {} {unit}",
        format::weight(weight_kg),
        fmt_result(uncapped),
    );
    if is_capped {
        working.push_str(" (exceeds limit)");
    }

    DerivedQuantity {
        value,
        is_capped,
        capping_limit: Some(limit_text),
        formula: formula.to_string(),
        working,
    }
}

fn bolus_node(cap: &PerKgCap, weight_kg: f64, name: &str) -> DerivedQuantity {
    capped_per_kg(
        weight_kg,
        cap.ml_per_kg,
        cap.ceiling_ml,
        &format!("{} mL × weight (kg)", cap.ml_per_kg),
        format!("{} mL for the {name}", format::volume(cap.ceiling_ml)),
        format::volume,
        "mL",
    )
}

/// Initial resuscitation bolus volume.
pub(crate) fn bolus_volume(config: &ProtocolConfig, weight_kg: f64) -> DerivedQuantity {
    bolus_node(&config.bolus, weight_kg, "resuscitation bolus")
}

/// Glucose correction bolus volume.
pub(crate) fn glucose_bolus_volume(config: &ProtocolConfig, weight_kg: f64) -> DerivedQuantity {
    bolus_node(&config.glucose_bolus, weight_kg, "glucose bolus")
}

/// Hyperosmolar hyperglycaemic state bolus volume.
pub(crate) fn hhs_bolus_volume(config: &ProtocolConfig, weight_kg: f64) -> DerivedQuantity {
    bolus_node(&config.hhs_bolus, weight_kg, "HHS bolus")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_ceiling_value_is_exact_product() {
        let config = ProtocolConfig::default();
        let bolus = bolus_volume(&config, 20.0);
        assert_eq!(bolus.value, 200.0);
        assert!(!bolus.is_capped);
        assert_eq!(bolus.working, "10 × 20.0 = 200 mL");
    }

    #[test]
    fn over_ceiling_value_is_ceiling() {
        let config = ProtocolConfig::default();
        let bolus = bolus_volume(&config, 80.0);
        assert_eq!(bolus.value, 750.0);
        assert!(bolus.is_capped);
        assert!(bolus.working.ends_with("(exceeds limit)"));
        // Uncapped arithmetic still shown for audit.
        assert!(bolus.working.contains("= 800 mL"));
    }

    #[test]
    fn exactly_at_ceiling_is_not_capped() {
        let config = ProtocolConfig::default();
        let bolus = bolus_volume(&config, 75.0);
        assert_eq!(bolus.value, 750.0);
        assert!(!bolus.is_capped);
    }

    #[test]
    fn glucose_and_hhs_boluses_use_their_own_ceilings() {
        let config = ProtocolConfig::default();

        let glucose = glucose_bolus_volume(&config, 80.0);
        assert_eq!(glucose.value, 150.0);
        assert!(glucose.is_capped);

        let hhs = hhs_bolus_volume(&config, 80.0);
        assert_eq!(hhs.value, 1500.0);
        assert!(hhs.is_capped);
        assert_eq!(hhs.capping_limit.as_deref(), Some("1500 mL for the HHS bolus"));
    }

    #[test]
    fn formula_names_per_kg_rate() {
        let config = ProtocolConfig::default();
        let glucose = glucose_bolus_volume(&config, 20.0);
        assert_eq!(glucose.formula, "2 mL × weight (kg)");
        assert_eq!(glucose.value, 40.0);
    }
}
