//! Daily maintenance fluid via the Holliday–Segar weight tiers.
//!
//! Total over all positive weights; the only policy applied is the
//! global daily ceiling.

use crate::config::ProtocolConfig;

use super::format;
use super::types::{DerivedQuantity, MaintenanceQuantities};

/// Daily volume with the formula text matching whichever weight tier
/// fired, so the audit trail shows the branch actually used.
fn daily_volume(config: &ProtocolConfig, weight_kg: f64) -> DerivedQuantity {
    let weight_text = format::weight(weight_kg);
    let (uncapped, formula, arithmetic) = if weight_kg < 10.0 {
        (
            weight_kg * 100.0,
            "weight (kg) × 100",
            format!("{weight_text} × 100"),
        )
    } else if weight_kg < 20.0 {
        (
            1000.0 + (weight_kg - 10.0) * 50.0,
            "1000 + (weight (kg) − 10) × 50",
            format!("1000 + ({weight_text} − 10) × 50"),
        )
    } else {
        (
            1500.0 + (weight_kg - 20.0) * 20.0,
            "1500 + (weight (kg) − 20) × 20",
            format!("1500 + ({weight_text} − 20) × 20"),
        )
    };

    let ceiling = config.maintenance_ceiling_ml;
    let is_capped = uncapped > ceiling;
    let value = if is_capped { ceiling } else { uncapped };

    let mut working = format!("{arithmetic} = {} mL", format::volume(uncapped));
    if is_capped {
        working.push_str(" (exceeds limit)");
    }

    DerivedQuantity {
        value,
        is_capped,
        capping_limit: Some(format!(
            "{} mL per day for all weights",
            format::volume(ceiling)
        )),
        formula: formula.to_string(),
        working,
    }
}

/// Derive the daily maintenance volume and its hourly rate.
pub(crate) fn derive(config: &ProtocolConfig, weight_kg: f64) -> MaintenanceQuantities {
    let volume = daily_volume(config, weight_kg);

    let rate_value = volume.value / 24.0;
    let rate = DerivedQuantity {
        value: rate_value,
        is_capped: false,
        capping_limit: None,
        formula: "maintenance volume ÷ 24 hours".to_string(),
        working: format!(
            "{} ÷ 24 = {} mL/hour",
            format::volume(volume.value),
            format::rate(rate_value),
        ),
    };

    MaintenanceQuantities { volume, rate }
}
