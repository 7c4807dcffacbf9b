//! Fluid deficit derivation chain.
//!
//! Four sequential steps, each reading already-computed siblings rather
//! than recomputing them: percentage (by severity tier), volume (ceiling
//! keyed by percentage value), volume less bolus (shock-aware), and
//! replacement rate. A failed step yields a zero placeholder and the
//! chain carries on, so one pass still surfaces every input problem.

use crate::config::ProtocolConfig;

use super::format;
use super::types::{ClinicalInput, DeficitQuantities, DerivedQuantity, SeverityTier};
use super::ErrorLog;

/// Chain a placeholder node for a step whose dependency failed upstream.
fn not_calculated(formula: &str) -> DerivedQuantity {
    DerivedQuantity {
        value: 0.0,
        is_capped: false,
        capping_limit: None,
        formula: formula.to_string(),
        working: "not calculated (severity undetermined)".to_string(),
    }
}

/// Step 1: deficit percentage, looked up from the tier thresholds.
///
/// Returns the node plus the raw percentage for the next step; `None`
/// when severity was undetermined.
fn percentage(
    config: &ProtocolConfig,
    tier: SeverityTier,
    errors: &mut ErrorLog,
) -> (DerivedQuantity, Option<f64>) {
    let formula = "deficit percentage by severity tier";

    let thresholds = match tier {
        SeverityTier::Severe => &config.severe,
        SeverityTier::Moderate => &config.moderate,
        SeverityTier::Mild => &config.mild,
        SeverityTier::Undetermined => {
            errors.push("Deficit percentage requires a determined severity tier");
            return (not_calculated(formula), None);
        }
    };

    let percent = thresholds.deficit_percentage;
    let node = DerivedQuantity {
        value: percent,
        is_capped: false,
        capping_limit: None,
        formula: formula.to_string(),
        working: format!("{tier} → {}%", format::percentage(percent)),
    };
    (node, Some(percent))
}

/// Step 2: deficit volume, `percentage × weight × 10`, held to the
/// ceiling configured for that percentage value.
fn volume(
    config: &ProtocolConfig,
    weight_kg: f64,
    percent: Option<f64>,
    errors: &mut ErrorLog,
) -> (DerivedQuantity, Option<f64>) {
    let formula = "deficit percentage × weight (kg) × 10";

    let Some(percent) = percent else {
        return (not_calculated(formula), None);
    };

    let uncapped = percent * weight_kg * 10.0;
    let working_arithmetic = format!(
        "{} × {} × 10 = {} mL",
        format::percentage(percent),
        format::weight(weight_kg),
        format::volume(uncapped),
    );

    let Some(ceiling) = config.deficit_ceiling_for(percent) else {
        errors.push(format!(
            "No deficit ceiling configured for a {}% deficit",
            format::percentage(percent),
        ));
        let node = DerivedQuantity {
            value: uncapped,
            is_capped: false,
            capping_limit: None,
            formula: formula.to_string(),
            working: working_arithmetic,
        };
        return (node, Some(uncapped));
    };

    let is_capped = uncapped > ceiling;
    let value = if is_capped { ceiling } else { uncapped };
    let mut working = working_arithmetic;
    if is_capped {
        working.push_str(" (exceeds limit)");
    }

    let node = DerivedQuantity {
        value,
        is_capped,
        capping_limit: Some(format!(
            "{} mL for a {}% deficit",
            format::volume(ceiling),
            format::percentage(percent),
        )),
        formula: formula.to_string(),
        working,
    };
    (node, Some(value))
}

/// Step 3: deficit volume less the resuscitation bolus.
///
/// Shocked patients keep the full deficit — their bolus is additional
/// resuscitation, not part of the replacement. Otherwise the bolus
/// node's post-cap `value` is subtracted exactly as shown to the
/// clinician, never re-derived from weight.
fn volume_less_bolus(
    volume_ml: Option<f64>,
    bolus: &DerivedQuantity,
    shock_present: bool,
) -> (DerivedQuantity, Option<f64>) {
    let formula = "deficit volume − resuscitation bolus (not subtracted in shock)";

    let Some(volume_ml) = volume_ml else {
        return (not_calculated(formula), None);
    };

    let bolus_to_subtract = if shock_present { 0.0 } else { bolus.value };
    let value = volume_ml - bolus_to_subtract;

    let working = if shock_present {
        format!(
            "{} − 0 (shock: bolus not subtracted) = {} mL",
            format::volume(volume_ml),
            format::volume(value),
        )
    } else {
        format!(
            "{} − {} = {} mL",
            format::volume(volume_ml),
            format::volume(bolus_to_subtract),
            format::volume(value),
        )
    };

    let node = DerivedQuantity {
        value,
        is_capped: false,
        capping_limit: None,
        formula: formula.to_string(),
        working,
    };
    (node, Some(value))
}

/// Step 4: hourly replacement rate over the configured duration.
fn replacement_rate(config: &ProtocolConfig, volume_ml: Option<f64>) -> DerivedQuantity {
    let hours = config.deficit_replacement_hours;
    let formula = format!("deficit volume less bolus ÷ {hours} hours");

    let Some(volume_ml) = volume_ml else {
        return not_calculated(&formula);
    };

    let value = volume_ml / hours;
    DerivedQuantity {
        value,
        is_capped: false,
        capping_limit: None,
        formula,
        working: format!(
            "{} ÷ {hours} = {} mL/hour",
            format::volume(volume_ml),
            format::rate(value),
        ),
    }
}

/// Run the full deficit chain for one pass.
pub(crate) fn derive(
    config: &ProtocolConfig,
    input: &ClinicalInput,
    tier: SeverityTier,
    bolus: &DerivedQuantity,
    errors: &mut ErrorLog,
) -> DeficitQuantities {
    let (percentage_node, percent) = percentage(config, tier, errors);
    let (volume_node, volume_ml) = volume(config, input.weight_kg, percent, errors);
    let (less_bolus_node, remaining_ml) =
        volume_less_bolus(volume_ml, bolus, input.shock_present);
    let rate_node = replacement_rate(config, remaining_ml);

    DeficitQuantities {
        percentage: percentage_node,
        volume: volume_node,
        volume_less_bolus: less_bolus_node,
        rate: rate_node,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::super::quantity;
    use super::super::types::{PatientSex, SeverityTier};
    use super::*;

    fn input(weight_kg: f64, shock_present: bool) -> ClinicalInput {
        ClinicalInput {
            weight_kg,
            ph: 7.0,
            bicarbonate: None,
            glucose: None,
            ketones: None,
            shock_present,
            insulin_rate: 0.05,
            patient_age_years: 8.0,
            patient_sex: PatientSex::Male,
            protocol_start: Utc::now(),
        }
    }

    fn derive_default(
        weight_kg: f64,
        shock_present: bool,
        tier: SeverityTier,
    ) -> (DeficitQuantities, ErrorLog) {
        let config = ProtocolConfig::default();
        let clinical = input(weight_kg, shock_present);
        let bolus = quantity::bolus_volume(&config, weight_kg);
        let mut errors = ErrorLog::new();
        let deficit = derive(&config, &clinical, tier, &bolus, &mut errors);
        (deficit, errors)
    }

    #[test]
    fn severe_tier_full_chain() {
        let (deficit, errors) = derive_default(20.0, false, SeverityTier::Severe);
        assert!(errors.is_empty());

        assert_eq!(deficit.percentage.value, 10.0);
        assert_eq!(deficit.percentage.working, "severe → 10%");

        // 10 × 20 × 10 = 2000, under the 10% ceiling of 7500.
        assert_eq!(deficit.volume.value, 2000.0);
        assert!(!deficit.volume.is_capped);
        assert_eq!(
            deficit.volume.capping_limit.as_deref(),
            Some("7500 mL for a 10% deficit")
        );

        // Bolus 10 × 20 = 200 subtracted exactly.
        assert_eq!(deficit.volume_less_bolus.value, 1800.0);
        assert_eq!(deficit.volume_less_bolus.working, "2000 − 200 = 1800 mL");

        assert_eq!(deficit.rate.value, 1800.0 / 48.0);
        assert_eq!(deficit.rate.working, "1800 ÷ 48 = 37.5 mL/hour");
    }

    #[test]
    fn shock_suppresses_bolus_subtraction() {
        let (deficit, _) = derive_default(20.0, true, SeverityTier::Severe);
        assert_eq!(deficit.volume_less_bolus.value, 2000.0);
        assert!(deficit
            .volume_less_bolus
            .working
            .contains("shock: bolus not subtracted"));
    }

    #[test]
    fn subtracted_bolus_is_the_capped_figure() {
        // At 80 kg both the deficit volume and the bolus hit their
        // ceilings; the subtraction must use the capped bolus (750),
        // not the raw 10 × 80 = 800.
        let (deficit, _) = derive_default(80.0, false, SeverityTier::Severe);
        assert_eq!(deficit.volume.value, 7500.0);
        assert!(deficit.volume.is_capped);
        assert_eq!(deficit.volume_less_bolus.value, 6750.0);
        assert_eq!(deficit.rate.value, 6750.0 / 48.0);
    }

    #[test]
    fn ceiling_selected_by_percentage_value() {
        // Mild and moderate share the 5% percentage and therefore the
        // 3750 mL ceiling. 80 kg: 5 × 80 × 10 = 4000 → capped.
        for tier in [SeverityTier::Moderate, SeverityTier::Mild] {
            let (deficit, errors) = derive_default(80.0, false, tier);
            assert!(errors.is_empty());
            assert_eq!(deficit.volume.value, 3750.0);
            assert!(deficit.volume.is_capped);
            assert_eq!(
                deficit.volume.capping_limit.as_deref(),
                Some("3750 mL for a 5% deficit")
            );
        }
    }

    #[test]
    fn undetermined_severity_short_circuits_with_one_error() {
        let (deficit, errors) = derive_default(20.0, false, SeverityTier::Undetermined);
        assert_eq!(errors.len(), 1);
        assert!(errors.as_slice()[0].contains("severity tier"));

        for node in [
            &deficit.percentage,
            &deficit.volume,
            &deficit.volume_less_bolus,
            &deficit.rate,
        ] {
            assert_eq!(node.value, 0.0);
            assert_eq!(node.working, "not calculated (severity undetermined)");
        }
    }

    #[test]
    fn unknown_percentage_registers_error_not_a_guess() {
        let mut config = ProtocolConfig::default();
        config.severe.deficit_percentage = 8.0; // no ceiling entry
        let clinical = input(20.0, false);
        let bolus = quantity::bolus_volume(&config, 20.0);
        let mut errors = ErrorLog::new();

        let deficit = derive(&config, &clinical, SeverityTier::Severe, &bolus, &mut errors);

        assert_eq!(errors.len(), 1);
        assert!(errors.as_slice()[0].contains("No deficit ceiling configured for a 8% deficit"));
        // Uncapped figure kept for diagnostics, never flagged capped.
        assert_eq!(deficit.volume.value, 1600.0);
        assert!(!deficit.volume.is_capped);
        assert!(deficit.volume.capping_limit.is_none());
    }

    #[test]
    fn rate_keeps_full_precision() {
        let (deficit, _) = derive_default(13.0, false, SeverityTier::Severe);
        // 10 × 13 × 10 = 1300; bolus 130; (1300 − 130) / 48.
        assert_eq!(deficit.rate.value, 1170.0 / 48.0);
        assert_eq!(deficit.rate.working, "1170 ÷ 48 = 24.4 mL/hour");
    }
}
