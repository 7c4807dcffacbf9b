//! Insulin infusion rate from the clinician's selected per-kg option.
//!
//! The option set is a small fixed enumeration carried in configuration;
//! an option with no configured ceiling is a programming or configuration
//! error and is reported, never silently defaulted.

use crate::config::ProtocolConfig;

use super::format;
use super::quantity::capped_per_kg;
use super::types::{ClinicalInput, DerivedQuantity};
use super::ErrorLog;

pub(crate) fn derive(
    config: &ProtocolConfig,
    input: &ClinicalInput,
    errors: &mut ErrorLog,
) -> DerivedQuantity {
    let option = input.insulin_rate;
    let formula = format!("{option} Units/kg/hour × weight (kg)");

    let Some(ceiling) = config.insulin_ceiling_for(option) else {
        errors.push(format!(
            "Insulin rate option {option} Units/kg/hour is not a recognised protocol rate"
        ));
        return DerivedQuantity {
            value: 0.0,
            is_capped: false,
            capping_limit: None,
            formula,
            working: "not calculated (unrecognised insulin rate option)".to_string(),
        };
    };

    capped_per_kg(
        input.weight_kg,
        option,
        ceiling,
        &formula,
        format!(
            "{} Units/hour for the {option} Units/kg/hour option",
            format::insulin(ceiling)
        ),
        format::insulin,
        "Units/hour",
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::super::types::PatientSex;
    use super::*;

    fn input(weight_kg: f64, insulin_rate: f64) -> ClinicalInput {
        ClinicalInput {
            weight_kg,
            ph: 7.0,
            bicarbonate: None,
            glucose: None,
            ketones: None,
            shock_present: false,
            insulin_rate,
            patient_age_years: 8.0,
            patient_sex: PatientSex::Female,
            protocol_start: Utc::now(),
        }
    }

    #[test]
    fn low_option_uncapped() {
        let mut errors = ErrorLog::new();
        let rate = derive(&ProtocolConfig::default(), &input(20.0, 0.05), &mut errors);
        assert!(errors.is_empty());
        assert_eq!(rate.value, 1.0);
        assert!(!rate.is_capped);
        assert_eq!(rate.working, "0.05 × 20.0 = 1.00 Units/hour");
    }

    #[test]
    fn high_option_caps_at_its_own_ceiling() {
        let mut errors = ErrorLog::new();
        let rate = derive(&ProtocolConfig::default(), &input(80.0, 0.1), &mut errors);
        assert!(errors.is_empty());
        assert_eq!(rate.value, 7.5);
        assert!(rate.is_capped);
        assert_eq!(
            rate.capping_limit.as_deref(),
            Some("7.50 Units/hour for the 0.1 Units/kg/hour option")
        );
    }

    #[test]
    fn each_option_has_its_own_ceiling() {
        let mut errors = ErrorLog::new();
        let rate = derive(&ProtocolConfig::default(), &input(80.0, 0.05), &mut errors);
        // 0.05 × 80 = 4.0 exceeds the low option's 3.75 ceiling even
        // though it is well under the high option's.
        assert_eq!(rate.value, 3.75);
        assert!(rate.is_capped);
    }

    #[test]
    fn unrecognised_option_registers_error() {
        let mut errors = ErrorLog::new();
        let rate = derive(&ProtocolConfig::default(), &input(20.0, 0.07), &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors.as_slice()[0].contains("0.07"));
        assert_eq!(rate.value, 0.0);
        assert!(rate.capping_limit.is_none());
    }
}
