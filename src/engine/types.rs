//! Data model for one calculation pass: the clinical input, the severity
//! tier, and the tree of derived quantities returned to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════
// Input
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientSex {
    Male,
    Female,
}

/// One patient's sanitised clinical measurements.
///
/// Field-level validation happens upstream: numeric fields are already
/// numbers in plausible units. The engine still never panics on
/// clinically out-of-band values; it classifies `Undetermined` and
/// reports errors instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalInput {
    /// Working weight in kilograms. Must be positive.
    pub weight_kg: f64,
    /// Blood gas pH.
    pub ph: f64,
    /// Bicarbonate in mmol/L, when the blood gas reported one.
    pub bicarbonate: Option<f64>,
    /// Blood glucose in mmol/L. Audit metadata, not consumed by dosing.
    pub glucose: Option<f64>,
    /// Blood ketones in mmol/L. Audit metadata, not consumed by dosing.
    pub ketones: Option<f64>,
    /// Clinically shocked at presentation. Suppresses the bolus
    /// subtraction from the deficit.
    pub shock_present: bool,
    /// Selected insulin infusion rate in Units/kg/hour. Must be one of
    /// the protocol's discrete options.
    pub insulin_rate: f64,
    /// Audit metadata.
    pub patient_age_years: f64,
    /// Audit metadata.
    pub patient_sex: PatientSex,
    /// When the protocol was started. Audit metadata.
    pub protocol_start: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════
// Severity
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Severe,
    Moderate,
    Mild,
    /// No tier matched the presented pH and bicarbonate. Downstream
    /// severity-dependent quantities yield placeholders.
    Undetermined,
}

impl std::fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SeverityTier::Severe => "severe",
            SeverityTier::Moderate => "moderate",
            SeverityTier::Mild => "mild",
            SeverityTier::Undetermined => "undetermined",
        };
        f.write_str(text)
    }
}

/// The severity node of the result tree: the tier plus the audit strings
/// explaining how it was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityAssessment {
    pub tier: SeverityTier,
    pub formula: String,
    pub working: String,
}

// ═══════════════════════════════════════════════════════════
// Derived quantities
// ═══════════════════════════════════════════════════════════

/// The uniform shape of every calculated value in the result tree.
///
/// `value` keeps full precision for any dependent computation; rounding
/// happens only inside the `working` string. The uncapped figure is not
/// carried — it survives only as the arithmetic shown in `working`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedQuantity {
    /// The post-cap numeric result actually used.
    pub value: f64,
    /// True iff the uncapped result exceeded the applicable ceiling.
    pub is_capped: bool,
    /// Human-readable description of the ceiling that applies, `None`
    /// where no ceiling exists for this quantity.
    pub capping_limit: Option<String>,
    /// Static template of the computation.
    pub formula: String,
    /// The formula with this patient's numbers substituted, rounded for
    /// display only.
    pub working: String,
}

/// The four sequential deficit derivations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeficitQuantities {
    pub percentage: DerivedQuantity,
    pub volume: DerivedQuantity,
    pub volume_less_bolus: DerivedQuantity,
    pub rate: DerivedQuantity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceQuantities {
    pub volume: DerivedQuantity,
    pub rate: DerivedQuantity,
}

/// Everything one calculation pass produces.
///
/// Caller contract: when `errors` is non-empty, none of the numeric
/// values are clinically valid. The tree is still returned in full, with
/// placeholders on failed branches, so every input problem surfaces in a
/// single pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub severity: SeverityAssessment,
    pub bolus_volume: DerivedQuantity,
    pub glucose_bolus_volume: DerivedQuantity,
    pub hhs_bolus_volume: DerivedQuantity,
    pub deficit: DeficitQuantities,
    pub maintenance: MaintenanceQuantities,
    pub starting_fluid_rate: DerivedQuantity,
    pub insulin_rate: DerivedQuantity,
    pub errors: Vec<String>,
}

impl CalculationResult {
    /// True when every branch resolved and the values may be used.
    pub fn is_usable(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_tier_display_text() {
        assert_eq!(SeverityTier::Severe.to_string(), "severe");
        assert_eq!(SeverityTier::Undetermined.to_string(), "undetermined");
    }

    #[test]
    fn clinical_input_deserializes_documented_fields() {
        let input: ClinicalInput = serde_json::from_str(
            r#"{
                "weight_kg": 20.0,
                "ph": 7.15,
                "bicarbonate": 12.0,
                "glucose": 32.0,
                "ketones": 5.1,
                "shock_present": false,
                "insulin_rate": 0.05,
                "patient_age_years": 9.4,
                "patient_sex": "female",
                "protocol_start": "2026-08-01T10:30:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(input.weight_kg, 20.0);
        assert_eq!(input.bicarbonate, Some(12.0));
        assert_eq!(input.patient_sex, PatientSex::Female);
    }

    #[test]
    fn optional_measurements_may_be_absent() {
        let input: ClinicalInput = serde_json::from_str(
            r#"{
                "weight_kg": 20.0,
                "ph": 7.15,
                "bicarbonate": null,
                "glucose": null,
                "ketones": null,
                "shock_present": true,
                "insulin_rate": 0.1,
                "patient_age_years": 3.0,
                "patient_sex": "male",
                "protocol_start": "2026-08-01T10:30:00Z"
            }"#,
        )
        .unwrap();
        assert!(input.bicarbonate.is_none());
        assert!(input.shock_present);
    }
}
