//! The clinical calculation engine.
//!
//! One pure, synchronous pass: sanitised clinical input plus an injected
//! protocol table in, the full tree of derived quantities plus an ordered
//! error list out. Every branch runs even when an earlier one failed, so
//! a single pass surfaces every input problem at once. The engine holds
//! no state between passes; concurrent independent calls are safe.

pub mod types;

mod deficit;
mod format;
mod insulin;
mod maintenance;
mod quantity;
mod severity;

use crate::config::ProtocolConfig;

use types::{CalculationResult, ClinicalInput, DerivedQuantity};

// ═══════════════════════════════════════════════════════════
// Error accumulator
// ═══════════════════════════════════════════════════════════

/// Append-only diagnostic list owned by one evaluation pass.
///
/// Threaded explicitly through each derivation step; discarded into the
/// result when the pass completes.
#[derive(Debug, Default)]
pub(crate) struct ErrorLog {
    entries: Vec<String>,
}

impl ErrorLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn as_slice(&self) -> &[String] {
        &self.entries
    }

    fn into_vec(self) -> Vec<String> {
        self.entries
    }
}

// ═══════════════════════════════════════════════════════════
// Orchestration
// ═══════════════════════════════════════════════════════════

/// Starting fluid rate: deficit replacement plus maintenance, summed at
/// full precision with no further capping.
fn starting_fluid_rate(
    deficit_rate: &DerivedQuantity,
    maintenance_rate: &DerivedQuantity,
) -> DerivedQuantity {
    let value = deficit_rate.value + maintenance_rate.value;
    DerivedQuantity {
        value,
        is_capped: false,
        capping_limit: None,
        formula: "deficit rate + maintenance rate".to_string(),
        working: format!(
            "{} + {} = {} mL/hour",
            format::rate(deficit_rate.value),
            format::rate(maintenance_rate.value),
            format::rate(value),
        ),
    }
}

/// Run one calculation pass.
///
/// Fixed dependency order: severity, then the three weight-based boluses
/// (independent of severity), then the deficit chain (reads severity and
/// the bolus node), maintenance, the starting fluid rate (reads both
/// rates), and the insulin rate. The result always carries the complete
/// tree; check `errors` before trusting any value.
pub fn calculate(config: &ProtocolConfig, input: &ClinicalInput) -> CalculationResult {
    let mut errors = ErrorLog::new();

    let severity = severity::classify(config, input.ph, input.bicarbonate, &mut errors);

    let bolus_volume = quantity::bolus_volume(config, input.weight_kg);
    let glucose_bolus_volume = quantity::glucose_bolus_volume(config, input.weight_kg);
    let hhs_bolus_volume = quantity::hhs_bolus_volume(config, input.weight_kg);

    let deficit = deficit::derive(config, input, severity.tier, &bolus_volume, &mut errors);
    let maintenance = maintenance::derive(config, input.weight_kg);
    let starting_fluid_rate = starting_fluid_rate(&deficit.rate, &maintenance.rate);
    let insulin_rate = insulin::derive(config, input, &mut errors);

    if errors.is_empty() {
        tracing::info!(tier = %severity.tier, "Calculation pass complete");
    } else {
        tracing::warn!(
            tier = %severity.tier,
            error_count = errors.len(),
            "Calculation pass completed with errors; values must not be used"
        );
    }

    CalculationResult {
        severity,
        bolus_volume,
        glucose_bolus_volume,
        hhs_bolus_volume,
        deficit,
        maintenance,
        starting_fluid_rate,
        insulin_rate,
        errors: errors.into_vec(),
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
