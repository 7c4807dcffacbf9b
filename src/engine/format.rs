//! Display rounding for working strings.
//!
//! These conventions are a display contract for the audit trail: weight
//! to 1 decimal place, volumes to 0, fluid rates to 1, insulin rates
//! to 2. They apply only to `working` text — numeric `value` fields are
//! never rounded.

/// Weight in kg, 1 decimal place.
pub(crate) fn weight(kg: f64) -> String {
    format!("{kg:.1}")
}

/// Volume in mL, whole millilitres.
pub(crate) fn volume(ml: f64) -> String {
    format!("{ml:.0}")
}

/// Fluid rate in mL/hour, 1 decimal place.
pub(crate) fn rate(ml_per_hour: f64) -> String {
    format!("{ml_per_hour:.1}")
}

/// Insulin rate in Units/hour, 2 decimal places.
pub(crate) fn insulin(units_per_hour: f64) -> String {
    format!("{units_per_hour:.2}")
}

/// Deficit percentage, whole percent.
pub(crate) fn percentage(percent: f64) -> String {
    format!("{percent:.0}")
}

/// Blood gas pH, 2 decimal places.
pub(crate) fn ph(ph: f64) -> String {
    format!("{ph:.2}")
}

/// Bicarbonate in mmol/L, 1 decimal place; readable when absent.
pub(crate) fn bicarbonate(bicarbonate: Option<f64>) -> String {
    match bicarbonate {
        Some(value) => format!("{value:.1} mmol/L"),
        None => "not provided".to_string(),
    }
}
