//! Paediatric DKA protocol calculation engine.
//!
//! Turns one patient's sanitised clinical measurements into individualised
//! fluid and insulin dosing: severity classification, resuscitation and
//! correction boluses, the deficit replacement chain, maintenance fluid,
//! the starting fluid rate and the insulin infusion rate. Every quantity
//! is self-documenting — numeric value, formula, worked substitution and
//! safety-cap metadata — and every input problem found during a pass is
//! returned in one ordered error list.
//!
//! The engine is pure and stateless; the protocol table is an explicit
//! [`ProtocolConfig`] value injected into each call.

pub mod config;
pub mod engine;
pub mod error;

pub use config::ProtocolConfig;
pub use engine::calculate;
pub use engine::types::{
    CalculationResult, ClinicalInput, DerivedQuantity, PatientSex, SeverityTier,
};
pub use error::ConfigError;
