//! Input normalizer: raw form strings to canonical quantities.
//!
//! Parsing is lenient. A field that is empty, whitespace only, or not a finite
//! number is treated as unknown and the solver proceeds without it; nothing is
//! reported back to the caller. Dropped non-empty fields are logged at `debug`
//! level.
//!
//! # Example
//!
//! ```
//! use colligative::normalize::{RawInputs, normalize};
//! use colligative::units::{TemperatureUnit, UnitSelection};
//! use colligative::{Domain, Quantity};
//!
//! let raw: RawInputs = [("t_solution", "271.65"), ("kf", "abc")].into_iter().collect();
//! let units = UnitSelection::default().with_solution_temperature(TemperatureUnit::Kelvin);
//!
//! let quantities = normalize(Domain::FreezingPoint, &raw, &units);
//! assert!((quantities.get(Quantity::SolutionTemperature).unwrap() + 1.5).abs() < 1e-10);
//! assert_eq!(quantities.get(Quantity::KConstant), None);
//! ```

use std::collections::HashMap;

use crate::units::{MassUnit, TemperatureUnit, UnitSelection};
use crate::{Domain, Quantity, QuantityMap};

/// Raw text of each input field, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputs {
    fields: HashMap<String, String>,
}

impl RawInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text of a field, replacing any previous text.
    pub fn set(&mut self, field: impl Into<String>, text: impl Into<String>) {
        self.fields.insert(field.into(), text.into());
    }

    /// Builder form of [`RawInputs::set`].
    pub fn with(mut self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.set(field, text);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawInputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawInputs { fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

impl From<HashMap<String, String>> for RawInputs {
    fn from(fields: HashMap<String, String>) -> Self {
        RawInputs { fields }
    }
}

/// Parses one field.
///
/// Returns `None` for empty or whitespace-only text, for text that is not a
/// number, and for non-finite numbers such as `inf` or `NaN`.
pub fn parse_field(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Builds the canonical quantity map for `domain`.
///
/// Temperatures are converted to Celsius, solute mass to grams and solvent
/// mass to kilograms. Fields outside the domain's vocabulary are ignored.
pub fn normalize(domain: Domain, raw: &RawInputs, units: &UnitSelection) -> QuantityMap {
    for (field, _) in raw.fields() {
        if domain.quantity_for_field(field).is_none() {
            tracing::debug!(field, %domain, "ignoring field outside domain vocabulary");
        }
    }

    let mut quantities = QuantityMap::new();
    for quantity in Quantity::ALL {
        let field = domain.field_name(quantity);
        let Some(text) = raw.get(field) else {
            continue;
        };
        match parse_field(text) {
            Some(value) => quantities.insert(quantity, to_canonical(quantity, value, units)),
            None if !text.trim().is_empty() => {
                tracing::debug!(field, input = text, "dropping unparseable field");
            }
            None => {}
        }
    }
    quantities
}

/// Converts a parsed value from its selected unit to the canonical one.
fn to_canonical(quantity: Quantity, value: f64, units: &UnitSelection) -> f64 {
    match quantity {
        Quantity::SolutionTemperature => {
            units.solution_temperature.to(value, TemperatureUnit::Celsius)
        }
        Quantity::SolventTemperature => {
            units.solvent_temperature.to(value, TemperatureUnit::Celsius)
        }
        Quantity::SoluteMass => units.solute_mass.to(value, MassUnit::Grams),
        Quantity::SolventMass => units.solvent_mass.to(value, MassUnit::Kilograms),
        _ => value,
    }
}
