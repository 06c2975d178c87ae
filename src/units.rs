//! Temperature and mass units accepted by the input form.
//!
//! The solver works in one canonical unit system: temperatures in degrees
//! Celsius, solute mass in grams and solvent mass in kilograms. The two mass
//! quantities deliberately use different canonical units because molar mass is
//! expressed in g/mol while molality is expressed in mol/kg.
//!
//! # Example
//!
//! ```
//! use colligative::units::{MassUnit, TemperatureUnit};
//!
//! let celsius = TemperatureUnit::Kelvin.to(273.15, TemperatureUnit::Celsius);
//! assert_eq!(celsius, 0.0);
//!
//! let kilograms = MassUnit::Grams.to(250.0, MassUnit::Kilograms);
//! assert_eq!(kilograms, 0.25);
//! ```

use std::fmt;
use std::str::FromStr;

/// Offset between the Kelvin and Celsius scales.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Number of grams in one kilogram.
pub const GRAMS_PER_KILOGRAM: f64 = 1000.0;

/// Errors raised while interpreting unit selections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    /// The label does not name a unit of the expected kind
    #[error("Unknown {kind} unit: {label:?}")]
    UnknownUnit { kind: &'static str, label: String },
    /// The field does not carry a unit selector
    #[error("Field has no unit selector: {0}")]
    UnknownField(String),
}

/// Temperature scales offered for the solution and solvent temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemperatureUnit {
    /// Degrees Celsius (canonical)
    #[default]
    Celsius,
    /// Kelvin
    Kelvin,
}

impl TemperatureUnit {
    /// Converts `value` from one temperature scale to another.
    pub fn convert(value: f64, from: TemperatureUnit, to: TemperatureUnit) -> f64 {
        match (from, to) {
            (TemperatureUnit::Kelvin, TemperatureUnit::Celsius) => value - KELVIN_OFFSET,
            (TemperatureUnit::Celsius, TemperatureUnit::Kelvin) => value + KELVIN_OFFSET,
            _ => value,
        }
    }

    /// Converts a value expressed in this unit into `target`.
    pub fn to(self, value: f64, target: TemperatureUnit) -> f64 {
        Self::convert(value, self, target)
    }

    /// Short unit symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Kelvin => "K",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::Celsius => write!(f, "Celsius"),
            TemperatureUnit::Kelvin => write!(f, "Kelvin"),
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "celsius" | "c" | "°c" => Ok(TemperatureUnit::Celsius),
            "kelvin" | "k" => Ok(TemperatureUnit::Kelvin),
            _ => Err(UnitError::UnknownUnit { kind: "temperature", label: s.to_string() }),
        }
    }
}

/// Mass units offered for the solute and solvent masses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MassUnit {
    /// Grams (canonical for solute mass)
    #[default]
    Grams,
    /// Kilograms (canonical for solvent mass)
    Kilograms,
}

impl MassUnit {
    /// Converts `value` from one mass unit to another.
    pub fn convert(value: f64, from: MassUnit, to: MassUnit) -> f64 {
        match (from, to) {
            (MassUnit::Grams, MassUnit::Kilograms) => value / GRAMS_PER_KILOGRAM,
            (MassUnit::Kilograms, MassUnit::Grams) => value * GRAMS_PER_KILOGRAM,
            _ => value,
        }
    }

    /// Converts a value expressed in this unit into `target`.
    pub fn to(self, value: f64, target: MassUnit) -> f64 {
        Self::convert(value, self, target)
    }

    /// Short unit symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            MassUnit::Grams => "g",
            MassUnit::Kilograms => "kg",
        }
    }
}

impl fmt::Display for MassUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MassUnit::Grams => write!(f, "grams"),
            MassUnit::Kilograms => write!(f, "kilograms"),
        }
    }
}

impl FromStr for MassUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grams" | "gram" | "g" => Ok(MassUnit::Grams),
            "kilograms" | "kilogram" | "kg" => Ok(MassUnit::Kilograms),
            _ => Err(UnitError::UnknownUnit { kind: "mass", label: s.to_string() }),
        }
    }
}

/// Unit selected for each unit-bearing input field.
///
/// The default mirrors the first option of every selector on the input form:
/// Celsius for both temperatures and grams for both masses. Note that this
/// means a bare solvent mass is read as grams unless the caller selects
/// kilograms.
///
/// # Examples
///
/// ```
/// use colligative::units::{MassUnit, TemperatureUnit, UnitSelection};
///
/// let units = UnitSelection::default()
///     .with_solution_temperature(TemperatureUnit::Kelvin)
///     .with_solvent_mass(MassUnit::Kilograms);
///
/// let same = UnitSelection::from_fields([
///     ("t_solution_unit", "Kelvin"),
///     ("kg_solvent_unit", "kilograms"),
/// ])
/// .unwrap();
///
/// assert_eq!(units, same);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitSelection {
    pub solution_temperature: TemperatureUnit,
    pub solvent_temperature: TemperatureUnit,
    pub solute_mass: MassUnit,
    pub solvent_mass: MassUnit,
}

impl UnitSelection {
    /// Creates the default selection (Celsius, Celsius, grams, grams).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_solution_temperature(mut self, unit: TemperatureUnit) -> Self {
        self.solution_temperature = unit;
        self
    }

    pub fn with_solvent_temperature(mut self, unit: TemperatureUnit) -> Self {
        self.solvent_temperature = unit;
        self
    }

    pub fn with_solute_mass(mut self, unit: MassUnit) -> Self {
        self.solute_mass = unit;
        self
    }

    pub fn with_solvent_mass(mut self, unit: MassUnit) -> Self {
        self.solvent_mass = unit;
        self
    }

    /// Builds a selection from `field -> unit label` pairs.
    ///
    /// Fields may be named after their selector (`t_solution_unit`) or after
    /// the value field they qualify (`t_solution`). Selectors that are not
    /// mentioned keep their default.
    pub fn from_fields<I, K, V>(fields: I) -> Result<Self, UnitError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut selection = Self::default();
        for (field, label) in fields {
            let field = field.as_ref();
            let label = label.as_ref();
            match field.strip_suffix("_unit").unwrap_or(field) {
                "t_solution" => selection.solution_temperature = label.parse()?,
                "t_solvent" => selection.solvent_temperature = label.parse()?,
                "mass_solute" => selection.solute_mass = label.parse()?,
                "kg_solvent" => selection.solvent_mass = label.parse()?,
                _ => return Err(UnitError::UnknownField(field.to_string())),
            }
        }
        Ok(selection)
    }
}
