//! # Colligative: Freezing-Point and Boiling-Point Problem Solver
//!
//! Given a partial set of known quantities for a dilute non-electrolyte
//! solution, derives every quantity that the colligative relations allow:
//!
//! - ΔT = K × molality
//! - ΔT = T(solution) - T(solvent)
//! - molality = solute mol / solvent kg
//! - solute mol = solute mass / Mr
//!
//! together with their rearrangements. Derivation is a forward-chaining
//! fixed-point iteration over a static rule table; every application is
//! recorded in a derivation trace.
//!
//! ## Example
//!
//! ```
//! use colligative::{Domain, Quantity, RawInputs, UnitSelection, solve};
//! use colligative::units::MassUnit;
//!
//! let raw = RawInputs::new()
//!     .with("kf", "1.86")
//!     .with("mass_solute", "18")
//!     .with("mr", "18")
//!     .with("kg_solvent", "1");
//! let units = UnitSelection::default().with_solvent_mass(MassUnit::Kilograms);
//!
//! let solution = solve(Domain::FreezingPoint, &raw, &units)?;
//!
//! assert_eq!(solution.get(Quantity::Molality), Some(1.0));
//! assert!((solution.get(Quantity::DeltaT).unwrap() - 1.86).abs() < 1e-12);
//! assert_eq!(solution.trace.len(), 3);
//! # Ok::<(), colligative::SolveError>(())
//! ```
//!
//! ## Domains
//!
//! The freezing-point and boiling-point problems share one solver and one
//! rule shape; they differ only in their constants (Kf vs Kb) and in the
//! field names the input form uses.
//!
//! ## Optional Features
//!
//! - **`serde`**: `Serialize`/`Deserialize` for inputs and `Serialize` for
//!   solutions and traces

use std::fmt;

pub mod normalize;
pub mod rules;
pub mod solver;
pub mod trace;
pub mod units;

pub use normalize::{RawInputs, normalize, parse_field};
pub use rules::{ArithmeticError, FormulaRule, Operation, RuleError};
pub use solver::{FixedPointSolver, Solution, SolveError, SolveResult, SolverConfig};
pub use trace::{Trace, TraceEntry};
pub use units::{MassUnit, TemperatureUnit, UnitError, UnitSelection};

/// Which colligative problem is being solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Domain {
    /// Freezing-point depression (cryoscopic constant Kf)
    FreezingPoint,
    /// Boiling-point elevation (ebullioscopic constant Kb)
    BoilingPoint,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::FreezingPoint, Domain::BoilingPoint];

    /// Rule table for this domain, in firing-priority order.
    pub fn rules(self) -> &'static [FormulaRule] {
        match self {
            Domain::FreezingPoint => &rules::FREEZING_POINT_RULES,
            Domain::BoilingPoint => &rules::BOILING_POINT_RULES,
        }
    }

    /// Input field carrying `quantity`.
    pub fn field_name(self, quantity: Quantity) -> &'static str {
        match (self, quantity) {
            (Domain::FreezingPoint, Quantity::DeltaT) => "delta_tf",
            (Domain::BoilingPoint, Quantity::DeltaT) => "delta_tb",
            (Domain::FreezingPoint, Quantity::KConstant) => "kf",
            (Domain::BoilingPoint, Quantity::KConstant) => "kb",
            (_, Quantity::Molality) => "molality",
            (_, Quantity::SolutionTemperature) => "t_solution",
            (_, Quantity::SolventTemperature) => "t_solvent",
            (_, Quantity::SoluteMass) => "mass_solute",
            (_, Quantity::MolarMass) => "mr",
            (_, Quantity::SoluteMoles) => "moles_solute",
            (_, Quantity::SolventMass) => "kg_solvent",
        }
    }

    /// Inverse of [`Domain::field_name`].
    pub fn quantity_for_field(self, field: &str) -> Option<Quantity> {
        Quantity::ALL.into_iter().find(|&q| self.field_name(q) == field)
    }

    /// Display symbol for `quantity`.
    pub fn label(self, quantity: Quantity) -> &'static str {
        match (self, quantity) {
            (Domain::FreezingPoint, Quantity::DeltaT) => "Δtf",
            (Domain::BoilingPoint, Quantity::DeltaT) => "Δtb",
            (Domain::FreezingPoint, Quantity::KConstant) => "Kf",
            (Domain::BoilingPoint, Quantity::KConstant) => "Kb",
            (_, Quantity::Molality) => "molality",
            (_, Quantity::SolutionTemperature) => "T(solution)",
            (_, Quantity::SolventTemperature) => "T(solvent)",
            (_, Quantity::SoluteMass) => "solute mass",
            (_, Quantity::MolarMass) => "Mr",
            (_, Quantity::SoluteMoles) => "solute mol",
            (_, Quantity::SolventMass) => "solvent mass",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::FreezingPoint => write!(f, "freezing-point depression"),
            Domain::BoilingPoint => write!(f, "boiling-point elevation"),
        }
    }
}

/// The nine quantities of a colligative problem.
///
/// Values are always held in canonical units; see [`Quantity::canonical_unit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quantity {
    /// Temperature shift ΔT
    DeltaT = 0,
    /// Cryoscopic or ebullioscopic constant
    KConstant = 1,
    Molality = 2,
    SolutionTemperature = 3,
    SolventTemperature = 4,
    SoluteMass = 5,
    /// Molar mass of the solute (Mr)
    MolarMass = 6,
    SoluteMoles = 7,
    SolventMass = 8,
}

impl Quantity {
    pub const COUNT: usize = 9;

    /// Every quantity in canonical order.
    pub const ALL: [Quantity; Quantity::COUNT] = [
        Quantity::DeltaT,
        Quantity::KConstant,
        Quantity::Molality,
        Quantity::SolutionTemperature,
        Quantity::SolventTemperature,
        Quantity::SoluteMass,
        Quantity::MolarMass,
        Quantity::SoluteMoles,
        Quantity::SolventMass,
    ];

    /// Position in [`Quantity::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn canonical_unit(self) -> &'static str {
        match self {
            Quantity::DeltaT | Quantity::SolutionTemperature | Quantity::SolventTemperature => {
                TemperatureUnit::Celsius.symbol()
            }
            Quantity::KConstant => "°C·kg/mol",
            Quantity::Molality => "mol/kg",
            Quantity::SoluteMass => MassUnit::Grams.symbol(),
            Quantity::MolarMass => "g/mol",
            Quantity::SoluteMoles => "mol",
            Quantity::SolventMass => MassUnit::Kilograms.symbol(),
        }
    }
}

/// Known values for each quantity, absent when unknown.
///
/// [`QuantityMap::insert`] is for direct input and overwrites.
/// [`QuantityMap::fill`] is the solver's path: it only sets absent entries,
/// so a derived value can never replace an existing one.
///
/// # Examples
///
/// ```
/// use colligative::{Quantity, QuantityMap};
///
/// let mut quantities = QuantityMap::new();
/// quantities.insert(Quantity::Molality, 0.5);
///
/// assert!(quantities.fill(Quantity::DeltaT, 0.93));
/// assert!(!quantities.fill(Quantity::DeltaT, 1.0));
/// assert_eq!(quantities.get(Quantity::DeltaT), Some(0.93));
/// assert_eq!(quantities.known_count(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuantityMap {
    values: [Option<f64>; Quantity::COUNT],
}

impl QuantityMap {
    /// Creates a map with every quantity unknown.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, quantity: Quantity) -> Option<f64> {
        self.values[quantity.index()]
    }

    pub fn is_known(&self, quantity: Quantity) -> bool {
        self.values[quantity.index()].is_some()
    }

    /// Sets a value, replacing any existing one.
    pub fn insert(&mut self, quantity: Quantity, value: f64) {
        self.values[quantity.index()] = Some(value);
    }

    /// Sets a value only if the quantity is unknown. Returns whether it was set.
    pub fn fill(&mut self, quantity: Quantity, value: f64) -> bool {
        let slot = &mut self.values[quantity.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }

    pub fn known_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Whether all nine quantities are known.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// All quantities in canonical order with their optional values.
    pub fn iter(&self) -> impl Iterator<Item = (Quantity, Option<f64>)> + '_ {
        Quantity::ALL.into_iter().map(|q| (q, self.get(q)))
    }

    /// Known quantities only.
    pub fn known(&self) -> impl Iterator<Item = (Quantity, f64)> + '_ {
        Quantity::ALL.into_iter().filter_map(|q| self.get(q).map(|v| (q, v)))
    }
}

impl FromIterator<(Quantity, f64)> for QuantityMap {
    fn from_iter<I: IntoIterator<Item = (Quantity, f64)>>(iter: I) -> Self {
        let mut quantities = QuantityMap::new();
        for (quantity, value) in iter {
            quantities.insert(quantity, value);
        }
        quantities
    }
}

/// Normalizes raw form input and solves it with default solver settings.
///
/// Unparseable fields are treated as unknown. Fails only when a formula
/// divides by zero or its result overflows.
pub fn solve(domain: Domain, raw: &RawInputs, units: &UnitSelection) -> SolveResult<Solution> {
    let quantities = normalize(domain, raw, units);
    tracing::debug!(%domain, known = quantities.known_count(), "solving");
    FixedPointSolver::for_domain(domain).solve(quantities)
}
