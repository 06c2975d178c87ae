//! Formula rules relating the nine colligative quantities.
//!
//! Every relation is a binary operation on two known quantities producing a
//! third. The rule tables are plain data: the solver walks them in declaration
//! order, so the order below is observable through the derivation trace.
//!
//! Two rules may share a target. Whichever becomes ready first fires and the
//! target is then locked for the rest of the run.
//!
//! # Example
//!
//! ```
//! use colligative::{Domain, Quantity, QuantityMap};
//!
//! let rule = &Domain::FreezingPoint.rules()[0];
//! assert_eq!(rule.target, Quantity::DeltaT);
//!
//! let mut known = QuantityMap::new();
//! known.insert(Quantity::KConstant, 1.86);
//! known.insert(Quantity::Molality, 0.5);
//! assert!(rule.is_ready(&known));
//!
//! let inputs = rule.prerequisites(&known).unwrap();
//! assert!((rule.evaluate(inputs).unwrap() - 0.93).abs() < 1e-12);
//! ```

use crate::Quantity::{
    DeltaT, KConstant, MolarMass, Molality, SoluteMass, SoluteMoles, SolutionTemperature,
    SolventMass, SolventTemperature,
};
use crate::{Quantity, QuantityMap};

/// Arithmetic failure while evaluating a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArithmeticError {
    /// The divisor of a quotient was zero
    #[error("division by zero")]
    DivisionByZero,
    /// The result overflowed to an infinity
    #[error("result is not finite")]
    NonFinite,
}

/// Structural problems in a rule table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// A rule lists its own target among its inputs
    #[error("Rule '{equation}' depends on its own target {target:?}")]
    SelfDependency { equation: &'static str, target: Quantity },
}

/// Binary operation applied by a formula rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Operation {
    /// `a × b`
    Product,
    /// `a / b`, fails on a zero divisor
    Quotient,
    /// `a - b`
    Difference,
}

impl Operation {
    /// Applies the operation to two prerequisite values.
    ///
    /// A zero divisor or an overflowing result is an error rather than an
    /// infinity, so a bad constant (for example `Kf = 0`) or an extreme input
    /// cannot leak non-finite values into later rules.
    pub fn apply(self, a: f64, b: f64) -> Result<f64, ArithmeticError> {
        let result = match self {
            Operation::Product => a * b,
            Operation::Difference => a - b,
            Operation::Quotient if b == 0.0 => return Err(ArithmeticError::DivisionByZero),
            Operation::Quotient => a / b,
        };
        if result.is_finite() { Ok(result) } else { Err(ArithmeticError::NonFinite) }
    }

    /// Operator symbol as written in the equation text.
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Product => "×",
            Operation::Quotient => "/",
            Operation::Difference => "-",
        }
    }
}

/// One derivation path: `target = inputs[0] <operation> inputs[1]`.
///
/// Arity is fixed by the `[Quantity; 2]` input array, so a rule with the wrong
/// number of prerequisites cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaRule {
    /// Quantity produced by the rule
    pub target: Quantity,
    /// Prerequisites in operand order
    pub inputs: [Quantity; 2],
    pub operation: Operation,
    /// Equation text shown in the derivation trace
    pub equation: &'static str,
}

impl FormulaRule {
    pub const fn new(
        target: Quantity,
        operation: Operation,
        inputs: [Quantity; 2],
        equation: &'static str,
    ) -> Self {
        FormulaRule { target, inputs, operation, equation }
    }

    /// Returns the prerequisite values if all of them are known.
    pub fn prerequisites(&self, quantities: &QuantityMap) -> Option<[f64; 2]> {
        Some([quantities.get(self.inputs[0])?, quantities.get(self.inputs[1])?])
    }

    /// Whether the rule would fire: target unknown and every input known.
    pub fn is_ready(&self, quantities: &QuantityMap) -> bool {
        !quantities.is_known(self.target) && self.inputs.iter().all(|&q| quantities.is_known(q))
    }

    /// Computes the target from prerequisite values.
    pub fn evaluate(&self, inputs: [f64; 2]) -> Result<f64, ArithmeticError> {
        self.operation.apply(inputs[0], inputs[1])
    }
}

/// Checks a rule table for rules that can never fire.
pub fn validate_rules(rules: &[FormulaRule]) -> Result<(), RuleError> {
    for rule in rules {
        if rule.inputs.contains(&rule.target) {
            return Err(RuleError::SelfDependency { equation: rule.equation, target: rule.target });
        }
    }
    Ok(())
}

/// Freezing-point depression relations.
pub static FREEZING_POINT_RULES: [FormulaRule; 9] = [
    FormulaRule::new(DeltaT, Operation::Product, [KConstant, Molality], "Δtf = Kf × molality"),
    FormulaRule::new(
        DeltaT,
        Operation::Difference,
        [SolutionTemperature, SolventTemperature],
        "Δtf = T(solution) - T(solvent)",
    ),
    FormulaRule::new(Molality, Operation::Quotient, [DeltaT, KConstant], "molality = Δtf / Kf"),
    FormulaRule::new(
        Molality,
        Operation::Quotient,
        [SoluteMoles, SolventMass],
        "molality = solute mol / solvent kg",
    ),
    FormulaRule::new(
        SoluteMoles,
        Operation::Quotient,
        [SoluteMass, MolarMass],
        "solute mol = solute mass / Mr",
    ),
    FormulaRule::new(
        SoluteMoles,
        Operation::Product,
        [Molality, SolventMass],
        "solute mol = molality × solvent kg",
    ),
    FormulaRule::new(
        SoluteMass,
        Operation::Product,
        [SoluteMoles, MolarMass],
        "solute mass = solute mol × Mr",
    ),
    FormulaRule::new(
        SolventMass,
        Operation::Quotient,
        [SoluteMoles, Molality],
        "solvent kg = solute mol / molality",
    ),
    FormulaRule::new(
        MolarMass,
        Operation::Quotient,
        [SoluteMass, SoluteMoles],
        "Mr = solute mass / solute mol",
    ),
];

/// Boiling-point elevation relations. Same shape as the freezing table with
/// the ebullioscopic constant in place of the cryoscopic one.
pub static BOILING_POINT_RULES: [FormulaRule; 9] = [
    FormulaRule::new(DeltaT, Operation::Product, [KConstant, Molality], "Δtb = Kb × molality"),
    FormulaRule::new(
        DeltaT,
        Operation::Difference,
        [SolutionTemperature, SolventTemperature],
        "Δtb = T(solution) - T(solvent)",
    ),
    FormulaRule::new(Molality, Operation::Quotient, [DeltaT, KConstant], "molality = Δtb / Kb"),
    FormulaRule::new(
        Molality,
        Operation::Quotient,
        [SoluteMoles, SolventMass],
        "molality = solute mol / solvent kg",
    ),
    FormulaRule::new(
        SoluteMoles,
        Operation::Quotient,
        [SoluteMass, MolarMass],
        "solute mol = solute mass / Mr",
    ),
    FormulaRule::new(
        SoluteMoles,
        Operation::Product,
        [Molality, SolventMass],
        "solute mol = molality × solvent kg",
    ),
    FormulaRule::new(
        SoluteMass,
        Operation::Product,
        [SoluteMoles, MolarMass],
        "solute mass = solute mol × Mr",
    ),
    FormulaRule::new(
        SolventMass,
        Operation::Quotient,
        [SoluteMoles, Molality],
        "solvent kg = solute mol / molality",
    ),
    FormulaRule::new(
        MolarMass,
        Operation::Quotient,
        [SoluteMass, SoluteMoles],
        "Mr = solute mass / solute mol",
    ),
];
