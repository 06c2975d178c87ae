//! Forward-chaining fixed-point solver.
//!
//! The solver repeatedly walks a rule table in declaration order. A rule fires
//! when its target is unknown and both prerequisites are known; the result is
//! written back immediately, so later rules in the same pass already see it.
//! Solving stops after the first pass in which nothing fires.
//!
//! # Termination
//!
//! Each firing makes one more quantity known and known quantities are never
//! revised, so the shipped nine-quantity tables reach a fixed point in at most
//! ten passes. The pass limit ([`SolverConfig::max_passes`]) guards custom
//! tables. Reaching it without a quiet pass is reported through
//! [`Solution::converged`] and a `warn` event, or as
//! [`SolveError::PassLimitExceeded`] when the limit is strict.
//!
//! # Example
//!
//! ```
//! use colligative::solver::FixedPointSolver;
//! use colligative::{Domain, Quantity, QuantityMap};
//!
//! let mut known = QuantityMap::new();
//! known.insert(Quantity::SoluteMass, 18.0);
//! known.insert(Quantity::MolarMass, 18.0);
//! known.insert(Quantity::SolventMass, 1.0);
//!
//! let solution = FixedPointSolver::for_domain(Domain::FreezingPoint).solve(known)?;
//!
//! assert_eq!(solution.get(Quantity::SoluteMoles), Some(1.0));
//! assert_eq!(solution.get(Quantity::Molality), Some(1.0));
//! assert!(solution.converged);
//! # Ok::<(), colligative::SolveError>(())
//! ```

use std::borrow::Cow;

use crate::rules::{ArithmeticError, FormulaRule, RuleError, validate_rules};
use crate::trace::{Trace, TraceEntry, render_report};
use crate::{Domain, Quantity, QuantityMap};

/// Default cap on solver passes.
pub const DEFAULT_MAX_PASSES: usize = 10;

/// Result type for solver operations.
pub type SolveResult<T> = Result<T, SolveError>;

/// Errors that abort a solve.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    /// A rule's operation failed; no partial solution is returned
    #[error("Cannot evaluate '{equation}' for {quantity:?}: {source}")]
    Arithmetic {
        equation: &'static str,
        quantity: Quantity,
        #[source]
        source: ArithmeticError,
    },
    /// The pass limit was reached before a fixed point (strict mode only)
    #[error("No fixed point after {passes} passes")]
    PassLimitExceeded { passes: usize },
    /// The supplied rule table is malformed
    #[error("Invalid rule table: {0}")]
    InvalidRules(#[from] RuleError),
}

/// Solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Maximum number of passes over the rule table
    pub max_passes: usize,
    /// Return an error instead of a partial solution when the limit is hit
    pub strict_pass_limit: bool,
}

impl SolverConfig {
    pub fn new(max_passes: usize) -> Self {
        SolverConfig { max_passes, strict_pass_limit: false }
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn with_strict_pass_limit(mut self, strict: bool) -> Self {
        self.strict_pass_limit = strict;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PASSES)
    }
}

/// Outcome of a solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Solution {
    pub domain: Domain,
    /// Inputs plus every derived quantity
    pub quantities: QuantityMap,
    /// Rule applications in firing order
    pub trace: Trace,
    /// Number of passes run, including the final quiet pass
    pub passes: usize,
    /// Whether a pass completed without firing any rule
    pub converged: bool,
}

impl Solution {
    pub fn get(&self, quantity: Quantity) -> Option<f64> {
        self.quantities.get(quantity)
    }

    /// Quantities the solver could not derive.
    pub fn unknown(&self) -> Vec<Quantity> {
        self.quantities.iter().filter(|(_, v)| v.is_none()).map(|(q, _)| q).collect()
    }

    /// One line per quantity, with `unknown` for underived values.
    pub fn report(&self) -> String {
        render_report(self.domain, &self.quantities)
    }
}

/// Fixed-point solver over one rule table.
#[derive(Debug, Clone)]
pub struct FixedPointSolver {
    domain: Domain,
    rules: Cow<'static, [FormulaRule]>,
    config: SolverConfig,
}

impl FixedPointSolver {
    /// Solver for the built-in table of `domain` with default settings.
    pub fn for_domain(domain: Domain) -> Self {
        Self::with_config(domain, SolverConfig::default())
    }

    /// Solver for the built-in table of `domain`.
    pub fn with_config(domain: Domain, config: SolverConfig) -> Self {
        FixedPointSolver { domain, rules: Cow::Borrowed(domain.rules()), config }
    }

    /// Solver over a caller-supplied table.
    ///
    /// The table is checked with [`validate_rules`] before use.
    pub fn with_rules(
        domain: Domain,
        rules: Vec<FormulaRule>,
        config: SolverConfig,
    ) -> SolveResult<Self> {
        validate_rules(&rules)?;
        Ok(FixedPointSolver { domain, rules: Cow::Owned(rules), config })
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn rules(&self) -> &[FormulaRule] {
        &self.rules
    }

    /// Derives every reachable quantity from `quantities`.
    pub fn solve(&self, mut quantities: QuantityMap) -> SolveResult<Solution> {
        let mut trace = Trace::new();
        let mut passes = 0;
        let mut converged = false;

        while passes < self.config.max_passes {
            passes += 1;
            let fired = self.run_pass(&mut quantities, &mut trace)?;
            tracing::trace!(pass = passes, fired, "solver pass complete");
            if fired == 0 {
                converged = true;
                break;
            }
        }

        if !converged {
            if self.config.strict_pass_limit {
                return Err(SolveError::PassLimitExceeded { passes });
            }
            tracing::warn!(
                domain = %self.domain,
                passes,
                "pass limit reached before a fixed point; returning partial solution"
            );
        }

        Ok(Solution { domain: self.domain, quantities, trace, passes, converged })
    }

    /// Runs one pass over the table and returns how many rules fired.
    fn run_pass(&self, quantities: &mut QuantityMap, trace: &mut Trace) -> SolveResult<usize> {
        let mut fired = 0;
        for rule in self.rules.iter() {
            if quantities.is_known(rule.target) {
                continue;
            }
            let Some(inputs) = rule.prerequisites(quantities) else {
                continue;
            };

            let result = rule.evaluate(inputs).map_err(|source| SolveError::Arithmetic {
                equation: rule.equation,
                quantity: rule.target,
                source,
            })?;

            quantities.fill(rule.target, result);
            tracing::debug!(equation = rule.equation, result, "formula applied");
            trace.push(TraceEntry::new(rule, inputs, result));
            fired += 1;
        }
        Ok(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{FREEZING_POINT_RULES, Operation};

    fn known(values: &[(Quantity, f64)]) -> QuantityMap {
        values.iter().copied().collect()
    }

    #[test]
    fn test_single_rule() {
        let solution = FixedPointSolver::for_domain(Domain::FreezingPoint)
            .solve(known(&[(Quantity::KConstant, 1.86), (Quantity::Molality, 0.5)]))
            .unwrap();

        assert!((solution.get(Quantity::DeltaT).unwrap() - 0.93).abs() < 1e-12);
        assert_eq!(solution.trace.len(), 1);
        assert_eq!(solution.trace.entries()[0].equation, "Δtf = Kf × molality");
        assert_eq!(solution.passes, 2);
        assert!(solution.converged);
    }

    #[test]
    fn test_same_pass_propagation() {
        let solution = FixedPointSolver::for_domain(Domain::FreezingPoint)
            .solve(known(&[
                (Quantity::SolutionTemperature, -1.5),
                (Quantity::SolventTemperature, 0.0),
                (Quantity::KConstant, 1.86),
            ]))
            .unwrap();

        assert_eq!(solution.get(Quantity::DeltaT), Some(-1.5));
        assert_eq!(solution.get(Quantity::Molality), Some(-1.5 / 1.86));

        let lines = solution.trace.lines();
        assert_eq!(lines[0], "Δtf = T(solution) - T(solvent): -1.5000 - 0.0000 = -1.5000");
        assert_eq!(lines[1], "molality = Δtf / Kf: -1.5000 / 1.8600 = -0.8065");
        // Both fire in the first pass; the second pass is quiet.
        assert_eq!(solution.passes, 2);
    }

    #[test]
    fn test_two_pass_propagation() {
        let solution = FixedPointSolver::for_domain(Domain::FreezingPoint)
            .solve(known(&[
                (Quantity::SoluteMass, 18.0),
                (Quantity::MolarMass, 18.0),
                (Quantity::SolventMass, 1.0),
            ]))
            .unwrap();

        let targets: Vec<Quantity> = solution.trace.iter().map(|e| e.target).collect();
        assert_eq!(targets, vec![Quantity::SoluteMoles, Quantity::Molality]);
        assert_eq!(solution.get(Quantity::SoluteMoles), Some(1.0));
        assert_eq!(solution.get(Quantity::Molality), Some(1.0));
        assert_eq!(solution.passes, 3);
        assert_eq!(
            solution.unknown(),
            vec![
                Quantity::DeltaT,
                Quantity::KConstant,
                Quantity::SolutionTemperature,
                Quantity::SolventTemperature
            ]
        );
    }

    #[test]
    fn test_empty_input_converges_immediately() {
        let solution =
            FixedPointSolver::for_domain(Domain::BoilingPoint).solve(QuantityMap::new()).unwrap();

        assert!(solution.trace.is_empty());
        assert_eq!(solution.quantities.known_count(), 0);
        assert_eq!(solution.passes, 1);
        assert!(solution.converged);
    }

    #[test]
    fn test_fully_determined_is_idempotent() {
        let full: QuantityMap = Quantity::ALL.into_iter().map(|q| (q, 1.0)).collect();
        let solution = FixedPointSolver::for_domain(Domain::FreezingPoint).solve(full).unwrap();

        assert!(solution.trace.is_empty());
        assert_eq!(solution.quantities, full);
    }

    #[test]
    fn test_first_ready_rule_locks_target() {
        // Both ΔT rules are ready; the product rule is declared first.
        let solution = FixedPointSolver::for_domain(Domain::FreezingPoint)
            .solve(known(&[
                (Quantity::KConstant, 1.86),
                (Quantity::Molality, 0.5),
                (Quantity::SolutionTemperature, -3.0),
                (Quantity::SolventTemperature, 0.0),
            ]))
            .unwrap();

        assert!((solution.get(Quantity::DeltaT).unwrap() - 0.93).abs() < 1e-12);
        assert_eq!(solution.trace.iter().filter(|e| e.target == Quantity::DeltaT).count(), 1);
    }

    #[test]
    fn test_consistent_paths_agree() {
        // Molality reachable through ΔT/K or through moles/kg; either way 0.5.
        let inputs = [
            (Quantity::KConstant, 1.86),
            (Quantity::DeltaT, 0.93),
            (Quantity::SoluteMass, 9.0),
            (Quantity::MolarMass, 18.0),
            (Quantity::SolventMass, 1.0),
        ];
        let solution =
            FixedPointSolver::for_domain(Domain::FreezingPoint).solve(known(&inputs)).unwrap();

        let via_moles = solution.get(Quantity::SoluteMoles).unwrap()
            / solution.get(Quantity::SolventMass).unwrap();
        assert!((solution.get(Quantity::Molality).unwrap() - via_moles).abs() < 1e-10);
    }

    #[test]
    fn test_known_set_grows_monotonically() {
        let start = known(&[
            (Quantity::KConstant, 0.512),
            (Quantity::SolutionTemperature, 100.256),
            (Quantity::SolventTemperature, 100.0),
            (Quantity::SolventMass, 0.25),
            (Quantity::SoluteMass, 9.0),
        ]);
        let solution = FixedPointSolver::for_domain(Domain::BoilingPoint).solve(start).unwrap();

        for (quantity, value) in start.known() {
            assert_eq!(solution.get(quantity), Some(value));
        }
        assert!(solution.quantities.is_complete());
        assert_eq!(solution.trace.len(), Quantity::COUNT - start.known_count());
    }

    #[test]
    fn test_deterministic() {
        let start = known(&[
            (Quantity::KConstant, 1.86),
            (Quantity::SoluteMoles, 0.2),
            (Quantity::SolventMass, 0.4),
            (Quantity::MolarMass, 58.44),
        ]);
        let solver = FixedPointSolver::for_domain(Domain::FreezingPoint);
        let first = solver.solve(start).unwrap();
        let second = solver.solve(start).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_constant_aborts() {
        let err = FixedPointSolver::for_domain(Domain::FreezingPoint)
            .solve(known(&[(Quantity::DeltaT, 0.93), (Quantity::KConstant, 0.0)]))
            .unwrap_err();

        assert_eq!(
            err,
            SolveError::Arithmetic {
                equation: "molality = Δtf / Kf",
                quantity: Quantity::Molality,
                source: ArithmeticError::DivisionByZero,
            }
        );
    }

    #[test]
    fn test_overflow_aborts() {
        let err = FixedPointSolver::for_domain(Domain::FreezingPoint)
            .solve(known(&[(Quantity::KConstant, 1e300), (Quantity::Molality, 1e300)]))
            .unwrap_err();

        assert_eq!(
            err,
            SolveError::Arithmetic {
                equation: "Δtf = Kf × molality",
                quantity: Quantity::DeltaT,
                source: ArithmeticError::NonFinite,
            }
        );
    }

    #[test]
    fn test_zero_constant_in_product_is_fine() {
        let solution = FixedPointSolver::for_domain(Domain::FreezingPoint)
            .solve(known(&[(Quantity::KConstant, 0.0), (Quantity::Molality, 0.5)]))
            .unwrap();
        assert_eq!(solution.get(Quantity::DeltaT), Some(0.0));
    }

    #[test]
    fn test_default_config() {
        let solver = FixedPointSolver::for_domain(Domain::BoilingPoint);
        assert_eq!(solver.domain(), Domain::BoilingPoint);
        assert_eq!(solver.config().max_passes, DEFAULT_MAX_PASSES);
        assert!(!solver.config().strict_pass_limit);
        assert_eq!(solver.rules().len(), 9);
    }

    #[test]
    fn test_pass_limit_partial_solution() {
        let config = SolverConfig::default().with_max_passes(1);
        let solver = FixedPointSolver::with_config(Domain::FreezingPoint, config);
        assert_eq!(solver.config().max_passes, 1);
        let solution = solver
            .solve(known(&[
                (Quantity::SoluteMass, 18.0),
                (Quantity::MolarMass, 18.0),
                (Quantity::SolventMass, 1.0),
            ]))
            .unwrap();

        assert!(!solution.converged);
        assert_eq!(solution.passes, 1);
        assert_eq!(solution.get(Quantity::SoluteMoles), Some(1.0));
        assert_eq!(solution.get(Quantity::Molality), None);
    }

    #[test]
    fn test_strict_pass_limit() {
        let config = SolverConfig::new(2).with_strict_pass_limit(true);
        let err = FixedPointSolver::with_config(Domain::FreezingPoint, config)
            .solve(known(&[
                (Quantity::SoluteMass, 18.0),
                (Quantity::MolarMass, 18.0),
                (Quantity::SolventMass, 1.0),
            ]))
            .unwrap_err();
        assert_eq!(err, SolveError::PassLimitExceeded { passes: 2 });
    }

    #[test]
    fn test_custom_rules_rejected_when_self_dependent() {
        let rules = vec![FormulaRule::new(
            Quantity::MolarMass,
            Operation::Quotient,
            [Quantity::MolarMass, Quantity::SoluteMoles],
            "Mr = Mr / mol",
        )];
        let err =
            FixedPointSolver::with_rules(Domain::FreezingPoint, rules, SolverConfig::default())
                .unwrap_err();
        assert!(matches!(err, SolveError::InvalidRules(RuleError::SelfDependency { .. })));
    }

    #[test]
    fn test_custom_rules_subset() {
        let rules = FREEZING_POINT_RULES[4..5].to_vec();
        let solver =
            FixedPointSolver::with_rules(Domain::FreezingPoint, rules, SolverConfig::default())
                .unwrap();
        let solution = solver
            .solve(known(&[(Quantity::SoluteMass, 5.85), (Quantity::MolarMass, 58.5)]))
            .unwrap();

        assert!((solution.get(Quantity::SoluteMoles).unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(solver.rules().len(), 1);
    }
}
