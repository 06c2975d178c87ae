//! Derivation trace and result report.
//!
//! Each successful rule application produces one [`TraceEntry`]. Entries keep
//! full precision; rounding to four decimals happens only when rendering.

use std::fmt;

use crate::rules::{FormulaRule, Operation};
use crate::{Domain, Quantity, QuantityMap};

/// Heading printed above the rendered steps.
pub const TRACE_HEADER: &str = "Calculation steps";

const SEPARATOR_WIDTH: usize = 50;

/// Record of a single rule application.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TraceEntry {
    /// Equation text of the rule that fired
    pub equation: &'static str,
    pub target: Quantity,
    pub operation: Operation,
    /// Prerequisite values in operand order
    pub inputs: [f64; 2],
    pub result: f64,
}

impl TraceEntry {
    pub fn new(rule: &FormulaRule, inputs: [f64; 2], result: f64) -> Self {
        TraceEntry {
            equation: rule.equation,
            target: rule.target,
            operation: rule.operation,
            inputs,
            result,
        }
    }
}

impl fmt::Display for TraceEntry {
    /// Differences render as `a - b` with an ASCII hyphen-minus, matching the
    /// equation text, not the typographic minus sign (U+2212). Every other
    /// operation renders its operands joined by `/`, products included.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joiner = match self.operation {
            Operation::Difference => "-",
            Operation::Product | Operation::Quotient => "/",
        };
        write!(
            f,
            "{}: {:.4} {} {:.4} = {:.4}",
            self.equation, self.inputs[0], joiner, self.inputs[1], self.result
        )
    }
}

/// Ordered log of rule applications.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceEntry> {
        self.entries.iter()
    }

    /// Rendered step lines without the header and separators.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a TraceEntry;
    type IntoIter = std::slice::Iter<'a, TraceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "-".repeat(SEPARATOR_WIDTH);
        writeln!(f, "{}", TRACE_HEADER)?;
        writeln!(f, "{}", separator)?;
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        write!(f, "{}", separator)
    }
}

/// Renders one line per quantity in canonical order.
///
/// Known values are shown to four decimals with their canonical unit;
/// quantities the solver could not derive are shown as `unknown`.
pub fn render_report(domain: Domain, quantities: &QuantityMap) -> String {
    quantities
        .iter()
        .map(|(quantity, value)| match value {
            Some(v) => format!("{}: {:.4} {}", domain.label(quantity), v, quantity.canonical_unit()),
            None => format!("{}: unknown", domain.label(quantity)),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{BOILING_POINT_RULES, FREEZING_POINT_RULES};

    #[test]
    fn test_product_renders_with_slash() {
        let entry = TraceEntry::new(&FREEZING_POINT_RULES[0], [1.86, 0.5], 0.93);
        assert_eq!(entry.to_string(), "Δtf = Kf × molality: 1.8600 / 0.5000 = 0.9300");
    }

    #[test]
    fn test_difference_renders_with_minus() {
        let entry = TraceEntry::new(&BOILING_POINT_RULES[1], [101.2, 100.0], 101.2 - 100.0);
        assert_eq!(entry.to_string(), "Δtb = T(solution) - T(solvent): 101.2000 - 100.0000 = 1.2000");
    }

    #[test]
    fn test_rendering_rounds_but_keeps_precision() {
        let result = -1.5 / 1.86;
        let entry = TraceEntry::new(&FREEZING_POINT_RULES[2], [-1.5, 1.86], result);
        assert_eq!(entry.to_string(), "molality = Δtf / Kf: -1.5000 / 1.8600 = -0.8065");
        assert_eq!(entry.result, result);
    }

    #[test]
    fn test_trace_framing() {
        let mut trace = Trace::new();
        trace.push(TraceEntry::new(&FREEZING_POINT_RULES[0], [1.86, 0.5], 0.93));

        let rendered = trace.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], TRACE_HEADER);
        assert_eq!(lines[1], "-".repeat(50));
        assert_eq!(lines[2], "Δtf = Kf × molality: 1.8600 / 0.5000 = 0.9300");
        assert_eq!(lines[3], "-".repeat(50));
    }

    #[test]
    fn test_report_marks_unknowns() {
        let mut quantities = QuantityMap::new();
        quantities.insert(Quantity::Molality, 0.5);

        let report = render_report(Domain::BoilingPoint, &quantities);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), Quantity::COUNT);
        assert_eq!(lines[0], "Δtb: unknown");
        assert_eq!(lines[1], "Kb: unknown");
        assert_eq!(lines[2], "molality: 0.5000 mol/kg");
    }
}
