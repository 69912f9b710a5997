use std::ops::Not;

use strum_macros::{Display, EnumIter, EnumString};

// Three-valued signal carried by pins and held as gate state.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Signal {
    Zero,
    One,
    // not driven yet, or indeterminate
    #[default]
    Unknown,
}

impl Signal {
    pub fn is_one(&self) -> bool {
        matches!(self, Signal::One)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Signal::Unknown)
    }

    pub fn and(self, other: Signal) -> Signal {
        match (self, other) {
            (Signal::Unknown, _) | (_, Signal::Unknown) => Signal::Unknown,
            (Signal::One, Signal::One) => Signal::One,
            _ => Signal::Zero,
        }
    }

    pub fn or(self, other: Signal) -> Signal {
        match (self, other) {
            (Signal::Unknown, _) | (_, Signal::Unknown) => Signal::Unknown,
            (Signal::One, _) | (_, Signal::One) => Signal::One,
            _ => Signal::Zero,
        }
    }

    /// Wire colour a renderer uses for this signal.
    pub fn wire_color(&self) -> &'static str {
        match self {
            Signal::Zero => "black",
            Signal::One => "red",
            Signal::Unknown => "gray",
        }
    }
}

impl Not for Signal {
    type Output = Signal;

    fn not(self) -> Self::Output {
        match self {
            Signal::Zero => Signal::One,
            Signal::One => Signal::Zero,
            Signal::Unknown => Signal::Unknown,
        }
    }
}

impl From<bool> for Signal {
    fn from(value: bool) -> Self {
        if value {
            Signal::One
        } else {
            Signal::Zero
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumIter)]
pub enum LogicType {
    Not,
    And,
    Or,
}

impl LogicType {
    pub fn name(&self) -> String {
        self.to_string().to_uppercase()
    }

    pub fn arity(&self) -> usize {
        match self {
            LogicType::Not => 1,
            LogicType::And | LogicType::Or => 2,
        }
    }

    // inputs are positional, in declared pin order
    pub fn evaluate(&self, inputs: &[Signal]) -> Signal {
        assert_eq!(
            inputs.len(),
            self.arity(),
            "{} takes exactly {} inputs",
            self.name(),
            self.arity()
        );

        match self {
            LogicType::Not => !inputs[0],
            LogicType::And => inputs[0].and(inputs[1]),
            LogicType::Or => inputs[0].or(inputs[1]),
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::iproduct;
    use strum::IntoEnumIterator;

    use super::{LogicType, Signal};

    #[test]
    fn unittest_logic_and_truth_table() {
        assert_eq!(LogicType::And.evaluate(&[Signal::Zero, Signal::Zero]), Signal::Zero);
        assert_eq!(LogicType::And.evaluate(&[Signal::Zero, Signal::One]), Signal::Zero);
        assert_eq!(LogicType::And.evaluate(&[Signal::One, Signal::Zero]), Signal::Zero);
        assert_eq!(LogicType::And.evaluate(&[Signal::One, Signal::One]), Signal::One);
    }

    #[test]
    fn unittest_logic_or_truth_table() {
        assert_eq!(LogicType::Or.evaluate(&[Signal::Zero, Signal::Zero]), Signal::Zero);
        assert_eq!(LogicType::Or.evaluate(&[Signal::Zero, Signal::One]), Signal::One);
        assert_eq!(LogicType::Or.evaluate(&[Signal::One, Signal::Zero]), Signal::One);
        assert_eq!(LogicType::Or.evaluate(&[Signal::One, Signal::One]), Signal::One);
    }

    #[test]
    fn unittest_logic_unknown_is_contagious() {
        for (a, b) in iproduct!(Signal::iter(), Signal::iter()) {
            let any_unknown = !a.is_known() || !b.is_known();

            for logic in [LogicType::And, LogicType::Or] {
                let out = logic.evaluate(&[a, b]);
                assert_eq!(out == Signal::Unknown, any_unknown, "{logic} {a} {b}");
            }
        }
    }

    #[test]
    fn unittest_logic_not() {
        assert_eq!(LogicType::Not.evaluate(&[Signal::Zero]), Signal::One);
        assert_eq!(LogicType::Not.evaluate(&[Signal::One]), Signal::Zero);
        assert_eq!(LogicType::Not.evaluate(&[Signal::Unknown]), Signal::Unknown);
    }

    #[test]
    #[should_panic]
    fn unittest_logic_arity_violation() {
        LogicType::And.evaluate(&[Signal::One]);
    }

    #[test]
    fn unittest_signal_names() {
        assert_eq!("one".parse::<Signal>().unwrap(), Signal::One);
        assert_eq!(Signal::Unknown.to_string(), "unknown");
        assert_eq!(Signal::One.wire_color(), "red");
        assert_eq!(LogicType::Or.name(), "OR");
    }
}
