//! Arithmetic problem generation
//!
//! Problems and distractors are pure functions of difficulty and the RNG
//! handed in, so seeded sessions replay identically.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Arithmetic operators a problem can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    /// Exact division only; never produces a remainder
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    /// Accepts the display symbols plus the ASCII stand-ins `*` and `/`
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            'x' | 'X' | '*' | '×' => Some(Operator::Multiply),
            '÷' | '/' => Some(Operator::Divide),
            _ => None,
        }
    }

    /// Symbol as shown in the question text
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "x",
            Operator::Divide => "÷",
        }
    }

    pub fn apply(&self, lhs: u32, rhs: u32) -> u32 {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Subtract => lhs - rhs,
            Operator::Multiply => lhs * rhs,
            Operator::Divide => lhs / rhs,
        }
    }
}

/// A question and its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathProblem {
    pub question: String,
    pub answer: u32,
    pub operator: Operator,
    pub lhs: u32,
    pub rhs: u32,
}

impl MathProblem {
    fn new(operator: Operator, lhs: u32, rhs: u32) -> Self {
        Self {
            question: format!("{} {} {}", lhs, operator.symbol(), rhs),
            answer: operator.apply(lhs, rhs),
            operator,
            lhs,
            rhs,
        }
    }
}

/// Largest add/subtract operand bound for a difficulty level
pub fn max_operand(difficulty: u32) -> u32 {
    9 + difficulty / 2
}

/// Multiplication stays inside the times tables regardless of difficulty
const MULTIPLY_MAX: u32 = 10;
/// Divisors and quotients stay small
const DIVIDE_MAX: u32 = 12;

/// Problem generator over a configurable operator set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemGenerator {
    operators: Vec<Operator>,
}

impl Default for ProblemGenerator {
    fn default() -> Self {
        Self {
            operators: vec![Operator::Add, Operator::Subtract, Operator::Multiply],
        }
    }
}

impl ProblemGenerator {
    /// Restrict problems to the given operators. An empty set falls back to addition.
    pub fn with_operators(operators: &[Operator]) -> Self {
        let mut ops = Vec::with_capacity(operators.len());
        for op in operators {
            if !ops.contains(op) {
                ops.push(*op);
            }
        }
        if ops.is_empty() {
            log::warn!("Empty operator set, falling back to addition");
            ops.push(Operator::Add);
        }
        Self { operators: ops }
    }

    /// Parse an operator list such as `"+-x/"` or `"+, ÷"`.
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let mut ops = Vec::new();
        for c in list.chars().filter(|c| !c.is_whitespace() && *c != ',') {
            let op = Operator::from_symbol(c)
                .ok_or_else(|| ConfigError::UnknownOperator(c.to_string()))?;
            ops.push(op);
        }
        if ops.is_empty() {
            return Err(ConfigError::Empty { field: "operators" });
        }
        Ok(Self::with_operators(&ops))
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Flip one operator in or out of the set. Removing the last one leaves
    /// addition.
    pub fn toggled(&self, op: Operator) -> Self {
        let ops: Vec<Operator> = if self.operators.contains(&op) {
            self.operators.iter().copied().filter(|o| *o != op).collect()
        } else {
            // Keep a stable display order
            Operator::ALL
                .into_iter()
                .filter(|o| *o == op || self.operators.contains(o))
                .collect()
        };
        Self::with_operators(&ops)
    }

    /// Generate a problem for `difficulty` (1-based; 0 is treated as 1)
    pub fn generate<R: Rng + ?Sized>(&self, difficulty: u32, rng: &mut R) -> MathProblem {
        let operator = self.operators[rng.random_range(0..self.operators.len())];
        let max = max_operand(difficulty.max(1));

        match operator {
            Operator::Add => {
                let a = rng.random_range(2..=max + 1);
                let b = rng.random_range(2..=max + 1);
                MathProblem::new(Operator::Add, a, b)
            }
            Operator::Subtract => {
                let a = rng.random_range(2..=max + 1);
                let b = rng.random_range(2..=max + 1);
                // Larger operand first keeps the answer non-negative
                MathProblem::new(Operator::Subtract, a.max(b), a.min(b))
            }
            Operator::Multiply => {
                let a = rng.random_range(1..=MULTIPLY_MAX);
                let b = rng.random_range(1..=MULTIPLY_MAX);
                MathProblem::new(Operator::Multiply, a, b)
            }
            Operator::Divide => {
                let cap = max.min(DIVIDE_MAX);
                let divisor = rng.random_range(2..=cap);
                let quotient = rng.random_range(2..=cap);
                MathProblem::new(Operator::Divide, divisor * quotient, divisor)
            }
        }
    }
}

/// Generate a problem with the default operator set
pub fn generate_problem<R: Rng + ?Sized>(difficulty: u32, rng: &mut R) -> MathProblem {
    ProblemGenerator::default().generate(difficulty, rng)
}

/// A plausible wrong answer: `correct` shifted by 1-10 in either direction.
///
/// Never equal to `correct`. Results below zero are reflected.
pub fn generate_distractor<R: Rng + ?Sized>(correct: u32, rng: &mut R) -> u32 {
    let offset = rng.random_range(1..=10u32);
    let distractor = if rng.random_bool(0.5) {
        correct.checked_add(offset).unwrap_or(correct - offset)
    } else if offset > correct {
        offset - correct
    } else {
        correct - offset
    };

    if distractor == correct {
        correct.checked_add(1).unwrap_or(correct - 1)
    } else {
        distractor
    }
}
