use super::color_band::{ColorBand, MAX_ANSWER};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    pub fn all() -> [Operation; 4] {
        [
            Operation::Addition,
            Operation::Subtraction,
            Operation::Multiplication,
            Operation::Division,
        ]
    }

    pub fn symbol(&self) -> char {
        match self {
            Operation::Addition => '+',
            Operation::Subtraction => '-',
            Operation::Multiplication => '×',
            Operation::Division => '÷',
        }
    }
}

/// An arithmetic prompt `left <op> right = ?` and its answer.
#[readonly::make]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub operation: Operation,
    pub left: u32,
    pub right: u32,
    pub answer: u32,
}

impl Question {
    pub fn new(operation: Operation, left: u32, right: u32) -> Self {
        let answer = match operation {
            Operation::Addition => left + right,
            Operation::Subtraction => left.saturating_sub(right),
            Operation::Multiplication => left * right,
            Operation::Division => {
                if right == 0 {
                    0
                } else {
                    left / right
                }
            }
        };
        Self {
            operation,
            left,
            right,
            answer: answer.min(MAX_ANSWER),
        }
    }

    pub fn color(&self) -> ColorBand {
        ColorBand::for_answer(self.answer)
    }

    /// Parses and checks a typed answer.
    pub fn check(&self, input: &str) -> AnswerCheck {
        match input.trim().parse::<i64>() {
            Ok(value) if value == self.answer as i64 => AnswerCheck::Correct,
            Ok(_) => AnswerCheck::Incorrect,
            Err(_) => AnswerCheck::NotANumber,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerCheck {
    Correct,
    Incorrect,
    NotANumber,
}

impl Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} = ?",
            self.left,
            self.operation.symbol(),
            self.right
        )
    }
}
