use crate::model::{MemoryGrid, Operation, Question, MAX_ANSWER};
use log::trace;
use rand::Rng;

/// Attempts made to land on a color that still has unclaimed cells.
pub const MAX_QUESTION_ATTEMPTS: usize = 50;

pub fn create_question<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let operations = Operation::all();
    let operation = operations[rng.random_range(0..operations.len())];
    match operation {
        Operation::Addition => {
            let a = rng.random_range(1..=100);
            let max_b = (MAX_ANSWER - a).min(100);
            let b = rng.random_range(1..=max_b);
            Question::new(operation, a, b)
        }
        Operation::Subtraction => {
            let answer = rng.random_range(1..=MAX_ANSWER);
            let b = rng.random_range(1..=answer.min(100));
            Question::new(operation, answer + b, b)
        }
        Operation::Multiplication => {
            let a = rng.random_range(2..=12);
            let b = rng.random_range(1..=MAX_ANSWER / a);
            Question::new(operation, a, b)
        }
        Operation::Division => {
            let divisor = rng.random_range(2..=12);
            let quotient = rng.random_range(1..=MAX_ANSWER / divisor);
            Question::new(operation, divisor * quotient, divisor)
        }
    }
}

/// A question biased towards colors that still have unclaimed cells, or
/// `None` once every cell is claimed. When no attempt lands on an open color
/// the last question generated is used as is.
pub fn generate_question<R: Rng + ?Sized>(rng: &mut R, grid: &MemoryGrid) -> Option<Question> {
    if grid.total_remaining() == 0 {
        return None;
    }
    let remaining = grid.remaining_by_color();
    let mut question = create_question(rng);
    for attempt in 1..MAX_QUESTION_ATTEMPTS {
        if remaining.get(&question.color()).copied().unwrap_or(0) > 0 {
            trace!(target: "memory_chess", "Question found after {} attempts", attempt);
            return Some(question);
        }
        question = create_question(rng);
    }
    Some(question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColorBand, Party};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_answers_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut operations = HashSet::new();
        for _ in 0..5000 {
            let question = create_question(&mut rng);
            assert!(question.answer <= MAX_ANSWER, "{}", question);
            operations.insert(question.operation);
        }
        assert_eq!(operations.len(), 4);
    }

    #[test]
    fn test_division_is_exact() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..2000 {
            let question = create_question(&mut rng);
            if question.operation == Operation::Division {
                assert_eq!(question.left % question.right, 0, "{}", question);
                assert!(question.answer >= 1);
            }
        }
    }

    #[test]
    fn test_bias_towards_open_colors() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = MemoryGrid::from_colors(&[ColorBand::Blue, ColorBand::Red]);
        grid.claim(1, Party::Player1);

        let hits = (0..200)
            .filter_map(|_| generate_question(&mut rng, &grid))
            .filter(|q| q.color() == ColorBand::Blue)
            .count();
        // one blue band out of six: 50 attempts miss with probability ~1e-4
        assert!(hits >= 195, "only {} of 200 questions were blue", hits);
    }

    #[test]
    fn test_no_question_when_everything_claimed() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut grid = MemoryGrid::from_colors(&[ColorBand::Blue]);
        grid.claim(0, Party::Player2);
        assert_eq!(generate_question(&mut rng, &grid), None);
    }
}
