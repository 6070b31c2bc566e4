//! Randomizing token order so the answer position is not predictable.

use rand::seq::SliceRandom;
use rand::Rng;

use super::Puzzle;

/// Shuffle the tokens of `puzzle` and move `answer_index` along with the outlier.
///
/// The outlier is located again by value after shuffling, which relies on the
/// tokens being distinct (validation guarantees this). A puzzle whose
/// `answer_index` is out of bounds is returned unchanged.
pub fn shuffle_puzzle<R: Rng + ?Sized>(mut puzzle: Puzzle, rng: &mut R) -> Puzzle {
    let Some(answer) = puzzle.answer().map(str::to_string) else {
        return puzzle;
    };
    puzzle.tokens.shuffle(rng);
    puzzle.answer_index = puzzle
        .tokens
        .iter()
        .position(|token| *token == answer)
        .unwrap_or(puzzle.answer_index);
    puzzle
}
