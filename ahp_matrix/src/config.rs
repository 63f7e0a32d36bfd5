// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The smallest and largest intensities of the Saaty scale.
pub const MIN_INTENSITY: u32 = 1;
pub const MAX_INTENSITY: u32 = 9;

/// One answer of a respondent: which of two criteria matters more, and by how much.
///
/// The pair is unordered: `Judgment::new(0, 2, 2, 5)` and `Judgment::new(2, 0, 2, 5)`
/// describe the same answer (criterion 2 is strongly preferred over criterion 0).
///
/// The intensity follows the Saaty scale:
/// 1 = equal importance, 3 = moderate, 5 = strong, 7 = very strong, 9 = extreme.
/// The even values are intermediate intensities.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct Judgment {
    pub first: usize,
    pub second: usize,
    pub winner: usize,
    pub intensity: u32,
}

impl Judgment {
    pub fn new(first: usize, second: usize, winner: usize, intensity: u32) -> Judgment {
        Judgment {
            first,
            second,
            winner,
            intensity,
        }
    }

    /// The judgment stating that `winner` is preferred over `loser`.
    pub fn prefer(winner: usize, loser: usize, intensity: u32) -> Judgment {
        Judgment::new(winner, loser, winner, intensity)
    }

    /// The criterion that was not chosen.
    pub fn loser(&self) -> usize {
        if self.winner == self.first {
            self.second
        } else {
            self.first
        }
    }

    /// The pair, lower index first.
    pub fn pair(&self) -> (usize, usize) {
        if self.first < self.second {
            (self.first, self.second)
        } else {
            (self.second, self.first)
        }
    }
}

// ******** Output data structures *********

/// The outcome of the consistency evaluation of one matrix.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Consistency {
    /// The largest real part among the eigenvalues of the matrix.
    pub lambda_max: f64,
    /// (lambda_max - n) / (n - 1), or 0 for a single criterion.
    pub consistency_index: f64,
    /// The random index used for this size.
    pub random_index: f64,
    /// The consistency ratio, rounded to 4 decimal places.
    pub ratio: f64,
}

/// Errors that prevent a matrix from being built or evaluated.
#[derive(PartialEq, Debug, Clone)]
pub enum AhpErrors {
    /// An index is outside the criteria, both sides of the pair are the same
    /// criterion, or the winner is not one of the two criteria.
    InvalidIndex { index: usize, size: usize },
    /// The intensity is outside of the 1-9 scale.
    InvalidIntensity(u32),
    /// The same pair was judged twice and duplicates are rejected.
    DuplicateJudgment { first: usize, second: usize },
    /// A matrix needs at least one criterion.
    EmptyMatrix,
    /// The rows do not describe a square matrix.
    NotSquare { rows: usize, columns: usize },
    /// No random index is known for this number of criteria.
    UnsupportedSize(usize),
    /// The eigenvalue decomposition did not produce a usable dominant eigenvalue.
    DegenerateMatrix,
}

impl Error for AhpErrors {}

impl Display for AhpErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AhpErrors::InvalidIndex { index, size } => {
                write!(f, "invalid criterion index {} for {} criteria", index, size)
            }
            AhpErrors::InvalidIntensity(x) => write!(
                f,
                "invalid intensity {}: expected a value between {} and {}",
                x, MIN_INTENSITY, MAX_INTENSITY
            ),
            AhpErrors::DuplicateJudgment { first, second } => {
                write!(f, "the pair ({}, {}) was judged more than once", first, second)
            }
            AhpErrors::EmptyMatrix => write!(f, "a comparison matrix needs at least one criterion"),
            AhpErrors::NotSquare { rows, columns } => {
                write!(f, "matrix is not square: {} rows, {} columns", rows, columns)
            }
            AhpErrors::UnsupportedSize(n) => {
                write!(f, "no random index available for {} criteria", n)
            }
            AhpErrors::DegenerateMatrix => {
                write!(f, "the eigenvalue computation did not converge")
            }
        }
    }
}

// ********* Configuration **********

/// What to do when the same pair of criteria receives a second judgment.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DuplicateJudgmentMode {
    /// The last judgment replaces the previous ones.
    LastWins,
    /// A second judgment is an error.
    Reject,
}

/// The reference values for the random index.
///
/// - Saaty covers 1 to 10 criteria. This is the table used by most AHP tools.
/// - Extended adds the published values for 11 to 15 criteria.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RandomIndexTable {
    Saaty,
    Extended,
}

const SAATY_RANDOM_INDEX: [f64; 10] = [0.00, 0.00, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49];

const EXTENDED_RANDOM_INDEX: [f64; 15] = [
    0.00, 0.00, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49, 1.51, 1.48, 1.56, 1.57, 1.59,
];

impl RandomIndexTable {
    /// The random index for a matrix of size n, if the table covers it.
    pub fn random_index(&self, n: usize) -> Option<f64> {
        let table: &[f64] = match self {
            RandomIndexTable::Saaty => &SAATY_RANDOM_INDEX,
            RandomIndexTable::Extended => &EXTENDED_RANDOM_INDEX,
        };
        if n == 0 {
            None
        } else {
            table.get(n - 1).cloned()
        }
    }

    /// The largest matrix size covered by the table.
    pub fn max_size(&self) -> usize {
        match self {
            RandomIndexTable::Saaty => SAATY_RANDOM_INDEX.len(),
            RandomIndexTable::Extended => EXTENDED_RANDOM_INDEX.len(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AhpRules {
    pub duplicate_judgment_mode: DuplicateJudgmentMode,
    pub random_index_table: RandomIndexTable,
}

impl AhpRules {
    pub const DEFAULT_RULES: AhpRules = AhpRules {
        duplicate_judgment_mode: DuplicateJudgmentMode::LastWins,
        random_index_table: RandomIndexTable::Saaty,
    };
}

impl Default for AhpRules {
    fn default() -> Self {
        AhpRules::DEFAULT_RULES
    }
}
