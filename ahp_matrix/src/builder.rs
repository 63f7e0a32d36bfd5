use log::debug;
use std::collections::HashSet;

pub use crate::config::*;
use crate::matrix::ComparisonMatrix;

/// A builder for assembling the comparison matrix of one respondent.
///
/// Each judgment is checked when it is added, so that a form layer can report
/// the faulty answer directly.
///
/// ```
/// use ahp_matrix::builder::Builder;
/// use ahp_matrix::{AhpErrors, AhpRules};
///
/// let mut builder = Builder::new(3, &AhpRules::DEFAULT_RULES)?;
/// builder.prefer(0, 1, 3)?;
/// builder.prefer(2, 0, 5)?;
///
/// let matrix = builder.build();
/// assert_eq!(matrix[(0, 1)], 3.0);
/// assert_eq!(matrix[(0, 2)], 0.2);
///
/// # Ok::<(), AhpErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: AhpRules,
    pub(crate) _matrix: ComparisonMatrix,
    pub(crate) _judged: HashSet<(usize, usize)>,
}

impl Builder {
    pub fn new(size: usize, rules: &AhpRules) -> Result<Builder, AhpErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _matrix: ComparisonMatrix::neutral(size)?,
            _judged: HashSet::new(),
        })
    }

    /// Records that `winner` is preferred over `loser` with the given intensity.
    pub fn prefer(&mut self, winner: usize, loser: usize, intensity: u32) -> Result<(), AhpErrors> {
        self.add_judgment(&Judgment::prefer(winner, loser, intensity))
    }

    /// Adds a judgment to the matrix.
    ///
    /// Depending on the duplicate judgment mode, a second judgment on the same pair
    /// either replaces the first one or is rejected.
    pub fn add_judgment(&mut self, judgment: &Judgment) -> Result<(), AhpErrors> {
        let size = self._matrix.size();
        for index in [judgment.first, judgment.second] {
            if index >= size {
                return Err(AhpErrors::InvalidIndex { index, size });
            }
        }
        if judgment.first == judgment.second {
            return Err(AhpErrors::InvalidIndex {
                index: judgment.second,
                size,
            });
        }
        if judgment.winner != judgment.first && judgment.winner != judgment.second {
            return Err(AhpErrors::InvalidIndex {
                index: judgment.winner,
                size,
            });
        }
        if !(MIN_INTENSITY..=MAX_INTENSITY).contains(&judgment.intensity) {
            return Err(AhpErrors::InvalidIntensity(judgment.intensity));
        }

        let pair = judgment.pair();
        if !self._judged.insert(pair) {
            match self._rules.duplicate_judgment_mode {
                DuplicateJudgmentMode::Reject => {
                    return Err(AhpErrors::DuplicateJudgment {
                        first: pair.0,
                        second: pair.1,
                    });
                }
                DuplicateJudgmentMode::LastWins => {
                    debug!("add_judgment: overwriting pair {:?}", pair);
                }
            }
        }

        self._matrix
            .set_preference(judgment.winner, judgment.loser(), judgment.intensity);
        Ok(())
    }

    /// The number of distinct pairs that received a judgment.
    pub fn num_judged(&self) -> usize {
        self._judged.len()
    }

    pub fn build(self) -> ComparisonMatrix {
        self._matrix
    }
}

/// Builds the comparison matrix of n criteria from a set of judgments.
///
/// Pairs without a judgment stay at the neutral value 1.
pub fn build_matrix(
    size: usize,
    judgments: &[Judgment],
    rules: &AhpRules,
) -> Result<ComparisonMatrix, AhpErrors> {
    let mut builder = Builder::new(size, rules)?;
    for judgment in judgments.iter() {
        builder.add_judgment(judgment)?;
    }
    debug!(
        "build_matrix: size: {:?} judged pairs: {:?}",
        size,
        builder.num_judged()
    );
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scenario_abc() -> Vec<Judgment> {
        // A over B at 3, C over A at 5, B vs C unanswered.
        vec![Judgment::prefer(0, 1, 3), Judgment::prefer(2, 0, 5)]
    }

    #[test]
    fn no_judgment_is_all_ones() {
        let m = build_matrix(5, &[], &AhpRules::DEFAULT_RULES).unwrap();
        assert_eq!(m, ComparisonMatrix::neutral(5).unwrap());
    }

    #[test]
    fn three_criteria_scenario() {
        let m = build_matrix(3, &scenario_abc(), &AhpRules::DEFAULT_RULES).unwrap();
        assert_eq!(m[(0, 1)], 3.0);
        assert_eq!(m[(1, 0)], 1.0 / 3.0);
        assert_eq!(m[(2, 0)], 5.0);
        assert_eq!(m[(0, 2)], 1.0 / 5.0);
        assert_eq!(m[(1, 2)], 1.0);
        assert_eq!(m[(2, 1)], 1.0);
        for i in 0..3 {
            assert_eq!(m[(i, i)], 1.0);
        }
    }

    #[test]
    fn winner_may_be_given_in_either_position() {
        let rules = AhpRules::DEFAULT_RULES;
        let a = build_matrix(3, &[Judgment::new(0, 2, 2, 7)], &rules).unwrap();
        let b = build_matrix(3, &[Judgment::new(2, 0, 2, 7)], &rules).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[(2, 0)], 7.0);
    }

    #[test]
    fn intensity_bounds() {
        let rules = AhpRules::DEFAULT_RULES;
        for intensity in [1, 9] {
            assert!(build_matrix(2, &[Judgment::prefer(0, 1, intensity)], &rules).is_ok());
        }
        for intensity in [0, 10] {
            assert_eq!(
                build_matrix(2, &[Judgment::prefer(0, 1, intensity)], &rules),
                Err(AhpErrors::InvalidIntensity(intensity))
            );
        }
    }

    #[test]
    fn invalid_indices() {
        let rules = AhpRules::DEFAULT_RULES;
        assert_eq!(
            build_matrix(3, &[Judgment::prefer(3, 0, 2)], &rules),
            Err(AhpErrors::InvalidIndex { index: 3, size: 3 })
        );
        assert_eq!(
            build_matrix(3, &[Judgment::prefer(1, 1, 2)], &rules),
            Err(AhpErrors::InvalidIndex { index: 1, size: 3 })
        );
        assert_eq!(
            build_matrix(3, &[Judgment::new(0, 1, 2, 2)], &rules),
            Err(AhpErrors::InvalidIndex { index: 2, size: 3 })
        );
        assert_eq!(build_matrix(0, &[], &rules), Err(AhpErrors::EmptyMatrix));
    }

    #[test]
    fn duplicates_last_wins() {
        let judgments = vec![Judgment::prefer(0, 1, 3), Judgment::prefer(1, 0, 6)];
        let m = build_matrix(2, &judgments, &AhpRules::DEFAULT_RULES).unwrap();
        assert_eq!(m[(1, 0)], 6.0);
        assert_eq!(m[(0, 1)], 1.0 / 6.0);
    }

    #[test]
    fn duplicates_rejected() {
        let rules = AhpRules {
            duplicate_judgment_mode: DuplicateJudgmentMode::Reject,
            ..AhpRules::DEFAULT_RULES
        };
        let judgments = vec![Judgment::prefer(2, 1, 3), Judgment::prefer(1, 2, 3)];
        assert_eq!(
            build_matrix(3, &judgments, &rules),
            Err(AhpErrors::DuplicateJudgment {
                first: 1,
                second: 2
            })
        );
    }

    #[test]
    fn builder_counts_pairs() {
        let mut builder = Builder::new(4, &AhpRules::DEFAULT_RULES).unwrap();
        builder.prefer(0, 1, 2).unwrap();
        builder.prefer(1, 0, 4).unwrap();
        builder.prefer(3, 2, 9).unwrap();
        assert!(builder.prefer(3, 4, 9).is_err());
        assert_eq!(builder.num_judged(), 2);
    }

    #[test]
    fn round_trip_recovers_judgments() {
        let judgments = vec![
            Judgment::prefer(0, 1, 3),
            Judgment::prefer(2, 0, 5),
            Judgment::prefer(1, 3, 9),
            Judgment::prefer(3, 2, 2),
            Judgment::prefer(0, 3, 1),
        ];
        let m = build_matrix(4, &judgments, &AhpRules::DEFAULT_RULES).unwrap();
        for jd in judgments.iter() {
            let (i, j) = jd.pair();
            let recovered = m.judgment(i, j).unwrap();
            assert_eq!(recovered.intensity, jd.intensity);
            if jd.intensity > 1 {
                assert_eq!(recovered.winner, jd.winner);
            }
        }
        // The neutral pair (1, 2) and the equal pair (0, 3) are not listed.
        assert_eq!(m.judgments().len(), 4);
    }

    fn judgment_set(size: usize) -> impl Strategy<Value = (usize, Vec<Judgment>)> {
        let pairs: Vec<(usize, usize)> = (0..size)
            .flat_map(|i| ((i + 1)..size).map(move |j| (i, j)))
            .collect();
        let num_pairs = pairs.len();
        proptest::collection::vec((any::<bool>(), 1u32..=9), num_pairs).prop_map(move |answers| {
            let judgments = pairs
                .iter()
                .zip(answers.iter())
                .map(|((i, j), (first_wins, intensity))| {
                    let winner = if *first_wins { *i } else { *j };
                    Judgment::new(*i, *j, winner, *intensity)
                })
                .collect();
            (size, judgments)
        })
    }

    proptest! {
        #[test]
        fn reciprocal_invariant(input in (2usize..=20).prop_flat_map(judgment_set)) {
            let (size, judgments) = input;
            let m = build_matrix(size, &judgments, &AhpRules::DEFAULT_RULES).unwrap();
            for i in 0..size {
                prop_assert_eq!(m[(i, i)], 1.0);
                for j in 0..size {
                    if i != j {
                        prop_assert_eq!(m[(i, j)] * m[(j, i)], 1.0);
                    }
                }
            }
            for jd in judgments.iter() {
                let recovered = m.judgment(jd.first, jd.second).unwrap();
                prop_assert_eq!(recovered.intensity, jd.intensity);
                if jd.intensity > 1 {
                    prop_assert_eq!(recovered.winner, jd.winner);
                }
            }
        }
    }
}
