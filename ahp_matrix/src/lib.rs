/*!

Pairwise comparison matrices for the Analytic Hierarchy Process (AHP).

This crate turns the answers of one respondent (which criterion of a pair matters more,
and by how much on the 1-9 Saaty scale) into a reciprocal comparison matrix, and measures
how consistent these answers are with each other through the consistency ratio (CR).

```
use ahp_matrix::*;

let judgments = vec![Judgment::prefer(0, 1, 3), Judgment::prefer(2, 0, 5)];
let matrix = build_matrix(3, &judgments, &AhpRules::DEFAULT_RULES)?;
let cr = consistency_ratio(&matrix)?;
assert_eq!(cr, 0.7515);

# Ok::<(), AhpErrors>(())
```

By convention, a CR below 0.10 is considered acceptable.
*/

pub mod builder;
mod config;
pub mod manual;
mod matrix;

use log::{debug, info};
use nalgebra::linalg::Schur;

pub use crate::builder::build_matrix;
pub use crate::config::*;
pub use crate::matrix::ComparisonMatrix;

// The budget of QR iterations for the Schur decomposition.
// Positive reciprocal matrices of up to 20 criteria converge in a few dozens.
const MAX_SCHUR_ITERATIONS: usize = 10_000;

// How far below n the dominant eigenvalue may fall through rounding alone.
const LAMBDA_TOLERANCE: f64 = 1e-9;

fn round4(x: f64) -> f64 {
    let r = (x * 10_000.0).round() / 10_000.0;
    // No negative zero
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

/// The largest real part of the eigenvalues of the matrix.
///
/// The imaginary parts are ignored: a positive reciprocal matrix has a real dominant
/// eigenvalue, and any imaginary residue is a floating point artifact.
fn lambda_max(matrix: &ComparisonMatrix) -> Result<f64, AhpErrors> {
    if matrix.cells().any(|(_, _, v)| !v.is_finite()) {
        return Err(AhpErrors::DegenerateMatrix);
    }
    if matrix.size() == 1 {
        return Ok(matrix[(0, 0)]);
    }
    let schur = Schur::try_new(matrix.to_dmatrix(), f64::EPSILON, MAX_SCHUR_ITERATIONS)
        .ok_or(AhpErrors::DegenerateMatrix)?;
    let eigenvalues = schur.complex_eigenvalues();
    debug!("lambda_max: eigenvalues: {:?}", eigenvalues.as_slice());

    let mut res: Option<f64> = None;
    for ev in eigenvalues.iter() {
        if !ev.re.is_finite() {
            return Err(AhpErrors::DegenerateMatrix);
        }
        res = Some(match res {
            Some(x) if x >= ev.re => x,
            _ => ev.re,
        });
    }
    match res {
        Some(x) if x > 0.0 => Ok(x),
        _ => Err(AhpErrors::DegenerateMatrix),
    }
}

/// Computes the consistency of a complete comparison matrix.
///
/// Arguments:
/// * `matrix` a complete comparison matrix, typically produced by the builder. Its content is
/// not validated.
/// * `table` the random index reference values.
///
/// Fails with `UnsupportedSize` if the table has no random index for the size of the matrix,
/// and with `DegenerateMatrix` if a cell is not finite, if the eigenvalues cannot be computed,
/// or if the dominant eigenvalue is below n (never the case for a positive reciprocal matrix).
pub fn evaluate_consistency(
    matrix: &ComparisonMatrix,
    table: RandomIndexTable,
) -> Result<Consistency, AhpErrors> {
    let n = matrix.size();
    let random_index = table
        .random_index(n)
        .ok_or(AhpErrors::UnsupportedSize(n))?;

    let lambda_max = lambda_max(matrix)?;
    let consistency_index = if n > 1 {
        // lambda_max >= n for positive reciprocal matrices.
        if lambda_max < n as f64 - LAMBDA_TOLERANCE {
            debug!(
                "evaluate_consistency: lambda_max {:?} below the size {:?}",
                lambda_max, n
            );
            return Err(AhpErrors::DegenerateMatrix);
        }
        let ci = (lambda_max - n as f64) / (n - 1) as f64;
        // Rounding noise
        if ci < 0.0 {
            0.0
        } else {
            ci
        }
    } else {
        0.0
    };
    let ratio = if random_index > 0.0 {
        round4(consistency_index / random_index)
    } else {
        0.0
    };
    debug!(
        "evaluate_consistency: n: {:?} lambda_max: {:?} ci: {:?} ri: {:?} cr: {:?}",
        n, lambda_max, consistency_index, random_index, ratio
    );
    Ok(Consistency {
        lambda_max,
        consistency_index,
        random_index,
        ratio,
    })
}

/// The consistency ratio of the matrix, using Saaty's random index table.
pub fn consistency_ratio(matrix: &ComparisonMatrix) -> Result<f64, AhpErrors> {
    evaluate_consistency(matrix, RandomIndexTable::Saaty).map(|c| c.ratio)
}

/// Builds the matrix of one respondent and evaluates it.
///
/// Arguments:
/// * `size` the number of criteria
/// * `judgments` the answers of the respondent. Unanswered pairs are simply absent.
/// * `rules` the rules for duplicate judgments and the random index table
pub fn run_consistency(
    size: usize,
    judgments: &[Judgment],
    rules: &AhpRules,
) -> Result<(ComparisonMatrix, Consistency), AhpErrors> {
    info!(
        "Processing {:?} judgments over {:?} criteria, rules: {:?}",
        judgments.len(),
        size,
        rules
    );
    let matrix = build_matrix(size, judgments, rules)?;
    let consistency = evaluate_consistency(&matrix, rules.random_index_table)?;
    info!(
        "Consistency ratio: {} (lambda max: {:.6})",
        consistency.ratio, consistency.lambda_max
    );
    Ok((matrix, consistency))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn from_weights(weights: &[f64]) -> ComparisonMatrix {
        let rows: Vec<Vec<f64>> = weights
            .iter()
            .map(|wi| weights.iter().map(|wj| wi / wj).collect())
            .collect();
        ComparisonMatrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn three_criteria_reference_value() {
        init();
        let judgments = vec![Judgment::prefer(0, 1, 3), Judgment::prefer(2, 0, 5)];
        let (m, c) = run_consistency(3, &judgments, &AhpRules::DEFAULT_RULES).unwrap();
        // For a 3x3 reciprocal matrix, lambda_max = 1 + r^(1/3) + r^(-1/3)
        // with r = m[0][1] * m[1][2] / m[0][2] = 15.
        let r: f64 = 15.0;
        let expected = 1.0 + r.cbrt() + 1.0 / r.cbrt();
        assert!((c.lambda_max - expected).abs() < 1e-9);
        assert_eq!(c.random_index, 0.58);
        assert_eq!(c.ratio, 0.7515);
        assert_eq!(consistency_ratio(&m), Ok(0.7515));
    }

    #[test]
    fn consistent_matrices_have_zero_ratio() {
        init();
        let cases: Vec<Vec<f64>> = vec![
            vec![4.0, 2.0, 1.0],
            vec![0.5, 0.25, 0.125, 0.125],
            vec![9.0, 7.0, 5.0, 3.0, 1.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
        ];
        for weights in cases {
            let c = evaluate_consistency(&from_weights(&weights), RandomIndexTable::Saaty).unwrap();
            assert!(c.consistency_index < 1e-6, "{:?}: {:?}", weights, c);
            assert!(c.ratio < 1e-6, "{:?}: {:?}", weights, c);
        }
    }

    #[test]
    fn consistent_judgments_have_zero_ratio() {
        // Weights 4, 2, 1: A = 2 B, A = 4 C, B = 2 C.
        let judgments = vec![
            Judgment::prefer(0, 1, 2),
            Judgment::prefer(0, 2, 4),
            Judgment::prefer(1, 2, 2),
        ];
        let (_, c) = run_consistency(3, &judgments, &AhpRules::DEFAULT_RULES).unwrap();
        assert_eq!(c.ratio, 0.0);
    }

    #[test]
    fn small_matrices_are_consistent() {
        let one = ComparisonMatrix::neutral(1).unwrap();
        let c = evaluate_consistency(&one, RandomIndexTable::Saaty).unwrap();
        assert_eq!(c.ratio, 0.0);
        assert_eq!(c.consistency_index, 0.0);

        for intensity in 1..=9 {
            let m = build_matrix(2, &[Judgment::prefer(1, 0, intensity)], &AhpRules::DEFAULT_RULES)
                .unwrap();
            assert_eq!(consistency_ratio(&m), Ok(0.0));
        }
    }

    #[test]
    fn unanswered_survey_is_consistent() {
        for n in 1..=10 {
            let (m, c) = run_consistency(n, &[], &AhpRules::DEFAULT_RULES).unwrap();
            assert!(m.cells().all(|(_, _, v)| v == 1.0));
            assert_eq!(c.ratio, 0.0);
            assert!((c.lambda_max - n as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn inconsistent_cycle_is_flagged() {
        // A > B, B > C, C > A, all strongly.
        let judgments = vec![
            Judgment::prefer(0, 1, 9),
            Judgment::prefer(1, 2, 9),
            Judgment::prefer(2, 0, 9),
        ];
        let (_, c) = run_consistency(3, &judgments, &AhpRules::DEFAULT_RULES).unwrap();
        assert!(c.ratio > 0.1);
        assert!(c.lambda_max > 3.0);
    }

    #[test]
    fn beyond_table_is_unsupported() {
        let m = ComparisonMatrix::neutral(11).unwrap();
        assert_eq!(consistency_ratio(&m), Err(AhpErrors::UnsupportedSize(11)));
        assert_eq!(
            run_consistency(11, &[], &AhpRules::DEFAULT_RULES),
            Err(AhpErrors::UnsupportedSize(11))
        );
    }

    #[test]
    fn extended_table_covers_fifteen() {
        let rules = AhpRules {
            random_index_table: RandomIndexTable::Extended,
            ..AhpRules::DEFAULT_RULES
        };
        for n in 11..=15 {
            let (_, c) = run_consistency(n, &[Judgment::prefer(0, 1, 2)], &rules).unwrap();
            assert!(c.ratio >= 0.0);
        }
        assert_eq!(
            run_consistency(16, &[], &rules),
            Err(AhpErrors::UnsupportedSize(16))
        );
        assert_eq!(RandomIndexTable::Extended.random_index(11), Some(1.51));
        assert_eq!(RandomIndexTable::Saaty.random_index(11), None);
        assert_eq!(RandomIndexTable::Saaty.random_index(0), None);
        assert_eq!(RandomIndexTable::Saaty.max_size(), 10);
    }

    #[test]
    fn degenerate_matrices_are_reported() {
        let zeros = ComparisonMatrix::from_rows(&[vec![0.0; 3], vec![0.0; 3], vec![0.0; 3]]).unwrap();
        assert_eq!(consistency_ratio(&zeros), Err(AhpErrors::DegenerateMatrix));

        let nan = ComparisonMatrix::from_rows(&[
            vec![1.0, f64::NAN, 1.0],
            vec![1.0, 1.0, 1.0],
            vec![1.0, 1.0, 1.0],
        ])
        .unwrap();
        assert_eq!(consistency_ratio(&nan), Err(AhpErrors::DegenerateMatrix));

        let infinite = ComparisonMatrix::from_rows(&[vec![1.0, f64::INFINITY], vec![0.0, 1.0]]).unwrap();
        assert_eq!(consistency_ratio(&infinite), Err(AhpErrors::DegenerateMatrix));
        let single_nan = ComparisonMatrix::from_rows(&[vec![f64::NAN]]).unwrap();
        assert_eq!(consistency_ratio(&single_nan), Err(AhpErrors::DegenerateMatrix));
    }

    #[test]
    fn eigenvalue_below_size_is_degenerate() {
        // Not reciprocal: lambda_max = 1.5 < 2.
        let m = ComparisonMatrix::from_rows(&[vec![1.0, 0.5], vec![0.5, 1.0]]).unwrap();
        assert_eq!(
            evaluate_consistency(&m, RandomIndexTable::Saaty),
            Err(AhpErrors::DegenerateMatrix)
        );
    }

    #[test]
    fn input_is_not_modified() {
        let judgments = vec![Judgment::prefer(0, 1, 3), Judgment::prefer(2, 0, 5)];
        let m = build_matrix(3, &judgments, &AhpRules::DEFAULT_RULES).unwrap();
        let copy = m.clone();
        let _ = consistency_ratio(&m).unwrap();
        assert_eq!(m, copy);
    }
}
