use std::path::Path;

use crate::ahp::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// All the unordered pairs of criteria, in the order of the survey form:
/// (0, 1), (0, 2), ..., (0, n-1), (1, 2), ...
pub fn form_pairs(size: usize) -> Vec<(usize, usize)> {
    (0..size)
        .flat_map(|i| ((i + 1)..size).map(move |j| (i, j)))
        .collect()
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

/// Reads one row of the survey form layout.
///
/// Each pair of criteria takes two cells from `first_col`: the chosen criterion and the
/// intensity. A pair is answered only when both cells are filled. Missing cells at the end of
/// the row are treated as empty.
///
/// Returns None for a blank row.
pub fn read_form_row(
    row: &[String],
    lineno: usize,
    name_col: usize,
    first_col: usize,
    criteria: &[String],
) -> AhpResult<Option<ParsedResponse>> {
    let respondent = row
        .get(name_col)
        .context(CsvLineToShortSnafu { lineno })?
        .trim()
        .to_string();

    let mut choices: Vec<ParsedChoice> = Vec::new();
    for (pair_idx, (i, j)) in form_pairs(criteria.len()).into_iter().enumerate() {
        let choice = cell(row, first_col + 2 * pair_idx);
        let intensity = cell(row, first_col + 2 * pair_idx + 1);
        match (choice.is_empty(), intensity.is_empty()) {
            (false, false) => {
                choices.push(ParsedChoice {
                    lineno,
                    first: criteria[i].clone(),
                    second: criteria[j].clone(),
                    winner: choice.to_string(),
                    intensity: intensity.to_string(),
                });
            }
            (true, true) => {}
            _ => {
                debug!(
                    "read_form_row: line {}: pair ({}, {}) only partially answered, skipping",
                    lineno, criteria[i], criteria[j]
                );
            }
        }
    }

    if respondent.is_empty() {
        if choices.is_empty() {
            warn!("read_form_row: line {}: skipping blank row", lineno);
            return Ok(None);
        }
        return MissingRespondentNameSnafu { lineno }.fail();
    }

    Ok(Some(ParsedResponse {
        respondent,
        lineno,
        choices,
    }))
}
