// Export of the evaluated matrices as Excel workbooks.

use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::ahp::*;

pub const MATRIX_SHEET: &str = "Matriz_AHP";
pub const CONSISTENCY_SHEET: &str = "Consistencia";

/// Keeps the respondent names usable as file names.
fn sanitize_file_name(name: &str) -> String {
    let s: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let s = s.trim_matches('.').to_string();
    if s.is_empty() {
        "respondent".to_string()
    } else {
        s
    }
}

/// Writes the matrix and the consistency ratio of a response to
/// `<dir>/<respondent> - <response id>.xlsx`, with two worksheets:
///
/// - `Matriz_AHP`: the matrix, rows and columns labelled with the criteria
/// - `Consistencia`: `Métrica` / `Valor`, one `CR` row
///
/// The response id keeps the files of respondents with the same name apart.
/// Returns the path of the workbook.
pub fn export_response(
    dir: &Path,
    response_id: &str,
    criteria: &[String],
    er: &EvaluatedResponse,
) -> AhpResult<String> {
    fs::create_dir_all(dir).context(WritingOutputSnafu {
        path: dir.display().to_string(),
    })?;
    let p = dir.join(format!(
        "{} - {}.xlsx",
        sanitize_file_name(&er.respondent),
        response_id
    ));
    let path = p.display().to_string();

    let mut workbook = Workbook::new();

    let matrix_sheet = workbook.add_worksheet();
    matrix_sheet
        .set_name(MATRIX_SHEET)
        .context(XlsxWriteSnafu { path: &path })?;
    for (idx, name) in criteria.iter().enumerate() {
        let pos = idx as u16 + 1;
        matrix_sheet
            .write_string(0, pos, name.as_str())
            .context(XlsxWriteSnafu { path: &path })?;
        matrix_sheet
            .write_string(pos as u32, 0, name.as_str())
            .context(XlsxWriteSnafu { path: &path })?;
    }
    for (row, col, value) in er.matrix.cells() {
        matrix_sheet
            .write_number(row as u32 + 1, col as u16 + 1, value)
            .context(XlsxWriteSnafu { path: &path })?;
    }

    let consistency_sheet = workbook.add_worksheet();
    consistency_sheet
        .set_name(CONSISTENCY_SHEET)
        .context(XlsxWriteSnafu { path: &path })?;
    consistency_sheet
        .write_string(0, 0, "Métrica")
        .context(XlsxWriteSnafu { path: &path })?;
    consistency_sheet
        .write_string(0, 1, "Valor")
        .context(XlsxWriteSnafu { path: &path })?;
    consistency_sheet
        .write_string(1, 0, "CR")
        .context(XlsxWriteSnafu { path: &path })?;
    consistency_sheet
        .write_number(1, 1, er.consistency.ratio)
        .context(XlsxWriteSnafu { path: &path })?;

    workbook
        .save(&p)
        .context(XlsxWriteSnafu { path: &path })?;
    info!("Exported the matrix of {} to {}", er.respondent, path);
    Ok(path)
}
