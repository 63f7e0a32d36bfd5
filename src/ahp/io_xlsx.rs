use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::ahp::{
    io_common::{read_form_row, simplify_file_name},
    *,
};

/// Reads responses in the survey form layout from an Excel workbook.
///
/// The worksheet is the one named in the source, or the first one.
pub fn read_excel_form(
    path: String,
    cfs: &FileSource,
    criteria: &[String],
) -> AhpResult<Vec<ParsedResponse>> {
    let name_col = cfs.name_column_index()?;
    let first_col = cfs.first_judgment_column_index()?;
    let first_row = cfs.first_judgment_row_index()?;
    let file_name = simplify_file_name(&path);

    let wrange = get_range(&path, cfs)?;
    // The range starts at the first non-empty cell, not necessarily at A1.
    let (start_row, start_col) = wrange
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    debug!(
        "read_excel_form: {}: range starts at {:?}",
        file_name,
        (start_row, start_col)
    );

    let mut res: Vec<ParsedResponse> = Vec::new();
    for (idx, cells) in wrange.rows().enumerate() {
        let lineno = start_row + idx + 1;
        if lineno < first_row {
            continue;
        }
        let mut row: Vec<String> = vec![String::new(); start_col];
        for cell in cells.iter() {
            row.push(read_cell(cell, lineno)?);
        }
        debug!("read_excel_form: {}:{} row: {:?}", file_name, lineno, row);
        if let Some(pr) = read_form_row(&row, lineno, name_col, first_col, criteria)? {
            res.push(pr);
        }
    }
    info!("read_excel_form: {}: {} responses", file_name, res.len());
    Ok(res)
}

fn get_range(path: &String, cfs: &FileSource) -> AhpResult<Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match &cfs.excel_worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };
    Ok(wrange)
}

/// The content of a cell as text. Whole numbers are written without decimals.
fn read_cell(cell: &DataType, lineno: usize) -> AhpResult<String> {
    match cell {
        DataType::String(s) => Ok(s.trim().to_string()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Empty => Ok(String::new()),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}
