// Primitives for reading CSV files.

use std::collections::HashMap;
use std::fs::File;

use crate::ahp::{
    io_common::{read_form_row, simplify_file_name},
    *,
};

/// Reads responses in the survey form layout: one row per respondent.
pub fn read_csv_form(
    path: String,
    cfs: &FileSource,
    criteria: &[String],
) -> AhpResult<Vec<ParsedResponse>> {
    let name_col = cfs.name_column_index()?;
    let first_col = cfs.first_judgment_column_index()?;
    let file_name = simplify_file_name(&path);

    let mut res: Vec<ParsedResponse> = Vec::new();
    for (lineno, line) in get_records(&path, cfs)? {
        let row: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        debug!("read_csv_form: {}:{} row: {:?}", file_name, lineno, row);
        if let Some(pr) = read_form_row(&row, lineno, name_col, first_col, criteria)? {
            res.push(pr);
        }
    }
    info!("read_csv_form: {}: {} responses", file_name, res.len());
    Ok(res)
}

/// Reads responses with one judgment per row:
/// respondent, first criterion, second criterion, preferred criterion, intensity.
///
/// The respondent column is given by the name column index, the others follow it.
/// The judgments are grouped per respondent, in the order of first appearance.
pub fn read_csv_pairs(path: String, cfs: &FileSource) -> AhpResult<Vec<ParsedResponse>> {
    let name_col = cfs.name_column_index()?;
    let file_name = simplify_file_name(&path);

    let mut res: Vec<ParsedResponse> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (lineno, line) in get_records(&path, cfs)? {
        debug!("read_csv_pairs: {}:{} row: {:?}", file_name, lineno, line);
        let field = |idx: usize| -> AhpResult<String> {
            Ok(line
                .get(name_col + idx)
                .context(CsvLineToShortSnafu { lineno })?
                .trim()
                .to_string())
        };
        let respondent = field(0)?;
        if respondent.is_empty() {
            return MissingRespondentNameSnafu { lineno }.fail();
        }
        let choice = ParsedChoice {
            lineno,
            first: field(1)?,
            second: field(2)?,
            winner: field(3)?,
            intensity: field(4)?,
        };
        let pos = *positions.entry(respondent.clone()).or_insert_with(|| {
            res.push(ParsedResponse {
                respondent: respondent.clone(),
                lineno,
                choices: Vec::new(),
            });
            res.len() - 1
        });
        res[pos].choices.push(choice);
    }
    info!("read_csv_pairs: {}: {} responses", file_name, res.len());
    Ok(res)
}

/// The records of the file, with their line numbers, starting at the first response row.
fn get_records(path: &String, cfs: &FileSource) -> AhpResult<Vec<(usize, csv::StringRecord)>> {
    let first_row = cfs.first_judgment_row_index()?;
    let rdr: csv::Reader<File> = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path: path.clone() })?;
    let mut res: Vec<(usize, csv::StringRecord)> = Vec::new();
    // The index starts at 1 to respect most conventions in the excel world
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu {})?;
        if lineno < first_row {
            continue;
        }
        res.push((lineno, line));
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let p = dir.path().join(name);
        let mut f = File::create(&p).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        p.display().to_string()
    }

    fn abc() -> Vec<String> {
        vec!["A".to_string(), "B".to_string(), "C".to_string()]
    }

    #[test]
    fn form_layout() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_file(
            &dir,
            "form.csv",
            "name,A vs B,intensity,A vs C,intensity,B vs C,intensity\n\
             Ana,A,3,C,5,,\n\
             ,,,,,,\n\
             Luis,A,2,A,4,B,2\n",
        );
        let res = read_csv_form(p, &FileSource::new("csv", "form.csv"), &abc()).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].respondent, "Ana");
        assert_eq!(res[0].lineno, 2);
        assert_eq!(res[0].choices.len(), 2);
        assert_eq!(res[1].respondent, "Luis");
        assert_eq!(res[1].lineno, 4);
        assert_eq!(res[1].choices.len(), 3);
    }

    #[test]
    fn pairs_layout() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_file(
            &dir,
            "pairs.csv",
            "respondent,first,second,winner,intensity\n\
             Ana,A,B,A,3\n\
             Luis,B,C,C,7\n\
             Ana,A,C,C,5\n",
        );
        let res = read_csv_pairs(p, &FileSource::new("csv_pairs", "pairs.csv")).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].respondent, "Ana");
        assert_eq!(res[0].choices.len(), 2);
        assert_eq!(res[0].choices[1].lineno, 4);
        assert_eq!(res[1].respondent, "Luis");
        assert_eq!(res[1].choices[0].winner, "C");
    }

    #[test]
    fn pairs_layout_short_line() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_file(
            &dir,
            "pairs.csv",
            "respondent,first,second,winner,intensity\nAna,A,B,A\n",
        );
        let res = read_csv_pairs(p, &FileSource::new("csv_pairs", "pairs.csv"));
        assert!(matches!(res, Err(AhpError::CsvLineToShort { lineno: 2 })), "{:?}", res);
    }

    #[test]
    fn missing_file() {
        let res = read_csv_form(
            "/nonexistent/form.csv".to_string(),
            &FileSource::new("csv", "form.csv"),
            &abc(),
        );
        assert!(matches!(res, Err(AhpError::CsvOpen { .. })), "{:?}", res);
    }
}
