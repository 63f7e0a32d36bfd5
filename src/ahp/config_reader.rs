use crate::ahp::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

/// The largest number of criteria in a survey project.
pub const MAX_CRITERIA: usize = 20;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "projectName")]
    pub project_name: String,
    #[serde(rename = "projectId")]
    pub project_id: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "storeDirectory")]
    pub store_directory: Option<String>,
    #[serde(rename = "exportMatrices")]
    pub export_matrices: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "nameColumnIndex")]
    pub name_column_index: Option<JSValue>,
    #[serde(rename = "firstJudgmentColumnIndex")]
    pub first_judgment_column_index: Option<JSValue>,
    #[serde(rename = "firstJudgmentRowIndex")]
    pub first_judgment_row_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    pub fn new(provider: &str, file_path: &str) -> FileSource {
        FileSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            name_column_index: None,
            first_judgment_column_index: None,
            first_judgment_row_index: None,
            excel_worksheet_name: None,
        }
    }

    /// The column of the respondent name (0-based).
    pub fn name_column_index(&self) -> AhpResult<usize> {
        read_js_index(&self.name_column_index, 1)
    }

    /// The column of the first judgment (0-based).
    pub fn first_judgment_column_index(&self) -> AhpResult<usize> {
        read_js_index(&self.first_judgment_column_index, 2)
    }

    /// The first row holding a response (1-based, like the spreadsheet line numbers).
    pub fn first_judgment_row_index(&self) -> AhpResult<usize> {
        read_js_index(&self.first_judgment_row_index, 2).map(|x| x + 1)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyCriterion {
    pub name: String,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(rename = "duplicateJudgment")]
    pub duplicate_judgment: Option<String>,
    #[serde(rename = "randomIndexTable")]
    pub random_index_table: Option<String>,
    #[serde(rename = "requireAllJudgments")]
    pub require_all_judgments: Option<bool>,
    #[serde(rename = "consistencyThreshold")]
    pub consistency_threshold: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(default)]
    pub criteria: Vec<SurveyCriterion>,
    #[serde(rename = "responseSources")]
    pub response_sources: Vec<FileSource>,
    pub rules: Option<RulesConfig>,
}

impl SurveyConfig {
    /// The directory for the exported matrices, if the export is turned on.
    pub fn export_directory(&self) -> Option<&str> {
        let settings = &self.output_settings;
        match settings.export_matrices {
            Some(false) => None,
            _ => settings.output_directory.as_deref(),
        }
    }
}

/// The rules of a survey, once validated.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyRules {
    pub ahp: AhpRules,
    pub require_all_judgments: bool,
    /// Responses with a consistency ratio strictly below this value are acceptable.
    pub consistency_threshold: f64,
}

pub const DEFAULT_CONSISTENCY_THRESHOLD: f64 = 0.1;

pub fn validate_rules(rules: &Option<RulesConfig>) -> AhpResult<SurveyRules> {
    let default_rules = RulesConfig::default();
    let rules = rules.as_ref().unwrap_or(&default_rules);
    let res = SurveyRules {
        ahp: AhpRules {
            duplicate_judgment_mode: match rules.duplicate_judgment.as_deref() {
                None | Some("lastWins") => DuplicateJudgmentMode::LastWins,
                Some("reject") => DuplicateJudgmentMode::Reject,
                Some(x) => {
                    whatever!("Unknown duplicateJudgment option: {:?}", x)
                }
            },
            random_index_table: match rules.random_index_table.as_deref() {
                None | Some("saaty") => RandomIndexTable::Saaty,
                Some("extended") => RandomIndexTable::Extended,
                Some(x) => {
                    whatever!("Unknown randomIndexTable option: {:?}", x)
                }
            },
        },
        require_all_judgments: rules.require_all_judgments.unwrap_or(false),
        consistency_threshold: match rules.consistency_threshold {
            None => DEFAULT_CONSISTENCY_THRESHOLD,
            Some(x) if x > 0.0 && x.is_finite() => x,
            Some(x) => {
                whatever!("consistencyThreshold must be a positive number, got {}", x)
            }
        },
    };
    Ok(res)
}

pub fn validate_criteria(criteria: &[String]) -> AhpResult<()> {
    if criteria.len() < 2 || criteria.len() > MAX_CRITERIA {
        whatever!(
            "A project needs between 2 and {} criteria, found {}",
            MAX_CRITERIA,
            criteria.len()
        );
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for c in criteria.iter() {
        if c.trim().is_empty() {
            whatever!("Criteria names cannot be empty");
        }
        if !seen.insert(c.as_str()) {
            whatever!("Criterion {:?} appears more than once", c);
        }
    }
    Ok(())
}

/// Project ids are used as file names by the store.
pub fn validate_project_id(id: &str) -> AhpResult<()> {
    if id.is_empty()
        || !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        whatever!("Invalid project id {:?}: only letters, digits, - and _ are allowed", id);
    }
    Ok(())
}

pub fn read_summary(path: String) -> AhpResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Reads a 1-based row or column index and returns it 0-based.
///
/// Accepted: numbers, numeric strings and Excel-style column letters ("A", "AB").
fn read_js_index(x: &Option<JSValue>, default: usize) -> AhpResult<usize> {
    let one_based = match x {
        None | Some(JSValue::Null) => default,
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {})?,
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => s
            .to_ascii_uppercase()
            .chars()
            .try_fold(0usize, |acc, c| {
                acc.checked_mul(26)?
                    .checked_add(c as usize - 'A' as usize + 1)
            })
            .context(ParsingJsonNumberSnafu {})?,
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .context(ParsingJsonNumberSnafu {})?,
        _ => return ParsingJsonNumberSnafu {}.fail(),
    };
    if one_based == 0 {
        return ParsingJsonNumberSnafu {}.fail();
    }
    Ok(one_based - 1)
}
