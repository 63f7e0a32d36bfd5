use log::{debug, info, warn};

use ahp_matrix::*;
use snafu::{prelude::*, Snafu};

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::ahp::config_reader::*;
use crate::ahp::store::{JsonFileStore, Project, Response, ResponseStore};

pub mod config_reader;
mod export;
mod io_common;
mod io_csv;
mod io_xlsx;
pub mod store;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AhpError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Unexpected cell content at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Could not understand a row or column index"))]
    ParsingJsonNumber {},
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Either a configuration file or an input file is required"))]
    MissingInput {},
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV content"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno} is too short"))]
    CsvLineToShort { lineno: usize },
    #[snafu(display("Error writing Excel file {path}"))]
    XlsxWrite {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },

    #[snafu(display("Line {lineno}: missing respondent name"))]
    MissingRespondentName { lineno: usize },
    #[snafu(display("Line {lineno}: {name} is not a criterion of this project"))]
    UnknownCriterion { lineno: usize, name: String },
    #[snafu(display("Line {lineno}: the choice {choice} is neither {first} nor {second}"))]
    UnknownChoice {
        lineno: usize,
        choice: String,
        first: String,
        second: String,
    },
    #[snafu(display("Line {lineno}: cannot read the intensity {content}"))]
    ParsingIntensity { lineno: usize, content: String },
    #[snafu(display("Respondent {respondent} left {missing} pairs unanswered"))]
    MissingJudgments { respondent: String, missing: usize },
    #[snafu(display("The response of {respondent} (line {lineno}) was rejected: {source}"))]
    Evaluation {
        source: AhpErrors,
        respondent: String,
        lineno: usize,
    },
    #[snafu(display("{size} criteria are more than the {max} supported by the random index table"))]
    UnsupportedCriteriaCount { size: usize, max: usize },

    #[snafu(display("Error accessing the store at {path}"))]
    StoreIo {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading or writing the stored record {path}"))]
    StoreJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Project {project_id} not found in the store"))]
    ProjectNotFound { project_id: String },
    #[snafu(display("Project {project_id} is already registered with other criteria"))]
    CriteriaMismatch { project_id: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AhpResult<T> = Result<T, AhpError>;

/// One answer, as parsed by the readers.
/// This is before matching the names against the criteria.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedChoice {
    pub lineno: usize,
    pub first: String,
    pub second: String,
    pub winner: String,
    pub intensity: String,
}

/// The answers of one respondent, as parsed by the readers.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedResponse {
    pub respondent: String,
    pub lineno: usize,
    pub choices: Vec<ParsedChoice>,
}

/// A response whose answers refer to valid criteria.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveyResponse {
    pub respondent: String,
    pub lineno: usize,
    pub judgments: Vec<Judgment>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct EvaluatedResponse {
    pub respondent: String,
    pub matrix: ComparisonMatrix,
    pub consistency: Consistency,
    /// The number of distinct pairs answered.
    pub answered: usize,
}

/// Where the results of a run go, on top of the summary.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunOptions {
    pub reference: Option<String>,
    pub out: Option<String>,
    pub store_dir: Option<String>,
    pub export_dir: Option<String>,
}

/// The number of unordered pairs of n criteria.
pub fn num_pairs(size: usize) -> usize {
    size * size.saturating_sub(1) / 2
}

fn read_responses(
    root_path: &Path,
    cfs: &FileSource,
    criteria: &[String],
) -> AhpResult<Vec<SurveyResponse>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read response file {:?}", p2);
    let parsed = match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_form(p2, cfs, criteria),
        "csv_pairs" => io_csv::read_csv_pairs(p2, cfs),
        "xlsx" => io_xlsx::read_excel_form(p2, cfs, criteria),
        x => whatever!("Provider not implemented {:?}", x),
    }?;
    validate_responses(&parsed, criteria)
}

fn validate_responses(
    parsed: &[ParsedResponse],
    criteria: &[String],
) -> AhpResult<Vec<SurveyResponse>> {
    let indexes: HashMap<&str, usize> = criteria
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();
    let lookup = |name: &String, lineno: usize| -> AhpResult<usize> {
        indexes
            .get(name.as_str())
            .cloned()
            .context(UnknownCriterionSnafu {
                lineno,
                name: name.clone(),
            })
    };

    let mut res: Vec<SurveyResponse> = Vec::new();
    for pr in parsed.iter() {
        let mut judgments: Vec<Judgment> = Vec::new();
        for pc in pr.choices.iter() {
            let first = lookup(&pc.first, pc.lineno)?;
            let second = lookup(&pc.second, pc.lineno)?;
            let winner = if pc.winner == pc.first {
                first
            } else if pc.winner == pc.second {
                second
            } else {
                return UnknownChoiceSnafu {
                    lineno: pc.lineno,
                    choice: pc.winner.clone(),
                    first: pc.first.clone(),
                    second: pc.second.clone(),
                }
                .fail();
            };
            let intensity = pc
                .intensity
                .trim()
                .parse::<u32>()
                .ok()
                .context(ParsingIntensitySnafu {
                    lineno: pc.lineno,
                    content: pc.intensity.clone(),
                })?;
            judgments.push(Judgment::new(first, second, winner, intensity));
        }
        debug!(
            "Judgments for respondent {:?}: {:?}",
            pr.respondent, judgments
        );
        res.push(SurveyResponse {
            respondent: pr.respondent.clone(),
            lineno: pr.lineno,
            judgments,
        });
    }
    Ok(res)
}

fn evaluate_response(
    response: &SurveyResponse,
    size: usize,
    rules: &SurveyRules,
) -> AhpResult<EvaluatedResponse> {
    let answered = response
        .judgments
        .iter()
        .map(|j| j.pair())
        .collect::<HashSet<(usize, usize)>>()
        .len();
    let expected = num_pairs(size);
    if rules.require_all_judgments && answered < expected {
        return MissingJudgmentsSnafu {
            respondent: response.respondent.clone(),
            missing: expected - answered,
        }
        .fail();
    }
    if answered < expected {
        debug!(
            "evaluate_response: {} answered {} of {} pairs",
            response.respondent, answered, expected
        );
    }
    let (matrix, consistency) = run_consistency(size, &response.judgments, &rules.ahp)
        .context(EvaluationSnafu {
            respondent: response.respondent.clone(),
            lineno: response.lineno,
        })?;
    Ok(EvaluatedResponse {
        respondent: response.respondent.clone(),
        matrix,
        consistency,
        answered,
    })
}

/// Finds the project of this survey, registering it in the store when there is one.
///
/// The criteria come from the configuration, or from the store when the configuration
/// only gives the id of an existing project. A project is only registered once its criteria
/// are valid and covered by the random index table of the rules.
fn resolve_project<'s>(
    config: &SurveyConfig,
    rules: &SurveyRules,
    store: Option<&mut (dyn ResponseStore + 's)>,
) -> AhpResult<Project> {
    let settings = &config.output_settings;
    let config_criteria: Vec<String> = config.criteria.iter().map(|c| c.name.clone()).collect();
    let project_id = match &settings.project_id {
        Some(id) => {
            validate_project_id(id)?;
            id.clone()
        }
        None => uuid::Uuid::new_v4().to_string(),
    };

    let project = match store {
        Some(store) => {
            let existing = store.load_project(&project_id)?;
            match existing {
                Some(p) if config_criteria.is_empty() || p.criteria == config_criteria => {
                    info!("Using registered project {} ({})", p.name, p.id);
                    p
                }
                Some(_) => {
                    return CriteriaMismatchSnafu { project_id }.fail();
                }
                None if config_criteria.is_empty() => {
                    return ProjectNotFoundSnafu { project_id }.fail();
                }
                None => {
                    let p = Project {
                        id: project_id,
                        name: settings.project_name.clone(),
                        criteria: config_criteria,
                    };
                    validate_criteria(&p.criteria)?;
                    check_table_size(p.criteria.len(), rules)?;
                    store.save_project(&p)?;
                    info!("Registered project {} with id {}", p.name, p.id);
                    p
                }
            }
        }
        None => Project {
            id: project_id,
            name: settings.project_name.clone(),
            criteria: config_criteria,
        },
    };
    validate_criteria(&project.criteria)?;
    check_table_size(project.criteria.len(), rules)?;
    Ok(project)
}

fn check_table_size(size: usize, rules: &SurveyRules) -> AhpResult<()> {
    let max = rules.ahp.random_index_table.max_size();
    if size > max {
        return UnsupportedCriteriaCountSnafu { size, max }.fail();
    }
    Ok(())
}

fn build_summary_js(project: &Project, rules: &SurveyRules, results: &[EvaluatedResponse]) -> JSValue {
    let results_js: Vec<JSValue> = results
        .iter()
        .map(|r| {
            json!({
                "respondent": r.respondent,
                "consistencyRatio": r.consistency.ratio,
                "acceptable": r.consistency.ratio < rules.consistency_threshold,
                "answered": r.answered,
                "matrix": r.matrix.to_rows(),
            })
        })
        .collect();
    json!({
        "config": {
            "project": project.name,
            "criteria": project.criteria,
            "consistencyThreshold": rules.consistency_threshold,
        },
        "results": results_js
    })
}

/// Runs a survey: reads all the responses, evaluates them, then exports and stores the results.
///
/// Nothing is stored if any response fails to be evaluated.
/// Returns the summary of the run.
pub fn process_survey(
    config: &SurveyConfig,
    root_path: &Path,
    mut store: Option<&mut dyn ResponseStore>,
    export_dir: Option<&Path>,
) -> AhpResult<JSValue> {
    let rules = validate_rules(&config.rules)?;
    let project = resolve_project(config, &rules, store.as_deref_mut())?;
    let size = project.criteria.len();

    if config.response_sources.is_empty() {
        whatever!("no response sources detected");
    }

    let mut responses: Vec<SurveyResponse> = Vec::new();
    for cfs in config.response_sources.iter() {
        let mut file_data = read_responses(root_path, cfs, &project.criteria)?;
        responses.append(&mut file_data);
    }
    info!("Read {} responses", responses.len());

    let mut evaluated: Vec<EvaluatedResponse> = Vec::new();
    for response in responses.iter() {
        let er = evaluate_response(response, size, &rules)?;
        if er.consistency.ratio >= rules.consistency_threshold {
            warn!(
                "Respondent {}: consistency ratio {} is above the threshold {}",
                er.respondent, er.consistency.ratio, rules.consistency_threshold
            );
        }
        evaluated.push(er);
    }

    // The ids are assigned first, so that the exported files and the stored records agree.
    let mut stored_responses: Vec<Response> = evaluated
        .iter()
        .map(|er| Response {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project.id.clone(),
            respondent: er.respondent.clone(),
            consistency_ratio: er.consistency.ratio,
            matrix: er.matrix.to_rows(),
            export_path: None,
        })
        .collect();
    if let Some(dir) = export_dir {
        for (response, er) in stored_responses.iter_mut().zip(evaluated.iter()) {
            response.export_path = Some(export::export_response(
                dir,
                &response.id,
                &project.criteria,
                er,
            )?);
        }
    }

    if let Some(store) = store {
        for response in stored_responses.iter() {
            store.save_response(response)?;
        }
        let stored = store.list_responses(&project.id)?;
        info!(
            "Project {} now holds {} responses",
            project.id,
            stored.len()
        );
    }

    Ok(build_summary_js(&project, &rules, &evaluated))
}

fn write_summary(summary: &str, out: &Option<String>) -> AhpResult<()> {
    match out.as_deref() {
        None | Some("stdout") => {
            println!("{}", summary);
        }
        Some(path) => {
            fs::write(path, summary).context(WritingOutputSnafu { path })?;
            info!("Summary written to {}", path);
        }
    }
    Ok(())
}

fn check_reference(pretty_js_stats: &str, reference: &Option<String>) -> AhpResult<()> {
    if let Some(summary_p) = reference {
        let summary_ref = read_summary(summary_p.clone())?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }
    Ok(())
}

/// Runs the survey described by a configuration, relative to the given directory.
pub fn run_survey_config(
    config: &SurveyConfig,
    root_path: &Path,
    options: &RunOptions,
) -> AhpResult<()> {
    info!("config: {:?}", config);
    let store_dir: Option<PathBuf> = options
        .store_dir
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| {
            config
                .output_settings
                .store_directory
                .as_ref()
                .map(|d| root_path.join(d))
        });
    let export_dir: Option<PathBuf> = options
        .export_dir
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| config.export_directory().map(|d| root_path.join(d)));

    let mut json_store = match store_dir {
        Some(dir) => Some(JsonFileStore::open(dir)?),
        None => None,
    };
    let store: Option<&mut dyn ResponseStore> = json_store
        .as_mut()
        .map(|s| s as &mut dyn ResponseStore);

    let summary = process_survey(config, root_path, store, export_dir.as_deref())?;
    let pretty_js_stats = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;
    write_summary(&pretty_js_stats, &options.out)?;
    check_reference(&pretty_js_stats, &options.reference)
}

/// Runs the survey described by a configuration file.
///
/// All the paths in the configuration are relative to the directory of the file.
pub fn run_survey(config_path: String, options: &RunOptions) -> AhpResult<()> {
    let config_p = Path::new(config_path.as_str());
    let config_str = fs::read_to_string(config_path.clone()).context(OpeningJsonSnafu {
        path: config_path.clone(),
    })?;
    let config: SurveyConfig = serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
    run_survey_config(&config, root_p, options)
}
