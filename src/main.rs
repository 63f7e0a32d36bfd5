use std::path::Path;
use std::process;

use clap::Parser;
use log::{info, warn};
use snafu::{prelude::*, ErrorCompat};

mod ahp;
mod args;

use crate::ahp::config_reader::{FileSource, OutputSettings, SurveyConfig, SurveyCriterion};
use crate::ahp::{AhpResult, MissingInputSnafu, RunOptions};

/// Assembles a survey configuration from the command line flags.
fn config_from_args(args: &args::Args) -> AhpResult<SurveyConfig> {
    let input = args.input.clone().context(MissingInputSnafu {})?;
    let input_type = args.input_type.clone().unwrap_or_else(|| "csv".to_string());
    let mut source = FileSource::new(&input_type, &input);
    source.excel_worksheet_name = args.excel_worksheet_name.clone();
    Ok(SurveyConfig {
        output_settings: OutputSettings {
            project_name: args
                .project_name
                .clone()
                .unwrap_or_else(|| "survey".to_string()),
            project_id: None,
            output_directory: None,
            store_directory: None,
            export_matrices: None,
        },
        criteria: args
            .criteria
            .iter()
            .map(|name| SurveyCriterion { name: name.clone() })
            .collect(),
        response_sources: vec![source],
        rules: None,
    })
}

fn run(args: &args::Args) -> AhpResult<()> {
    let options = RunOptions {
        reference: args.reference.clone(),
        out: args.out.clone(),
        store_dir: args.store.clone(),
        export_dir: args.export_dir.clone(),
    };
    match &args.config {
        Some(config_path) => ahp::run_survey(config_path.clone(), &options),
        None => {
            let config = config_from_args(args)?;
            ahp::run_survey_config(&config, Path::new("."), &options)
        }
    }
}

fn main() {
    let args = args::Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    info!("args: {:?}", args);

    if let Err(e) = run(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        process::exit(1);
    }
}
