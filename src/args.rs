use clap::Parser;

/// Collects AHP pairwise comparison surveys and checks the consistency of each respondent.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the survey: project, criteria, response files and rules.
    /// All the paths in this file are relative to its directory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, ahpsurvey checks that the computed
    /// summary matches the reference and fails otherwise.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the JSON summary of the survey. Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The file containing the responses, when no configuration file is given.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv, csv_pairs or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (repeatable) The criteria of the survey, in the order of the form. Used when no configuration file is given.
    #[clap(long, value_parser)]
    pub criteria: Vec<String>,

    /// (default survey) The name of the project, when no configuration file is given.
    #[clap(long, value_parser)]
    pub project_name: Option<String>,

    /// (directory) If specified, projects and responses are stored in this directory.
    /// Overrides the store directory of the configuration.
    #[clap(long, value_parser)]
    pub store: Option<String>,

    /// (directory) If specified, the matrix and the consistency ratio of each respondent are exported
    /// as Excel workbooks in this directory. Overrides the output directory of the configuration.
    #[clap(long, value_parser)]
    pub export_dir: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
