use clap::Parser;

/// This is a program that summarizes election polling data.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the report: where to find the polling data and how to summarize it.
    /// The data file named in the configuration is resolved relative to the directory of the configuration file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the expected summary in JSON format. If provided, pollreader will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the polls will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The comma-separated polling data. The first line is a header and is always skipped.
    /// Setting this option overrides the file that may be specified with the --config option.
    /// (default polling_data.csv in the current directory)
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose (debug) logging to the standard error.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
