use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_biosample::app::App;
use kira_biosample::config::{ConfigLoader, ConfigOverrides};
use kira_biosample::domain::InputFormat;
use kira_biosample::error::KiraError;
use kira_biosample::export::write_records;
use kira_biosample::input::read_identifiers;
use kira_biosample::ncbi::NcbiHttpClient;
use kira_biosample::output::{ConsoleProgress, JsonOutput, OutputMode};

#[derive(Parser)]
#[command(name = "kira-bsf")]
#[command(about = "Fetch NCBI BioSample metadata for a list of accessions and export it as CSV")]
#[command(version, author)]
struct Cli {
    /// Identifier list: one id per line, or the first column of a .csv/.tsv file
    input: Utf8PathBuf,

    /// Destination CSV, overwritten if it exists
    output: Utf8PathBuf,

    #[arg(long)]
    config: Option<String>,

    /// Contact address sent to NCBI with every request
    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    api_key: Option<String>,

    /// Pause after each request, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    #[arg(long)]
    input_format: Option<InputFormat>,

    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(kira) = report.downcast_ref::<KiraError>() {
            return ExitCode::from(map_exit_code(kira));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &KiraError) -> u8 {
    match error {
        KiraError::ConfigRead(_) | KiraError::ConfigParse(_) | KiraError::InvalidEmail(_) => 2,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let overrides = ConfigOverrides {
        email: cli.email,
        api_key: cli.api_key,
        delay_ms: cli.delay_ms,
    };
    let config = ConfigLoader::resolve(cli.config.as_deref(), overrides)?;
    if config.email.is_none() {
        tracing::warn!(
            "no contact email configured; set --email, NCBI_EMAIL or \"email\" in kira-bsf.json"
        );
    }

    let ids = read_identifiers(&cli.input, cli.input_format)?;
    let client = NcbiHttpClient::new(&config)?;
    let app = App::new(client, config.delay);

    match output_mode {
        OutputMode::Human => {
            let result = app.run(&ids, &ConsoleProgress);
            write_records(&cli.output, &result.records)?;
            ConsoleProgress::print_done(&result, &cli.output);
        }
        OutputMode::Json => {
            let result = app.run(&ids, &JsonOutput);
            write_records(&cli.output, &result.records)?;
            JsonOutput::print_batch(&result, &cli.output).into_diagnostic()?;
        }
    }
    Ok(())
}
