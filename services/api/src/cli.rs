use crate::demo::{run_demo, DemoArgs};
use crate::infra::read_surveys;
use crate::server;
use clap::{Args, Parser, Subcommand};
use energy_audit::config::AppConfig;
use energy_audit::error::AppError;
use energy_audit::survey::{write_csv, MetricsPolicy, SurveyRecord, SurveySummary};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Energy Audit",
    about = "Run the household energy-audit service or work with saved surveys",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the derived summary of every survey in a JSON file
    Summary(SummaryArgs),
    /// Flatten saved surveys from a JSON file into CSV
    Export(ExportArgs),
    /// Walk through a complete sample survey end to end
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// JSON file holding one survey or an array of surveys
    pub(crate) path: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// JSON file holding one survey or an array of surveys
    pub(crate) path: PathBuf,
    /// Write the CSV here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Summary(args) => run_summary(args),
        Command::Export(args) => run_export(args),
        Command::Demo(args) => run_demo(args),
    }
}

fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let summaries = build_summaries(&read_surveys(&args.path)?, &config.audit.policy);

    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

fn build_summaries(records: &[SurveyRecord], policy: &MetricsPolicy) -> Vec<SurveySummary> {
    records
        .iter()
        .map(|record| SurveySummary::from_record(record, policy))
        .collect()
}

fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let records = read_surveys(&args.path)?;

    match args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(&path)?);
            let rows = write_csv(&records, &mut writer)?;
            writer.flush()?;
            eprintln!("wrote {rows} rows to {}", path.display());
        }
        None => {
            write_csv(&records, std::io::stdout().lock())?;
        }
    }
    Ok(())
}
