#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # aigrade
//!
//! Grades a folder of Java submissions against an assignment description and a
//! scoring sheet.
//!
//! The judge is any OpenAI-compatible endpoint. Set `OPENAI_API_KEY` (and
//! optionally `OPENAI_ENDPOINT`, `OPENAI_MODEL`, `OPENAI_TEMPERATURE`) in the
//! environment or a `.env` file, then run
//!
//! ```sh
//! aigrade grade --scoring-sheet rubric.txt --assignment lab3.txt --submissions subs/
//! ```

use std::path::PathBuf;

use aigrade::{
    GradingJob,
    config::GraderConfig,
    constants::DEFAULT_OUTPUT_FILE,
    grade::{ReportFormat, failure_summary, results_table, write_report},
    java::{RawSubmission, analyze},
};
use anyhow::{Context, Result};
use bpaf::*;
use colored::Colorize;
use dotenvy::dotenv;
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Arguments of the `grade` command.
#[derive(Debug, Clone)]
struct GradeArgs {
    /// rubric file
    scoring_sheet: PathBuf,
    /// assignment description file
    assignment:    PathBuf,
    /// submissions folder
    submissions:   PathBuf,
    /// aggregate results file
    output:        PathBuf,
    /// explicit output format
    format:        Option<ReportFormat>,
    /// breakdown folder override
    breakdown_dir: Option<PathBuf>,
    /// JSON config file
    config:        Option<PathBuf>,
    /// model override
    model:         Option<String>,
    /// concurrency override
    jobs:          Option<usize>,
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade every submission in a folder
    Grade(GradeArgs),
    /// Run the style checks on one file without calling the judge
    Check(PathBuf, Option<PathBuf>),
}

/// Parsed command line.
#[derive(Debug, Clone)]
struct Opts {
    /// log at debug level
    verbose: bool,
    /// what to do
    cmd:     Cmd,
}

/// Parse the command line arguments and return `Opts`
fn options() -> Opts {
    /// parses the optional config file flag
    fn config_file() -> impl Parser<Option<PathBuf>> {
        long("config")
            .help("JSON file overriding scoring, model, retries and concurrency")
            .argument::<PathBuf>("FILE")
            .optional()
    }

    let scoring_sheet = long("scoring-sheet")
        .help("Path to the scoring sheet file")
        .argument::<PathBuf>("FILE");
    let assignment = long("assignment")
        .help("Path to the assignment description, as plain text")
        .argument::<PathBuf>("FILE");
    let submissions = long("submissions")
        .help("Directory containing student submissions")
        .argument::<PathBuf>("DIR");
    let output = long("output")
        .help("Where to write the results (.csv, .tsv or .json)")
        .argument::<PathBuf>("FILE")
        .fallback(PathBuf::from(DEFAULT_OUTPUT_FILE))
        .debug_fallback();
    let format = long("format")
        .help("Results format, overrides the output file extension")
        .argument::<ReportFormat>("csv|tsv|json")
        .optional();
    let breakdown_dir = long("breakdown-dir")
        .help("Directory for per-submission judge breakdowns, GradingBreakdowns unless configured")
        .argument::<PathBuf>("DIR")
        .optional();
    let config = config_file();
    let model = long("model")
        .help("Judge model or config alias, overrides OPENAI_MODEL")
        .argument::<String>("NAME")
        .optional();
    let jobs = short('j')
        .long("jobs")
        .help("Judge calls in flight at once")
        .argument::<usize>("N")
        .optional();

    let grade = construct!(GradeArgs {
        scoring_sheet,
        assignment,
        submissions,
        output,
        format,
        breakdown_dir,
        config,
        model,
        jobs,
    })
    .map(Cmd::Grade)
    .to_options()
    .command("grade")
    .help("Grade every .java file in a folder");

    let file = positional::<PathBuf>("FILENAME").help("Java file to check");
    let check = construct!(Cmd::Check(file, config_file()))
        .to_options()
        .command("check")
        .help("Run the style checks on one file, without calling the judge");

    let verbose = short('v').long("verbose").help("Log debug output").switch();
    let cmd = construct!([grade, check]);

    construct!(Opts { verbose, cmd })
        .to_options()
        .descr("Grades Java submissions with an LLM judge and style deductions")
        .run()
}

/// Grades a folder and writes the results.
async fn grade(args: GradeArgs) -> Result<()> {
    let mut config = GraderConfig::load(args.config.as_deref())?;
    if let Some(model) = args.model {
        config.set_model(model);
    }
    if let Some(jobs) = args.jobs {
        config.set_max_concurrency(jobs);
    }
    if let Some(dir) = args.breakdown_dir {
        config.set_breakdown_dir(dir);
    }

    let job = GradingJob {
        scoring_sheet: args.scoring_sheet,
        assignment:    args.assignment,
        submissions:   args.submissions,
    };
    let outcome = job.run(&config).await?;

    if !outcome.records.is_empty() {
        println!("{}", results_table(&outcome.records));
    }
    let format = args
        .format
        .unwrap_or_else(|| ReportFormat::from_path(&args.output));
    write_report(&outcome.records, &args.output, format)?;
    eprintln!("{}", format!("Results saved to {}", args.output.display()).green());

    let failures = failure_summary(&outcome.failures);
    if !failures.is_empty() {
        eprint!("{failures}");
    }
    Ok(())
}

/// Prints the style report for one file.
fn check(file: PathBuf, config_file: Option<PathBuf>) -> Result<()> {
    let config = GraderConfig::load(config_file.as_deref())?;
    let raw = RawSubmission::read(&file)?;
    let normalized = raw.normalize();
    let report = analyze(&raw, config.format_scoring(), config.required_boundary_print());

    println!("{}", serde_json::to_string_pretty(&serde_json::json!({
        "identity": normalized.identity(),
        "brace_violations": report.brace_violations,
        "boundary_violation": report.boundary_violation,
        "deduction": report.total(),
    }))
    .context("Could not serialize the style report")?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let opts = options();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(if opts.verbose { Level::DEBUG } else { Level::INFO });
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    match opts.cmd {
        Cmd::Grade(args) => grade(args).await?,
        Cmd::Check(file, config_file) => check(file, config_file)?,
    };

    Ok(())
}
