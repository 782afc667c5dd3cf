//! Command-line interface for smellcheck.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde_json::{json, Value};

use crate::config::{self, Config, LongFunctionConfig};
use crate::detect::{Analysis, RuleSet, Runner};
use crate::error::Error;
use crate::refactor::{self, RefactorRequest, DEFAULT_GOAL};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Path argument meaning standard input.
const STDIN: &str = "-";

/// Detect code smells in Python snippets.
///
/// Smellcheck reports over-long functions and magic numbers, and can emit a
/// refactor request payload for an external model or validate the model's
/// reply.
#[derive(Parser)]
#[command(name = "smellcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one or more Python snippets
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),
    /// Validate a refactoring model reply
    Validate(ValidateArgs),
    /// List the available detector rules
    Rules(RulesArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Files to analyze (`-` reads standard input)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Rules to run, in order (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub rules: Option<Vec<String>>,

    /// Statement threshold for long functions
    #[arg(long)]
    pub max_statements: Option<usize>,

    /// Order issues by line and column instead of traversal order
    #[arg(long)]
    pub sort: bool,

    /// Print the refactor request payload instead of the report
    #[arg(long)]
    pub request: bool,

    /// Refactoring goal for --request
    #[arg(long, default_value = DEFAULT_GOAL, requires = "request")]
    pub goal: String,
}

/// Arguments for the validate command.
#[derive(Parser)]
pub struct ValidateArgs {
    /// Reply file (`-` reads standard input)
    pub path: PathBuf,
}

/// Arguments for the rules command.
#[derive(Parser)]
pub struct RulesArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Read a snippet from a file or standard input.
fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == STDIN {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))
}

/// Load the config and apply command-line overrides.
fn resolve_config(
    path: Option<&Path>,
    rules: Option<&[String]>,
    max_statements: Option<usize>,
) -> anyhow::Result<Config> {
    let mut config = config::load(path)?;
    if let Some(ids) = rules {
        config.rules = Some(ids.to_vec());
    }
    if let Some(max) = max_statements {
        config.long_function = Some(LongFunctionConfig {
            max_statements: Some(max),
        });
    }
    config::validate(&config)?;
    Ok(config)
}

/// Result of analyzing one input.
struct Outcome {
    name: String,
    source: String,
    result: crate::Result<Analysis>,
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    analyze_into(&mut out, args)
}

/// Analyze every input and write the results to `out`.
///
/// The output shape follows the number of inputs named on the command line,
/// not the number that parsed: one input prints its document bare, several
/// print an array.
fn analyze_into<W: Write>(out: &mut W, args: &AnalyzeArgs) -> anyhow::Result<i32> {
    let config = match resolve_config(
        args.config.as_deref(),
        args.rules.as_deref(),
        args.max_statements,
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let rules = RuleSet::from_config(&config)?;

    let mut inputs = Vec::with_capacity(args.paths.len());
    for path in &args.paths {
        match read_input(path) {
            Ok(source) => inputs.push((path.to_string_lossy().to_string(), source)),
            Err(e) => {
                eprintln!("Error: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    // Inputs are independent; the rule set is shared read-only.
    let runner = Runner::new(&rules);
    let outcomes: Vec<Outcome> = inputs
        .into_par_iter()
        .map(|(name, source)| {
            let result = runner.run(&source).map(|mut analysis| {
                if args.sort {
                    analysis.report = analysis.report.sorted_by_location();
                }
                analysis
            });
            Outcome {
                name,
                source,
                result,
            }
        })
        .collect();

    let single = args.paths.len() == 1;
    let mut exit = EXIT_SUCCESS;
    let mut documents = Vec::new();

    for outcome in &outcomes {
        let analysis = match &outcome.result {
            Ok(a) => a,
            Err(e) => {
                exit = EXIT_ERROR;
                report_failure(out, args.format, &outcome.name, e)?;
                continue;
            }
        };

        if !analysis.report.is_empty() && exit == EXIT_SUCCESS {
            exit = EXIT_FAILED;
        }

        if args.request {
            let request = RefactorRequest::new(&outcome.source, &analysis.report)?
                .with_goal(args.goal.clone());
            documents.push(serde_json::to_value(request)?);
            continue;
        }

        match args.format {
            OutputFormat::Json if single => report::write_json(out, &analysis.report)?,
            OutputFormat::Json => documents.push(json!({
                "source": outcome.name,
                "issues": report::to_transport_form(&analysis.report)?,
            })),
            OutputFormat::Pretty => report::write_pretty(out, &outcome.name, analysis)?,
        }
    }

    if args.request || (args.format == OutputFormat::Json && !single) {
        write_documents(out, documents, single)?;
    }

    Ok(exit)
}

fn report_failure<W: Write>(
    out: &mut W,
    format: OutputFormat,
    name: &str,
    err: &Error,
) -> anyhow::Result<()> {
    match (format, err.as_syntax()) {
        (OutputFormat::Pretty, Some(syntax)) => {
            report::write_rejected(out, name, &syntax.to_string())?;
        }
        _ => eprintln!("Error: {}: {}", name, err),
    }
    Ok(())
}

/// With `single`, the one document prints bare, or nothing when its input
/// failed. Otherwise the documents print as an array, possibly empty.
fn write_documents<W: Write>(
    out: &mut W,
    mut documents: Vec<Value>,
    single: bool,
) -> anyhow::Result<()> {
    let doc = if single {
        match documents.pop() {
            Some(doc) => doc,
            None => return Ok(()),
        }
    } else {
        Value::Array(documents)
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
    Ok(())
}

/// Run the validate command.
pub fn run_validate(args: &ValidateArgs) -> anyhow::Result<i32> {
    let raw = match read_input(&args.path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match refactor::validate(&raw) {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: invalid reply: {}", e);
            Ok(EXIT_FAILED)
        }
    }
}

/// Run the rules command.
pub fn run_rules(args: &RulesArgs) -> anyhow::Result<i32> {
    let config = match config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let rules = RuleSet::from_config(&config)?;

    println!("Registered rules:");
    println!();
    for rule in rules.iter() {
        println!("  {:<16} {:<14} {}", rule.id(), rule.name(), rule.description());
    }
    println!();
    println!("Settings:");
    println!("  long_function.max_statements   {}", config.max_statements());
    println!("  magic_number.allowed_values    {:?}", config.allowed_values());
    println!("  magic_number.allow_assignments {}", config.allow_assignments());

    Ok(EXIT_SUCCESS)
}
