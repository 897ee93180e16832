use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use typedmath::core::config::DEFAULT_CONFIG_FILE;
use typedmath::dsl::{bracket_balance, describe, execute_line, statements, DslOutput};
use typedmath::{EngineConfig, Registry};

#[derive(Parser)]
#[command(name = "typedmath")]
#[command(version = "0.1")]
#[command(about = "typedmath: typed elementwise rounding over scalars, sequences and matrices", long_about = None)]
struct Cli {
    /// Output format: 'display' (human-readable) or 'json' (operand codec)
    #[arg(long, value_enum, default_value = "display", global = true)]
    format: OutputFormat,

    /// Config file (defaults to $TYPEDMATH_CONFIG or ./typedmath.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Display,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Start REPL (default)
    Repl,
    /// Run a script file, one call per statement
    Run {
        /// Path to the script file
        file: PathBuf,
    },
    /// Evaluate a single call, e.g. `eval fix 3.18 1`
    Eval {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        line: Vec<String>,
    },
    /// List registered operations and their signatures
    Ops,
    /// Write a default typedmath.toml
    Init,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::load(),
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(Commands::Init) = cli.command {
        return handle_init();
    }

    let registry = Registry::with_config(config)?;

    match cli.command {
        Some(Commands::Run { file }) => {
            let content = fs::read_to_string(&file)?;
            let stmts = match statements(&content) {
                Ok(stmts) => stmts,
                Err(e) => {
                    eprintln!("{}: {}", "Error".red(), e);
                    std::process::exit(1);
                }
            };
            for (line_no, stmt) in stmts {
                match execute_line(&registry, &stmt, line_no) {
                    Ok(output) => print_output(&output, cli.format),
                    Err(e) => {
                        eprintln!("Error on line {}: {}", line_no, e);
                        std::process::exit(1);
                    }
                }
            }
        }
        Some(Commands::Eval { line }) => match execute_line(&registry, &line.join(" "), 1) {
            Ok(output) => print_output(&output, cli.format),
            Err(e) => {
                eprintln!("{}: {}", "Error".red(), e);
                std::process::exit(1);
            }
        },
        Some(Commands::Ops) => println!("{}", describe(&registry)),
        Some(Commands::Repl) | None => run_repl(&registry, cli.format)?,
        Some(Commands::Init) => {}
    }

    Ok(())
}

fn print_output(output: &DslOutput, format: OutputFormat) {
    if matches!(output, DslOutput::None) {
        return;
    }
    match format {
        OutputFormat::Display => println!("{}", output),
        OutputFormat::Json => println!("{}", output.to_json()),
    }
}

fn handle_init() -> Result<(), Box<dyn std::error::Error>> {
    if !Path::new(DEFAULT_CONFIG_FILE).exists() {
        fs::write(DEFAULT_CONFIG_FILE, EngineConfig::default_toml())?;
        println!("Created default configuration: {}", DEFAULT_CONFIG_FILE.green());
    } else {
        println!(
            "Configuration file already exists: {}",
            DEFAULT_CONFIG_FILE.yellow()
        );
    }
    Ok(())
}

fn run_repl(registry: &Registry, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let mut rl = DefaultEditor::new()?;
    let history_path = ".typedmath_history";

    if rl.load_history(history_path).is_err() {
        // No history yet
    }

    println!("{}", "typedmath REPL v0.1".bold().blue());
    println!("Type 'ops' to list operations, 'exit' or Ctrl-D to quit.");

    let mut current_cmd = String::new();
    let mut balance = 0;

    loop {
        let prompt = if balance == 0 { ">>  " } else { " ..  " };
        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.eq_ignore_ascii_case("EXIT") {
                    break;
                }

                rl.add_history_entry(trimmed)?;

                if !current_cmd.is_empty() {
                    current_cmd.push(' ');
                }
                current_cmd.push_str(trimmed);
                balance += bracket_balance(trimmed);

                if balance <= 0 {
                    match execute_line(registry, &current_cmd, 1) {
                        Ok(output) => print_output(&output, format),
                        Err(e) => eprintln!("{}: {}", "Error".red(), e),
                    }
                    current_cmd.clear();
                    balance = 0;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                current_cmd.clear();
                balance = 0;
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(history_path);
    Ok(())
}
