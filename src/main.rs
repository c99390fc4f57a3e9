use anyhow::{Context, Result};
use clap::{Args, Parser as ClapParser, Subcommand};
use roboscript::{compile, parse, tokenize, CompileError, TokenKind};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_INPUT: &str = "program.robo";

#[derive(ClapParser)]
#[command(name = "roboscript")]
#[command(about = "Compiler from RoboScript to Arduino sketches", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Input file path (defaults to program.robo)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Inline program text, used instead of a file
    #[arg(long, value_name = "TEXT", conflicts_with = "file")]
    code: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize the program and print tokens
    Lex {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Parse the program and print the AST as JSON
    Parse {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Compile the program to an Arduino sketch
    Compile {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file path
        #[arg(short, long, value_name = "OUTPUT", default_value = "robot_code.cpp")]
        output: PathBuf,

        /// Print the sketch to stdout as well
        #[arg(short, long)]
        print: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Lex { source } => lex_source(&source)?,
        Commands::Parse { source } => parse_source(&source)?,
        Commands::Compile {
            source,
            output,
            print,
        } => compile_source(&source, &output, print)?,
    }

    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Program text and a name for it in messages.
fn read_source(args: &SourceArgs) -> Result<(String, String)> {
    if let Some(code) = &args.code {
        return Ok((code.clone(), "<inline>".to_string()));
    }

    let path = args
        .file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read file '{}'", path.display()))?;
    Ok((text, path.display().to_string()))
}

/// Attach the failing stage to a pipeline error.
fn stage_error(err: impl Into<CompileError>, origin: &str) -> anyhow::Error {
    let err = err.into();
    let kind = err.kind();
    anyhow::Error::new(err).context(format!("{kind} in '{origin}'"))
}

fn lex_source(args: &SourceArgs) -> Result<()> {
    let (input, origin) = read_source(args)?;

    let tokens = tokenize(&input).map_err(|e| stage_error(e, &origin))?;

    println!("Tokens:");
    println!("-------");
    let visible: Vec<_> = tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .collect();
    for (i, token) in visible.iter().enumerate() {
        println!(
            "[{i}] {} = \"{}\" (line {}, col {})",
            token.kind.name(),
            token.lexeme,
            token.pos.line,
            token.pos.column
        );
    }

    println!("\nTotal tokens: {}", visible.len());

    Ok(())
}

fn parse_source(args: &SourceArgs) -> Result<()> {
    let (input, origin) = read_source(args)?;

    let tokens = tokenize(&input).map_err(|e| stage_error(e, &origin))?;
    let program = parse(tokens).map_err(|e| stage_error(e, &origin))?;

    let json = program
        .to_json_pretty()
        .context("failed to serialize the AST")?;
    println!("{json}");

    Ok(())
}

fn compile_source(args: &SourceArgs, output: &Path, print: bool) -> Result<()> {
    let (input, origin) = read_source(args)?;

    // Nothing is written unless every stage succeeded
    let compilation = compile(&input).map_err(|e| stage_error(e, &origin))?;

    let ast_json = compilation
        .program
        .to_json_pretty()
        .context("failed to serialize the AST")?;

    fs::write(output, &compilation.output)
        .with_context(|| format!("failed to write sketch to '{}'", output.display()))?;
    let destination = fs::canonicalize(output)
        .with_context(|| format!("failed to resolve '{}'", output.display()))?;
    info!(path = %destination.display(), "wrote sketch");

    if print {
        println!("{}", compilation.output);
    }

    println!("Arduino code written to: {}", destination.display());
    println!(
        "Statements: {} top-level, {} at all depths",
        compilation.program.statements.len(),
        compilation.statement_count()
    );
    println!("AST JSON size: {} bytes", ast_json.len());
    println!("Output size: {} bytes", compilation.output.len());

    Ok(())
}
