mod test_runner;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;

use sfc::pad::PadMode;
use sfc::parser::ParseWarning;
use sfc::{MapOptions, ParseOptions, ParseResult};

const SUBCOMMANDS: &[&str] = &["split", "test", "help"];

/// Environment variable holding the log filter, e.g. `SFC_LOG=sfc=trace`.
const LOG_ENV: &str = "SFC_LOG";

#[derive(Parser)]
#[command(name = "sfc", version, about = "Single-file component splitter")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split a component into its blocks
    Split(SplitArgs),

    /// Run .test.vue fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct SplitArgs {
    /// Component file to split
    file: String,

    /// Pad block content so line numbers match the file: none, line or space
    #[arg(long, default_value = "none")]
    pad: PadMode,

    /// Attach source maps to script and style blocks
    #[arg(long)]
    map: bool,

    /// Print only the content of the first block of this type
    #[arg(short, long)]
    block: Option<String>,

    /// Which block of that type to print, counting from 0
    #[arg(long, default_value_t = 0, requires = "block")]
    index: usize,

    /// List blocks with their positions instead of printing JSON
    #[arg(long)]
    list_blocks: bool,

    /// Only report warnings (exit 1 if there are any)
    #[arg(long)]
    check: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.vue file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    init_logging();

    // `sfc file.vue` works like `sfc split file.vue`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args
        .iter()
        .skip(1)
        .position(|a| !a.starts_with('-'))
        .map(|i| i + 1)
    {
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(pos, "split".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    match cli.command {
        Command::Split(split_args) => do_split(split_args, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn do_split(args: SplitArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            process::exit(1);
        }
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    let options = ParseOptions {
        pad: args.pad,
        map: args.map.then(|| MapOptions::new(args.file.clone())),
    };
    tracing::debug!(file = %args.file, pad = %options.pad, map = args.map, "splitting");

    let result = sfc::parser::Parser::new(&source, file_id).parse(&options);

    let writer = StandardStream::stderr(color_choice);
    emit_warnings(&writer, &files, &result.warnings);

    if args.check {
        if result.warnings.is_empty() {
            eprintln!("ok: {} split cleanly", args.file);
            return;
        }
        process::exit(1);
    }

    if let Some(kind) = &args.block {
        print_block(&result, kind, args.index);
        return;
    }

    if args.list_blocks {
        print_block_list(&result);
        return;
    }

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("error: cannot serialize result: {}", e);
            process::exit(1);
        }
    }
}

fn print_block(result: &ParseResult, kind: &str, index: usize) {
    let found = result
        .blocks()
        .into_iter()
        .filter(|b| b.kind.as_str().eq_ignore_ascii_case(kind))
        .nth(index);

    match found {
        Some(block) => print!("{}", block.content),
        None => {
            eprintln!("error: no <{}> block at index {}", kind, index);
            process::exit(1);
        }
    }
}

fn print_block_list(result: &ParseResult) {
    for block in result.blocks() {
        let attrs: Vec<String> = block
            .attrs
            .iter()
            .map(|(name, value)| match value.as_str() {
                Some(v) => format!("{}=\"{}\"", name, v),
                None => name.clone(),
            })
            .collect();
        println!(
            "{:<10} {:>4}:{:<4} {}",
            block.kind,
            block.start.line,
            block.start.column,
            attrs.join(" ")
        );
    }
}

fn emit_warnings(
    writer: &StandardStream,
    files: &SimpleFiles<String, String>,
    warnings: &[ParseWarning],
) {
    let config = term::Config::default();
    for warning in warnings {
        let diagnostic = warning.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, &diagnostic);
    }
}
