use anyhow::Context;
use clap::Parser;
use std::io::{BufRead, BufReader};
use std::time::Duration;
use thirth::config::Config;
use thirth::interpreter::{Interpreter, RunResult};
use thirth::vm::{OverflowPolicy, WordStats};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run a thirth program, one line at a time.
#[derive(Parser, Debug)]
#[command()]
struct Args {
    /// File containing a thirth program. Reads standard input if omitted.
    #[arg()]
    file: Option<String>,
    /// Maximum stack size. Overrides THIRTH_MAX_STACK_SIZE.
    #[arg(long, short = 'm')]
    max_stack_size: Option<usize>,
    /// What arithmetic does on overflow (`checked` or `wrapping`).
    /// Overrides THIRTH_OVERFLOW.
    #[arg(long)]
    overflow: Option<OverflowPolicy>,
    /// Print statistics after running the program.
    #[arg(long, short = 's')]
    stats: bool,
}

fn open_input(file: Option<&str>) -> anyhow::Result<Box<dyn BufRead>> {
    Ok(match file {
        Some(path) => {
            let file = std::fs::File::open(path).with_context(|| format!("cannot open {path}"))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(std::io::stdin().lock()),
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(max_stack_size) = args.max_stack_size {
        config.max_stack_size = max_stack_size;
    }
    if let Some(overflow) = args.overflow {
        config.overflow = overflow;
    }
    info!(?config, "starting session");

    let input = open_input(args.file.as_deref())?;
    let mut interpreter = Interpreter::with_tracer(config.vm_options(), WordStats::new(0));

    let start_time = std::time::Instant::now();
    let result = interpreter.run(input, &mut std::io::stdout().lock(), &mut std::io::stderr().lock())?;
    let elapsed = start_time.elapsed();

    if args.stats {
        print_stats(&result, interpreter.tracer(), elapsed);
    }

    Ok(())
}

fn print_stats(result: &RunResult, stats: &WordStats, elapsed: Duration) {
    eprintln!("Execution time: {:?}", elapsed);
    eprintln!("Lines read: {} ({} failed)", result.lines_read, result.lines_failed);
    eprintln!(
        "Words executed: {} ({} operators, {} failed)",
        result.words_executed, stats.instructions, stats.failed_instructions
    );
    eprintln!("Maximum stack depth: {}, final depth: {}", stats.max_depth, stats.depth);
}
