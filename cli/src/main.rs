//! CLI entrypoint for triad
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;
mod progress;

use anyhow::{Context, Result, bail};
use clap::Parser;
use commands::{Cli, Command, EvaluateArgs, RunArgs};
use indicatif::ProgressBar;
use progress::{ConsoleProgress, SuspendingWriter};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};
use triad_application::{
    AnswerStore, BatchInput, CodeAgent, NoProgress, Orchestrator, RetryingInvoker,
    RunBatchUseCase, SolveProgressNotifier,
};
use triad_domain::{
    AnswerRecord, ExecutionCapabilities, Task, TaskId, accuracy_by_level, evaluate,
};
use triad_infrastructure::{
    ChatCompletionsInvoker, ConfigLoader, JsonlAnswerLog, LocalDirectoryLister, PythonSandbox,
    load_tasks,
};

const ANSWERS_FILE: &str = "answers.jsonl";
const LOG_FILE: &str = "logs.txt";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Run(args) => run(&cli, args).await,
        Command::Evaluate(args) => {
            let _guard = init_tracing(cli.verbose, None, None);
            evaluate_answers(args)
        }
    }
}

/// Install the stderr subscriber and, with a run directory, a file layer.
/// Stderr lines are written around `bar` so they do not tear the progress display.
fn init_tracing(
    verbose: u8,
    log_dir: Option<&Path>,
    bar: Option<ProgressBar>,
) -> Option<WorkerGuard> {
    // Initialize logging based on verbosity level
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, LOG_FILE));
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(move || SuspendingWriter::new(bar.clone())),
        )
        .with(file_layer)
        .init();
    guard
}

async fn run(cli: &Cli, args: &RunArgs) -> Result<()> {
    // Configuration errors are fatal before any work starts
    let config = if cli.no_config {
        ConfigLoader::load_defaults()?
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };
    let model = config.validate()?;
    let mut params = config.execution_params();
    if let Some(mode) = args.agent_mode {
        params = params.with_agent_mode(mode.into());
    }

    let corpus = match args.corpus.clone().or_else(|| config.corpus.path.clone()) {
        Some(path) => path,
        None => bail!("No corpus directory. Pass --corpus or set corpus.path."),
    };
    if !corpus.is_dir() {
        bail!(
            "Corpus directory does not exist: {} (checked at startup; pass --corpus or set corpus.path to an existing directory)",
            corpus.display()
        );
    }

    let run_id = args
        .run_id
        .clone()
        .unwrap_or_else(|| chrono::Local::now().format("%Y%m%d_%H%M%S").to_string());
    let run_dir = config.output.runs_dir.join(&run_id);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("Cannot create run directory {}", run_dir.display()))?;

    let console = (!cli.quiet).then(|| Arc::new(ConsoleProgress::new()));
    let _guard = init_tracing(
        cli.verbose,
        Some(&run_dir),
        console.as_ref().map(|c| c.bar().clone()),
    );
    info!("Starting run {} in {}", run_id, run_dir.display());
    if !params.agent_mode.suits_model(&model.id) {
        warn!(
            "Agent mode '{}' may not suit model '{}'; reasoning mode is meant for reasoning models and chat mode for the rest",
            params.agent_mode, model.id
        );
    }

    let tasks = load_tasks(&args.tasks)?;

    // === Dependency Injection ===
    let invoker = Arc::new(RetryingInvoker::new(
        Arc::new(ChatCompletionsInvoker::new(&model)?),
        config.retry.clone(),
    ));
    let sandbox = Arc::new(
        PythonSandbox::discover(config.sandbox.python.as_deref(), config.sandbox_timeout())?
            .with_working_dir(&corpus),
    );
    let corpus_display = corpus.display().to_string();
    let agent = Arc::new(
        CodeAgent::new(invoker, sandbox, corpus_display)
            .with_capabilities(ExecutionCapabilities::read_only())
            .with_mode(params.agent_mode)
            .with_max_steps(params.max_agent_steps)
            .with_max_tokens(params.max_tokens),
    );

    let token = CancellationToken::new();
    let orchestrator = Arc::new(
        Orchestrator::new(agent, Arc::new(LocalDirectoryLister::new()), corpus.clone())
            .with_cancellation(token.clone()),
    );
    let store = Arc::new(JsonlAnswerLog::open(run_dir.join(ANSWERS_FILE))?);
    let progress: Arc<dyn SolveProgressNotifier> = match &console {
        Some(console) => console.clone() as Arc<dyn SolveProgressNotifier>,
        None => Arc::new(NoProgress),
    };
    let runner = RunBatchUseCase::new(orchestrator, store.clone()).with_progress(progress);

    let signal_token = token.clone();
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            warn!("Received Ctrl+C, cancelling in-flight tasks");
            signal_token.cancel();
        }
    });

    let mut input = BatchInput::new(tasks.clone())
        .with_max_iterations(args.max_iterations.unwrap_or(params.max_iterations))
        .with_concurrency(args.concurrency.unwrap_or(params.concurrency));
    if !args.task_ids.is_empty() {
        input = input.with_task_ids(args.task_ids.iter().map(TaskId::new));
    }
    if let Some(max) = args.max_tasks {
        input = input.with_max_tasks(max);
    }

    let summary = runner.execute(input).await;
    if let Some(console) = &console {
        console.finish();
    }
    let summary = summary?;
    println!(
        "Run {}: {} solved, {} failed, {} skipped (answers in {})",
        run_id,
        summary.succeeded,
        summary.failed,
        summary.skipped,
        store.path().display()
    );

    if tasks.iter().any(Task::has_ground_truth) {
        report_accuracy(&store.load()?, &tasks, false)?;
    }
    Ok(())
}

fn evaluate_answers(args: &EvaluateArgs) -> Result<()> {
    let answers = JsonlAnswerLog::read(&args.answers)
        .with_context(|| format!("Cannot read answers from {}", args.answers.display()))?;
    let tasks = load_tasks(&args.tasks)?;
    report_accuracy(&answers, &tasks, args.json)
}

/// Score the answered ground-truth tasks and print accuracy per level
fn report_accuracy(answers: &[AnswerRecord], tasks: &[Task], json: bool) -> Result<()> {
    let answered: HashSet<&TaskId> = answers.iter().map(|a| &a.task_id).collect();
    let scored: Vec<Task> = tasks
        .iter()
        .filter(|t| t.has_ground_truth() && answered.contains(&t.task_id))
        .cloned()
        .collect();
    let missing = tasks
        .iter()
        .filter(|t| t.has_ground_truth() && !answered.contains(&t.task_id))
        .count();
    if missing > 0 {
        warn!("{} ground-truth tasks have no answer and are not scored", missing);
    }

    let results = evaluate(answers, &scored)?;
    if json {
        for result in &results {
            println!("{}", serde_json::to_string(result)?);
        }
    }

    let levels = accuracy_by_level(&results);
    let correct: usize = levels.iter().map(|l| l.correct).sum();
    let total: usize = levels.iter().map(|l| l.total).sum();
    for level in &levels {
        println!(
            "  {:<10} {:>4}/{:<4} {:6.2}%",
            level.level,
            level.correct,
            level.total,
            level.accuracy() * 100.0
        );
    }
    if total > 0 {
        println!(
            "  {:<10} {:>4}/{:<4} {:6.2}%",
            "overall",
            correct,
            total,
            correct as f64 / total as f64 * 100.0
        );
    }
    Ok(())
}
