//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use triad_domain::AgentMode;

/// Prompt style for the role agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AgentModeArg {
    /// Bare code blocks, for models that reason before answering
    Reasoning,
    /// Thought/Code scaffold, for chat models
    Chat,
}

impl From<AgentModeArg> for AgentMode {
    fn from(arg: AgentModeArg) -> Self {
        match arg {
            AgentModeArg::Reasoning => AgentMode::Reasoning,
            AgentModeArg::Chat => AgentMode::Chat,
        }
    }
}

/// CLI arguments for triad
#[derive(Parser, Debug)]
#[command(name = "triad")]
#[command(author, version, about = "Multi-role agents for data-analysis questions")]
#[command(long_about = r#"
triad answers data-analysis questions over a corpus of data files and manuals
with three cooperating roles:

1. Librarian: catalogs the corpus once and extracts task-specific knowledge
2. Strategist: plans a trajectory and evaluates each executed step
3. Executor: writes and runs read-only Python code for each step

Configuration files are loaded from (in priority order):
1. TRIAD_* environment variables (e.g. TRIAD_MODEL__API_KEY)
2. --config <path>     Explicit config file
3. ./triad.toml        Project-level config
4. ~/.config/triad/config.toml   Global config
5. BASE_URL, API_KEY, MODEL environment variables
--no-config skips 2-4.

Example:
  triad run --tasks tasks.jsonl --corpus data/context
  triad run --tasks tasks.jsonl --run-id baseline --max-tasks 20 -c 4
  triad run --tasks tasks.jsonl --agent-mode reasoning
  triad evaluate --answers runs/baseline/answers.jsonl --tasks dev.jsonl
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress per-task progress lines
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files (environment variables still apply)
    #[arg(long, global = true, conflicts_with = "config")]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Solve a task file, appending answers to the run's answer log
    Run(RunArgs),
    /// Score an existing answer log against tasks with ground truth
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSONL task file
    #[arg(long, value_name = "PATH")]
    pub tasks: PathBuf,

    /// Corpus directory (overrides `corpus.path`)
    #[arg(long, value_name = "DIR")]
    pub corpus: Option<PathBuf>,

    /// Run name; reuse a previous name to resume it
    #[arg(long, value_name = "NAME")]
    pub run_id: Option<String>,

    /// Only solve these task ids (can be specified multiple times)
    #[arg(long = "task-id", value_name = "ID", conflicts_with = "max_tasks")]
    pub task_ids: Vec<String>,

    /// Only solve the first N tasks
    #[arg(long, value_name = "N")]
    pub max_tasks: Option<usize>,

    /// Plan/execute/evaluate iterations per task
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Tasks solved at once
    #[arg(short, long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Prompt style (overrides `execution.agent_mode`)
    #[arg(long, value_enum, value_name = "MODE")]
    pub agent_mode: Option<AgentModeArg>,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Answer log (JSONL with task_id and agent_answer)
    #[arg(long, value_name = "PATH")]
    pub answers: PathBuf,

    /// JSONL task file carrying `answer` and `level`
    #[arg(long, value_name = "PATH")]
    pub tasks: PathBuf,

    /// Print per-task scores as JSON lines
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from([
            "triad", "-vv", "run", "--tasks", "t.jsonl", "--task-id", "5", "--task-id", "7",
            "-c", "3",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.task_ids, vec!["5", "7"]);
        assert_eq!(args.concurrency, Some(3));
        assert!(args.agent_mode.is_none());
    }

    #[test]
    fn test_parse_agent_mode() {
        let cli = Cli::parse_from([
            "triad", "run", "--tasks", "t.jsonl", "--agent-mode", "reasoning", "--no-config",
        ]);
        assert!(cli.no_config);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.agent_mode.map(AgentMode::from), Some(AgentMode::Reasoning));

        let result = Cli::try_parse_from([
            "triad", "run", "--tasks", "t.jsonl", "--agent-mode", "fast",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_config_conflicts_with_config() {
        let result = Cli::try_parse_from([
            "triad", "--config", "a.toml", "--no-config", "run", "--tasks", "t.jsonl",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_task_ids_conflict_with_max_tasks() {
        let result = Cli::try_parse_from([
            "triad", "run", "--tasks", "t.jsonl", "--task-id", "5", "--max-tasks", "2",
        ]);
        assert!(result.is_err());
    }
}
