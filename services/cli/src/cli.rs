use crate::demo::{run_demo, DemoArgs};
use crate::infra::print_rules;
use crate::replay::{run_replay, ReplayArgs};
use clap::{Args, Parser, Subcommand};
use purchase_rewards::config::AppConfig;
use purchase_rewards::error::AppError;
use purchase_rewards::telemetry;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "Purchase Rewards",
    about = "Evaluate threshold discount rules against customer purchases",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay the reference purchase sequence for a single customer (default command)
    Demo(DemoArgs),
    /// Register customers and replay purchases from CSV exports
    Replay(ReplayArgs),
    /// Print the active discount rules
    Rules(RulesArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct RulesArgs {
    /// Emit the rule set as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(
        ?config.environment,
        window_days = config.discounts.weekly_window_days,
        "configuration loaded"
    );

    match command {
        Command::Demo(args) => run_demo(args, &config.discounts),
        Command::Replay(args) => run_replay(args, &config.discounts),
        Command::Rules(args) => print_rules(&config.discounts, args.json),
    }
}
