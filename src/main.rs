use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use fxalert::core::alert::{AlertCondition, AlertId, NewAlert};
use fxalert::core::log::{LogStyle, init_logging};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show the current rate for a currency pair
    Rate { from: String, to: String },
    /// Convert an amount between two currencies
    Convert {
        from: String,
        to: String,
        amount: f64,
    },
    /// Manage rate alerts
    #[command(subcommand)]
    Alerts(AlertCommands),
    /// Run one alert sweep
    Sweep,
    /// Run alert sweeps on an interval until interrupted
    Watch {
        /// Seconds between sweeps, overrides the configured schedule
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

#[derive(Subcommand)]
enum AlertCommands {
    /// Create a rate alert
    Add(AddAlertArgs),
    /// List alerts
    List {
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Delete an alert
    Remove { id: AlertId },
}

#[derive(Args)]
struct AddAlertArgs {
    #[arg(short, long)]
    user: String,
    #[arg(long)]
    from: String,
    #[arg(long)]
    to: String,
    #[arg(short, long)]
    target: f64,
    #[arg(long, value_enum)]
    condition: ConditionArg,
    /// Re-arm the alert 24 hours after it fires
    #[arg(short, long)]
    recurring: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ConditionArg {
    Above,
    Below,
}

impl From<ConditionArg> for AlertCondition {
    fn from(arg: ConditionArg) -> Self {
        match arg {
            ConditionArg::Above => AlertCondition::Above,
            ConditionArg::Below => AlertCondition::Below,
        }
    }
}

impl From<Commands> for fxalert::AppCommand {
    fn from(cmd: Commands) -> fxalert::AppCommand {
        match cmd {
            Commands::Rate { from, to } => fxalert::AppCommand::Rate { from, to },
            Commands::Convert { from, to, amount } => {
                fxalert::AppCommand::Convert { from, to, amount }
            }
            Commands::Alerts(AlertCommands::Add(args)) => fxalert::AppCommand::AddAlert(NewAlert {
                user_id: args.user,
                from_currency: args.from,
                to_currency: args.to,
                target_rate: args.target,
                condition: args.condition.into(),
                recurring: args.recurring,
            }),
            Commands::Alerts(AlertCommands::List { user }) => {
                fxalert::AppCommand::ListAlerts { user_id: user }
            }
            Commands::Alerts(AlertCommands::Remove { id }) => {
                fxalert::AppCommand::RemoveAlert { id }
            }
            Commands::Sweep => fxalert::AppCommand::Sweep,
            Commands::Watch { interval } => fxalert::AppCommand::Watch {
                interval_seconds: interval,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let style = if matches!(cli.command, Some(Commands::Watch { .. })) {
        LogStyle::Daemon
    } else {
        LogStyle::Interactive
    };
    init_logging(cli.verbose, style);

    let result = match cli.command {
        Some(Commands::Setup) => fxalert::cli::setup::setup(),
        Some(cmd) => fxalert::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
