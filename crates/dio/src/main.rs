mod demo;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dio_core::Dio;
use dio_core::kernel::error::Result;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::demo::demo_plugin;

/// Dio: conditional bean provisioning and a run-once application lifecycle
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    /// Configuration file loaded as overrides (repeatable)
    #[arg(long = "config", value_name = "PATH", global = true)]
    configs: Vec<PathBuf>,

    /// Configuration file loaded as defaults (repeatable)
    #[arg(long = "default-config", value_name = "PATH", global = true)]
    default_configs: Vec<PathBuf>,

    /// Override a property, e.g. `--set app.env=dev` (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment, global = true)]
    assignments: Vec<(String, Value)>,

    /// Fold environment variables into properties (`APP_ENV` -> `app.env`)
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the application and serve until interrupted (default)
    Run {
        /// Stop on its own after this many milliseconds
        #[arg(long, value_name = "MS")]
        exit_after: Option<u64>,
    },
    /// Show which beans would be provisioned with the current properties
    Plan,
    /// Print a property value
    Get {
        /// Dotted property key
        key: String,
    },
}

/// `key=value`; the value is read as JSON when it parses, else as a string.
fn parse_assignment(raw: &str) -> std::result::Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn configure(args: &CliArgs) -> Result<Dio> {
    let mut dio = Dio::new();
    dio.use_plugin(demo_plugin())?;
    for path in &args.default_configs {
        dio.load_default_config(path)?;
    }
    for path in &args.configs {
        dio.load_config(path)?;
    }
    if args.env {
        dio.auto_migrate_env()?;
    }
    for (key, value) in &args.assignments {
        dio.set_property(key, value)?;
    }
    Ok(dio)
}

fn print_plan(dio: &Dio) {
    let plan = dio.plan();
    println!("{} bean(s) queued:", plan.len());
    for entry in plan {
        let name = if entry.name.is_empty() { "-" } else { entry.name.as_str() };
        let condition = entry
            .condition
            .map(|c| c.to_string())
            .unwrap_or_else(|| "always".to_string());
        println!(
            "  [{}] {:<4} {:<12} {:<10} {} ({})",
            entry.position,
            if entry.included { "yes" } else { "no" },
            name,
            entry.mode,
            entry.type_name,
            condition
        );
    }
}

async fn run(mut dio: Dio, exit_after: Option<u64>) -> Result<()> {
    let ctx = CancellationToken::new();
    if let Some(ms) = exit_after {
        let timer = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            timer.cancel();
        });
    }
    dio.run(ctx).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    let dio = match configure(&args) {
        Ok(dio) => dio,
        Err(e) => {
            eprintln!("Failed to configure application: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = match args.command {
        Some(Commands::Plan) => {
            print_plan(&dio);
            Ok(())
        }
        Some(Commands::Get { key }) => match dio.get_property_string(&key) {
            Some(value) => {
                println!("{}", value);
                Ok(())
            }
            None => {
                eprintln!("Property '{}' is not set", key);
                return ExitCode::FAILURE;
            }
        },
        Some(Commands::Run { exit_after }) => run(dio, exit_after).await,
        None => run(dio, None).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}
