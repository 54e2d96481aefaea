//! tgsync CLI - run one reconciliation from the command line.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tgsync_core::{extract_addresses, Task};
use tgsync_reconciler::config::{
    CLUSTER_ENV, EMPTY_SERVICE_POLICY_ENV, SERVICE_ENV, TARGET_GROUP_ENV,
};
use tgsync_reconciler::{
    EmptyServicePolicy, Fixture, HttpClient, HttpTargetRegistry, HttpTaskDirectory,
    InvocationResponse, MemoryRegistry, Reconciler, ReconcilerConfig,
};

/// tgsync CLI - target group reconciliation tool
#[derive(Parser)]
#[command(name = "tgsync")]
#[command(about = "Reconcile a target group with a service's running tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile once for a lifecycle event
    Invoke(InvokeArgs),

    /// Print the addresses extracted from a JSON task list
    Extract {
        /// Task list file ("-" for stdin)
        #[arg(short, long)]
        tasks: String,
    },
}

#[derive(Args)]
struct InvokeArgs {
    /// Event payload file ("-" for stdin)
    #[arg(short, long)]
    event: String,

    /// Reconcile against a JSON snapshot instead of the control API (wins over --api-url)
    #[arg(long, required_unless_present = "api_url")]
    fixture: Option<PathBuf>,

    /// Base URL of the control API
    #[arg(long, env = "CONTROL_API_URL")]
    api_url: Option<String>,

    /// Control API request timeout in seconds
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    /// Cluster name
    #[arg(long, env = CLUSTER_ENV)]
    cluster: String,

    /// Service name
    #[arg(long, env = SERVICE_ENV)]
    service: String,

    /// Target group handle
    #[arg(long, env = TARGET_GROUP_ENV)]
    target_group: String,

    /// Behavior of STOPPED events when no task is running (abort | drain-all)
    #[arg(long, env = EMPTY_SERVICE_POLICY_ENV, default_value = "abort")]
    empty_service_policy: EmptyServicePolicy,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tgsync_reconciler=warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Invoke(args) => {
            let succeeded = invoke(args).await?;
            if !succeeded {
                std::process::exit(1);
            }
        }
        Commands::Extract { tasks } => {
            extract(&tasks)?;
        }
    }

    Ok(())
}

/// Run one reconciliation. Returns whether it succeeded.
async fn invoke(args: InvokeArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let payload: Value = serde_json::from_str(&read_input(&args.event)?)?;
    let config = ReconcilerConfig::new(args.cluster, args.service, args.target_group)?
        .with_empty_service_policy(args.empty_service_policy);

    let (reconciler, registry) = match (&args.fixture, &args.api_url) {
        (Some(path), _) => {
            let fixture: Fixture = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            let (directory, registry) = fixture.into_collaborators();
            let registry = Arc::new(registry);
            debug!(fixture = %path.display(), "Using in-memory collaborators");
            (
                Reconciler::new(config, Arc::new(directory), registry.clone()),
                Some(registry),
            )
        }
        (None, Some(url)) => {
            debug!(api_url = %url, "Using control API collaborators");
            let client = HttpClient::new(url, Duration::from_secs(args.timeout_secs))?;
            (
                Reconciler::new(
                    config,
                    Arc::new(HttpTaskDirectory::new(client.clone())),
                    Arc::new(HttpTargetRegistry::new(client)),
                ),
                None,
            )
        }
        (None, None) => return Err("either --fixture or --api-url is required".into()),
    };

    debug!(
        cluster = %reconciler.config().cluster,
        target_group = %reconciler.config().target_group,
        "Invoking reconciler"
    );
    let result = reconciler.handle(&payload).await;
    let succeeded = result.is_ok();
    print_response(&InvocationResponse::from(result), registry.as_deref()).await?;

    Ok(succeeded)
}

async fn print_response(
    response: &InvocationResponse,
    registry: Option<&MemoryRegistry>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = match registry {
        Some(registry) => serde_json::json!({
            "response": response,
            "targets": registry.targets().await,
        }),
        None => serde_json::to_value(response)?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn extract(source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tasks: Vec<Task> = serde_json::from_str(&read_input(source)?)?;
    for address in extract_addresses(&tasks) {
        println!("{}", address);
    }
    Ok(())
}

fn read_input(source: &str) -> std::io::Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVOKE_WITH_FIXTURE: [&str; 12] = [
        "tgsync",
        "invoke",
        "--event",
        "e.json",
        "--fixture",
        "f.json",
        "--cluster",
        "c",
        "--service",
        "s",
        "--target-group",
        "tg",
    ];

    #[test]
    fn test_fixture_accepted_when_api_url_exported() {
        std::env::set_var("CONTROL_API_URL", "http://control.internal");

        let cli = Cli::try_parse_from(INVOKE_WITH_FIXTURE).unwrap();

        match cli.command {
            Commands::Invoke(args) => {
                assert_eq!(args.fixture, Some(PathBuf::from("f.json")));
                assert_eq!(args.api_url.as_deref(), Some("http://control.internal"));
            }
            Commands::Extract { .. } => panic!("Expected Invoke"),
        }
    }
}
