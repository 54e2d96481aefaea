//! tgsync reconciler trigger server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tgsync_reconciler::config::{
    CLUSTER_ENV, EMPTY_SERVICE_POLICY_ENV, SERVICE_ENV, TARGET_GROUP_ENV,
};
use tgsync_reconciler::{
    http, AppState, EmptyServicePolicy, HttpClient, HttpTargetRegistry, HttpTaskDirectory,
    Reconciler, ReconcilerConfig,
};

/// Serves the lifecycle event endpoint that keeps a target group in sync.
#[derive(Parser, Debug)]
#[command(name = "tgsync-reconciler", about = "Target group reconciler trigger server")]
struct Args {
    /// HTTP bind address
    #[arg(long, env = "TGSYNC_BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: String,

    /// Base URL of the cluster / load balancer control API
    #[arg(long, env = "CONTROL_API_URL")]
    api_url: String,

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
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tgsync_reconciler=info".parse()?))
        .with_target(true)
        .init();

    let config = ReconcilerConfig::new(args.cluster, args.service, args.target_group)?
        .with_empty_service_policy(args.empty_service_policy);
    let client = HttpClient::new(&args.api_url, Duration::from_secs(args.timeout_secs))?;
    let addr: SocketAddr = args.bind_addr.parse()?;

    info!(
        cluster = %config.cluster,
        service = %config.service,
        target_group = %config.target_group,
        empty_service_policy = %config.empty_service_policy,
        api_url = %args.api_url,
        "Starting tgsync reconciler"
    );

    let reconciler = Reconciler::new(
        config,
        Arc::new(HttpTaskDirectory::new(client.clone())),
        Arc::new(HttpTargetRegistry::new(client)),
    );
    let router = http::create_router(AppState::new(reconciler));

    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, router).await?;

    Ok(())
}
