//! Demo binary entry point.
//!
//! Wires a dispatcher with a few device-style routes, two in-memory
//! transports, and the request manager, then runs the manager loop. Useful
//! for poking at the pipeline without real transports.

use std::sync::Arc;

use clap::Parser;
use http::Method;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::body::Json;
use crate::dispatcher::Dispatcher;
use crate::entity::ResponseEntity;
use crate::manager::RequestManager;
use crate::registry;
use crate::runtime_config::RuntimeConfig;
use crate::server::{ChannelTransport, HttpRequest, RequestSource, Transport};

#[derive(Parser)]
#[command(name = "twinserve")]
#[command(about = "Dual-transport HTTP routing core demo", long_about = None)]
pub struct Cli {
    /// Port handed to the transports.
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Worker coroutines (overrides TWINSERVE_WORKERS).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Tick delay in milliseconds (overrides TWINSERVE_TICK_MS).
    #[arg(long)]
    pub tick_ms: Option<u64>,
}

#[derive(serde::Serialize)]
struct DeviceStatus {
    state: &'static str,
    uptime_secs: u64,
}

fn demo_dispatcher() -> anyhow::Result<Dispatcher> {
    let mut dispatcher = Dispatcher::new();

    dispatcher.register(Method::GET, "/api/device/status", |_body, _vars| {
        let status = DeviceStatus {
            state: "ready",
            uptime_secs: 0,
        };
        Ok(ResponseEntity::ok(Json(status))
            .with_header("Content-Type", "application/json")
            .into())
    })?;

    dispatcher.register(Method::GET, "/api/user/{userId}", |_body, vars| {
        let user_id: u32 = vars.get_as("userId")?;
        Ok(ResponseEntity::ok(serde_json::json!({ "userId": user_id })).into())
    })?;

    dispatcher.register(Method::POST, "/api/echo", |body, _vars| {
        Ok(ResponseEntity::ok(body.to_string()).into())
    })?;

    Ok(dispatcher)
}

/// Parse arguments, wire the demo pipeline, and run the manager loop.
pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = RuntimeConfig::from_env();
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.tick = std::time::Duration::from_millis(tick_ms);
    }

    let local: Arc<ChannelTransport> =
        Arc::new(ChannelTransport::new("local-0", RequestSource::LocalServer));
    let cloud: Arc<ChannelTransport> =
        Arc::new(ChannelTransport::new("cloud-0", RequestSource::CloudServer));
    registry::set_local_transport(local.clone());
    registry::set_cloud_transport(cloud.clone());

    let dispatcher = Arc::new(demo_dispatcher()?);
    let manager = Arc::new(RequestManager::new(
        dispatcher,
        local.clone() as Arc<dyn Transport>,
        Some(cloud.clone() as Arc<dyn Transport>),
        &config,
    ));

    if !manager.start_server(cli.port) {
        anyhow::bail!("primary transport failed to start on port {}", cli.port);
    }

    // Seed one request per transport so the loop has something to show.
    local.push_request(HttpRequest::with_generated_id(
        Method::GET,
        "/api/device/status",
        "",
        RequestSource::LocalServer,
    ));
    cloud.push_request(HttpRequest::with_generated_id(
        Method::GET,
        "/api/user/42",
        "",
        RequestSource::CloudServer,
    ));

    info!(port = cli.port, "twinserve demo running, ctrl-c to exit");

    let loop_manager = Arc::clone(&manager);
    let handle = unsafe { may::coroutine::spawn(move || loop_manager.run()) };
    handle
        .join()
        .map_err(|err| anyhow::anyhow!("manager loop failed: {err:?}"))?;
    Ok(())
}
