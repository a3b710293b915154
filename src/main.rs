//! tirewatch - Tire Sensor Telemetry Simulator Binary
//!
//! A standalone binary that simulates a tire sensor fleet and serves its
//! telemetry feed, with companion commands to inspect and consume the feed.

use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use tirewatch::telemetry::{self, BroadcastHub, SensorRegistry, TelemetryConfig};
use tirewatch::{
    start_server, AppState, ClientConfig, SensorReading, ServerConfig, TelemetryClient,
    DEFAULT_RECONNECT_DELAY_MS, DEFAULT_TICK_INTERVAL_MS, DEFAULT_WEB_PORT,
};
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "tirewatch")]
#[command(about = "tirewatch - Tire Sensor Telemetry Simulator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "Simulates a fleet of tire sensors and streams classified readings over WebSocket and REST")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Web server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Web server port
    #[arg(short, long, default_value_t = DEFAULT_WEB_PORT)]
    port: u16,

    /// Scheduler tick period in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    interval: u64,

    /// Number of simulated sensors
    #[arg(long, default_value_t = 4)]
    sensors: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulator and serve the telemetry feed (default)
    Serve(ServeArgs),

    /// Print one freshly initialized snapshot batch and exit
    Snapshot(SnapshotArgs),

    /// Consume a telemetry feed and render the latest readings
    Watch(WatchArgs),
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[derive(Args)]
struct WatchArgs {
    /// Feed URL; defaults to the local server at the configured port
    #[arg(long)]
    url: Option<String>,

    /// Reconnection delay in milliseconds
    #[arg(long, default_value_t = DEFAULT_RECONNECT_DELAY_MS)]
    reconnect_delay: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Serve(args)) => serve_command(&cli, args).await?,
        Some(Commands::Snapshot(args)) => snapshot_command(&cli, args)?,
        Some(Commands::Watch(args)) => watch_command(&cli, args).await?,
        None => serve_command(&cli, &ServeArgs::default()).await?,
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

async fn serve_command(cli: &Cli, args: &ServeArgs) -> anyhow::Result<()> {
    info!("Starting tirewatch telemetry server...");

    let telemetry_config = TelemetryConfig::default()
        .with_tick_interval(Duration::from_millis(cli.interval))
        .with_positions(TelemetryConfig::positions_for_count(cli.sensors));

    let registry = SensorRegistry::new(telemetry_config.positions.clone());
    let state = AppState::new(registry, BroadcastHub::default());

    let scheduler = telemetry::scheduler::start(
        state.registry.clone(),
        state.hub.clone(),
        telemetry_config.tick_interval,
    );

    info!(
        "Simulating {} tire sensors, broadcasting every {}ms",
        telemetry_config.positions.len(),
        cli.interval
    );

    let server_config = ServerConfig::new(&cli.host, cli.port).with_cors(!args.no_cors);
    let result = start_server(server_config, state).await;

    scheduler.shutdown().await;
    result?;

    Ok(())
}

fn snapshot_command(cli: &Cli, args: &SnapshotArgs) -> anyhow::Result<()> {
    let registry = SensorRegistry::new(TelemetryConfig::positions_for_count(cli.sensors));
    let readings = registry.readings();

    match args.format.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&readings)?;
            println!("{}", json);
        }
        "pretty" => {
            println!("Tire sensor snapshot ({} sensors)", readings.len());
            println!("=================================");
            print_readings(&readings);
        }
        _ => {
            error!("Unsupported format: {}. Use 'json' or 'pretty'", args.format);
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn watch_command(cli: &Cli, args: &WatchArgs) -> anyhow::Result<()> {
    let url = args.url.clone().unwrap_or_else(|| {
        let host = if cli.host == "0.0.0.0" {
            "127.0.0.1"
        } else {
            cli.host.as_str()
        };
        format!("ws://{}:{}/ws", host, cli.port)
    });

    println!("Watching telemetry feed at {}", url);

    let client = TelemetryClient::connect(
        ClientConfig::new(url).with_reconnect_delay(Duration::from_millis(args.reconnect_delay)),
    );

    let render = async {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;

            if client.is_connected().await {
                println!("[connected]");
            } else if let Some(error) = client.last_error().await {
                println!("[disconnected: {}]", error);
            } else {
                println!("[disconnected]");
            }

            print_readings(&client.latest().await);
        }
    };

    tokio::select! {
        _ = render => {}
        _ = tokio::signal::ctrl_c() => {}
    }

    client.shutdown().await;

    Ok(())
}

fn print_readings(readings: &[SensorReading]) {
    for reading in readings {
        println!(
            "  {:<12} {:>6.2} PSI  {:>6.2} C  {:>5.2} mm  [{}]",
            reading.position, reading.pressure, reading.temperature, reading.tread_depth,
            reading.status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["tirewatch", "--port", "9090"]).unwrap();
        assert_eq!(cli.port, 9090);
    }

    #[test]
    fn test_default_values() {
        let cli = Cli::try_parse_from(["tirewatch"]).unwrap();
        assert_eq!(cli.port, DEFAULT_WEB_PORT);
        assert_eq!(cli.interval, DEFAULT_TICK_INTERVAL_MS);
        assert_eq!(cli.host, "0.0.0.0");
        assert_eq!(cli.sensors, 4);
    }

    #[test]
    fn test_watch_args() {
        let cli = Cli::try_parse_from([
            "tirewatch",
            "watch",
            "--url",
            "ws://example.local:3001/ws",
            "--reconnect-delay",
            "500",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Watch(args)) => {
                assert_eq!(args.url.as_deref(), Some("ws://example.local:3001/ws"));
                assert_eq!(args.reconnect_delay, 500);
            }
            _ => panic!("expected watch subcommand"),
        }
    }
}
