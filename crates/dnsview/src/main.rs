// # dnsview - DNS Records Viewer
//
// Thin terminal front end over dnsview-core:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the HTTP gateway into a ViewController
// 4. Rendering every state change and feeding stdin lines back as input
//
// Record logic, load ordering and submission sequencing live in dnsview-core.
//
// ## Configuration
//
// - `DNSVIEW_BASE_URL`: Records service base URL (default http://localhost:8080)
// - `DNSVIEW_RECORDS_PATH`: Dataset path (default /dns-records)
// - `DNSVIEW_RESOLVE_PATH`: Resolve path (default /resolve)
// - `DNSVIEW_TIMEOUT_SECS`: Per-request timeout (default none)
// - `DNSVIEW_LOG_LEVEL`: trace, debug, info, warn, error (default warn)
//
// ## Input
//
// Each stdin line is a command: `:r` reloads the dataset, `:q` quits, and
// anything else is submitted as a domain to resolve. Ctrl-C quits.
//
// ## Example
//
// ```bash
// export DNSVIEW_BASE_URL=http://records.internal:8080
// export DNSVIEW_LOG_LEVEL=info
//
// dnsview
// ```

mod render;

use anyhow::Result;
use dnsview_core::{ClientConfig, ControllerEvent, EndpointConfig, ViewController, ViewState};
use dnsview_http::HttpGateway;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum DnsviewExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DnsviewExitCode> for ExitCode {
    fn from(code: DnsviewExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    client: ClientConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = EndpointConfig::default();

        let timeout_secs = match lookup("DNSVIEW_TIMEOUT_SECS") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!(
                    "DNSVIEW_TIMEOUT_SECS must be a whole number of seconds. Got: {}",
                    raw
                )
            })?),
            None => None,
        };

        let endpoint = EndpointConfig {
            base_url: lookup("DNSVIEW_BASE_URL").unwrap_or(defaults.base_url),
            records_path: lookup("DNSVIEW_RECORDS_PATH").unwrap_or(defaults.records_path),
            resolve_path: lookup("DNSVIEW_RESOLVE_PATH").unwrap_or(defaults.resolve_path),
            timeout_secs,
        };

        Ok(Self {
            client: ClientConfig {
                endpoint,
                ..ClientConfig::default()
            },
            log_level: lookup("DNSVIEW_LOG_LEVEL").unwrap_or_else(|| "warn".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.client.validate()?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DNSVIEW_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn tracing_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "error" => Level::ERROR,
            _ => Level::WARN,
        }
    }
}

/// A parsed stdin line
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Refresh,
    Quit,
    Submit(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        match line.trim() {
            ":r" => Command::Refresh,
            ":q" => Command::Quit,
            _ => Command::Submit(line.to_string()),
        }
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DnsviewExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DnsviewExitCode::ConfigError.into();
    }

    // Logs go to stderr so they never interleave with rendered frames
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.tracing_level())
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnsviewExitCode::ConfigError.into();
    }

    info!("Starting dnsview against {}", config.client.endpoint.base_url);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnsviewExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_client(config).await {
            error!("Client error: {}", e);
            DnsviewExitCode::RuntimeError
        } else {
            DnsviewExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the viewer until the user quits
async fn run_client(config: Config) -> Result<()> {
    let gateway = HttpGateway::new(&config.client.endpoint)?;
    info!(
        "Records at {}, resolution at {}",
        gateway.records_url(),
        gateway.resolve_url()
    );

    let (controller, events) =
        ViewController::new(Box::new(gateway), &config.client.controller)?;
    let controller = Arc::new(controller);

    let renderer = tokio::spawn(render_frames(controller.watch(), tokio::io::stdout()));
    let event_log = tokio::spawn(log_events(ReceiverStream::new(events)));

    {
        let controller = controller.clone();
        tokio::spawn(async move { controller.mount().await });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    debug!("stdin closed; waiting for Ctrl-C");
                    stdin_open = false;
                    continue;
                };
                match Command::parse(&line) {
                    Command::Quit => break,
                    Command::Refresh => {
                        let controller = controller.clone();
                        tokio::spawn(async move { controller.refresh().await });
                    }
                    Command::Submit(domain) => {
                        let controller = controller.clone();
                        tokio::spawn(async move {
                            let disposition = controller.submit_domain(domain).await;
                            debug!("Submission finished: {:?}", disposition);
                        });
                    }
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(|e| anyhow::anyhow!("Failed to wait for Ctrl-C: {}", e))?;
                info!("Received Ctrl-C");
                break;
            }
        }
    }

    info!("Shutting down dnsview");
    renderer.abort();
    event_log.abort();
    Ok(())
}

/// Write a frame for every distinct view state
///
/// Stops at the first write or flush error. Returns the number of frames
/// written.
async fn render_frames<S, W>(mut states: S, mut out: W) -> usize
where
    S: Stream<Item = ViewState> + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut last_frame = String::new();
    let mut written = 0;

    while let Some(state) = states.next().await {
        let frame = render::render(&state);
        if frame == last_frame {
            continue;
        }

        let output = format!("\n{}", frame);
        if let Err(e) = out.write_all(output.as_bytes()).await {
            warn!("Failed to write frame: {}", e);
            break;
        }
        if let Err(e) = out.flush().await {
            warn!("Failed to flush frame: {}", e);
            break;
        }
        last_frame = frame;
        written += 1;
    }
    written
}

async fn log_events(mut events: ReceiverStream<ControllerEvent>) {
    while let Some(event) = events.next().await {
        debug!("Controller event: {:?}", event);
    }
}
