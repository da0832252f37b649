use clap::Parser;
use ferrous_doh_domain::{CliOverrides, TrustPolicy};
use tracing::{error, info, warn};

mod bootstrap;
mod di;
mod server;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "ferrous-doh")]
#[command(version)]
#[command(about = "Ferrous DoH - plain DNS over UDP forwarded to a DNS-over-HTTPS upstream")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// DoH upstream URL
    #[arg(short = 'u', long, value_name = "URL")]
    upstream: Option<String>,

    /// Upstream exchange timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind,
        upstream_url: cli.upstream,
        timeout_ms: cli.timeout_ms,
        log_level: cli.log_level,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Ferrous DoH v{}", env!("CARGO_PKG_VERSION"));
    info!(
        upstream = %config.upstream.url,
        trust_policy = config.upstream.tls.as_str(),
        timeout_ms = config.upstream.timeout_ms,
        "Upstream configured"
    );
    if config.upstream.tls == TrustPolicy::InsecureIpLiteral {
        warn!(
            upstream = %config.upstream.url,
            "Upstream certificate is NOT verified (insecure_ip_literal); answers can be spoofed by anyone on the path"
        );
    }

    let dns_services = di::DnsServices::new(&config)?;

    let dns_addr = config.server.listen_addr();
    let dns_handler = dns_services.handler;

    tokio::select! {
        result = server::start_dns_server(dns_addr, dns_handler) => {
            if let Err(e) = result {
                error!(error = %e, "DNS server error");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
