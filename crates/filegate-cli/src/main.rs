//! Filegate Gateway - container file storage gateway

use clap::Parser;
use filegate_cli::{run_server, GatewayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "filegate-gateway")]
#[command(about = "File storage gateway routing containers to object stores")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "FILEGATE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8090", env = "FILEGATE_PORT")]
    port: u16,

    /// Maximum upload size in bytes
    #[arg(long, default_value = "104857600", env = "FILEGATE_MAX_UPLOAD_SIZE")]
    max_upload_size: usize,

    /// Lifetime of issued access URIs in seconds
    #[arg(long, default_value = "300", env = "FILEGATE_ACCESS_URI_TTL_SECS")]
    access_uri_ttl_secs: u64,

    /// Host substituted into issued access URIs
    #[arg(long, env = "FILEGATE_URI_HOST_OVERRIDE")]
    uri_host_override: Option<String>,

    /// Port substituted into issued access URIs
    #[arg(long, env = "FILEGATE_URI_PORT_OVERRIDE")]
    uri_port_override: Option<u16>,

    /// Use in-memory storage (for testing, data will not persist)
    #[arg(long, env = "FILEGATE_MEMORY_STORE")]
    memory_store: bool,

    /// Base URL of access URIs issued by the in-memory store
    #[arg(
        long,
        default_value = "http://localhost:8090/blobs",
        env = "FILEGATE_MEMORY_BASE_URL"
    )]
    memory_base_url: String,

    /// Enable debug logging
    #[arg(short, long, env = "FILEGATE_DEBUG")]
    debug: bool,

    /// JWT secret for token validation
    #[arg(long, env = "JWT_SECRET")]
    jwt_secret: Option<String>,

    /// Disable authentication (for development only!)
    #[arg(long, env = "FILEGATE_NO_AUTH")]
    no_auth: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!(
                "filegate_cli={log_level},filegate_core={log_level},filegate_storage={log_level},tower_http=debug"
            )
            .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Filegate on {}:{}", args.host, args.port);

    if args.memory_store {
        tracing::warn!("⚠️  Using in-memory storage - data will NOT persist!");
    }

    if args.no_auth {
        tracing::warn!("⚠️  Authentication is DISABLED - for development only!");
    } else if args.jwt_secret.is_none() {
        anyhow::bail!("JWT_SECRET is required unless authentication is disabled");
    }

    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        use_memory_store: args.memory_store,
        memory_base_url: args.memory_base_url,
        jwt_secret: args.jwt_secret,
        auth_enabled: !args.no_auth,
        max_upload_size: args.max_upload_size,
        access_uri_ttl_secs: args.access_uri_ttl_secs,
        uri_host_override: args.uri_host_override,
        uri_port_override: args.uri_port_override,
        ..Default::default()
    }
    .with_container_stores_from_env();

    run_server(config).await
}
