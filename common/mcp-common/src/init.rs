//! Server initialization utilities
//!
//! Tracing setup and the `serve_stdio!` macro shared by MCP server binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging for MCP servers
///
/// Logs go to stderr; stdout is reserved for the MCP protocol.
/// `RUST_LOG` filters, with `<crate_name>=info` added by default.
/// Set `LOG_FORMAT=json` for JSON lines instead of plain text.
///
/// # Arguments
///
/// * `crate_name` - Target that gets the default `info` level, in the
///   underscore form tracing uses (`"sqlgate_mcp"`, not `"sqlgate-mcp"`)
///
/// # Errors
///
/// Fails if the directive does not parse or a global subscriber is
/// already installed.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     mcp_common::init_tracing("my_mcp")?;
///     tracing::info!("Starting server");
///     // ...
/// }
/// ```
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let directive = format!("{}=info", crate_name);
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}

/// Macro for standardized MCP server startup
///
/// Expands to a `#[tokio::main] async fn main()` that:
/// 1. Initializes tracing to stderr
/// 2. Builds the server with `<$server_type>::connect().await?`
/// 3. Serves via stdio transport until the client disconnects
///
/// The server type must provide `async fn connect() -> anyhow::Result<Self>`
/// and implement `rmcp::ServerHandler`. A failed `connect` ends the process
/// with an error before anything is served.
///
/// ```rust,ignore
/// mcp_common::serve_stdio!(MyMcpServer, "my_mcp");
/// ```
#[macro_export]
macro_rules! serve_stdio {
    ($server_type:ty, $crate_name:expr) => {
        #[tokio::main]
        async fn main() -> anyhow::Result<()> {
            use rmcp::ServiceExt;

            $crate::init_tracing($crate_name)?;

            tracing::info!(concat!("Starting ", $crate_name, " MCP Server"));

            let server = <$server_type>::connect().await?;
            let service = server.serve(rmcp::transport::stdio()).await?;

            tracing::info!("Server running, waiting for requests...");

            service.waiting().await?;

            tracing::info!("Server shutting down");
            Ok(())
        }
    };
}
