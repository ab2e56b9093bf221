mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use larder_server::config::{DatabaseConfig, ServerConfig};
use larder_server::media::MediaStore;
use larder_server::{api, app, db, store, AppState};

#[derive(Parser)]
#[command(name = "larder-server", version, about = "Multi-tenant recipe catalog API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve(ServerConfig),

    /// Print the OpenAPI document as JSON and exit
    Openapi,

    /// Create an account with staff and superuser rights
    CreateSuperuser {
        #[command(flatten)]
        database: DatabaseConfig,

        #[arg(long)]
        email: String,

        #[arg(long, env = "LARDER_SUPERUSER_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(config) => serve(config).await,
        Command::Openapi => {
            let spec = api::openapi()
                .to_pretty_json()
                .context("Failed to render OpenAPI document")?;
            println!("{}", spec);
            Ok(())
        }
        Command::CreateSuperuser {
            database,
            email,
            password,
        } => create_superuser(&database, &email, &password),
    }
}

async fn serve(config: ServerConfig) -> Result<()> {
    let telemetry = telemetry::init_telemetry()?;

    let pool = db::create_pool(&config.database.database_url)
        .context("Failed to set up database")?;

    tokio::fs::create_dir_all(&config.media_root)
        .await
        .with_context(|| format!("Failed to create media root {}", config.media_root.display()))?;
    let media = MediaStore::new(config.media_root.clone(), &config.media_url);

    let app = app(AppState::new(pool, media));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    let local_addr = listener.local_addr()?;

    tracing::info!("Server listening on {}", local_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", local_addr);
    tracing::info!(
        "OpenAPI spec available at http://{}/api-docs/openapi.json",
        local_addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    telemetry.shutdown();
    Ok(())
}

fn create_superuser(database: &DatabaseConfig, email: &str, password: &str) -> Result<()> {
    telemetry::init_console();

    let pool = db::create_pool(&database.database_url).context("Failed to set up database")?;
    let mut conn = pool.get()?;
    let user = store::users::create_superuser(&mut conn, email, password)
        .context("Failed to create superuser")?;

    tracing::info!(user_id = %user.id, email = %user.email, "Created superuser");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
