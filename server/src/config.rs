use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,
}

#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Address the HTTP listener binds to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: SocketAddr,

    /// Directory uploaded files are written to
    #[arg(long, env = "MEDIA_ROOT", default_value = "media")]
    pub media_root: PathBuf,

    /// URL prefix uploaded files are served under
    #[arg(long, env = "MEDIA_URL", default_value = "/media")]
    pub media_url: String,
}
