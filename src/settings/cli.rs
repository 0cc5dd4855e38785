use super::Parser;

/// Storefront API server.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// Path of the settings file, without or with the `.toml` extension.
    #[arg(long)]
    pub settings: Option<String>,
}
