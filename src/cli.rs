use clap::{Parser, ValueEnum};
use fcx_lib::{FigmaAuth, OutputFormat};

#[derive(Parser)]
#[command(name = "fcx")]
#[command(
    version,
    about = "Figma Context MCP - Simplified Figma design data for coding agents"
)]
pub struct Cli {
    #[arg(
        long,
        env = "FIGMA_API_KEY",
        hide_env_values = true,
        help = "Figma personal access token"
    )]
    pub figma_api_key: Option<String>,

    #[arg(
        long,
        env = "FIGMA_OAUTH_TOKEN",
        hide_env_values = true,
        help = "Figma OAuth bearer token (alternative to --figma-api-key)"
    )]
    pub figma_oauth_token: Option<String>,

    #[arg(
        long,
        env = "PORT",
        default_value = "3333",
        help = "HTTP port when not running in stdio mode"
    )]
    pub port: u16,

    #[arg(long, help = "Serve MCP over stdio instead of HTTP")]
    pub stdio: bool,

    #[arg(long, value_enum, default_value = "yaml", help = "Tool payload format")]
    pub output_format: OutputFormatArg,

    #[arg(long, help = "Disable the download_figma_images tool")]
    pub skip_image_downloads: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Yaml,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(value: OutputFormatArg) -> Self {
        match value {
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

impl Cli {
    /// Resolve the credential, preferring the personal access token. Exactly
    /// one auth mode ends up active per server.
    pub fn auth(&self) -> Option<FigmaAuth> {
        if let Some(token) = self.figma_api_key.as_ref().filter(|t| !t.is_empty()) {
            return Some(FigmaAuth::PersonalAccessToken(token.clone()));
        }
        if let Some(token) = self.figma_oauth_token.as_ref().filter(|t| !t.is_empty()) {
            return Some(FigmaAuth::OAuthToken(token.clone()));
        }
        None
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
