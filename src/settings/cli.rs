use super::Parser;

#[derive(Parser, Debug)]
#[command(about = "DealFlow authentication API server")]
pub struct Cli {
    /// Path to a TOML settings file.
    #[arg(long)]
    pub settings: Option<String>,
}
