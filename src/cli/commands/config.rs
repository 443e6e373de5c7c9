use crate::cli::OutputFormat;
use crate::config::config;

/// Print the configuration the server would start with. The JWT secret is
/// never serialized.
pub fn show(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{}", serde_yaml::to_string(config)?),
    }
    Ok(())
}
