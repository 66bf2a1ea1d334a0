//! Print the OpenAPI document as JSON or YAML.

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use photos_backend::ApiDoc;
use utoipa::OpenApi;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

/// Dump the photo service OpenAPI document to stdout.
#[derive(Debug, Parser)]
#[command(name = "openapi-dump")]
struct Cli {
    /// Output format.
    #[arg(long, value_enum, default_value = "json")]
    format: Format,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let doc = ApiDoc::openapi();
    let rendered = match cli.format {
        Format::Json => doc
            .to_pretty_json()
            .wrap_err("serialise OpenAPI document as JSON")?,
        Format::Yaml => doc
            .to_yaml()
            .wrap_err("serialise OpenAPI document as YAML")?,
    };
    println!("{rendered}");
    Ok(())
}
