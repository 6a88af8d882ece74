//! Convert a document example
//!
//! This example demonstrates the conversion flow:
//! - Reading a markdown file from disk
//! - Choosing an engine and adjusting formatting options
//! - Sending the request once and saving the converted document
//!
//! Usage: `cargo run --example convert_file -- notes.md [primary|alternate]`

use analyzer_client::conversion::{BlockStyle, ListMarker, Spacing};
use analyzer_client::{
    Config, ConversionClient, ConversionOptions, ConversionOutcome, ConversionRequest, Engine,
    SourceFile,
};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let input = args.next().ok_or("usage: convert_file <file> [primary|alternate]")?;
    let engine = match args.next().as_deref() {
        Some("alternate") => Engine::Alternate,
        _ => Engine::Primary,
    };

    let mut options = ConversionOptions::default();
    options.formatting.line_spacing = 1.5;
    options.formatting.list_marker = ListMarker::Dash;
    options
        .spacing
        .set(BlockStyle::Heading1, Spacing::new(18.0, 8.0));

    let client = ConversionClient::new(Config::default())?;
    let file = SourceFile::from_path(&input).await?;
    let request = ConversionRequest::build(file, engine, options)?;

    match client.send(&request).await {
        ConversionOutcome::Downloaded(document) => {
            let path = document.save_to(Path::new(".")).await?;
            println!("✓ Converted with {} engine: {}", engine, path.display());
        }
        ConversionOutcome::Failed { code, message } => {
            eprintln!("✗ Conversion failed [{}]: {}", code, message);
        }
    }

    Ok(())
}
