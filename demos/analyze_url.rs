//! Analyze a URL example
//!
//! This example demonstrates the task lifecycle:
//! - Initialising logging from the configuration
//! - Submitting a URL for analysis
//! - Following progress events until the task ends
//! - Exporting the finished result as a document
//!
//! Usage: `cargo run --example analyze_url -- example.com [http://127.0.0.1:5000]`

use analyzer_client::{Config, TaskController, TaskEvent, logging};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let target = args.next().unwrap_or_else(|| "example.com".to_string());
    let config = match args.next() {
        Some(base_url) => Config::with_base_url(base_url),
        None => Config::default(),
    };

    logging::init(&config.logging)?;

    let controller = TaskController::new(config)?;
    let mut events = controller.subscribe();

    let handle = controller.submit(&target).await?;
    println!("Submitted {} as task {}", target, handle.id());

    while let Ok(event) = events.recv().await {
        match event {
            TaskEvent::Progress {
                progress, message, ..
            } => {
                println!("  {:>3}% {}", progress, message.unwrap_or_default());
            }
            TaskEvent::Completed { result, cost, .. } => {
                println!("✓ Completed (cost: {})", cost);
                println!("{}", result);

                let file = controller.export(handle.id()).await?;
                let path = file.save_to(Path::new(".")).await?;
                println!("Saved export to {}", path.display());
                break;
            }
            TaskEvent::Failed { code, message, .. } => {
                eprintln!("✗ Failed [{}]: {}", code, message);
                break;
            }
        }
    }

    controller.acknowledge();
    Ok(())
}
