//! Fleetlog Invoice Extractor
//!
//! One-shot extraction of a scanned invoice image: extract through the
//! vision backend, run strict validation, and write the result as JSON.
//!
//! Usage:
//!   cargo run --bin fleetlog-invoice -- path/to/invoice.jpg
//!   cargo run --bin fleetlog-invoice -- invoice.png --output output/

use std::env;
use std::path::PathBuf;

use chrono::Utc;

use fleetlog_core::{media, validate};
use fleetlog_extract::{extract_invoice_from_image, ExtractOptions};
use fleetlog_inference::OpenRouterBackend;

#[derive(Debug)]
struct Args {
    input: PathBuf,
    output_dir: PathBuf,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let mut input = None;
    let mut output_dir = PathBuf::from("output");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    output_dir = PathBuf::from(&args[i]);
                }
            }
            "--help" | "-h" => {
                println!("Usage: fleetlog-invoice <invoice.jpg> [--output DIR]");
                std::process::exit(0);
            }
            other => input = Some(PathBuf::from(other)),
        }
        i += 1;
    }

    let input = input.unwrap_or_else(|| {
        eprintln!("Usage: fleetlog-invoice <invoice.jpg> [--output DIR]");
        std::process::exit(1);
    });

    Args { input, output_dir }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = parse_args();

    println!("Invoice Data Extractor");
    println!("Processing file: {}", args.input.display());

    let filename = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid input path"))?
        .to_string();
    if !media::is_image(&filename) {
        anyhow::bail!("Currently only image files are supported (.jpg, .png, .gif, .webp)");
    }
    let mime_type = media::media_type_for(&filename)?;

    let data = tokio::fs::read(&args.input)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.input.display(), e))?;
    media::check_declared_type(&filename, &data)?;

    let backend = OpenRouterBackend::from_env()?;

    println!("Extracting invoice data...");
    let extracted =
        extract_invoice_from_image(&backend, &data, mime_type, ExtractOptions::default()).await?;

    if validate::validate_invoice(&extracted) {
        println!("Validation passed");
    } else {
        println!("Validation warning detected");
    }

    let invoice_number = extracted.invoice_number.as_deref().unwrap_or("unknown");
    tokio::fs::create_dir_all(&args.output_dir).await?;
    let output_path = args.output_dir.join(format!(
        "invoice-{}-{}.json",
        invoice_number,
        Utc::now().timestamp()
    ));
    tokio::fs::write(&output_path, serde_json::to_string_pretty(&extracted)?).await?;
    println!("JSON saved to: {}", output_path.display());

    Ok(())
}
