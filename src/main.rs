use anyhow::{Context, Result};
use clap::Parser;
use mistral_ocr::ai::MistralHttpClient;
use mistral_ocr::attachment::Attachment;
use mistral_ocr::models::{CompletionRequest, Config, Content, Message};
use mistral_ocr::ocr::OcrProvider;
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "mistral-ocr")]
#[command(about = "Extract text from an image or PDF with Mistral OCR")]
struct CliArgs {
    /// Local file path or http(s) URL of the image or PDF.
    #[arg(value_name = "SOURCE")]
    source: String,

    /// OCR model id. Defaults to OCR_MODEL or mistral-ocr-latest.
    #[arg(long)]
    model: Option<String>,

    /// Extra request parameter as key=<json>, e.g. include_image_base64=false.
    #[arg(long = "param", value_name = "KEY=JSON", value_parser = parse_param)]
    params: Vec<(String, Value)>,

    /// MIME type to use instead of the detected one, e.g. application/pdf.
    #[arg(long)]
    mime: Option<String>,

    /// Text sent alongside the attachment.
    #[arg(long, default_value = "Extract the text from this document.")]
    prompt: String,
}

fn parse_param(input: &str) -> std::result::Result<(String, Value), String> {
    let (key, raw) = input
        .split_once('=')
        .ok_or_else(|| format!("Invalid parameter '{}'. Expected KEY=JSON", input))?;
    if key.is_empty() {
        return Err(format!("Invalid parameter '{}'. Key is empty", input));
    }
    // Bare words are taken as strings so `--param pages=all` works unquoted.
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

async fn run(args: CliArgs) -> Result<()> {
    let config = Config::from_env()?;
    let model = args.model.unwrap_or_else(|| config.ocr_model.clone());

    let mut attachment = Attachment::parse(&args.source)
        .with_context(|| format!("Failed to load attachment from {}", args.source))?;
    if let Some(mime) = args.mime {
        attachment = attachment.with_mime_type(mime);
    }
    info!(
        "Loaded {} attachment ({})",
        attachment.kind(),
        attachment.mime_type()
    );

    let mut request = CompletionRequest::new(model);
    request.params.extend(args.params);

    let provider = OcrProvider::new(Box::new(MistralHttpClient::from_config(&config)));
    let messages = [Message::user(
        Content::text(args.prompt).with_attachment(attachment),
    )];

    let message = provider.complete(&messages, &request).await?;
    println!("{}", message.content);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mistral_ocr=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    if let Err(e) = run(args).await {
        error!("OCR failed: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
