//! KYC CLI - unattended identity verification from a terminal
//!
//! Usage:
//!   kyc init                          Write the default configuration
//!   kyc run <captures>                Walk through the full flow
//!   kyc details <session>             Show extracted details for a session
//!   kyc say <text>                    Synthesize a prompt with the backend voice
//!   kyc upload-image <file>           Upload a single document image

mod terminal;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kyc_backend::{HttpBackend, VerificationBackend};
use kyc_core::{CapturedImage, DocumentKind, KycConfig, ReviewDetails, SessionId, SpeechAudio};
use kyc_flow::FlowController;
use kyc_media::{FileMediaDevices, SpoolAudioSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use terminal::{TerminalDriver, TerminalSpeech};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "kyc")]
#[command(author, version, about = "Unattended KYC verification flow")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (defaults to .kyc/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verification backend base URL, overriding the configuration
    #[arg(long, global = true, value_name = "URL")]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Run the full verification flow
    Run {
        /// Directory holding aadhaar.*, pan.* and face.* images
        captures: PathBuf,

        /// Where remote narration audio is written
        #[arg(long, default_value = ".kyc/narration")]
        audio_dir: PathBuf,

        /// Skip the backend voice and print prompts only
        #[arg(long)]
        no_voice: bool,
    },

    /// Fetch extracted details for a session
    Details {
        /// Session ID issued by the backend
        session: String,

        /// Print the raw extracted fields as JSON
        #[arg(long)]
        json: bool,
    },

    /// Synthesize speech through the backend voice
    Say {
        /// Text to speak
        text: String,

        /// Output file for inline audio
        #[arg(short, long, default_value = "narration.wav")]
        out: PathBuf,
    },

    /// Upload a single document image to a session
    UploadImage {
        /// Image file
        file: PathBuf,

        /// Session ID issued by the backend
        #[arg(long)]
        session: String,

        /// Document kind (aadhaar, pan, face)
        #[arg(long)]
        kind: DocumentKind,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Commands::Init { path, force } = &cli.command {
        return cmd_init(path, *force);
    }

    let config = load_config(cli.config.as_deref(), cli.backend)?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Run {
            captures,
            audio_dir,
            no_voice,
        } => cmd_run(config, captures, audio_dir, no_voice).await,
        Commands::Details { session, json } => cmd_details(&config, session, json).await,
        Commands::Say { text, out } => cmd_say(&config, text, out).await,
        Commands::UploadImage {
            file,
            session,
            kind,
        } => cmd_upload_image(&config, file, session, kind).await,
    }
}

fn load_config(path: Option<&Path>, backend: Option<String>) -> Result<KycConfig> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| KycConfig::default_path(Path::new(".")));

    let mut config = KycConfig::load_or_default(&path)
        .with_context(|| format!("Failed to load config from {:?}", path))?;

    if let Some(url) = backend {
        config.backend.base_url = url;
    }
    info!("Using backend {}", config.backend.base_url);
    Ok(config)
}

fn http_backend(config: &KycConfig) -> Result<HttpBackend> {
    HttpBackend::new(&config.backend).context("Failed to create HTTP client")
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    let config_path = KycConfig::default_path(path);
    if config_path.exists() && !force {
        bail!(
            "{:?} already exists (use --force to overwrite)",
            config_path
        );
    }

    KycConfig::write_default(&config_path).context("Failed to write config")?;

    println!("Initialized KYC config in {:?}", path);
    println!("Created:");
    println!("  .kyc/config.toml");
    println!("\nNext steps:");
    println!("  1. Set [backend] base_url to your verification backend");
    println!("  2. Put aadhaar.png, pan.png and face.png in a capture directory");
    println!("  3. Run 'kyc run <capture-dir>'");
    Ok(())
}

async fn cmd_run(
    mut config: KycConfig,
    captures: PathBuf,
    audio_dir: PathBuf,
    no_voice: bool,
) -> Result<()> {
    if no_voice {
        config.narration.remote_tts = false;
    }
    info!("Starting KYC flow with captures from {:?}", captures);

    let mut flow = FlowController::new(
        &config,
        Arc::new(http_backend(&config)?),
        Arc::new(FileMediaDevices::new(captures)),
        Arc::new(TerminalSpeech),
        Arc::new(SpoolAudioSink::new(audio_dir)),
    );

    let view = TerminalDriver::new().run(&mut flow).await?;

    if let Some(session) = flow.session() {
        println!("\nSession: {}", session);
    }
    match view.step {
        "complete" => Ok(()),
        _ => bail!("{}", view.heading),
    }
}

async fn cmd_details(config: &KycConfig, session: String, json: bool) -> Result<()> {
    let backend = http_backend(config)?;
    let details = backend
        .fetch_details(&SessionId::new(session))
        .await
        .context("Failed to fetch details")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
        return Ok(());
    }

    let review = ReviewDetails::from_extracted(&details);
    let width = review
        .fields()
        .iter()
        .map(|f| f.label.len())
        .max()
        .unwrap_or(0);
    for field in review.fields() {
        println!("{:width$}  {}", field.label, field.value, width = width);
    }
    Ok(())
}

async fn cmd_say(config: &KycConfig, text: String, out: PathBuf) -> Result<()> {
    let backend = http_backend(config)?;
    let audio = backend
        .synthesize(&text)
        .await
        .context("Voice service failed")?;

    match audio {
        SpeechAudio::Url(url) => println!("{}", url),
        SpeechAudio::Wav(bytes) => {
            tokio::fs::write(&out, &bytes)
                .await
                .with_context(|| format!("Failed to write {:?}", out))?;
            println!("Wrote {} bytes to {:?}", bytes.len(), out);
        }
    }
    Ok(())
}

async fn cmd_upload_image(
    config: &KycConfig,
    file: PathBuf,
    session: String,
    kind: DocumentKind,
) -> Result<()> {
    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {:?}", file))?;
    let mime = mime_guess::from_path(&file).first_or_octet_stream();
    let image = CapturedImage::from_bytes(kind, mime.essence_str(), &bytes);

    let backend = http_backend(config)?;
    let receipt = backend
        .upload_image(&image, &SessionId::new(session))
        .await
        .context("Image upload failed")?;

    match receipt.url {
        Some(url) => println!("Uploaded {} image: {}", kind, url),
        None => println!("Uploaded {} image", kind),
    }
    Ok(())
}
