//! CLI command implementations

use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use clipstream_core::config::ClipstreamConfig;
use clipstream_core::pipeline::ClipPipeline;
use clipstream_core::timecode::TimeSpec;
use clipstream_core::vod::VodReference;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a VOD to its playable source-quality stream URL
    Resolve {
        /// VOD id or platform VOD URL
        vod: String,
    },
    /// Cut a clip out of a VOD or an already-resolved stream URL
    Clip {
        /// VOD id, platform VOD URL, or direct playlist/media URL
        source: String,
        /// Clip start (seconds or H:MM:SS)
        #[arg(short, long)]
        start: String,
        /// Clip end (seconds or H:MM:SS)
        #[arg(short, long)]
        end: String,
        /// Output file path
        #[arg(short, long, default_value = "clip.mp4")]
        output: PathBuf,
    },
    /// Start the API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Resolve { vod } => resolve_vod(vod).await,
        Commands::Clip {
            source,
            start,
            end,
            output,
        } => clip(source, start, end, output).await,
        Commands::Serve { host, port } => serve(host, port).await,
    }
}

async fn resolve_vod(vod: String) -> anyhow::Result<()> {
    let config = ClipstreamConfig::from_env();
    let pipeline = ClipPipeline::new(config)?;

    let reference = VodReference::parse(&vod)?;
    let resolved = pipeline.resolve_stream(&reference).await?;

    println!("Title:    {}", resolved.title);
    println!("Duration: {}", resolved.duration_label);
    println!("Stream:   {}", resolved.stream_url);

    Ok(())
}

async fn clip(source: String, start: String, end: String, output: PathBuf) -> anyhow::Result<()> {
    let config = ClipstreamConfig::from_env();
    let pipeline = ClipPipeline::new(config)?;

    let start = TimeSpec::Text(start);
    let end = TimeSpec::Text(end);

    // A platform VOD reference goes through full resolution; anything else
    // is treated as an already-resolved source locator.
    let clip = match VodReference::parse(&source) {
        Ok(reference) => {
            println!("Resolving VOD {}...", reference.vod_id());
            pipeline.clip_vod(&reference, &start, &end).await?
        }
        Err(_) => pipeline.extract_clip(&source, &start, &end).await?,
    };

    tokio::fs::write(&output, &clip.bytes)
        .await
        .with_context(|| format!("failed writing {}", output.display()))?;

    println!(
        "Wrote {} ({} bytes, {})",
        output.display(),
        clip.bytes.len(),
        clip.mime_type
    );

    Ok(())
}

async fn serve(host: String, port: u16) -> anyhow::Result<()> {
    let config = ClipstreamConfig::from_env();
    clipstream_web::run_server(config, &host, port)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))
}
