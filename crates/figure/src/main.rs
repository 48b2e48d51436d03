//! figure-render - composite a figure from a JSON scene description.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use figure::{FigureRenderer, RendererConfig};

/// Composite a figure from a JSON scene description
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scene config file
    config: PathBuf,

    /// Output file, overriding the scene's output.path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Regular font file to try (repeatable, tried in order)
    #[arg(long = "font", value_name = "PATH")]
    fonts: Vec<PathBuf>,

    /// Bold font file to try (repeatable, tried in order)
    #[arg(long = "bold-font", value_name = "PATH")]
    bold_fonts: Vec<PathBuf>,

    /// Draw text with the built-in face instead of font files
    #[arg(long)]
    builtin_font: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn renderer_config(&self) -> RendererConfig {
        let mut config = if self.builtin_font {
            RendererConfig::builtin_fonts_only()
        } else {
            RendererConfig::default()
        };

        if !self.fonts.is_empty() {
            config = config.with_font_paths(self.fonts.iter().cloned());
        }
        if !self.bold_fonts.is_empty() {
            config = config.with_bold_font_paths(self.bold_fonts.iter().cloned());
        }
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("figure-render v{}", figure::VERSION);

    let renderer = FigureRenderer::with_config(&args.config, &args.renderer_config());
    let written = renderer
        .render(args.output.as_deref())
        .with_context(|| format!("failed to render {}", args.config.display()))?;

    println!("{}", written.display());
    Ok(())
}
