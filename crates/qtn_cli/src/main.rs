//! quaternion - render scenes and convert `.qif` images.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qtn_core::{load_scene, Image, QifByteOrder};
use qtn_renderer::{render, RenderSettings};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "quaternion")]
#[command(about = "Minimal offline triangle ray caster", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON scene to a .qif image
    Render {
        /// Scene description (.json)
        scene: PathBuf,
        /// Output .qif file
        #[arg(short, long, default_value = "out.qif")]
        output: PathBuf,
        /// Also export a PNG (or any format inferred from the extension)
        #[arg(long)]
        png: Option<PathBuf>,
        /// Rays per pixel
        #[arg(short, long)]
        samples: Option<u32>,
        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Override the scene width
        #[arg(long)]
        width: Option<u32>,
        /// Override the scene height
        #[arg(long)]
        height: Option<u32>,
    },
    /// Convert a .qif image to PNG (or any format inferred from the extension)
    Convert {
        /// Input .qif file
        input: PathBuf,
        /// Output image file
        output: PathBuf,
        /// Header integers are big-endian
        #[arg(long)]
        big_endian: bool,
    },
    /// Print the dimensions of a .qif image
    Info {
        /// Input .qif file
        input: PathBuf,
        /// Header integers are big-endian
        #[arg(long)]
        big_endian: bool,
    },
}

fn byte_order(big_endian: bool) -> QifByteOrder {
    if big_endian {
        QifByteOrder::Big
    } else {
        QifByteOrder::Little
    }
}

#[allow(clippy::too_many_arguments)]
fn render_scene(
    scene_path: &Path,
    output: &Path,
    png: Option<&Path>,
    samples: Option<u32>,
    seed: Option<u64>,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<()> {
    let mut scene = load_scene(scene_path)
        .with_context(|| format!("Failed to load scene {}", scene_path.display()))?;
    if let Some(width) = width {
        scene.width = width;
    }
    if let Some(height) = height {
        scene.height = height;
    }

    let mut settings = RenderSettings::default();
    if let Some(samples) = samples {
        settings.samples = samples;
    }
    if let Some(seed) = seed {
        settings.seed = seed;
    }

    log::info!(
        "Rendering {}x{} @ {} spp (seed {})",
        scene.width,
        scene.height,
        settings.samples,
        settings.seed
    );

    let mut image = Image::new(scene.width, scene.height);
    image.fill(scene.background);

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let stats = render(&scene, &mut image, &settings, &mut rng)?;
    println!(
        "Rendered {} pixels ({} hit) in {:?}",
        stats.pixels, stats.pixels_hit, stats.elapsed
    );

    image
        .save_qif(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Saved to {}", output.display());

    if let Some(png) = png {
        image
            .save_png(png)
            .with_context(|| format!("Failed to export {}", png.display()))?;
        println!("Exported {}", png.display());
    }

    Ok(())
}

fn convert(input: &Path, output: &Path, big_endian: bool) -> Result<()> {
    let image = Image::load_qif_with_order(input, byte_order(big_endian))
        .with_context(|| format!("Failed to read {}", input.display()))?;
    image
        .save_png(output)
        .with_context(|| format!("Failed to export {}", output.display()))?;
    println!(
        "Converted {} ({}x{}) to {}",
        input.display(),
        image.width(),
        image.height(),
        output.display()
    );
    Ok(())
}

fn info(input: &Path, big_endian: bool) -> Result<()> {
    let image = Image::load_qif_with_order(input, byte_order(big_endian))
        .with_context(|| format!("Failed to read {}", input.display()))?;
    println!("{}: {}x{}", input.display(), image.width(), image.height());
    Ok(())
}

fn main() -> Result<()> {
    // RUST_LOG overrides the Info default
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            scene,
            output,
            png,
            samples,
            seed,
            width,
            height,
        } => render_scene(&scene, &output, png.as_deref(), samples, seed, width, height)?,
        Commands::Convert {
            input,
            output,
            big_endian,
        } => convert(&input, &output, big_endian)?,
        Commands::Info { input, big_endian } => info(&input, big_endian)?,
    }

    Ok(())
}
