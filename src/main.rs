use std::path::PathBuf;

use clap::Parser;
use image_stack::{BuiltinLuts, ImageStack, NameRegistry, StackLoader, StackOptions};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Builds a two-slice stack (picture and its negative) and writes both
/// display images next to each other.
#[derive(Parser, Debug)]
#[command(name = "image-stack", version, about)]
struct Args {
    /// Picture to load, decoded as 8-bit grayscale
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the rendered slices
    #[arg(short, long, default_value = "result.png")]
    output: PathBuf,

    /// Lookup table used for display
    #[arg(long, default_value = "grays", env = "IMAGE_STACK_LUT")]
    lut: String,

    /// Log mask rebuilds and display mapping
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let picture = image::open(&args.input)?.into_luma8();
    let mut negative = picture.clone();
    image::imageops::invert(&mut negative);

    let source = StackLoader::from_gray_images(&[picture, negative])?;
    let options = StackOptions {
        title: args.input.file_stem().map(|s| s.to_string_lossy().into_owned()),
        lut: args.lut,
    };
    let mut stack =
        ImageStack::with_options(source, &options, &mut NameRegistry::new(), &BuiltinLuts)?;
    info!(
        title = stack.title(),
        slices = stack.slice_count(),
        bytes = stack.byte_size(),
        "stack loaded"
    );

    let (height, width) = stack.dim();
    let mut canvas = image::RgbImage::new(width as u32 * 2, height as u32);
    for index in 0..stack.slice_count() {
        stack.set_active(index);
        let rendered = stack.to_rgb_image()?;
        image::imageops::replace(&mut canvas, &rendered, (index * width) as i64, 0);
    }
    canvas.save(&args.output)?;
    info!(output = %args.output.display(), "display written");
    Ok(())
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "image_stack=trace"
    } else {
        "image_stack=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
