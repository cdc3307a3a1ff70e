//! jpegenc - baseline JPEG encoder CLI
//!
//! Reads a binary PPM (P6) file and writes a baseline JFIF file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{ArgAction, Parser};
use log::Level;
use tracing_subscriber::filter::LevelFilter;

use baseline_jpeg::{load_ppm, Backend, Encoder};

/// Encode a PPM image as a baseline JPEG.
#[derive(Parser, Debug)]
#[command(name = "jpegenc")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    jpegenc photo.ppm                     Writes photo.jpg
    jpegenc photo.ppm -o out.jpg -q 90    Finer quantization
    jpegenc photo.ppm --no-subsample      Keep full chroma detail
    jpegenc photo.ppm --parallel -vv      Parallel stages, trace logging")]
struct Args {
    /// Input image file (P6 PPM)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (defaults to INPUT with a .jpg extension)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Rescale the standard tables to this quality (1-100)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Text for the COM segment
    #[arg(long, conflicts_with = "no_comment")]
    comment: Option<String>,

    /// Omit the COM segment
    #[arg(long)]
    no_comment: bool,

    /// Disable 4:2:0 chroma averaging
    #[arg(long)]
    no_subsample: bool,

    /// Run the per-pixel and per-block stages on the thread pool
    #[arg(long)]
    parallel: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Map `-v` occurrences to a subscriber level.
fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install a stderr subscriber. Library `log` records reach it through
/// the `tracing-log` bridge.
fn init_logging(verbose: u8) {
    // A subscriber may already be set (tests); keep the existing one then
    let _ = tracing_subscriber::fmt()
        .with_max_level(verbosity_level(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("jpg"));

    let start = Instant::now();
    let image = load_ppm(&args.input)?;

    let mut encoder = Encoder::new().subsample_chroma(!args.no_subsample);
    if let Some(quality) = args.quality {
        encoder = encoder.quality(quality);
    }
    if args.no_comment {
        encoder = encoder.no_comment();
    } else if let Some(comment) = args.comment {
        encoder = encoder.comment(comment);
    }
    if args.parallel {
        encoder = encoder.backend(Backend::Parallel);
    }

    let jpeg = encoder.encode_image(&image)?;
    let mut file = BufWriter::new(File::create(&output)?);
    file.write_all(&jpeg)?;
    file.flush()?;

    if log::log_enabled!(Level::Debug) {
        log::debug!(
            "{} -> {} ({}x{}, {} bytes, {:.1?})",
            args.input.display(),
            output.display(),
            image.width(),
            image.height(),
            jpeg.len(),
            start.elapsed()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(verbosity_level(0), LevelFilter::WARN);
        assert_eq!(verbosity_level(1), LevelFilter::DEBUG);
        assert_eq!(verbosity_level(2), LevelFilter::TRACE);
        assert_eq!(verbosity_level(9), LevelFilter::TRACE);
    }

    #[test]
    fn test_verbose_flag_counts() {
        let args = Args::try_parse_from(["jpegenc", "in.ppm", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_comment_conflicts_with_no_comment() {
        let result = Args::try_parse_from(["jpegenc", "in.ppm", "--comment", "x", "--no-comment"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_logging_init_is_repeatable() {
        init_logging(1);
        init_logging(2);
        log::warn!("still routed");
    }
}
