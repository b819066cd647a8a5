use clap::{Parser, Subcommand};
use std::path::PathBuf;

use contour::similarity::ErrorMetric;

#[derive(Parser, Debug)]
#[command(name = "contour", about = "Find similar-sounding sections across a track catalog")]
pub struct Cli {
    /// Config file (defaults to contour.toml or the user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract peak envelopes from audio files into a catalog
    Index {
        /// Audio files (WAV, MP3, FLAC, OGG, AAC)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Catalog file to write
        #[arg(short, long, default_value = "catalog.json")]
        output: PathBuf,

        /// Add to an existing catalog instead of replacing it
        #[arg(long)]
        append: bool,

        /// Envelope points per track
        #[arg(long)]
        points: Option<usize>,
    },

    /// Rank catalog tracks by similarity to a window of a reference track
    Search {
        /// Catalog file
        catalog: PathBuf,

        /// Id of the reference track
        #[arg(short, long)]
        reference: String,

        /// Window start in milliseconds (defaults to 0)
        #[arg(long)]
        start_ms: Option<f64>,

        /// Window end in milliseconds (defaults to start + configured window)
        #[arg(long)]
        end_ms: Option<f64>,

        /// Envelope frames between compared windows (1 = exhaustive)
        #[arg(long)]
        step: Option<usize>,

        /// Number of matches to print
        #[arg(long)]
        top: Option<usize>,

        /// Per-frame error used for scoring
        #[arg(long, value_enum)]
        metric: Option<ErrorMetric>,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a track's envelope resampled to a display width
    Peaks {
        /// Catalog file
        catalog: PathBuf,

        /// Track id
        #[arg(short, long)]
        track: String,

        /// Number of bars
        #[arg(short, long, default_value_t = 80)]
        width: usize,

        /// Height of the text waveform in rows
        #[arg(long, default_value_t = 8)]
        rows: usize,
    },
}
