use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use log::LevelFilter;
use pacer_core::settings::{
    DEFAULT_CHUNK_CHAR_BUDGET, DEFAULT_PAUSE_MS, DEFAULT_WPM, PlaybackConfig,
};

#[derive(Parser, Debug)]
#[command(name = "pacer", version)]
#[command(about = "Paced guided reading in the terminal", long_about = None)]
pub(super) struct Cli {
    /// Increase log verbosity (-v, -vv). RUST_LOG still applies on top.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub(super) verbose: u8,

    #[command(subcommand)]
    pub(super) command: CliCommand,
}

impl Cli {
    pub(super) fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub(super) enum CliCommand {
    /// Read a text/HTML file or a share token at a steady pace
    Read(ReadArgs),
    /// Turn a file into a share token
    Encode {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Title stored in the token (defaults to the file name)
        #[arg(long)]
        title: Option<String>,
    },
    /// Print the article inside a share token or reader URL
    Decode {
        #[arg(value_name = "TOKEN")]
        token: String,
    },
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "doc"])))]
pub(super) struct ReadArgs {
    /// Plain text or HTML file
    #[arg(value_name = "FILE")]
    pub(super) file: Option<PathBuf>,

    /// Share token (or reader URL) instead of a file
    #[arg(long, value_name = "TOKEN")]
    pub(super) doc: Option<String>,

    /// Title shown in status lines
    #[arg(long)]
    pub(super) title: Option<String>,

    /// Reading pace in words per minute
    #[arg(long, default_value_t = DEFAULT_WPM)]
    pub(super) wpm: f32,

    /// Pause after each sentence, in milliseconds
    #[arg(long, default_value_t = DEFAULT_PAUSE_MS)]
    pub(super) pause_ms: u32,

    /// Characters highlighted per step
    #[arg(long, default_value_t = DEFAULT_CHUNK_CHAR_BUDGET)]
    pub(super) chunk_chars: usize,

    /// Word id to start from (ids are `word-0`, `word-1`, ...)
    #[arg(long, value_name = "WORD_ID")]
    pub(super) start_at: Option<String>,

    /// Load without starting; type `tap` to begin
    #[arg(long)]
    pub(super) paused: bool,

    /// Log remaining time every N seconds (0 disables)
    #[arg(long, default_value_t = 0)]
    pub(super) status_secs: u64,
}

impl ReadArgs {
    pub(super) fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig::default()
            .with_wpm(self.wpm)
            .with_pause_ms(self.pause_ms)
            .with_chunk_char_budget(self.chunk_chars)
    }
}
