use std::{
    cell::RefCell,
    fmt, fs, io,
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use embassy_executor::Spawner;
use embassy_sync::channel::Channel;
use embassy_time::Duration;
use log::{LevelFilter, error, info};
use pacer_core::{
    content::segment,
    document::Document,
    playback::{PlaybackController, PlaybackError, driver::Pacer},
};

use cli::{Cli, CliCommand, ReadArgs};
use commands::CommandChannel;
use session::{SessionClock, SessionEnd};
use terminal::TerminalVisual;
use transport::{Article, TransportError};

#[path = "main/cli.rs"]
mod cli;
#[path = "main/commands.rs"]
mod commands;
#[path = "main/session.rs"]
mod session;
#[path = "main/terminal.rs"]
mod terminal;
#[path = "main/transport.rs"]
mod transport;

static COMMANDS: CommandChannel = Channel::new();

#[derive(Debug)]
enum StartupError {
    File(PathBuf, io::Error),
    Token(TransportError),
    StartAt(String, PlaybackError),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path, err) => write!(f, "cannot read {}: {}", path.display(), err),
            Self::Token(err) => write!(f, "cannot open share token: {err}"),
            Self::StartAt(word_id, err) => write!(f, "cannot start at {word_id}: {err}"),
        }
    }
}

impl From<TransportError> for StartupError {
    fn from(err: TransportError) -> Self {
        Self::Token(err)
    }
}

fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn read_file(path: &Path) -> Result<String, StartupError> {
    fs::read_to_string(path).map_err(|err| StartupError::File(path.to_path_buf(), err))
}

fn file_title(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}

fn load_document(args: &ReadArgs) -> Result<Document, StartupError> {
    let (content, title) = match (&args.doc, &args.file) {
        (Some(token), _) => {
            let article = transport::decode(token)?;
            (article.content, article.title)
        }
        (None, Some(path)) => (read_file(path)?, file_title(path)),
        // clap requires one of the two.
        (None, None) => (String::new(), None),
    };

    let title = args.title.clone().or(title);
    Ok(segment(&content, title.as_deref()))
}

async fn read(args: ReadArgs) -> Result<SessionEnd, StartupError> {
    let document = load_document(&args)?;
    let clock = SessionClock::new();
    let mut controller = PlaybackController::new(
        document,
        TerminalVisual::new(io::stdout()),
        args.playback_config(),
    );

    if controller.index().is_empty() {
        info!("nothing to read");
        return Ok(SessionEnd::Finished);
    }
    if let Some(word_id) = &args.start_at {
        controller
            .seek(word_id, clock.now_ms())
            .map_err(|err| StartupError::StartAt(word_id.clone(), err))?;
    }
    if !args.paused {
        controller.start(clock.now_ms());
    }

    commands::spawn_reader(io::stdin(), &COMMANDS);
    let status_every = (args.status_secs > 0).then(|| Duration::from_secs(args.status_secs));
    let controller = RefCell::new(controller);

    Ok(session::run(&controller, &COMMANDS, clock, status_every).await)
}

fn encode(path: PathBuf, title: Option<String>) -> Result<(), StartupError> {
    let article = Article {
        title: title.or_else(|| file_title(&path)),
        content: read_file(&path)?,
    };
    println!("{}", transport::encode(&article)?);
    Ok(())
}

fn decode(token: &str) -> Result<(), StartupError> {
    let article = transport::decode(token)?;
    if let Some(title) = &article.title {
        println!("# {title}\n");
    }
    println!("{}", article.content);
    Ok(())
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let cli = Cli::parse();
    init_logger(cli.log_level());

    let result = match cli.command {
        CliCommand::Read(args) => read(args).await.map(|end| {
            info!("session ended: {:?}", end);
        }),
        CliCommand::Encode { file, title } => encode(file, title),
        CliCommand::Decode { token } => decode(&token),
    };

    // The executor never returns on its own.
    match result {
        Ok(()) => process::exit(0),
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    }
}
