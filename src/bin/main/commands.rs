use std::{
    fmt,
    io::{BufRead, BufReader, Read},
    thread,
};

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use log::{debug, warn};

pub(super) const COMMAND_QUEUE_DEPTH: usize = 8;

pub(super) type CommandChannel = Channel<CriticalSectionRawMutex, Command, COMMAND_QUEUE_DEPTH>;

/// Runtime control line typed while reading.
#[derive(Clone, Debug, PartialEq)]
pub(super) enum Command {
    Press,
    Release,
    Tap,
    Seek(String),
    Select(String),
    Pace(f32),
    Faster,
    Slower,
    PauseMs(u32),
    Chunk(usize),
    Status,
    Quit,
    /// Sent by the reader thread when input ends; never parsed from a line.
    InputClosed,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) enum ParseError {
    Unknown(String),
    MissingArgument(&'static str),
    BadArgument(&'static str, String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(word) => write!(f, "unknown command `{word}`"),
            Self::MissingArgument(command) => write!(f, "`{command}` needs an argument"),
            Self::BadArgument(command, arg) => write!(f, "`{command}`: bad argument `{arg}`"),
        }
    }
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub(super) fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();

    let command = match head.to_ascii_lowercase().as_str() {
        "press" | "down" => Command::Press,
        "release" | "up" => Command::Release,
        "tap" | "t" => Command::Tap,
        "seek" | "goto" => Command::Seek(required(arg, "seek")?.to_string()),
        "select" | "pick" => Command::Select(required(arg, "select")?.to_string()),
        "pace" | "wpm" => Command::Pace(parsed(arg, "pace")?),
        "faster" | "+" => Command::Faster,
        "slower" | "-" => Command::Slower,
        "pause-ms" | "pause" => Command::PauseMs(parsed(arg, "pause-ms")?),
        "chunk" => Command::Chunk(parsed(arg, "chunk")?),
        "status" | "s" => Command::Status,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn required<'a>(arg: Option<&'a str>, command: &'static str) -> Result<&'a str, ParseError> {
    arg.ok_or(ParseError::MissingArgument(command))
}

fn parsed<T: std::str::FromStr>(arg: Option<&str>, command: &'static str) -> Result<T, ParseError> {
    let arg = required(arg, command)?;
    arg.parse()
        .map_err(|_| ParseError::BadArgument(command, arg.to_string()))
}

/// Forward parsed lines from `input` into `commands` on a plain thread.
///
/// End of input is reported as [`Command::InputClosed`].
pub(super) fn spawn_reader<R>(input: R, commands: &'static CommandChannel) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        if forward_lines(input, commands) {
            embassy_futures::block_on(commands.send(Command::InputClosed));
        }
        debug!("stdin reader finished");
    })
}

/// Returns `false` when the lines ended with `quit`.
fn forward_lines<R: Read>(input: R, commands: &CommandChannel) -> bool {
    for line in BufReader::new(input).lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("stdin read failed: {}", err);
                return true;
            }
        };

        match parse(&line) {
            Ok(Some(command)) => {
                let quit = command == Command::Quit;
                embassy_futures::block_on(commands.send(command));
                if quit {
                    return false;
                }
            }
            Ok(None) => {}
            Err(err) => warn!("{}", err),
        }
    }
    true
}
