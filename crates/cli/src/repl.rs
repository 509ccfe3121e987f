use std::path::{Path, PathBuf};

use stamp_engine::to_seconds;

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Load(String),
    Open(PathBuf),
    Play,
    Pause,
    Seek(f64),
    Capture,
    Time(String),
    Description(String),
    Add {
        time: Option<String>,
        description: Option<String>,
    },
    Remove(usize),
    Jump(usize),
    List,
    Copy,
    Save(PathBuf),
    Restore(PathBuf),
    Help,
    Quit,
}

/// Error for input lines that do not form a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseError {}

pub const HELP: &str = "\
commands:
  load <url>             load a YouTube video
  open <path>            open a local video file
  play | pause           control playback
  seek <h:mm:ss|secs>    jump to a position
  capture                copy the playhead into the time field
  time <text>            type into the time field
  desc <text>            type into the description field
  add [time [desc...]]   commit the pending timestamp
  rm <n>                 remove row n
  jump <n>               seek to row n
  list                   show the current state
  copy                   copy all timestamps to the clipboard
  save <path>            write the session to a JSON file
  restore <path>         read a session JSON file
  help | quit";

/// Parses one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "load" => ReplCommand::Load(rest.to_owned()),
        "open" => ReplCommand::Open(PathBuf::from(required(word, rest)?)),
        "play" => ReplCommand::Play,
        "pause" => ReplCommand::Pause,
        "seek" => ReplCommand::Seek(parse_position(required(word, rest)?)?),
        "capture" => ReplCommand::Capture,
        "time" => ReplCommand::Time(rest.to_owned()),
        "desc" => ReplCommand::Description(rest.to_owned()),
        "add" => parse_add(rest),
        "rm" => ReplCommand::Remove(parse_row(word, rest)?),
        "jump" => ReplCommand::Jump(parse_row(word, rest)?),
        "list" | "ls" => ReplCommand::List,
        "copy" => ReplCommand::Copy,
        "save" => ReplCommand::Save(PathBuf::from(required(word, rest)?)),
        "restore" => ReplCommand::Restore(PathBuf::from(required(word, rest)?)),
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => return Err(ParseError(format!("unknown command `{other}`, try `help`"))),
    };
    Ok(Some(command))
}

/// Guesses a MIME type from the file extension.
pub fn infer_content_type(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);

    let content_type = match extension.as_deref() {
        Some("mp4") => "video/mp4",
        Some("m4v") => "video/x-m4v",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("mov") => "video/quicktime",
        Some("ogv") => "video/ogg",
        Some("avi") => "video/x-msvideo",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    };
    content_type.to_owned()
}

fn parse_add(rest: &str) -> ReplCommand {
    if rest.is_empty() {
        return ReplCommand::Add {
            time: None,
            description: None,
        };
    }
    match rest.split_once(char::is_whitespace) {
        Some((time, description)) => ReplCommand::Add {
            time: Some(time.to_owned()),
            description: Some(description.trim().to_owned()),
        },
        None => ReplCommand::Add {
            time: Some(rest.to_owned()),
            description: None,
        },
    }
}

fn required<'a>(word: &str, rest: &'a str) -> Result<&'a str, ParseError> {
    if rest.is_empty() {
        return Err(ParseError(format!("`{word}` needs an argument")));
    }
    Ok(rest)
}

fn parse_row(word: &str, rest: &str) -> Result<usize, ParseError> {
    match required(word, rest)?.parse::<usize>() {
        Ok(row) if row > 0 => Ok(row),
        _ => Err(ParseError(format!("`{word}` expects a row number starting at 1"))),
    }
}

fn parse_position(raw: &str) -> Result<f64, ParseError> {
    if raw.contains(':') {
        return Ok(to_seconds(raw) as f64);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
        .ok_or_else(|| ParseError(format!("`{raw}` is not a position")))
}
