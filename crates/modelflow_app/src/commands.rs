// SPDX-License-Identifier: MIT OR Apache-2.0
//! Console command parsing.
//!
//! Each line typed into the session is one graph gesture or query. Nodes are
//! addressed by the short numeric handle shown in the node table; ports as
//! `<handle>.<variable>`, with `#k` selecting the k-th duplicate.

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Help text listing every command
pub const HELP: &str = "\
commands:
  load <path>                 add a model from a spreadsheet
  reload <n> <path>           replace model n with another spreadsheet
  placeholder <label>         add an empty model
  remove <n>                  remove model n and its wires
  connect <n>.<var> <m>.<var> wire an output of n to an input of m (append #k for duplicates)
  disconnect <edge>           remove a wire by id prefix
  wire <n> <m>                wire every same-named output of n into m
  clear <n>                   clear the load error of model n
  wait                        wait for pending loads
  show                        print models, ranks and wires
  layers                      print execution layers
  json                        print the graph as JSON
  help                        show this help
  quit                        leave the session";

/// One port on the console, e.g. `2.rate#1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Node handle
    pub handle: u32,
    /// Variable name
    pub name: String,
    /// Which duplicate of the name
    pub occurrence: usize,
}

impl FromStr for Endpoint {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CommandError::InvalidEndpoint(s.to_string());
        let (handle, port) = s.split_once('.').ok_or_else(invalid)?;
        let handle = handle.parse().map_err(|_| invalid())?;
        // `#k` selects a duplicate only when k is all digits; otherwise `#` is
        // part of the variable name
        let (name, occurrence) = match port.rsplit_once('#') {
            Some((name, k)) if !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()) => {
                (name, k.parse().map_err(|_| invalid())?)
            }
            _ => (port, 0),
        };
        if name.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            handle,
            name: name.to_string(),
            occurrence,
        })
    }
}

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a model from a file
    Load(PathBuf),
    /// Replace a model's contents from a file
    Reload(u32, PathBuf),
    /// Add an empty model
    Placeholder(String),
    /// Remove a model
    Remove(u32),
    /// Wire an output to an input
    Connect {
        /// Output end
        source: Endpoint,
        /// Input end
        target: Endpoint,
    },
    /// Remove a wire by id prefix
    Disconnect(String),
    /// Wire same-named variables from one model into another
    Wire(u32, u32),
    /// Clear a model's load error
    Clear(u32),
    /// Wait for pending loads
    Wait,
    /// Print the node table
    Show,
    /// Print execution layers
    Layers,
    /// Print JSON
    Json,
    /// Print help
    Help,
    /// Leave the session
    Quit,
}

/// Console input that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Blank line
    #[error("empty command")]
    Empty,

    /// Unrecognized command word
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    /// A required argument was not given
    #[error("`{command}` expects {expected}")]
    MissingArgument {
        /// Command word
        command: &'static str,
        /// What was expected
        expected: &'static str,
    },

    /// A handle is not a number
    #[error("invalid model handle `{0}`")]
    InvalidHandle(String),

    /// A port is not `<handle>.<variable>[#k]`
    #[error("invalid port `{0}`, expected <handle>.<variable>[#k]")]
    InvalidEndpoint(String),
}

fn handle(arg: Option<&str>, command: &'static str) -> Result<u32, CommandError> {
    let arg = arg.ok_or(CommandError::MissingArgument {
        command,
        expected: "a model handle",
    })?;
    arg.parse()
        .map_err(|_| CommandError::InvalidHandle(arg.to_string()))
}

fn rest<'a>(line: &'a str, word: &str) -> &'a str {
    line[word.len()..].trim()
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let mut args = line.split_whitespace();
        let Some(word) = args.next() else {
            return Err(CommandError::Empty);
        };

        let command = match word {
            "load" => {
                let path = rest(line, word);
                if path.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "load",
                        expected: "a file path",
                    });
                }
                Self::Load(PathBuf::from(path))
            }
            "reload" => {
                let n = handle(args.next(), "reload")?;
                let after_handle = rest(line, word);
                let path = after_handle
                    .split_once(char::is_whitespace)
                    .map(|(_, path)| path.trim())
                    .unwrap_or_default();
                if path.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "reload",
                        expected: "a model handle and a file path",
                    });
                }
                Self::Reload(n, PathBuf::from(path))
            }
            "placeholder" => {
                let label = rest(line, word);
                Self::Placeholder(if label.is_empty() { "Untitled" } else { label }.to_string())
            }
            "remove" => Self::Remove(handle(args.next(), "remove")?),
            "connect" => {
                let missing = CommandError::MissingArgument {
                    command: "connect",
                    expected: "two ports",
                };
                let source = args.next().ok_or(missing.clone())?.parse()?;
                let target = args.next().ok_or(missing)?.parse()?;
                Self::Connect { source, target }
            }
            "disconnect" => {
                let id = args.next().ok_or(CommandError::MissingArgument {
                    command: "disconnect",
                    expected: "an edge id",
                })?;
                Self::Disconnect(id.to_string())
            }
            "wire" => Self::Wire(handle(args.next(), "wire")?, handle(args.next(), "wire")?),
            "clear" => Self::Clear(handle(args.next(), "clear")?),
            "wait" => Self::Wait,
            "show" | "ls" => Self::Show,
            "layers" => Self::Layers,
            "json" => Self::Json,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}
