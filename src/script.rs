//! Line-oriented event scripts replayed against a headless session.
//!
//! ```text
//! # hover the desk computer, open it, read it for a bit
//! over 9f2c pc_target
//! click pc_target
//! wait 800
//! close
//! ```

use crate::app::HeadlessHost;
use crate::error::ScriptError;
use crate::scene::NodeId;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Over { id: NodeId, name: String },
    Out(NodeId),
    Click(String),
    Close,
    Wait(u64),
    Restart,
    Mute,
    Menu,
    Start,
}

impl Command {
    pub fn apply(&self, session: &mut Session<HeadlessHost>) {
        match self {
            Self::Over { id, name } => session.on_pointer_over(id, name),
            Self::Out(id) => session.on_pointer_out(id),
            Self::Click(name) => {
                session.on_click(name);
            }
            Self::Close => {
                session.close_modal();
            }
            Self::Wait(ms) => session.advance(*ms),
            Self::Restart => {
                session.restart();
            }
            Self::Mute => {
                session.toggle_mute();
            }
            Self::Menu => session.show_menu(),
            Self::Start => session.start(),
        }
    }
}

pub fn parse_script(text: &str) -> Result<Vec<Command>, ScriptError> {
    let mut commands = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        let mut words = content.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let parsed = match command {
            "over" => {
                let id = argument(words.next(), line, "over", "<id> <name>")?;
                let name = argument(words.next(), line, "over", "<id> <name>")?;
                Command::Over {
                    id: NodeId::new(id),
                    name: name.to_string(),
                }
            }
            "out" => Command::Out(NodeId::new(argument(words.next(), line, "out", "<id>")?)),
            "click" => Command::Click(argument(words.next(), line, "click", "<name>")?.to_string()),
            "close" => Command::Close,
            "wait" => {
                let value = argument(words.next(), line, "wait", "<ms>")?;
                let ms = value.parse::<u64>().map_err(|_| ScriptError::InvalidDuration {
                    line,
                    value: value.to_string(),
                })?;
                Command::Wait(ms)
            }
            "restart" => Command::Restart,
            "mute" => Command::Mute,
            "menu" => Command::Menu,
            "start" => Command::Start,
            other => {
                return Err(ScriptError::UnknownCommand {
                    line,
                    command: other.to_string(),
                })
            }
        };
        commands.push(parsed);
    }
    Ok(commands)
}

fn argument<'a>(
    word: Option<&'a str>,
    line: usize,
    command: &'static str,
    expected: &'static str,
) -> Result<&'a str, ScriptError> {
    word.ok_or(ScriptError::MissingArgument {
        line,
        command,
        expected,
    })
}
