//! Interactive line-oriented front-end
//!
//! Reads stdin, drives a [`SessionController`], and prints whatever the
//! transcript gained since the last prompt. Slash-prefixed controls stand in
//! for the buttons and settings panel of a graphical terminal.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::Result;
use crate::providers::ModelSelector;
use crate::session::{SessionController, TranscriptCursor};

/// Front-end controls, distinct from the session's local commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellControl {
    /// Start or stop voice capture
    Voice,
    Model(String),
    Set { key: String, value: String },
    Save,
    Load,
    Tokens,
    Controls,
    Quit,
    /// Slash input that is not a known control
    Unknown(String),
}

impl ShellControl {
    /// Parse a slash control; plain input returns `None`
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix('/')?;
        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();
        let arg = parts.next().unwrap_or_default().trim();

        Some(match name.as_str() {
            "voice" | "mic" => Self::Voice,
            "model" => Self::Model(arg.to_string()),
            "set" => {
                let mut kv = arg.splitn(2, char::is_whitespace);
                let key = kv.next().unwrap_or_default().to_string();
                let value = kv.next().unwrap_or_default().trim().to_string();
                Self::Set { key, value }
            }
            "save" => Self::Save,
            "load" => Self::Load,
            "tokens" => Self::Tokens,
            "controls" | "?" => Self::Controls,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(rest.to_string()),
        })
    }
}

const CONTROLS: &[(&str, &str)] = &[
    ("/voice", "start or stop voice capture"),
    ("/model <name>", "ChatGPT, GPT-4 or Perplexity"),
    ("/set <key> <value>", "change a setting, e.g. /set temperature 0.5"),
    ("/save", "persist settings"),
    ("/load", "restore saved settings"),
    ("/tokens", "toggle token display"),
    ("/controls", "show this list"),
    ("/quit", "leave the terminal"),
    ("<enter>", "send the pending voice draft"),
];

fn print_controls() {
    println!("Terminal controls:");
    for (control, summary) in CONTROLS {
        println!("  {control:<20} {summary}");
    }
}

/// Print transcript lines the renderer has not shown yet
fn flush_transcript(controller: &SessionController, cursor: &mut TranscriptCursor) {
    let transcript = controller.transcript();
    let delta = transcript.since(*cursor);
    if delta.cleared {
        print!("\x1b[2J\x1b[H");
    }
    for line in delta.lines {
        println!("{line}");
    }
    *cursor = transcript.cursor();
}

fn prompt(controller: &SessionController) {
    if controller.draft().is_empty() {
        print!("> ");
    } else {
        print!("[draft: {}] > ", controller.draft());
    }
    let _ = std::io::stdout().flush();
}

/// Run the interactive loop until `/quit` or end of input
///
/// # Errors
///
/// Returns error if stdin cannot be read
#[allow(clippy::future_not_send)]
pub async fn run(mut controller: SessionController) -> Result<()> {
    let mut cursor = TranscriptCursor::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    flush_transcript(&controller, &mut cursor);
    println!("Type /controls for terminal controls.");
    prompt(&controller);

    while let Some(line) = lines.next_line().await? {
        match ShellControl::parse(&line) {
            Some(ShellControl::Quit) => break,
            Some(ShellControl::Voice) => controller.toggle_voice().await,
            Some(ShellControl::Model(name)) => match name.parse::<ModelSelector>() {
                Ok(model) => controller.select_model(model),
                Err(e) => println!("{e}"),
            },
            Some(ShellControl::Set { key, value }) => {
                controller.set_setting(&key, &value);
            }
            Some(ShellControl::Save) => {
                controller.save_settings();
            }
            Some(ShellControl::Load) => {
                controller.load_settings();
            }
            Some(ShellControl::Tokens) => controller.toggle_show_tokens(),
            Some(ShellControl::Controls) => print_controls(),
            Some(ShellControl::Unknown(raw)) => println!("unknown control: /{raw}"),
            None if line.trim().is_empty() => {
                controller.submit_draft().await;
            }
            None => {
                controller.submit(&line).await;
            }
        }

        flush_transcript(&controller, &mut cursor);
        prompt(&controller);
    }

    println!();
    tracing::debug!(session = %controller.session_id(), "terminal closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_input_is_not_a_control() {
        assert_eq!(ShellControl::parse("hello"), None);
        assert_eq!(ShellControl::parse("status"), None);
    }

    #[test]
    fn controls_parse_their_arguments() {
        assert_eq!(ShellControl::parse("/voice"), Some(ShellControl::Voice));
        assert_eq!(
            ShellControl::parse("/model  GPT-4 "),
            Some(ShellControl::Model("GPT-4".to_string()))
        );
        assert_eq!(
            ShellControl::parse("/set temperature 0.4"),
            Some(ShellControl::Set {
                key: "temperature".to_string(),
                value: "0.4".to_string(),
            })
        );
        assert_eq!(ShellControl::parse("/QUIT"), Some(ShellControl::Quit));
        assert_eq!(
            ShellControl::parse("/dance"),
            Some(ShellControl::Unknown("dance".to_string()))
        );
    }
}
