//! Terminal panels rendered as plain display lines

use std::time::Duration;

use chrono::{DateTime, Local, Utc};

use super::command::LocalCommand;
use super::settings::SessionSettings;
use super::types::{ChatMessage, ErrorLogEntry, Role, SystemStats};
use crate::providers::{ModelSelector, Provider};

/// Messages shown by the history viewer
pub const HISTORY_PANEL_MESSAGES: usize = 10;

/// Entries shown by the error log viewer
pub const ERROR_PANEL_ENTRIES: usize = 20;

/// Characters of each message shown by the history viewer
pub const HISTORY_PREVIEW_CHARS: usize = 100;

const LABEL_WIDTH: usize = 12;
const VALUE_WIDTH: usize = 30;
const INNER_WIDTH: usize = LABEL_WIDTH + VALUE_WIDTH + 5;

fn rule(left: char, right: char) -> String {
    format!("{left}{}{right}", "═".repeat(INNER_WIDTH))
}

fn centered(text: &str) -> String {
    format!("║{text:^INNER_WIDTH$}║")
}

fn row(label: &str, value: &str) -> String {
    format!("║ {label:<LABEL_WIDTH$} │ {value:<VALUE_WIDTH$} ║")
}

fn titled(title: &str, rows: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut lines = vec![rule('╔', '╗'), centered(title), rule('╠', '╣')];
    lines.extend(rows);
    lines.push(rule('╚', '╝'));
    lines
}

const fn on_off(flag: bool) -> &'static str {
    if flag { "ENABLED" } else { "DISABLED" }
}

/// `1h 2m 3s`
#[must_use]
pub fn format_hms(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Local wall-clock time, `HH:MM:SS`
#[must_use]
pub fn clock(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Welcome banner shown at start and after reset
#[must_use]
pub fn banner(model: ModelSelector) -> Vec<String> {
    let mut lines = vec![
        rule('╔', '╗'),
        centered(&format!("NEURAL TERMINAL v{}", env!("CARGO_PKG_VERSION"))),
        centered("AI VOICE INTERFACE SYSTEM"),
        rule('╚', '╝'),
        String::new(),
        "> INITIALIZING NEURAL MATRIX...".to_string(),
        "> VOICE RECOGNITION: ONLINE".to_string(),
        "> AI MODELS: READY".to_string(),
        format!("> ACTIVE MODEL: {model}"),
        "> CONVERSATION MEMORY: ENABLED".to_string(),
        "> ERROR LOGGING: INITIALIZED".to_string(),
        String::new(),
    ];
    lines.extend(titled(
        "AVAILABLE COMMANDS",
        LocalCommand::ALL
            .into_iter()
            .map(|c| row(c.keyword(), c.summary())),
    ));
    lines.push(String::new());
    lines.push("NEURAL INTERFACE READY > _".to_string());
    lines
}

/// Command matrix
#[must_use]
pub fn help_panel() -> Vec<String> {
    let mut rows: Vec<String> = LocalCommand::ALL
        .into_iter()
        .map(|c| row(c.keyword(), c.summary()))
        .collect();
    rows.push(row("[MIC]", "Voice neural interface"));
    titled("COMMAND MATRIX", rows)
}

/// Inputs to the diagnostics panel
#[derive(Debug)]
pub struct StatusSnapshot<'a> {
    pub model: ModelSelector,
    pub settings: &'a SessionSettings,
    pub uptime: Duration,
    pub errors: u64,
    pub connected: bool,
}

/// System diagnostics
#[must_use]
pub fn status_panel(s: &StatusSnapshot<'_>) -> Vec<String> {
    let key_state = |p: Provider| {
        if s.settings.has_key(p) {
            "SESSION KEY"
        } else {
            "GATEWAY KEY"
        }
    };

    titled(
        "SYSTEM DIAGNOSTICS",
        [
            row("VERSION", &format!("Neural Terminal v{}", env!("CARGO_PKG_VERSION"))),
            row("AI MODEL", s.model.display_name()),
            row(
                "TEMPERATURE",
                &format!("{:.1}", s.settings.effective_temperature(s.model)),
            ),
            row(
                "MAX TOKENS",
                &s.settings.effective_max_tokens(s.model).to_string(),
            ),
            row("MEMORY", on_off(s.settings.conversation_memory)),
            row(
                "CONTEXT",
                if s.settings.smart_context { "SMART" } else { "BASIC" },
            ),
            row("DEBUG MODE", on_off(s.settings.debug_mode)),
            row("VOICE AUTO", on_off(s.settings.voice_auto_send)),
            row("SOUND FX", on_off(s.settings.sound_effects)),
            row("OPENAI API", key_state(Provider::OpenAi)),
            row("PERPLEXITY", key_state(Provider::Perplexity)),
            row("UPTIME", &format_hms(s.uptime)),
            row("ERRORS", &s.errors.to_string()),
            row(
                "CONNECTION",
                if s.connected { "ONLINE" } else { "OFFLINE" },
            ),
        ],
    )
}

/// Usage statistics
#[must_use]
pub fn stats_panel(stats: &SystemStats, transcriptions: usize, uptime: Duration) -> Vec<String> {
    let secs = uptime.as_secs();
    titled(
        "USAGE STATISTICS",
        [
            row("TOTAL CHATS", &stats.total_exchanges.to_string()),
            row("TOTAL TOKENS", &stats.total_tokens.to_string()),
            row(
                "AVG RESPONSE",
                &format!("{:.0}ms", stats.avg_response_ms.round()),
            ),
            row("VOICE TRANS", &transcriptions.to_string()),
            row("ERROR COUNT", &stats.errors.to_string()),
            row("SESSION TIME", &format!("{}m {}s", secs / 60, secs % 60)),
        ],
    )
}

/// Recent conversation, newest last
#[must_use]
pub fn history_panel(messages: &[ChatMessage], show_tokens: bool) -> Vec<String> {
    let start = messages.len().saturating_sub(HISTORY_PANEL_MESSAGES);
    let mut lines = vec!["── NEURAL HISTORY ──".to_string()];
    if messages.is_empty() {
        lines.push("  (no messages yet)".to_string());
    }
    for msg in &messages[start..] {
        let who = match msg.role {
            Role::User => "USER",
            Role::Assistant => msg.model.as_deref().unwrap_or("ASSISTANT"),
        };
        let mut header = format!("  [{}] {who}", clock(msg.timestamp));
        if let (true, Some(tokens)) = (show_tokens, msg.tokens) {
            header.push_str(&format!(" • {tokens}t"));
        }
        let preview: String = msg.content.chars().take(HISTORY_PREVIEW_CHARS).collect();
        let ellipsis = if msg.content.chars().count() > HISTORY_PREVIEW_CHARS {
            "..."
        } else {
            ""
        };
        lines.push(format!("{header}: {preview}{ellipsis}"));
    }
    lines
}

/// Recent diagnostics, newest last
#[must_use]
pub fn error_panel<'a>(
    entries: impl Iterator<Item = &'a ErrorLogEntry>,
    total: usize,
    debug: bool,
) -> Vec<String> {
    let mut lines = vec![format!("── ERROR LOG VIEWER ({total}) ──")];
    for entry in entries {
        lines.push(format!(
            "  [{}] [{}] {}",
            clock(entry.timestamp),
            entry.level,
            entry.message
        ));
        if let (true, Some(details)) = (debug, &entry.details) {
            lines.push(format!("      {details}"));
        }
    }
    lines
}
