//! Neural Terminal - voice-driven AI chat terminal and its provider gateway
//!
//! This library provides:
//! - A gateway server that forwards chat requests to OpenAI or Perplexity and
//!   audio uploads to Whisper, adding credentials and per-model defaults
//! - A terminal session controller that interprets local commands, keeps the
//!   conversation, and talks to the gateway
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Terminal front-end                   │
//! │   stdin  │  microphone  │  clipboard  │  exports    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              Session Controller                      │
//! │   commands  │  history  │  stats  │  settings       │
//! └────────────────────┬────────────────────────────────┘
//!                      │ HTTP
//! ┌────────────────────▼────────────────────────────────┐
//! │                   Gateway                            │
//! │   /api/chat  │  /api/transcribe  │  /health         │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//!          OpenAI  │  Perplexity  │  Whisper
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod providers;
pub mod session;
pub mod terminal;
pub mod voice;

pub use api::{ApiServer, ApiServerBuilder};
pub use client::{Gateway, GatewayError, HttpGateway};
pub use config::Config;
pub use error::{Error, Result};
pub use providers::{ModelSelector, Provider};
pub use session::{SessionController, SessionSettings, SessionState};
