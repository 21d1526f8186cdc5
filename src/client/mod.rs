//! Capabilities the session controller is given rather than reaching for

mod clipboard;
mod export;
pub mod gateway;
mod store;

pub use clipboard::{Clipboard, NoClipboard, SystemClipboard};
pub use export::{DirectoryExportSink, ExportSink};
pub use gateway::{
    ChatExchangeRequest, Gateway, GatewayError, GatewayReply, HttpGateway, Transcription,
};
pub use store::{FileStore, KeyValueStore, MemoryStore};
