use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use neural_terminal::client::{DirectoryExportSink, FileStore, Gateway, SystemClipboard};
use neural_terminal::voice::{AudioPayload, AudioSource, FileAudioSource};
use neural_terminal::{ApiServerBuilder, Config, HttpGateway, ModelSelector, SessionController};

/// Neural Terminal - voice-driven AI chat terminal and provider gateway
#[derive(Parser)]
#[command(name = "neural-terminal", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the gateway server (default)
    Serve {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
    /// Open the interactive terminal
    Terminal {
        /// Gateway base URL
        #[arg(long, env = "NEURAL_TERMINAL_GATEWAY_URL")]
        gateway_url: Option<String>,

        /// Initial model (ChatGPT, GPT-4, Perplexity)
        #[arg(short, long)]
        model: Option<ModelSelector>,

        /// Replay this audio file for every voice capture instead of the microphone
        #[arg(long)]
        audio_file: Option<PathBuf>,
    },
    /// Transcribe one audio file through the gateway
    Transcribe {
        /// Audio file to upload
        file: PathBuf,

        /// Gateway base URL
        #[arg(long, env = "NEURAL_TERMINAL_GATEWAY_URL")]
        gateway_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, Some(Command::Terminal { .. }));

    // Set up logging based on verbosity; the terminal keeps quiet by default
    let filter = match (cli.verbose, interactive) {
        (0, true) => "warn",
        (0, false) => "info,neural_terminal=info",
        (1, _) => "info,neural_terminal=debug",
        (2, _) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            tracing::info!(
                host = %config.server.host,
                port = config.server.port,
                "starting neural terminal gateway"
            );
            ApiServerBuilder::from_config(config).build().run().await?;
        }
        Command::Terminal {
            gateway_url,
            model,
            audio_file,
        } => {
            let url = gateway_url.unwrap_or(config.terminal.gateway_url);
            let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::new(reqwest::Client::new(), &url));

            let controller = SessionController::builder(gateway)
                .model(model.unwrap_or_default())
                .store(FileStore::in_dir(&config.terminal.data_dir))
                .clipboard(SystemClipboard)
                .export_sink(DirectoryExportSink::new(config.terminal.export_dir))
                .audio_source(audio_source(audio_file))
                .build();

            tracing::info!(gateway = %url, "terminal session started");
            neural_terminal::terminal::run(controller).await?;
        }
        Command::Transcribe { file, gateway_url } => {
            let url = gateway_url.unwrap_or(config.terminal.gateway_url);
            let gateway = HttpGateway::new(reqwest::Client::new(), &url);

            let audio = AudioPayload::from_file(&file)?;
            tracing::info!(file = %file.display(), bytes = audio.len(), "uploading audio");

            let transcription = gateway.transcribe(audio).await?;
            println!("{}", transcription.text);
        }
    }

    Ok(())
}

/// Pick the capture backend: a replay file, the microphone, or nothing
fn audio_source(audio_file: Option<PathBuf>) -> Box<dyn AudioSource> {
    if let Some(path) = audio_file {
        return Box::new(FileAudioSource::new(path));
    }

    #[cfg(feature = "microphone")]
    {
        Box::new(neural_terminal::voice::MicrophoneSource)
    }

    #[cfg(not(feature = "microphone"))]
    {
        tracing::warn!("built without the microphone feature - voice capture is unavailable");
        Box::new(neural_terminal::voice::UnavailableAudioSource)
    }
}
