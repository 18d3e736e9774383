use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_app::App;
use folio_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Folio album catalogue service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server until Ctrl+C or SIGTERM
    Serve {
        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the effective settings as JSON (session tokens are never shown)
    Settings,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load Folio settings")?;

    match cli.command {
        Command::Settings => {
            let rendered = serde_json::to_string_pretty(&settings)
                .with_context(|| "failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            folio_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "folio serve starting");

            let runtime = tokio::runtime::Runtime::new()
                .with_context(|| "failed to start tokio runtime")?;
            runtime.block_on(App::new(settings).run())
        }
    }
}
