mod console;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use clap::Parser;
use mafia_game::{
    CommandSink, FeedbackSink, GameConfig, GameEvent, Mode, Orchestrator, Publisher, SilentSink,
};
use mafia_transport::{BrokerClient, ClientConfig};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "mafia-host", about = "Run a Mafia game on the wristbands")]
struct Cli {
    /// Broker host (default: MAFIA_BROKER_HOST or 192.168.137.1).
    #[arg(long)]
    host: Option<String>,

    /// Broker port (default: MAFIA_BROKER_PORT or 1883).
    #[arg(long)]
    port: Option<u16>,

    /// Sounds only; taps are still used to hand out roles.
    #[arg(long, conflicts_with = "only_taps")]
    only_sound: bool,

    /// Taps only, no sounds.
    #[arg(long)]
    only_taps: bool,

    /// Directory holding the earcon .mp3 files.
    #[arg(long, default_value = "./earcons")]
    sound_dir: PathBuf,

    /// Audio player command; the sound file is appended as last argument.
    #[arg(long, default_value = "mpg123 -q")]
    player: String,

    /// Never start the audio player.
    #[arg(long)]
    no_sound: bool,

    /// Seed for role dealing (repeatable games).
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn mode(&self) -> Mode {
        Mode::from_flags(self.only_sound, self.only_taps)
    }

    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        if let Some(host) = &self.host {
            config = config.host(host.clone());
        }
        if let Some(port) = self.port {
            config = config.port(port);
        }
        config
    }

    fn sink(&self) -> Box<dyn FeedbackSink> {
        if self.no_sound {
            return Box::new(SilentSink);
        }
        match CommandSink::new(&self.player, &self.sound_dir) {
            Ok(sink) => Box::new(sink),
            Err(e) => {
                tracing::warn!("audio disabled: {e}");
                Box::new(SilentSink)
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = BrokerClient::connect(&cli.client_config()).await?;
    println!("Connected to broker at {}", client.peer());

    let mut config = GameConfig::new().mode(cli.mode());
    if let Some(seed) = cli.seed {
        config = config.seed(seed);
    }

    let (events_tx, events_rx) = mpsc::channel(64);
    let printer = tokio::spawn(print_events(events_rx));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut game = Orchestrator::new(client, cli.sink(), config, events_tx);
    let outcome = play(&mut game, ctrl_c).await;

    // Dropping the orchestrator closes the event channel.
    let client = game.into_publisher();
    if let Err(e) = printer.await {
        tracing::warn!("event printer failed: {e}");
    }
    if let Err(e) = client.close().await {
        tracing::warn!("{e}");
    }

    println!("Game ended.");
    outcome
}

/// Deal the first game, then hand over to the console. `shutdown` ends the
/// session at any point, including during role distribution.
async fn play<P, F>(game: &mut Orchestrator<P>, mut shutdown: Pin<&mut F>) -> anyhow::Result<()>
where
    P: Publisher,
    F: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        _ = shutdown.as_mut() => {
            println!("\nExiting...");
            return Ok(());
        }
        started = game.start() => started?,
    }
    console::run(game, shutdown).await
}

async fn print_events(mut events: mpsc::Receiver<GameEvent>) {
    while let Some(event) = events.recv().await {
        if matches!(
            event,
            GameEvent::Nightfall | GameEvent::PhaseEntered(_) | GameEvent::RolesAssigned(_)
        ) {
            println!();
        }
        println!("{event}");
    }
}
