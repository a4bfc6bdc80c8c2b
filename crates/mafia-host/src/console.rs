//! Line-based operator console.

use std::future::Future;
use std::io::BufRead;
use std::pin::Pin;

use mafia_game::{Command, Flow, Orchestrator, Publisher, HELP};
use tokio::sync::mpsc;

/// Read stdin on a blocking thread; the channel closes at EOF.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Feed operator commands to the game until `quit`, EOF, `shutdown` or a
/// lost broker connection. Each command runs to completion before the next
/// line is read.
pub async fn run<P, F>(game: &mut Orchestrator<P>, mut shutdown: Pin<&mut F>) -> anyhow::Result<()>
where
    P: Publisher,
    F: Future<Output = std::io::Result<()>>,
{
    let mut lines = spawn_stdin_reader();

    loop {
        let line = tokio::select! {
            _ = shutdown.as_mut() => {
                println!("\nExiting...");
                return Ok(());
            }
            line = lines.recv() => match line {
                Some(line) => line,
                None => return Ok(()),
            },
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        if command == Command::Help {
            println!("{HELP}");
            continue;
        }

        match game.handle(command).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => return Ok(()),
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => println!("{e}"),
        }
    }
}
