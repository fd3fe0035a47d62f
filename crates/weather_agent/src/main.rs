use std::io::{self, BufRead};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chat_store::SessionStore;
use weather_agent::app::App;
use weather_agent::config::AgentPaths;
use weather_agent::runtime::RuntimeController;
use weather_agent::transports::transport_from_env;
use weather_chat::{current_local_offset, init_logging, ChatSession, EnvConfig};

const TICK: Duration = Duration::from_millis(50);

fn main() -> anyhow::Result<()> {
    let env = EnvConfig::from_env();
    init_logging(&env);

    // Local offset lookup requires a single-threaded process.
    let offset = current_local_offset();
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let paths = AgentPaths::resolve(&env, &cwd);

    let transport = transport_from_env().map_err(|error| anyhow!(error))?;
    let session = ChatSession::open(SessionStore::in_dir(&paths.data_dir));
    let controller = RuntimeController::new(Arc::new(Mutex::new(session)), transport);

    let mut app = App::new(
        Arc::clone(&controller),
        paths.export_dir,
        offset,
        io::stdout(),
    );
    app.start()?;

    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::Builder::new()
        .name("weather-agent-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("failed to spawn stdin reader")?;

    while !app.should_exit() {
        app.on_tick()?;

        // Single-flight: input waits until the outstanding reply is applied.
        if app.is_sending() {
            controller.wait_for_events(TICK);
            continue;
        }

        match line_rx.recv_timeout(TICK) {
            Ok(line) => app.handle_line(&line)?,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}
