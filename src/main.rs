use std::sync::{Arc, Mutex, PoisonError, mpsc};
use std::time::Duration;

use aqmon_service::config::{DEFAULT_CONFIG_PATH, DashboardConfig};
use aqmon_service::dashboard::{Dashboard, RedrawGate};
use aqmon_service::ingest::TelemetryClient;
use aqmon_service::ingest::thingspeak::HttpFieldSource;
use aqmon_service::logging;
use aqmon_service::poller::Poller;
use chrono::Local;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DashboardConfig::load_or_reference(DEFAULT_CONFIG_PATH)?;
    logging::init_logger(&config.logging)?;

    let registry = config.registry()?;
    let district_ids = registry.ids();
    let source = HttpFieldSource::new(&config.telemetry_host, config.request_timeout())?;
    let client = Arc::new(TelemetryClient::new(registry, source));
    let board = Arc::new(Mutex::new(Dashboard::new(&district_ids)));

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        tracing::info!("got SIGINT, shutting down");
        let _ = shutdown_tx.send(());
    })?;

    let poller = Poller::spawn(
        client,
        district_ids,
        Arc::clone(&board),
        config.poll_interval(),
    )?;

    let stale_after = config.stale_after();
    let mut redraw = RedrawGate::default();
    loop {
        {
            let board = board.lock().unwrap_or_else(PoisonError::into_inner);
            let now = Local::now();
            if redraw.should_redraw(&board, now, stale_after) {
                // Clear the screen and home the cursor before each frame.
                print!("\x1b[2J\x1b[H{}", board.render(now, stale_after));
            }
        }

        match shutdown_rx.recv_timeout(Duration::from_millis(250)) {
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            _ => break,
        }
    }

    poller.stop();
    tracing::info!("shut down");
    Ok(())
}
