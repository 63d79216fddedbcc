pub mod category;
pub mod commands;
pub mod error;
pub mod nutrislice;
pub mod sensor;
pub mod setup;
pub mod state;
pub mod timeline;
pub mod types;
pub mod util;

use std::sync::Arc;

use state::AppState;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Run the stand-in host: load config, set up the instance, start the poller,
/// then print every published state and accept commands on stdin.
///
/// Commands: `set_date <today|tomorrow|YYYY-MM-DD>`, `refresh`, `state`,
/// `status`, `quit`.
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(serve()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn serve() -> Result<(), String> {
    let config = state::load_config()?;

    let instance = state::setup(config).await.map_err(|e| {
        let err = error::SetupError::from(&e);
        serde_json::to_string(&err).unwrap_or_else(|_| e.to_string())
    })?;
    {
        let sensor = instance.sensor.lock();
        log::info!("Sensor ready: {} ({})", sensor.name(), sensor.unique_id());
    }

    // Printer: one JSON line per published state
    let mut updates = instance.subscribe();
    print_state(updates.borrow_and_update().as_ref());
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            print_state(updates.borrow_and_update().as_ref());
        }
    });

    tokio::spawn(nutrislice::poller::run_menu_poller(instance.clone()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if !handle_command(&instance, line.trim()) {
            return Ok(());
        }
    }

    // Running detached (no stdin): keep polling until killed.
    log::info!("Command input closed; poller keeps running");
    std::future::pending::<()>().await;
    Ok(())
}

/// Dispatch one stdin command. Returns false when the host should exit.
fn handle_command(instance: &Arc<AppState>, line: &str) -> bool {
    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    match name {
        "" => {}
        "set_date" => {
            // Errors are already logged; the override is unchanged.
            let _ = commands::set_target_date(instance, arg);
        }
        "refresh" => commands::request_refresh(instance),
        // The printer task picks up the republished state
        "state" => {
            if commands::recompute_state(instance).is_none() {
                log::info!("No menu data yet");
            }
        }
        "status" => print_status(instance),
        "quit" | "exit" => return false,
        other => log::warn!("Unknown command: {}", other),
    }
    true
}

fn print_status(instance: &AppState) {
    let status = serde_json::json!({
        "last_refreshed": commands::get_last_refreshed(instance).map(|t| t.to_rfc3339()),
        "last_error": commands::get_last_error(instance),
    });
    println!("{}", status);
}

fn print_state(state: Option<&types::MenuState>) {
    let Some(state) = state else {
        return;
    };
    match serde_json::to_string(state) {
        Ok(json) => println!("{}", json),
        Err(e) => log::warn!("Failed to serialize state: {}", e),
    }
}
