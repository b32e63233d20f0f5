use anyhow::Result;
use chrono::Timelike;
use colored::Colorize;
use ovenclock::prelude::*;
use ovenclock::{ENGINE_NAME, VERSION};
use std::io::BufRead;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    // 2. Load the configuration: `ovenclock.toml` if present, overridable
    //    through OVENCLOCK_* environment variables.
    let mut config = load_config()?;

    // 3. No configured seed: start the wall clock at the local time.
    if config.clock_seed.is_none() {
        let now = chrono::Local::now();
        config.clock_seed = Some(ClockSeed {
            hour: now.hour() as u8,
            minute: now.minute() as u8,
        });
    }

    // 4. Create the engine and wire the terminal front panel.
    let engine = OvenClockEngine::new(config);
    spawn_panel_printer(&engine);
    spawn_stdin_buttons(&engine);

    info!("{} v{} — type 1 or 2 then Enter to press a button.", ENGINE_NAME, VERSION);

    // 5. Run the engine. This returns when Ctrl+C is received.
    engine.run().await?;

    Ok(())
}

fn load_config() -> Result<OvenClockConfig> {
    let loaded = config::Config::builder()
        .add_source(config::File::with_name("ovenclock").required(false))
        .add_source(config::Environment::with_prefix("OVENCLOCK").separator("__"))
        .build()?
        .try_deserialize::<OvenClockConfig>();
    match loaded {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!("Config not usable ({}); falling back to defaults.", e);
            Ok(OvenClockConfig::default())
        }
    }
}

/// Subscribes to the panel stream and renders it on the terminal: the time
/// display line, and the alert LED as red text.
fn spawn_panel_printer(engine: &OvenClockEngine) {
    let mut panel = engine.subscribe_panel_events();
    tokio::spawn(async move {
        while let Ok(event) = panel.recv().await {
            match event {
                PanelEvent::Banner { line } => {
                    println!("{}", line.dimmed());
                }
                PanelEvent::TimeShown { time } => {
                    // The device sends `H:MM\r`; one terminal line per render.
                    println!("{}", format!("{}", time).cyan().bold());
                }
                PanelEvent::Led { on: true } => {
                    println!("{}", "** ALARM **".red().bold());
                }
                PanelEvent::Led { on: false } => {
                    println!("{}", "alarm cleared".dimmed());
                }
            }
        }
    });
}

/// Reads stdin lines from a plain thread and turns `1`/`2` into button
/// presses. `ButtonHandle::press` never blocks, so this thread needs no
/// runtime handle.
fn spawn_stdin_buttons(engine: &OvenClockEngine) {
    let buttons = engine.button_handle();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match line.trim() {
                "1" => buttons.press(SwitchId::Switch1),
                "2" => buttons.press(SwitchId::Switch2),
                "" => {}
                other => println!("unknown input '{}' (use 1 or 2)", other),
            }
        }
    });
}
