//! Live terminal readout.
//!
//! Drives the stopwatch tick loop: redraws the `m:ss` readout every
//! `watch.tick_ms`, persists a drift-corrected fold every `watch.fold_ms`,
//! and checkpoints on Ctrl-C so a suspended or closed terminal loses no
//! time. The interval lives inside the loop; leaving the loop tears it
//! down, so a new watch always starts a fresh schedule.

use std::io::Write;
use std::time::Duration;

use stopclock_core::{Config, Stopwatch, StopwatchStore};

fn format_line(stopwatch: &Stopwatch, show_status: bool) -> String {
    let status = if stopwatch.is_running() {
        "RUNNING"
    } else {
        "STOPPED"
    };
    if show_status {
        format!("{} {}", stopwatch.display(), status)
    } else {
        stopwatch.display()
    }
}

fn persist(store: &StopwatchStore, stopwatch: &Stopwatch) {
    // Non-fatal; the readout keeps working from memory.
    if let Err(e) = store.save(stopwatch) {
        eprintln!("\nwarning: failed to persist stopwatch state: {e}");
    }
}

pub fn run(once: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = StopwatchStore::open()?;
    let (mut stopwatch, _) = store.load();
    // The load re-anchored a running stopwatch; persist before ticking.
    persist(&store, &stopwatch);

    if once {
        println!("{}", format_line(&stopwatch, config.display.show_status));
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let fold_ms = config.fold_interval_ms();
        let tick_ms = config.watch.tick_ms.clamp(50, 1000);
        let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if stopwatch.tick_every(fold_ms).is_some() {
                        persist(&store, &stopwatch);
                    }
                    print!("\r{:<24}", format_line(&stopwatch, config.display.show_status));
                    let _ = std::io::stdout().flush();
                }
                _ = &mut ctrl_c => {
                    // The unload hook: fold the open run so nothing is lost.
                    stopwatch.checkpoint();
                    persist(&store, &stopwatch);
                    println!();
                    break;
                }
            }
        }
    });

    Ok(())
}
