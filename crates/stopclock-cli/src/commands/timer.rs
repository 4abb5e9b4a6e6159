use stopclock_core::{Stopwatch, StopwatchStore};

/// Persist best-effort. Write failures are non-fatal: the in-memory state
/// stays authoritative for this invocation and the next command retries.
fn persist(store: &StopwatchStore, stopwatch: &Stopwatch) {
    if let Err(e) = store.save(stopwatch) {
        eprintln!("warning: failed to persist stopwatch state: {e}");
    }
}

pub fn start() -> Result<(), Box<dyn std::error::Error>> {
    let store = StopwatchStore::open()?;
    let (mut stopwatch, _) = store.load();

    match stopwatch.start() {
        Some(event) => {
            persist(&store, &stopwatch);
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        None => {
            // Already running; print the unchanged state.
            persist(&store, &stopwatch);
            println!(
                "{}",
                serde_json::to_string_pretty(&stopwatch.status_event())?
            );
        }
    }
    Ok(())
}

pub fn stop() -> Result<(), Box<dyn std::error::Error>> {
    let store = StopwatchStore::open()?;
    let (mut stopwatch, _) = store.load();

    match stopwatch.stop() {
        Some(event) => {
            persist(&store, &stopwatch);
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        None => {
            persist(&store, &stopwatch);
            println!(
                "{}",
                serde_json::to_string_pretty(&stopwatch.status_event())?
            );
        }
    }
    Ok(())
}

pub fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let store = StopwatchStore::open()?;
    let (mut stopwatch, _) = store.load();

    let event = stopwatch.clear();
    // Deleting the record is equivalent to persisting the zeroed snapshot:
    // an absent record loads as the default stopped state.
    if let Err(e) = store.clear() {
        eprintln!("warning: failed to clear persisted state: {e}");
    }
    if let Some(event) = event {
        println!("{}", serde_json::to_string_pretty(&event)?);
    }
    Ok(())
}

pub fn status() -> Result<(), Box<dyn std::error::Error>> {
    let store = StopwatchStore::open()?;
    // Loading credits any downtime and re-anchors a running stopwatch;
    // persist that so repeated status calls don't re-credit the same gap.
    let (stopwatch, resumed) = store.load();
    persist(&store, &stopwatch);

    println!(
        "{}",
        serde_json::to_string_pretty(&stopwatch.status_event())?
    );
    if let Some(event) = resumed {
        println!("{}", serde_json::to_string_pretty(&event)?);
    }
    Ok(())
}
