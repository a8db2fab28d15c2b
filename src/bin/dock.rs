//! Runs a dock against an in-memory platform and replays platform events
//! from a JSON-lines script. The starting list and every list published
//! while replaying are printed to stdout as one JSON line each; logs go to
//! stderr.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use car_dock::actor;
use car_dock::actor::broadcast::{BroadcastEvent, BroadcastReceiver};
use car_dock::actor::dock::{self as dock_actor, DockActor, Event};
use car_dock::common::config::Config;
use car_dock::common::log;
use car_dock::dock::Dock;
use car_dock::model::ComponentName;
use car_dock::sys::catalog::{AppEntry, Catalog};
use car_dock::sys::package::PackageEvent;
use car_dock::sys::platform::Platform;
use car_dock::sys::task::RunningTask;
use clap::Parser;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "dock", about = "Drive a dock from a scripted platform")]
struct Cli {
    /// Config file. Defaults to dock/dock.toml in the user config directory
    /// when that file exists.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log filter directives, e.g. `car_dock=debug`. Overrides RUST_LOG.
    #[arg(long)]
    log: Option<String>,
    /// JSON-lines event script. Read from stdin when absent.
    #[arg(long)]
    script: Option<PathBuf>,
}

/// One line of the event script.
#[derive(Deserialize, Debug)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ScriptEvent {
    Launch {
        component: ComponentName,
    },
    Task {
        task: RunningTask,
    },
    Pin {
        component: ComponentName,
        #[serde(default)]
        index: Option<usize>,
    },
    /// Pins whatever occupies `slot` when the dock reaches this line.
    PinSlot {
        slot: usize,
    },
    Unpin {
        component: ComponentName,
    },
    UnpinSlot {
        slot: usize,
    },
    Action {
        action: String,
        component: ComponentName,
    },
    Install {
        app: AppEntry,
    },
    Uninstall {
        package: String,
    },
    Package {
        change: PackageEvent,
    },
    DistractionOptimized {
        components: Vec<ComponentName>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    log::init_logging(cli.log.as_deref());

    let config = load_config(cli.config.as_deref())?;
    let catalog = Catalog::with_apps(config.catalog.apps.iter().cloned()).shared();
    catalog.set_tasks(config.catalog.tasks.clone());
    let dock = Dock::new(&config.dock, Platform::from_shared(catalog.clone()))
        .context("could not fill the dock")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("could not start the runtime")?;
    let capability_ready = config.catalog.apps.iter().any(|app| app.distraction_optimized);
    let result = runtime.block_on(run(cli.script, dock, catalog, capability_ready));
    // A pending stdin read would otherwise keep the process alive.
    runtime.shutdown_background();
    result
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        return Config::read(path).with_context(|| format!("loading {}", path.display()));
    }
    match Config::default_path() {
        Some(path) if path.exists() => {
            Config::read(&path).with_context(|| format!("loading {}", path.display()))
        }
        _ => {
            debug!("no config file; using defaults");
            Ok(Config::default())
        }
    }
}

async fn run(
    script: Option<PathBuf>,
    dock: Dock,
    catalog: Arc<Catalog>,
    capability_ready: bool,
) -> anyhow::Result<()> {
    let input: Box<dyn AsyncBufRead + Send + Unpin> = match &script {
        Some(path) => {
            let text = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            Box::new(std::io::Cursor::new(text))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut notices = dock.subscribe_notices();
    print_json(&BroadcastEvent::from(&dock.snapshot()))?;

    let (tx, rx) = actor::channel();
    let (broadcast_tx, mut broadcast_rx): (_, BroadcastReceiver) = actor::channel();
    if capability_ready {
        tx.send(Event::CapabilityProviderReady(catalog.clone()));
    }
    let mut actor = tokio::spawn(DockActor::new(dock, rx).with_broadcast(broadcast_tx).run());
    let feeder = tokio::spawn(feed(input, tx, catalog));

    let outcome = loop {
        tokio::select! {
            biased;
            Some((_span, notice)) = notices.recv() => {
                print_json(&BroadcastEvent::from(notice))?;
            }
            Some((_span, event)) = broadcast_rx.recv() => print_json(&event)?,
            outcome = &mut actor => break outcome,
        }
    };

    // The actor may finish before everything it sent was printed.
    while let Ok((_span, notice)) = notices.try_recv() {
        print_json(&BroadcastEvent::from(notice))?;
    }
    while let Ok((_span, event)) = broadcast_rx.try_recv() {
        print_json(&event)?;
    }

    match outcome.context("dock actor panicked")? {
        Ok(()) => {
            feeder.await.context("script reader panicked")??;
            info!("script finished");
            Ok(())
        }
        Err(err) => {
            feeder.abort();
            Err(err).context("dock stopped")
        }
    }
}

async fn feed(
    input: Box<dyn AsyncBufRead + Send + Unpin>,
    tx: dock_actor::Sender,
    catalog: Arc<Catalog>,
) -> anyhow::Result<()> {
    let mut lines = input.lines();
    let mut line_no = 0;
    while let Some(line) = lines.next_line().await.context("reading script")? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<ScriptEvent>(line) {
            Ok(event) => apply(event, &tx, &catalog),
            Err(err) => warn!(line_no, %err, "skipping malformed script line"),
        }
    }
    Ok(())
}

/// Updates the in-memory platform the way the real one would change, then
/// tells the dock about it.
fn apply(event: ScriptEvent, tx: &dock_actor::Sender, catalog: &Arc<Catalog>) {
    match event {
        ScriptEvent::Launch { component } => tx.send(Event::AppLaunched(component)),
        ScriptEvent::Task { task } => {
            catalog.move_task_to_front(task.clone());
            tx.send(Event::TaskMovedToFront(task));
        }
        ScriptEvent::Pin { component, index } => tx.send(Event::PinComponent { component, index }),
        ScriptEvent::PinSlot { slot } => tx.send(Event::PinSlot(slot)),
        ScriptEvent::Unpin { component } => tx.send(Event::UnpinComponent(component)),
        ScriptEvent::UnpinSlot { slot } => tx.send(Event::UnpinSlot(slot)),
        ScriptEvent::Action { action, component } => tx.send(Event::Action { action, component }),
        ScriptEvent::Install { app } => {
            let package = app.component.package().to_owned();
            catalog.install(app);
            tx.send(Event::Package(PackageEvent::Added { package }));
        }
        ScriptEvent::Uninstall { package } => {
            catalog.uninstall(&package);
            tx.send(Event::Package(PackageEvent::Removed { package, replacing: false }));
        }
        ScriptEvent::Package { change } => tx.send(Event::Package(change)),
        ScriptEvent::DistractionOptimized { components } => {
            for component in &components {
                catalog.set_distraction_optimized(component, true);
            }
            tx.send(Event::CapabilityProviderReady(catalog.clone()));
        }
    }
}

fn print_json(event: &BroadcastEvent) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer(&mut out, event).context("encoding dock event")?;
    writeln!(out).context("writing to stdout")?;
    Ok(())
}
