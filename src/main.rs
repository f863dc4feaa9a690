use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use storecheck::geolocation::GeolocationError;
use storecheck::{
    Catalog, CheckInController, CheckInStatus, DetailPanel, LocationPicker, MapSurface, Session,
    SimulatedGeolocation, StoreCheckConfig, logging,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

mod console;

use console::{Command, ConsoleMap, ConsoleNotifier, HELP, parse_command};

/// Store locator check-in, driven from the terminal
#[derive(Debug, Parser)]
#[command(name = "storecheck", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "STORECHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Display width in pixels, overriding the configuration
    #[arg(long)]
    width: Option<u32>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = StoreCheckConfig::load_from_path(cli.config.clone())?;
    if let Some(width) = cli.width {
        config.map.viewport_width = width;
        config.validate()?;
    }
    logging::init(&config.logging, cli.verbose)?;

    let catalog = match &config.catalog.path {
        Some(path) => {
            let context = format!("Failed to load catalog {}", path.display());
            Catalog::load(path).context(context)?
        }
        None => Catalog::embedded().context("Embedded catalog is invalid")?,
    };
    let catalog = Arc::new(catalog);
    info!("Catalog ready with {} businesses", catalog.len());

    let device = if config.geolocation.supported {
        SimulatedGeolocation::new(config.geolocation.position())
            .with_latency(Duration::from_millis(config.geolocation.latency_ms))
    } else {
        SimulatedGeolocation::unsupported()
    };

    println!(
        "🗺️ Map centred at {} (zoom {}), {} px wide",
        config.map.center(),
        config.map.initial_zoom,
        config.map.viewport_width
    );
    println!("{HELP}");

    let map = ConsoleMap::new(config.map.viewport_width);
    let mut session = Session::new(
        catalog.clone(),
        map,
        ConsoleNotifier::default(),
        device.clone(),
    );
    let (tx, rx) = mpsc::channel(32);

    let mut last_shown = None;
    let observer = move |controller: &CheckInController<ConsoleMap, ConsoleNotifier>| {
        let shown = controller
            .selected()
            .map(|b| (b.id.clone(), b.coordinates, controller.status()));
        if shown != last_shown {
            render(controller);
            last_shown = shown;
        }
    };

    let picker = LocationPicker::new(catalog);
    let (_, read) = tokio::join!(
        session.run_with(rx, observer),
        read_commands(tx, &picker, &device)
    );
    read
}

fn render(controller: &CheckInController<ConsoleMap, ConsoleNotifier>) {
    match controller.selected() {
        Some(business) => {
            let panel = DetailPanel::new(
                business,
                controller.status(),
                controller.map().viewport_width(),
            );
            print!("{panel}");
        }
        None if controller.status() == CheckInStatus::Idle => println!("(no business selected)"),
        None => {}
    }
}

async fn read_commands(
    tx: mpsc::Sender<storecheck::UiEvent>,
    picker: &LocationPicker,
    device: &SimulatedGeolocation,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Ui(event)) => {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Ok(Command::List) => print_options(picker, ""),
            Ok(Command::Search(query)) => print_options(picker, &query),
            Ok(Command::Goto(position)) => {
                device.move_to(position);
                println!("📡 device now reports {position}");
            }
            Ok(Command::Deny) => {
                device.fail_with(GeolocationError::PermissionDenied);
                println!("📡 device now refuses location requests");
            }
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Quit) => break,
            Err(message) => println!("{message}"),
        }
    }
    Ok(())
}

fn print_options(picker: &LocationPicker, query: &str) {
    let options = picker.search(query);
    if options.is_empty() {
        println!("no business matches '{query}'");
    }
    for option in options {
        println!("  {:>4}  {}", option.value, option.label.trim());
    }
}
