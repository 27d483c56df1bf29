use clap::Parser;
use homeboard::core::{ConfigureRef, PreviewHandle, ProviderInfo, ProviderRef, SimHost};
use homeboard::manager::{ExternalRequest, Outcome, ResultPayload, REQUEST_PICK_WIDGET};
use homeboard::ui::{MenuEntry, WidgetAction};
use homeboard::{FileStore, MemoryStore, Menu, SurfaceConfig, WidgetManager, WidgetStore};
use log::{info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// homeboard - widget host reconciliation demo shell
///
/// Runs a scripted session against an in-process simulated widget host:
/// reconciliation (optionally with a flaky host start), the add-widget
/// workflow, a move/resize session and the control-surface menus.
#[derive(Parser, Debug, Clone)]
#[command(name = "homeboard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,

    /// Persist widget records to this JSON file instead of memory
    #[arg(short = 's', long = "store", value_name = "FILE")]
    store: Option<PathBuf>,

    /// Fail the first host start to demonstrate the reconciliation retry
    #[arg(long = "flaky-host")]
    flaky_host: bool,
}

fn print_menu(label: &str, menu: &Menu) {
    println!("--- {label} ---");
    for entry in menu.entries() {
        match entry {
            MenuEntry::Title(text) => println!("  == {text} =="),
            MenuEntry::Note(text) => println!("     {text}"),
            MenuEntry::Config { label, .. } => println!("   > {label}"),
            MenuEntry::WidgetAction { label, .. } => println!("   > {label}"),
            MenuEntry::Widget { widget_id, label, .. } => {
                println!("   > {label} (#{widget_id})")
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logger with verbosity based on -d/--debug flag;
    // RUST_LOG overrides the CLI setting
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    warn!("Starting homeboard v{}", env!("CARGO_PKG_VERSION"));

    let mut host = SimHost::new();
    host.register_provider(
        ProviderInfo {
            provider: ProviderRef::new("com.example.clock/Clock"),
            label: "Clock".into(),
            min_width: 160,
            min_height: 80,
            configure: None,
            preview: Some(PreviewHandle("clock#preview".into())),
        },
        true,
    );
    host.register_provider(
        ProviderInfo {
            provider: ProviderRef::new("com.example.notes/Notes"),
            label: "Sticky notes".into(),
            min_width: 200,
            min_height: 120,
            configure: Some(ConfigureRef("com.example.notes/Configure".into())),
            preview: None,
        },
        true,
    );
    if cli.flaky_host {
        host.fail_next_starts(1);
    }

    let store: Box<dyn WidgetStore> = match &cli.store {
        Some(path) => match FileStore::open_path(path) {
            Ok(store) => Box::new(store),
            Err(err) => {
                warn!("could not open store at {}: {err}", path.display());
                return;
            }
        },
        None => Box::new(MemoryStore::new()),
    };

    let mut manager = WidgetManager::new(host, store, SurfaceConfig::default());

    // startup reconciliation, pumping the retry timer until it settles
    manager.restore_widgets(Instant::now());
    while manager.retry_pending() {
        std::thread::sleep(Duration::from_millis(50));
        manager.tick(Instant::now());
    }
    manager.surface_mut().set_viewport(1080, 1920);
    info!(
        "restored {} widget(s) from the store",
        manager.widget_count()
    );

    print_menu("surface menu", &manager.config_menu());

    // add a clock through the external pick flow
    let id = manager.select_widget();
    for request in manager.take_requests() {
        info!("external request: {request:?}");
        if let ExternalRequest::Pick { widget_id, .. } = request {
            manager
                .host_mut()
                .bind(widget_id, ProviderRef::new("com.example.clock/Clock"));
            manager.on_activity_result(
                REQUEST_PICK_WIDGET,
                Outcome::Ok,
                ResultPayload::widget(widget_id),
            );
        }
    }
    info!("created widget {id}");
    print_menu("surface menu", &manager.config_menu());
    print_menu("widget menu", &manager.widget_menu(id));

    // move it a page over, then grow it
    manager.apply_widget_action(id, WidgetAction::Move);
    manager.begin_drag(id);
    manager.drag_by(id, 540, 0);
    manager.end_drag(id);
    manager.apply_widget_action(id, WidgetAction::Resize);
    manager.begin_drag(id);
    manager.drag_by(id, 80, 40);
    manager.end_drag(id);
    manager.on_widget_click(id);

    let rec = manager.record(id).copied();
    info!("widget {id} committed as {rec:?}");

    // follow the wallpaper to the middle page
    manager.scroll(0.5, 0.0);
    info!("scroll position: {:?}", manager.surface().scroll_px());

    print_menu("widget list", &manager.widget_list_menu("Remove widget"));
    manager.stop();
}
