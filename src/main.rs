use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEvent};
use serde_json::{Value, json};
use tracing::Level;

use tilefocus::config::{Config, DEFAULT_CONFIG_TOML};
use tilefocus::constants::IDLE_POLL_MS;
use tilefocus::drivers::console::{ConsoleInputDriver, ConsoleTerminal};
use tilefocus::error::PaneError;
use tilefocus::event_loop::{ControlFlow, EventLoop, Tick};
use tilefocus::focus::{ElementId, VisualTree};
use tilefocus::keybindings::KeyBindings;
use tilefocus::layout::NavDirection;
use tilefocus::pane::{KindRegistry, PaneContent, PaneId, PaneKind};
use tilefocus::session::Session;
use tilefocus::tracing_sub;
use tilefocus::ui::{UiFrame, render_session, split_status};
use tilefocus::window::PaneManager;
use tilefocus::workspace::{
    JsonDirPersistence, MemoryPersistence, WorkspacePersistence, WorkspaceStore,
};

#[derive(Parser, Debug)]
#[command(
    name = "tilefocus",
    version = env!("CARGO_PKG_VERSION"),
    about = "Keyboard-driven tiling panes with directional focus and saved workspaces"
)]
struct Cli {
    /// TOML config file. Missing files fall back to the defaults.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for workspace-<n>.json files. Overrides the config file.
    #[arg(long = "workspace-dir", value_name = "DIR")]
    workspace_dir: Option<PathBuf>,

    /// Write logs here instead of stderr.
    #[arg(long = "log-file", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<String>,

    /// Print the default config file and exit.
    #[arg(long = "print-config")]
    print_config: bool,

    /// List the key bindings and exit.
    #[arg(long = "keys")]
    keys: bool,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    if cli.print_config {
        print!("{DEFAULT_CONFIG_TOML}");
        return Ok(());
    }
    if cli.keys {
        for (action, combos) in KeyBindings::default().help_entries() {
            println!("{:<28} {action}", combos.join(", "));
        }
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref()).map_err(io::Error::other)?;
    if let Some(dir) = cli.workspace_dir.clone() {
        config.workspace_dir = Some(dir);
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }
    config.validate().map_err(io::Error::other)?;
    let level: Level = config.log_level.parse().map_err(io::Error::other)?;
    tracing_sub::init(level, cli.log_file.as_deref())?;

    let mut session = build_session(&config)?;
    let mut terminal = ConsoleTerminal::new()?;
    terminal.enter()?;

    let mut event_loop = EventLoop::new(
        ConsoleInputDriver::new(),
        Duration::from_millis(IDLE_POLL_MS),
    );
    let mut dirty = true;
    let result = event_loop.run(|tick| match tick {
        Tick::Idle(now) => {
            dirty |= session.on_idle(now);
            if dirty {
                terminal.draw(|frame| {
                    let (canvas, _) = split_status(frame.area());
                    session.manager_mut().set_canvas(canvas);
                    let mut ui = UiFrame::new(frame);
                    render_session(&mut ui, &session);
                })?;
                dirty = false;
            }
            Ok(ControlFlow::Continue)
        }
        Tick::Input(Event::Key(key)) => {
            dirty = true;
            match session.handle_key(&key, false) {
                Some(flow) => Ok(flow),
                None => {
                    pane_key(&mut session, &key);
                    Ok(ControlFlow::Continue)
                }
            }
        }
        Tick::Input(Event::Resize(..)) => {
            dirty = true;
            Ok(ControlFlow::Continue)
        }
        Tick::Input(_) => Ok(ControlFlow::Continue),
    });

    terminal.exit()?;
    if let Err(err) = session.shutdown() {
        tracing::warn!(error = %err, "failed to save workspace on exit");
    }
    result
}

fn build_session(config: &Config) -> io::Result<Session> {
    let mut registry = KindRegistry::new();
    register_demo(&mut registry, "notes", "Notes", &["inbox", "ideas", "drafts"]);
    register_demo(&mut registry, "tasks", "Tasks", &["today", "this week", "someday"]);
    register_demo(&mut registry, "calendar", "Calendar", &["agenda", "month"]);
    let kinds = registry.kinds();

    let feedback = |pane: PaneId, direction: NavDirection| {
        tracing::debug!(pane_id = %pane, %direction, "hit layout edge");
    };
    let manager = PaneManager::new(
        Box::new(registry),
        Box::new(feedback),
        config.manager_config(),
    );

    let persistence: Arc<dyn WorkspacePersistence> = match &config.workspace_dir {
        Some(dir) => Arc::new(JsonDirPersistence::new(dir.clone())),
        None => Arc::new(MemoryPersistence::new()),
    };
    let mut store = WorkspaceStore::new(manager, persistence, config.workspace_slots);
    if config.background_save {
        store.enable_background_save()?;
    }
    store.load_initial();
    Ok(Session::new(store, KeyBindings::default(), kinds))
}

fn register_demo(
    registry: &mut KindRegistry,
    kind: &str,
    title: &'static str,
    items: &'static [&'static str],
) {
    let kind = PaneKind::new(kind);
    registry.register(kind.clone(), move || {
        Ok(Box::new(DemoPane::new(kind.clone(), title, items)) as Box<dyn PaneContent>)
    });
}

/// Keys that are not shortcuts go to the focused pane. The demo panes only
/// understand Tab and Shift+Tab, which walk input focus across their items.
fn pane_key(session: &mut Session, key: &KeyEvent) {
    let forward = match key.code {
        KeyCode::Tab => true,
        KeyCode::BackTab => false,
        _ => return,
    };
    let manager = session.manager_mut();
    let Some(container) = manager
        .focused()
        .and_then(|id| manager.pane(id))
        .map(|pane| pane.container())
    else {
        return;
    };
    let tree = manager.tree();
    let items: Vec<ElementId> = tree
        .children(container)
        .iter()
        .copied()
        .filter(|&element| tree.is_focusable(element))
        .collect();
    if items.is_empty() {
        return;
    }
    let len = items.len();
    let current = manager
        .input_focus()
        .and_then(|focus| items.iter().position(|&element| element == focus.element));
    let next = match current {
        Some(index) if forward => (index + 1) % len,
        Some(index) => (index + len - 1) % len,
        None => 0,
    };
    manager.set_input_focus(items[next]);
}

/// Placeholder content: a heading plus a few selectable items.
struct DemoPane {
    kind: PaneKind,
    title: &'static str,
    items: Vec<String>,
    filter: Option<String>,
}

impl DemoPane {
    fn new(kind: PaneKind, title: &'static str, items: &[&str]) -> Self {
        Self {
            kind,
            title,
            items: items.iter().map(|item| item.to_string()).collect(),
            filter: None,
        }
    }
}

impl PaneContent for DemoPane {
    fn build_visual(&mut self, tree: &mut VisualTree, container: ElementId) {
        tree.insert(container, self.title.to_ascii_uppercase(), false);
        for item in &self.items {
            tree.insert(container, item.as_str(), true);
        }
    }

    fn on_context_changed(&mut self, filter: Option<&str>) {
        self.filter = filter.map(str::to_string);
    }

    fn save_state(&self) -> Result<Value, PaneError> {
        Ok(json!({ "items": self.items }))
    }

    fn restore_state(&mut self, state: &Value) -> Result<(), PaneError> {
        let Some(items) = state.get("items") else {
            return Ok(());
        };
        self.items = serde_json::from_value(items.clone()).map_err(|err| PaneError::State {
            kind: self.kind.clone(),
            reason: err.to_string(),
        })?;
        Ok(())
    }

    fn title(&self) -> Option<String> {
        Some(match &self.filter {
            Some(filter) => format!("{} [{filter}]", self.title),
            None => self.title.to_string(),
        })
    }
}
