use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventKind,
    HandlerResponse, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokedex::action::Action;
use pokedex::api::PokeApiClient;
use pokedex::config::{Config, DEFAULT_LIMIT};
use pokedex::effect::{self, Effect};
use pokedex::logging::init_logging;
use pokedex::reducer::reducer;
use pokedex::resolver::{EntityResolver, DEFAULT_CONCURRENCY};
use pokedex::state::AppState;
use pokedex::ui::{DexComponentId, DexContext, DexUi};

#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Browse the PokeAPI catalog in the terminal")]
struct Args {
    /// PokeAPI base URL
    #[arg(long, default_value = pokedex::api::API_BASE)]
    api_base: String,

    /// Number of catalog entries to list
    #[arg(
        long,
        default_value_t = DEFAULT_LIMIT,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..=2000)
    )]
    limit: usize,

    /// Maximum detail requests in flight
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Resolve every detail right after the catalog loads
    #[arg(long)]
    prefetch: bool,

    /// Start with name ordering enabled
    #[arg(long)]
    sorted: bool,

    /// Audio file played once at startup
    #[arg(long)]
    music: Option<PathBuf>,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    #[command(flatten)]
    debug: DebugCliArgs,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            api_base: self.api_base.clone(),
            limit: self.limit,
            concurrency: self.concurrency.max(1),
            prefetch: self.prefetch,
            sorted: self.sorted,
            music: self.music.clone(),
            log_dir: self.log_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let config = args.config();
    let _logging = init_logging(&config.log_dir)?;
    tracing::info!(api_base = %config.api_base, limit = config.limit, "starting pokedex");

    let client = PokeApiClient::new(config.api_base.clone());
    let resolver = Arc::new(EntityResolver::new(Arc::new(client), config.concurrency));

    let debug = DebugSession::new(args.debug);
    let initial = config.clone();
    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(initial))
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, &config, resolver).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    tracing::info!("pokedex stopped");
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    config: &Config,
    resolver: Arc<EntityResolver>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(DexUi::new()));
    let mut bus: EventBus<AppState, Action, DexComponentId, DexContext> = EventBus::new();
    let keybindings: Keybindings<DexContext> = Keybindings::new();

    let ui_list = Rc::clone(&ui);
    bus.register(DexComponentId::DexList, move |event, state| {
        ui_list.borrow_mut().handle_list_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(DexComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        EventKind::Key(key) if !state.search.active => match key.code {
            crossterm::event::KeyCode::Char('q') => HandlerResponse::action(Action::Quit),
            crossterm::event::KeyCode::Char('/') => HandlerResponse::action(Action::SearchStart),
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    });

    let tick = config.tick_interval();
    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", tick, || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, Arc::clone(&resolver)),
        )
        .await
}

fn detail_key(name: &str) -> TaskKey {
    TaskKey::new(format!("detail_{name}"))
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, resolver: Arc<EntityResolver>) {
    match effect {
        Effect::LoadCatalog { limit } => {
            ctx.tasks().spawn(
                TaskKey::new("catalog"),
                effect::load_catalog(resolver.source(), limit),
            );
        }
        Effect::ResolveDetail { name } => {
            let key = detail_key(&name);
            ctx.tasks().spawn(key, effect::resolve_detail(resolver, name));
        }
        Effect::CancelDetail { name } => {
            tracing::debug!(%name, "detail resolution cancelled");
            ctx.tasks().cancel(&detail_key(&name));
        }
        Effect::PrefetchDetails { names } => {
            ctx.tasks().spawn(
                TaskKey::new("prefetch"),
                effect::prefetch_details(resolver, names),
            );
        }
        Effect::PlayMusic { path } => {
            ctx.tasks()
                .spawn(TaskKey::new("music"), effect::play_music(path));
        }
    }
}
