use std::path::{Path, PathBuf};

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;
use clap::Parser;
use tracing::{error, info, warn};

use tunnelrogue::{
    Config, Control, Game,
    engine::input::{action_for_click, action_for_key},
    render::{self, MainMenuChoice, menus::main_menu_choice},
    save::{SaveError, delete_save, load_game, save_game},
    scripted_input::{ScriptEvent, ScriptedInput},
    telemetry,
};

/// Descend through procedurally dug tunnels.
#[derive(Parser, Debug)]
#[command(name = "tunnelrogue", version, about, long_about = None)]
struct Args {
    /// Seed for reproducible dungeons
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file overriding the game constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where the game is saved on exit
    #[arg(long, default_value = "savegame.json")]
    save: PathBuf,

    /// Play a key script headless instead of opening a window
    #[arg(long)]
    script: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `tunnelrogue=trace` (defaults to RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Log file for interactive play
    #[arg(long, default_value = "tunnelrogue.log")]
    log_file: PathBuf,
}

enum Screen {
    MainMenu { notice: Option<String> },
    Playing(Box<Game>),
}

struct RogueState {
    config: Config,
    save_path: PathBuf,
    screen: Screen,
}

impl GameState for RogueState {
    fn tick(&mut self, ctx: &mut BTerm) {
        let next = match &mut self.screen {
            Screen::MainMenu { notice } => {
                render::main_menu(ctx, &self.config.window_title);
                if let Some(text) = notice.as_deref() {
                    render::message_box(ctx, text, 30);
                }
                match ctx.key {
                    Some(_) if notice.is_some() => {
                        *notice = None;
                        None
                    }
                    Some(key) => match main_menu_choice(key) {
                        Some(MainMenuChoice::NewGame) => Some(new_game(&self.config)),
                        Some(MainMenuChoice::Continue) => {
                            Some(continue_game(&self.config, &self.save_path))
                        }
                        Some(MainMenuChoice::Quit) => {
                            ctx.quit();
                            None
                        }
                        None => None,
                    },
                    None => None,
                }
            }
            Screen::Playing(game) => {
                let (mx, my) = ctx.mouse_pos();
                let mouse = Point::new(mx, my);
                let action = match ctx.key {
                    Some(key) => action_for_key(game.state, key),
                    None if ctx.left_click => action_for_click(game.state, mouse, true),
                    None => None,
                };
                let quit = action.is_some_and(|action| game.handle(action) == Control::Quit);
                render::render_all(ctx, game, mouse);
                quit.then(|| leave_game(game, &self.save_path))
            }
        };
        if let Some(screen) = next {
            self.screen = screen;
        }
    }
}

fn new_game(config: &Config) -> Screen {
    match Game::new(config.clone()) {
        Ok(game) => Screen::Playing(Box::new(game)),
        Err(err) => {
            error!(%err, "could not generate a dungeon");
            Screen::MainMenu {
                notice: Some(format!("Could not start: {err}")),
            }
        }
    }
}

fn continue_game(config: &Config, save_path: &Path) -> Screen {
    match load_game(save_path, config.clone()) {
        Ok(game) => Screen::Playing(Box::new(game)),
        Err(SaveError::NotFound(_)) => Screen::MainMenu {
            notice: Some("No save game to load.".to_string()),
        },
        Err(err) => {
            error!(%err, "could not load save");
            Screen::MainMenu {
                notice: Some("The save game could not be read.".to_string()),
            }
        }
    }
}

/// Saves a living player's game; a dead player's save is removed.
fn persist(game: &Game, save_path: &Path) -> Result<(), SaveError> {
    if game.player_is_dead() {
        delete_save(save_path)
    } else {
        save_game(save_path, game)
    }
}

fn leave_game(game: &Game, save_path: &Path) -> Screen {
    let notice = match persist(game, save_path) {
        Ok(()) => None,
        Err(err) => {
            error!(%err, "could not save");
            Some("The game could not be saved.".to_string())
        }
    };
    Screen::MainMenu { notice }
}

fn run_script(config: Config, script: &Path, save_path: &Path) -> BError {
    let mut input = ScriptedInput::from_file(script)?;
    let mut game = match load_game(save_path, config.clone()) {
        Ok(game) => game,
        Err(SaveError::NotFound(_)) => Game::new(config)?,
        Err(err) => {
            warn!(%err, "ignoring unreadable save");
            Game::new(config)?
        }
    };
    info!(events = input.remaining(), "running script");

    while let Some(event) = input.next_event() {
        let action = match event {
            ScriptEvent::Key(key) => action_for_key(game.state, key),
            ScriptEvent::Click { point, left } => action_for_click(game.state, point, left),
        };
        let Some(action) = action else {
            continue;
        };
        if game.handle(action) == Control::Quit {
            break;
        }
    }

    persist(&game, save_path)?;
    let stats = game.ecs.player_stats();
    info!(
        state = ?game.state,
        level = game.map.dungeon_level,
        hp = stats.map(|s| s.hp),
        "script finished"
    );
    for message in game.log.iter() {
        println!("{}", message.text);
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<Config, tunnelrogue::config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> BError {
    let args = Args::parse();
    let config = load_config(&args)?;

    if let Some(script) = &args.script {
        telemetry::init_stderr_logging(args.log_level.as_deref());
        return run_script(config, script, &args.save);
    }

    telemetry::init_file_logging(&args.log_file, args.log_level.as_deref())?;
    let context = BTermBuilder::simple(config.screen_width, config.screen_height)?
        .with_title(config.window_title.clone())
        .build()?;
    let state = RogueState {
        config,
        save_path: args.save,
        screen: Screen::MainMenu { notice: None },
    };
    main_loop(context, state)
}
