/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod logging;
mod scheduler;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use config::GameConfig;
use error::AppResult;
use scheduler::TickScheduler;
use sim::event::GameEvent;
use sim::intent::{self, Intent};
use sim::world::GameState;
use ui::gamepad::GamepadState;
use ui::input::{self as keys, Command, InputState};
use ui::renderer::Renderer;
use ui::sound::{self, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let (config, config_problem) = GameConfig::load();

    match logging::init(&config.log) {
        Ok(Some(path)) => info!(log = %path.display(), "logging started"),
        Ok(None) => {}
        Err(e) => eprintln!("Warning: {e}"),
    }
    if let Some(e) = config_problem {
        warn!("{e}; using default settings");
    }
    info!(tick_rate_ms = config.speed.tick_rate_ms, seed = ?config.seed, "starting");

    let mut state = GameState::new();
    if let Err(e) = run(&mut state, &config) {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Muncher!");
    println!("Final Score: {}", state.score);
}

/// Owns the terminal for the duration of the game.
fn run(state: &mut GameState, config: &GameConfig) -> AppResult<()> {
    let mut renderer = Renderer::new();
    renderer.init()?;

    let result = game_loop(state, &mut renderer, config);

    renderer.cleanup()?;
    result
}

fn game_loop(state: &mut GameState, renderer: &mut Renderer, config: &GameConfig) -> AppResult<()> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let sound = if config.sound_enabled { SoundEngine::new() } else { None };

    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad connected");
    }
    let mut ticks = TickScheduler::new(Duration::from_millis(config.speed.tick_rate_ms));

    let mut session = Session { state, rng: &mut rng, renderer, sound: sound.as_ref() };

    loop {
        kb.drain_events();
        let pad = gp.update();

        for key in kb.presses() {
            let commands = keys::key_commands(key, session.state.status);
            if session.run_commands(&commands) {
                return Ok(());
            }
        }
        let commands = pad.commands(session.state.status, session.state.difficulty);
        if session.run_commands(&commands) {
            return Ok(());
        }

        let now = Instant::now();
        ticks.sync(session.state.status, now);
        if ticks.due(now) {
            session.dispatch(Intent::Tick);
            ticks.sync(session.state.status, now);
        }

        session.renderer.render(session.state)?;

        let nap = ticks.remaining(Instant::now()).map_or(FRAME_SLEEP, |r| r.min(FRAME_SLEEP));
        std::thread::sleep(nap);
    }
}

/// Everything an intent touches: the snapshot, the random source and
/// the outputs that react to events.
struct Session<'a> {
    state: &'a mut GameState,
    rng: &'a mut StdRng,
    renderer: &'a mut Renderer,
    sound: Option<&'a SoundEngine>,
}

impl Session<'_> {
    /// Run commands in order. Returns true on quit.
    fn run_commands(&mut self, commands: &[Command]) -> bool {
        for &cmd in commands {
            match cmd {
                Command::Quit => {
                    info!(score = self.state.score, "quit requested");
                    return true;
                }
                Command::Apply(intent) => self.dispatch(intent),
            }
        }
        false
    }

    fn dispatch(&mut self, intent: Intent) {
        let (next, events) = intent::apply(self.state, intent, &mut *self.rng);
        *self.state = next;
        self.react(&events);
    }

    fn react(&mut self, events: &[GameEvent]) {
        if events.is_empty() { return; }
        self.renderer.notify(events, Instant::now());
        if let Some(sfx) = self.sound {
            for effect in sound::effects_for(events) {
                sfx.play(effect);
            }
        }
    }
}
