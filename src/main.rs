//! Hell's Gauntlet entry point
//!
//! Handles platform-specific initialization and runs the game loop. The web
//! build drives a session from requestAnimationFrame; the native build runs a
//! short scripted headless session and logs what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use hells_gauntlet::Session;
    use hells_gauntlet::audio::default_sink;
    use hells_gauntlet::consts::SIM_DT;
    use hells_gauntlet::platform::input::{Control, InputState};
    use hells_gauntlet::platform::storage::default_store;
    use hells_gauntlet::sim::{SessionPhase, Viewport};

    const BANNER_SECONDS: f32 = 3.0;

    /// Game instance holding all state
    struct Game {
        session: Session,
        input: InputState,
        last_time: f64,
        /// Seconds the achievement banner stays up
        banner_time: f32,
    }

    impl Game {
        fn new(viewport: Viewport, seed: u64) -> Self {
            let mut session = Session::new(viewport, seed, default_store(), default_sink());
            if session.load() {
                log::info!("Continuing saved game");
            }
            Self {
                session,
                input: InputState::new(),
                last_time: 0.0,
                banner_time: 0.0,
            }
        }

        fn update(&mut self, dt: f32) {
            let input = self.input.poll();
            self.session.update(dt, input);
            for achievement in self.session.take_unlocked() {
                self.show_banner(&format!("ACHIEVEMENT UNLOCKED: {}", achievement.title()));
            }

            if self.banner_time > 0.0 {
                self.banner_time -= dt;
                if self.banner_time <= 0.0 {
                    set_banner(None);
                }
            }
        }

        fn show_banner(&mut self, message: &str) {
            set_banner(Some(message));
            self.banner_time = BANNER_SECONDS;
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.session.snapshot();

            if let Some(el) = document.get_element_by_id("death-count") {
                el.set_text_content(Some(&hud.deaths.to_string()));
            }
            if let Some(el) = document.get_element_by_id("timer") {
                el.set_text_content(Some(&format!("{}s", hud.elapsed.floor() as u32)));
            }

            let screens = [
                ("start-screen", hud.phase == SessionPhase::Idle),
                ("pause-screen", hud.phase.is_paused()),
                ("death-screen", matches!(hud.phase, SessionPhase::Dead { .. })),
                ("victory-screen", hud.won),
            ];
            for (id, visible) in screens {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            }
        }
    }

    /// Show `message` in the banner, or hide it
    fn set_banner(message: Option<&str>) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("achievement"))
        {
            el.set_text_content(message);
            let _ = el.set_attribute("class", if message.is_some() { "" } else { "hidden" });
        }
    }

    fn viewport(window: &web_sys::Window) -> Viewport {
        let width = window.inner_width().ok().and_then(|v| v.as_f64());
        let height = window.inner_height().ok().and_then(|v| v.as_f64());
        match (width, height) {
            (Some(w), Some(h)) => Viewport::new(w as f32, h as f32),
            _ => Viewport::default(),
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Hell's Gauntlet starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(viewport(&window), seed)));

        setup_keyboard(&window, game.clone());
        setup_touch_buttons(game.clone());
        setup_menu_buttons(game.clone());
        setup_auto_pause(&window, game.clone());

        request_animation_frame(game);
    }

    fn setup_keyboard(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if game.borrow_mut().input.key_down(&event.code()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.code());
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_touch_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let buttons = [
            ("left-btn", Control::Left),
            ("right-btn", Control::Right),
            ("jump-btn", Control::Jump),
        ];
        for (id, control) in buttons {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            for (event_name, down) in [
                ("pointerdown", true),
                ("pointerup", false),
                ("pointerleave", false),
            ] {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    game.borrow_mut().input.touch(control, down);
                });
                let _ = btn
                    .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_menu_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let actions: [(&str, fn(&mut Game)); 8] = [
            ("start-btn", |g| g.session.start()),
            ("resume-btn", |g| g.session.resume()),
            ("restart-btn", |g| g.session.restart()),
            ("play-again-btn", |g| g.session.restart()),
            ("save-btn", |g| {
                g.session.save();
            }),
            ("load-btn", |g| {
                if !g.session.load() {
                    g.show_banner("No saved game found!");
                }
            }),
            ("clear-save-btn", |g| g.session.clear_save()),
            ("mute-btn", |g| {
                g.session.toggle_mute();
            }),
        ];
        for (id, action) in actions {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                action(&mut game.borrow_mut());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        // Window blur (click outside, tab switch)
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            g.input.clear();
            if g.session.phase() == SessionPhase::Running {
                g.session.pause();
                log::info!("Auto-paused (window blur)");
            }
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use hells_gauntlet::audio::default_sink;
    use hells_gauntlet::consts::SIM_DT;
    use hells_gauntlet::platform::storage::default_store;
    use hells_gauntlet::sim::{Difficulty, LevelLayout, TickInput, Viewport};
    use hells_gauntlet::{Session, Settings};

    env_logger::init();
    log::info!("Hell's Gauntlet (native) starting...");
    log::info!("Native mode runs a scripted headless session - build for wasm32 to play");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let difficulty = args
        .next()
        .and_then(|s| Difficulty::from_str(&s))
        .unwrap_or_default();

    let mut session = Session::new(Viewport::default(), seed, default_store(), default_sink());
    let settings = Settings {
        difficulty,
        layout: if difficulty == Difficulty::Normal {
            LevelLayout::Classic
        } else {
            LevelLayout::Random
        },
        ..session.settings().clone()
    };
    session.apply_settings(settings);
    session.restart();

    // Hold right, hop whenever grounded
    let frames = 60 * 30;
    for _ in 0..frames {
        let grounded = session.state().player.on_ground;
        let input = TickInput {
            right: true,
            jump_pressed: grounded,
            ..Default::default()
        };
        session.update(SIM_DT, input);
        if session.snapshot().won {
            break;
        }
    }

    let hud = session.snapshot();
    log::info!(
        "{} run finished: {:?}, {} deaths, {:.1}s, won: {}",
        difficulty.as_str(),
        hud.phase,
        hud.deaths,
        hud.elapsed,
        hud.won
    );
    for tag in &session.stats().achievements {
        log::info!("Achievement: {}", tag);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
