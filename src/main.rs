//! Math Defender entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use math_defender::audio::web::AudioManager;
    use math_defender::renderer::{FrameSink, RenderState};
    use math_defender::sim::{GameStatus, Operator, Playfield, ProblemGenerator, TickSource};
    use math_defender::{ConfigError, Game, RenderError, Settings, Tuning};

    /// Browser host: the game plus the GPU surface once it exists
    struct Host {
        game: Game<AudioManager>,
        render_state: Option<RenderState>,
        hud_cache: String,
    }

    impl Host {
        /// Canvas CSS pixels to playfield x, `None` outside the playfield
        fn pointer_to_field(&self, x: f32, y: f32) -> Option<f32> {
            let render_state = self.render_state.as_ref()?;
            let dpr = web_sys::window()?.device_pixel_ratio() as f32;
            render_state
                .letterbox
                .to_field(Vec2::new(x * dpr, y * dpr))
                .map(|p| p.x)
        }

        fn frame(&mut self, time: f64) {
            let sink = self.render_state.as_mut().map(|r| r as &mut dyn FrameSink);
            match self.game.frame(time, sink) {
                Ok(_) => {}
                Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let hud = self.game.hud();
            // Skip DOM writes when nothing changed
            let key = format!("{:?}", hud);
            if key == self.hud_cache {
                return;
            }
            self.hud_cache = key;

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let set_text = |id: &str, text: &str| {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(text));
                }
            };
            let set_visible = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };

            set_text("hud-score", &hud.score.to_string());
            set_text("hud-lives", &hud.lives.to_string());
            set_text("hud-level", &hud.difficulty.to_string());
            set_text("hud-problem", hud.question.as_deref().unwrap_or(""));
            set_text(
                "hud-best",
                &hud.high_score.map(|s| s.to_string()).unwrap_or_default(),
            );

            set_text("hud-operators", &hud.operators);
            set_visible("boss-bar", hud.boss_health.is_some());
            if let Some(health) = hud.boss_health {
                set_text("boss-health", &format!("{:.0}%", health * 100.0));
            }

            set_visible("menu", hud.status == GameStatus::Menu);
            set_visible("hud", hud.status == GameStatus::Playing);
            set_visible("game-over", hud.status == GameStatus::GameOver);
            if hud.status == GameStatus::GameOver {
                set_text("final-score", &hud.score.to_string());
                set_text(
                    "final-accuracy",
                    &hud.accuracy_percent
                        .map(|a| format!("{:.0}%", a))
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Math Defender starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element; nothing to draw on");
            return;
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = read_config(&canvas, "data-settings", Settings::from_json);
        let tuning = read_config(&canvas, "data-tuning", Tuning::from_json);
        let seed = js_sys::Date::now() as u64;
        let audio = AudioManager::new(&settings);
        let field = Playfield::new(tuning.width, tuning.height);
        let mut game = Game::new(seed, settings, tuning, audio);
        if let Some(list) = canvas.get_attribute("data-operators") {
            match ProblemGenerator::parse(&list) {
                Ok(generator) => {
                    game.set_generator(generator);
                }
                Err(e) => log::warn!("Ignoring data-operators: {}", e),
            }
        }
        let host = Rc::new(RefCell::new(Host {
            game,
            render_state: None,
            hud_cache: String::new(),
        }));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, host.clone());
        setup_buttons(host.clone());
        setup_visibility_handler(host.clone());

        // The loop runs even before the GPU is ready; frames are skipped until then
        request_animation_frame(host.clone());

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };
        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height, field).await {
            Ok(render_state) => host.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Failed to create device: {}", e),
        }

        log::info!("Math Defender running!");
    }

    /// JSON config from a canvas data attribute; missing or invalid means defaults
    fn read_config<T: Default>(
        canvas: &HtmlCanvasElement,
        attr: &str,
        parse: fn(&str) -> Result<T, ConfigError>,
    ) -> T {
        let Some(json) = canvas.get_attribute(attr) else {
            return T::default();
        };
        parse(&json).unwrap_or_else(|e| {
            log::warn!("Ignoring {}: {}", attr, e);
            T::default()
        })
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, host: Rc<RefCell<Host>>) {
        // Mouse move
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut h = host.borrow_mut();
                let x = h.pointer_to_field(event.offset_x() as f32, event.offset_y() as f32);
                h.game.input.pointer_x = x;
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer left the canvas
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                host.borrow_mut().game.input.pointer_x = None;
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move and touch start both steer
        for event_name in ["touchstart", "touchmove"] {
            let host = host.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    let mut h = host.borrow_mut();
                    let field_x = h.pointer_to_field(x, y);
                    h.game.input.pointer_x = field_x;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        let Some(window) = web_sys::window() else {
            return;
        };
        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut h = host.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => h.game.input.left = pressed,
                    "ArrowRight" | "d" | "D" => h.game.input.right = pressed,
                    "m" | "M" if pressed => {
                        h.game.toggle_mute();
                    }
                    "i" | "I" if pressed => {
                        h.game.input.autopilot = !h.game.input.autopilot;
                        log::info!("Autopilot: {}", h.game.input.autopilot);
                    }
                    " " | "Enter" if pressed => match h.game.session.status {
                        GameStatus::Menu => {
                            h.game.start();
                        }
                        GameStatus::GameOver => {
                            h.game.restart();
                        }
                        GameStatus::Playing => {}
                    },
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(host: Rc<RefCell<Host>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let actions: [(&str, fn(&mut Host)); 3] = [
            ("start-btn", |h| {
                h.game.audio.resume();
                h.game.start();
            }),
            ("restart-btn", |h| {
                h.game.audio.resume();
                h.game.restart();
            }),
            ("mute-btn", |h| {
                h.game.toggle_mute();
            }),
        ];

        for (id, action) in actions {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                action(&mut host.borrow_mut());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Menu operator toggles
        let op_ids = ["op-add", "op-sub", "op-mul", "op-div"];
        for (id, op) in op_ids.into_iter().zip(Operator::ALL) {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                host.borrow_mut().game.toggle_operator(op);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// A hidden tab stops rAF; drop the backlog so the sim doesn't jump on return
    fn setup_visibility_handler(host: Rc<RefCell<Host>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let doc = document.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            if doc.visibility_state() == web_sys::VisibilityState::Visible {
                host.borrow_mut().game.clock_mut().reset();
                log::info!("Tab visible again; clock reset");
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(host, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(host: Rc<RefCell<Host>>, time: f64) {
        {
            let mut h = host.borrow_mut();
            h.frame(time);
            h.update_hud();
        }

        request_animation_frame(host);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

/// Headless demo: the autopilot plays one session and the result is logged.
///
/// Usage: `math-defender [seed] [max_seconds] [--ops +-x/] [--tuning FILE] [--settings FILE]`
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use math_defender::audio::SilentAudio;
    use math_defender::consts::SIM_DT_MS;
    use math_defender::renderer::HeadlessSink;
    use math_defender::sim::{GameStatus, ProblemGenerator};
    use math_defender::{Game, Settings, Tuning};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut positional = Vec::new();
    let (mut ops, mut tuning_path, mut settings_path) = (None, None, None);
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ops" => ops = args.next(),
            "--tuning" => tuning_path = args.next(),
            "--settings" => settings_path = args.next(),
            _ => positional.push(arg),
        }
    }
    let seed = positional.first().and_then(|s| s.parse().ok()).unwrap_or(42u64);
    let max_seconds = positional.get(1).and_then(|s| s.parse().ok()).unwrap_or(120.0f64);

    // Bad config is logged and replaced by defaults
    let tuning = tuning_path
        .map(|path| {
            Tuning::from_file(&path).unwrap_or_else(|e| {
                log::error!("Ignoring tuning file {}: {}", path, e);
                Tuning::default()
            })
        })
        .unwrap_or_default();
    let settings = settings_path
        .map(|path| {
            Settings::from_file(&path).unwrap_or_else(|e| {
                log::error!("Ignoring settings file {}: {}", path, e);
                Settings::default()
            })
        })
        .unwrap_or_default();

    log::info!("Math Defender (native) starting headless demo, seed {}", seed);

    let mut game = Game::new(seed, settings, tuning, SilentAudio::default());
    if let Some(list) = ops {
        match ProblemGenerator::parse(&list) {
            Ok(generator) => {
                game.set_generator(generator);
            }
            Err(e) => log::error!("Ignoring --ops {}: {}", list, e),
        }
    }
    let mut sink = HeadlessSink::default();
    game.input.autopilot = true;
    game.start();

    let mut now = 0.0;
    while now < max_seconds * 1000.0 && game.session.status == GameStatus::Playing {
        if let Err(e) = game.frame(now, Some(&mut sink)) {
            log::error!("Frame failed: {}", e);
            break;
        }
        now += SIM_DT_MS as f64;
    }

    let hud = game.hud();
    let stats = game.session.stats;
    log::info!(
        "Finished after {:.1}s: status {:?}, score {}, lives {}, level {}, accuracy {}",
        game.session.elapsed_ms / 1000.0,
        hud.status,
        hud.score,
        hud.lives,
        hud.difficulty,
        hud.accuracy_percent
            .map(|a| format!("{:.0}%", a))
            .unwrap_or_else(|| "-".to_string())
    );
    log::info!(
        "{} frames, peak {} vertices; operators {}; {} correct, {} wrong, {} rams",
        sink.frames,
        sink.peak_vertex_count,
        hud.operators,
        stats.correct_hits,
        stats.wrong_hits,
        stats.ship_hits
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
