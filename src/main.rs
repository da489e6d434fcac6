//! Lodge Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlInputElement};

    use lodge_runner::leaderboard::{self, RunReport};
    use lodge_runner::level::Level;
    use lodge_runner::renderer::{shake_jitter, shapes, RenderState};
    use lodge_runner::sim::{tick, GameMode, GameState, LoreSource, ModalState, TickInput};
    use lodge_runner::{PlayerIdentity, Tuning};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        level: Level,
        tuning: Tuning,
        render_state: Option<RenderState>,
        input: TickInput,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        // Track mode for the one-shot victory submission
        last_mode: GameMode,
        submitted: bool,
    }

    impl Game {
        fn new(level: Level, tuning: Tuning, seed: u64, identity: PlayerIdentity) -> Self {
            let state = GameState::new(&level, seed, Some(identity));
            Self {
                state,
                level,
                tuning,
                render_state: None,
                input: TickInput::default(),
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                last_mode: GameMode::Start,
                submitted: false,
            }
        }

        /// Advance the simulation by exactly one tick per animation frame
        fn update(&mut self, time: f64) {
            let input = self.input;
            let events = tick(&mut self.state, &self.level, &self.tuning, &input);
            if events.clear_input {
                self.input = TickInput::default();
            }

            // Clear one-shot inputs after processing
            self.input.jump_pressed = false;
            self.input.jump_released = false;
            self.input.pause = false;

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 {
                let elapsed = time - oldest;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            // Submit the run once on the transition into Victory
            if self.state.mode == GameMode::Victory && self.last_mode != GameMode::Victory {
                self.submit_run();
            }
            self.last_mode = self.state.mode;
        }

        fn submit_run(&mut self) {
            if self.submitted {
                return;
            }
            if let (Some(identity), Some(score)) =
                (self.state.identity.as_ref(), self.state.final_score)
            {
                leaderboard::submit(RunReport::new(
                    &identity.user_id,
                    &identity.name,
                    score,
                    true,
                ));
                self.submitted = true;
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                let vertices = shapes::scene(&self.state, &self.level);
                let jitter = shake_jitter(self.state.effects.shake, self.state.time_ticks);
                match render_state.render(&vertices, &self.state.camera, jitter) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements and modal overlays in the DOM
        fn update_hud(&self) {
            let window = web_sys::window().unwrap();
            let document = window.document().unwrap();

            set_text(&document, "hud-score", &self.state.score.to_string());
            let held = self
                .level
                .required_tools
                .iter()
                .filter(|id| self.state.collected.contains(id))
                .count();
            set_text(
                &document,
                "hud-tools",
                &format!("{held}/{}", self.level.required_tools.len()),
            );
            set_text(&document, "hud-fps", &self.fps.to_string());

            match &self.state.warning {
                Some(w) => {
                    set_text(&document, "warning-banner", &w.text);
                    set_hidden(&document, "warning-banner", false);
                }
                None => set_hidden(&document, "warning-banner", true),
            }

            set_hidden(&document, "start-screen", self.state.mode != GameMode::Start);
            set_hidden(&document, "pause-menu", self.state.mode != GameMode::Paused);

            let victory = self.state.mode == GameMode::Victory;
            set_hidden(&document, "victory-screen", !victory);
            if victory {
                if let Some(score) = self.state.final_score {
                    set_text(&document, "final-score", &score.to_string());
                }
            }

            self.update_lore_modal(&document);
            self.update_quiz_modal(&document);
            self.update_identity_prompt(&document);
        }

        fn update_lore_modal(&self, document: &web_sys::Document) {
            match &self.state.modal {
                ModalState::Lore(LoreSource::Orb(id)) => {
                    if let Some(orb) = self.level.orb(*id) {
                        set_text(document, "lore-title", orb.name);
                        set_text(document, "lore-text", orb.flavor);
                    }
                    set_hidden(document, "lore-modal", false);
                }
                ModalState::Lore(LoreSource::Gate(text)) => {
                    set_text(document, "lore-title", "At the gate");
                    set_text(document, "lore-text", text);
                    set_hidden(document, "lore-modal", false);
                }
                _ => set_hidden(document, "lore-modal", true),
            }
        }

        fn update_quiz_modal(&self, document: &web_sys::Document) {
            // One shared modal serves both the orb quiz and the grave trial
            let prompt = match (&self.state.modal, &self.state.grave, self.state.mode) {
                (ModalState::Quiz(q), _, _) => Some((q.question_id, &q.order)),
                (_, Some(g), GameMode::Grave) => Some((g.question_id, &g.order)),
                _ => None,
            };

            let Some((question_id, order)) = prompt else {
                set_hidden(document, "quiz-modal", true);
                return;
            };
            let Some(question) = self.level.question(question_id) else {
                set_hidden(document, "quiz-modal", true);
                return;
            };

            set_text(document, "quiz-prompt", question.prompt);
            for slot in 0..4 {
                let id = format!("answer-{slot}");
                match order
                    .get(slot)
                    .and_then(|&i| question.answers.get(i as usize))
                {
                    Some(answer) => {
                        set_text(document, &id, answer);
                        set_hidden(document, &id, false);
                    }
                    None => set_hidden(document, &id, true),
                }
            }
            set_hidden(document, "quiz-modal", false);
        }

        fn update_identity_prompt(&self, document: &web_sys::Document) {
            set_hidden(document, "identity-prompt", !self.state.identity_requested);
        }
    }

    fn set_text(document: &web_sys::Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_hidden(document: &web_sys::Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let class = if hidden { "hidden" } else { "" };
            let _ = el.set_attribute("class", class);
        }
    }

    /// Pull the access token from the query string and decode it. `None`
    /// means the page was opened without an invitation.
    fn identity_from_url(window: &web_sys::Window) -> Option<PlayerIdentity> {
        let search = window.location().search().ok()?;
        let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
        let token = params.get("token")?;
        PlayerIdentity::from_token(&token)
    }

    fn level_from_url(window: &web_sys::Window) -> Level {
        let chosen = window
            .location()
            .search()
            .ok()
            .and_then(|s| web_sys::UrlSearchParams::new_with_str(&s).ok())
            .and_then(|p| p.get("level"));
        match chosen.as_deref() {
            Some("patrol") => Level::patrol(),
            _ => Level::story(),
        }
    }

    /// Optional tuning overlay embedded in the page
    fn tuning_from_dom(document: &web_sys::Document) -> Tuning {
        document
            .get_element_by_id("tuning-data")
            .and_then(|el| el.text_content())
            .map(|json| Tuning::from_json(&json))
            .unwrap_or_default()
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Lodge Runner starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        // Access is token-gated: no valid token, no game
        let Some(identity) = identity_from_url(&window) else {
            log::warn!("No valid access token in URL");
            set_hidden(&document, "access-denied", false);
            return;
        };
        log::info!("Welcome, {}", identity.name);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let level = level_from_url(&window);
        let tuning = tuning_from_dom(&document);
        let game = Rc::new(RefCell::new(Game::new(level, tuning, seed, identity)));
        game.borrow_mut()
            .state
            .camera
            .set_aspect(width as f32 / height as f32);

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(game.clone());
        setup_touch_buttons(game.clone());
        setup_menu_buttons(game.clone());
        setup_modal_buttons(game.clone());
        setup_identity_form(game.clone());
        setup_auto_pause(game.clone());
        setup_resize(canvas.clone(), game.clone());

        request_animation_frame(game);

        log::info!("Lodge Runner running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.input.left = true,
                    "ArrowRight" | "d" | "D" => g.input.right = true,
                    " " | "w" | "W" | "ArrowUp" => {
                        event.prevent_default();
                        if !event.repeat() {
                            g.input.jump_pressed = true;
                        }
                        g.input.jump_held = true;
                    }
                    "Escape" => g.input.pause = true,
                    "Enter" => g.state.start_run(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.input.left = false,
                    "ArrowRight" | "d" | "D" => g.input.right = false,
                    " " | "w" | "W" | "ArrowUp" => {
                        if g.input.jump_held {
                            g.input.jump_released = true;
                        }
                        g.input.jump_held = false;
                    }
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// On-screen controls for touch devices
    fn setup_touch_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        let held = [("btn-left", 0u8), ("btn-right", 1u8), ("btn-jump", 2u8)];
        for (id, which) in held {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                    event.prevent_default();
                    let mut g = game.borrow_mut();
                    match which {
                        0 => g.input.left = true,
                        1 => g.input.right = true,
                        _ => {
                            g.input.jump_pressed = true;
                            g.input.jump_held = true;
                        }
                    }
                });
                let _ = btn.add_event_listener_with_callback(
                    "touchstart",
                    closure.as_ref().unchecked_ref(),
                );
                closure.forget();
            }
            {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                    event.prevent_default();
                    let mut g = game.borrow_mut();
                    match which {
                        0 => g.input.left = false,
                        1 => g.input.right = false,
                        _ => {
                            if g.input.jump_held {
                                g.input.jump_released = true;
                            }
                            g.input.jump_held = false;
                        }
                    }
                });
                let _ = btn.add_event_listener_with_callback(
                    "touchend",
                    closure.as_ref().unchecked_ref(),
                );
                closure.forget();
            }
        }
    }

    fn setup_menu_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().state.start_run();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("resume-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().input.pause = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Restart from the pause menu or the victory screen
        for id in ["restart-btn", "play-again-btn"] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut guard = game.borrow_mut();
                let g = &mut *guard;
                g.state.reset(&g.level);
                g.state.start_run();
                g.input = TickInput::default();
                g.submitted = false;
                log::info!("Run restarted");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_modal_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        if let Some(btn) = document.get_element_by_id("lore-continue") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut guard = game.borrow_mut();
                let g = &mut *guard;
                g.state.acknowledge_lore(&g.level);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for slot in 0..4usize {
            let Some(btn) = document.get_element_by_id(&format!("answer-{slot}")) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut guard = game.borrow_mut();
                let g = &mut *guard;
                if g.state.mode == GameMode::Grave {
                    g.state.answer_grave(&g.level, slot);
                } else {
                    g.state.answer_quiz(&g.level, slot);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// The inner guard's name form. Submitting completes the identity and
    /// lets the gate trigger re-evaluate on the next tick.
    fn setup_identity_form(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        if let Some(btn) = document.get_element_by_id("identity-submit") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let document = web_sys::window().unwrap().document().unwrap();
                let name = document
                    .get_element_by_id("identity-name")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    .map(|input| input.value())
                    .unwrap_or_default();
                if name.trim().is_empty() {
                    return;
                }
                let mut g = game.borrow_mut();
                let mut identity = g.state.identity.clone().unwrap_or_default();
                identity.name = name.trim().to_string();
                g.state.set_identity(identity);
                log::info!("Identity completed");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.mode == GameMode::Playing && g.state.modal == ModalState::None {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.mode == GameMode::Playing && g.state.modal == ModalState::None {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let window = web_sys::window().unwrap();
            let dpr = window.device_pixel_ratio();
            let width = (canvas.client_width() as f64 * dpr) as u32;
            let height = (canvas.client_height() as f64 * dpr) as u32;
            if width == 0 || height == 0 {
                return;
            }
            canvas.set_width(width);
            canvas.set_height(height);
            let mut g = game.borrow_mut();
            g.state.camera.set_aspect(width as f32 / height as f32);
            if let Some(ref mut rs) = g.render_state {
                rs.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Lodge Runner (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    println!("\nRunning scripted smoke run...");
    headless_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive a few hundred frames of scripted input through the real tick to
/// catch gross regressions without a browser.
#[cfg(not(target_arch = "wasm32"))]
fn headless_run() {
    use lodge_runner::level::Level;
    use lodge_runner::sim::{tick, GameMode, GameState, ModalState, TickInput};
    use lodge_runner::Tuning;

    let level = Level::patrol();
    let tuning = Tuning::default();
    let mut state = GameState::new(&level, 42, None);
    state.start_run();

    let start_x = state.player.pos.x;
    for frame in 0..900u32 {
        let input = TickInput {
            right: true,
            jump_pressed: frame % 45 == 0,
            jump_held: frame % 45 < 20,
            jump_released: frame % 45 == 20,
            ..TickInput::default()
        };
        let events = tick(&mut state, &level, &tuning, &input);
        if events.clear_input || state.modal != ModalState::None {
            // A modal opened; acknowledge and keep walking
            state.acknowledge_lore(&level);
        }
        if state.mode == GameMode::Grave {
            break;
        }
    }

    assert!(state.player.pos.x > start_x, "player never moved");
    println!(
        "✓ Smoke run done: x={:.0}, score={}, mode={:?}",
        state.player.pos.x, state.score, state.mode
    );
}
