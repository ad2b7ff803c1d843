//! Browser glue: canvas + WebGPU surface, input listeners, the
//! `requestAnimationFrame` loop, DOM HUD and sounds.

mod audio;
mod hud;
mod render;

use std::{cell::RefCell, rc::Rc};

use anyhow::{anyhow, Result};
use js_sys::Function;
use log::{error, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{prelude::*, JsCast};
use web_sys::{window, HtmlCanvasElement};

use crate::config::{Config, TickMode};
use crate::event::GameEvent;
use crate::game::{Game, Input};
use crate::scene::{self, InstanceData, Letterbox, Palette};
use crate::timer::FrameTimer;
use crate::Level;

use audio::AudioManager;
use hud::{Anchor, Hud, OverlayAnchors};
use render::Renderer;

#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();

    let window = window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))?;

    let canvas = document
        .get_element_by_id("game-canvas")
        .ok_or_else(|| JsValue::from_str("Missing canvas"))?
        .dyn_into::<HtmlCanvasElement>()?;

    let hud = Hud::new(&document)?;
    let config = Config::from_query(&window.location().search().unwrap_or_default());
    info!("starting with {:?}", config);

    match run(canvas, hud.clone(), config).await {
        Ok(()) => Ok(()),
        Err(err) => {
            error!("{:#}", err);
            hud.set_error("WebGPU not available\nCheck browser support (Safari 17.4/iOS 17.4+)");
            Err(JsValue::from_str(&format!("{err:#}")))
        }
    }
}

async fn run(canvas: HtmlCanvasElement, hud: Hud, settings: Config) -> Result<()> {
    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| anyhow!("WebGPU adapter not available"))?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
            },
            None,
        )
        .await
        .map_err(|e| anyhow!("Request device failed: {}", e))?;

    let (width, height) = canvas_size(&canvas);
    let surface_caps = surface.get_capabilities(&adapter);
    let present_mode = if settings.uncapped
        && surface_caps
            .present_modes
            .contains(&wgpu::PresentMode::Immediate)
    {
        wgpu::PresentMode::Immediate
    } else {
        wgpu::PresentMode::Fifo
    };
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|format| format.is_srgb())
        .or_else(|| surface_caps.formats.first())
        .copied()
        .ok_or_else(|| anyhow!("Surface reports no texture formats"))?;

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: width.max(1),
        height: height.max(1),
        present_mode,
        desired_maximum_frame_latency: 1,
        alpha_mode: wgpu::CompositeAlphaMode::Opaque,
        view_formats: vec![],
    };
    surface.configure(&device, &config);

    let renderer = Renderer::new(&device, surface_format)?;
    let mut palette = Palette::default();
    if let Some(bg) = settings.background {
        palette.background = bg;
    }

    let state = Rc::new(RefCell::new(AppState {
        surface,
        config,
        device,
        queue,
        renderer,
        game: Game::new(settings.level),
        hud,
        audio: AudioManager::new(),
        canvas: canvas.clone(),
        timer: FrameTimer::default(),
        tick_mode: settings.tick_mode,
        palette,
        raf_closure: None,
        parked: false,
    }));

    let win = window().ok_or_else(|| anyhow!("No window"))?;
    install_window_hooks(&win, &state).map_err(|e| anyhow!("window hooks: {e:?}"))?;
    install_input_listeners(&win, &canvas, &state)
        .map_err(|e| anyhow!("input listeners: {e:?}"))?;

    start_animation_loop(state)?;
    info!("game running");

    Ok(())
}

/// `window.triggerJump()` and `window.setDifficulty(name)` for page buttons.
fn install_window_hooks(
    window: &web_sys::Window,
    state: &Rc<RefCell<AppState>>,
) -> Result<(), JsValue> {
    let jump_state = state.clone();
    let jump = Closure::wrap(Box::new(move || {
        handle_input(&jump_state, Input::Jump);
    }) as Box<dyn Fn()>);
    let func: &Function = jump.as_ref().unchecked_ref();
    js_sys::Reflect::set(window, &JsValue::from_str("triggerJump"), func)?;
    jump.forget();

    let level_state = state.clone();
    let set_difficulty = Closure::wrap(Box::new(move |name: String| -> Result<(), JsValue> {
        let mut app = level_state.borrow_mut();
        match app.game.select_level_by_name(&name) {
            Ok(event) => {
                app.dispatch(&[event]);
                Ok(())
            }
            Err(err) => {
                warn!("setDifficulty({name:?}) rejected: {err}");
                Err(JsValue::from_str(&err.to_string()))
            }
        }
    }) as Box<dyn FnMut(String) -> Result<(), JsValue>>);
    let func: &Function = set_difficulty.as_ref().unchecked_ref();
    js_sys::Reflect::set(window, &JsValue::from_str("setDifficulty"), func)?;
    set_difficulty.forget();

    Ok(())
}

fn install_input_listeners(
    window: &web_sys::Window,
    canvas: &HtmlCanvasElement,
    state: &Rc<RefCell<AppState>>,
) -> Result<(), JsValue> {
    let key_state = state.clone();
    let key_closure = Closure::wrap(Box::new(move |event: web_sys::KeyboardEvent| {
        if event.repeat() {
            return;
        }
        let level = match event.code().as_str() {
            "Space" => {
                event.prevent_default();
                handle_input(&key_state, Input::Jump);
                return;
            }
            "Digit1" => Level::Easy,
            "Digit2" => Level::Medium,
            "Digit3" => Level::Hard,
            _ => return,
        };
        let mut app = key_state.borrow_mut();
        match app.game.select_level(level) {
            Ok(event) => app.dispatch(&[event]),
            Err(err) => warn!("level key ignored: {err}"),
        }
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("keydown", key_closure.as_ref().unchecked_ref())?;
    key_closure.forget();

    let click_state = state.clone();
    let click_canvas = canvas.clone();
    let click_closure = Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
        let [x, y] = pointer_to_world(&click_canvas, event.offset_x(), event.offset_y());
        handle_input(&click_state, Input::Click { x, y });
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("click", click_closure.as_ref().unchecked_ref())?;
    click_closure.forget();

    let hover_state = state.clone();
    let hover_canvas = canvas.clone();
    let hover_closure = Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
        let [x, y] = pointer_to_world(&hover_canvas, event.offset_x(), event.offset_y());
        let hovered = hover_state.borrow().game.restart_hovered(x, y);
        let cursor = if hovered { "pointer" } else { "default" };
        if hover_canvas.style().set_property("cursor", cursor).is_err() {
            warn!("could not set canvas cursor");
        }
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("mousemove", hover_closure.as_ref().unchecked_ref())?;
    hover_closure.forget();

    let touch_state = state.clone();
    on_canvas_touch(canvas, move || handle_input(&touch_state, Input::Touch))?;

    let resize_state = state.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        let mut app = resize_state.borrow_mut();
        if !app.parked {
            return;
        }
        if let Err(err) = app.redraw_parked() {
            error!("Redraw after resize failed: {err:#}");
        }
    }) as Box<dyn FnMut()>);
    window.add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref())?;
    resize_closure.forget();

    Ok(())
}

/// Touches on the canvas jump or restart. Touches elsewhere (the level
/// buttons) keep their default so the browser still sends the click.
fn on_canvas_touch(
    canvas: &HtmlCanvasElement,
    mut on_touch: impl FnMut() + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
        event.prevent_default();
        on_touch();
    }) as Box<dyn FnMut(_)>);
    let options = web_sys::AddEventListenerOptions::new();
    options.set_passive(false);
    canvas.add_event_listener_with_callback_and_add_event_listener_options(
        "touchstart",
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    closure.forget();
    Ok(())
}

/// Apply an input and, if it restarted a finished round, wake the loop.
fn handle_input(state: &Rc<RefCell<AppState>>, input: Input) {
    let restarted = {
        let mut app = state.borrow_mut();
        let events = app.game.handle_input(input);
        app.dispatch(&events);
        events.contains(&GameEvent::Restarted)
    };
    if restarted {
        resume_animation_loop(state);
    }
}

fn pointer_to_world(canvas: &HtmlCanvasElement, x: i32, y: i32) -> [f32; 2] {
    let (width, height) = canvas_size(canvas);
    Letterbox::fit(width, height).to_world([x as f32, y as f32])
}

fn start_animation_loop(state: Rc<RefCell<AppState>>) -> Result<()> {
    let closure_state = state.clone();
    let closure = Closure::wrap(Box::new(move |time: f64| {
        let keep_going = {
            let mut app = closure_state.borrow_mut();
            match app.frame(time) {
                Ok(()) => !app.parked,
                Err(err) => {
                    error!("Frame error: {err:#}");
                    app.hud.set_error(&format!("WebGPU error\n{err:#}"));
                    app.raf_closure = None;
                    false
                }
            }
        };
        if keep_going {
            request_frame(&closure_state);
        }
    }) as Box<dyn FnMut(f64)>);

    state.borrow_mut().raf_closure = Some(closure);
    if !request_frame(&state) {
        return Err(anyhow!("Failed to request animation frame"));
    }
    Ok(())
}

fn resume_animation_loop(state: &Rc<RefCell<AppState>>) {
    {
        let mut app = state.borrow_mut();
        if !app.parked {
            return;
        }
        app.parked = false;
        app.timer.restart_clock();
    }
    request_frame(state);
}

fn request_frame(state: &Rc<RefCell<AppState>>) -> bool {
    let Some(win) = window() else { return false };
    let app = state.borrow();
    let Some(cb) = app.raf_closure.as_ref().map(|c| c.as_ref().unchecked_ref::<Function>()) else {
        return false;
    };
    if win.request_animation_frame(cb).is_err() {
        error!("Failed to schedule animation frame");
        return false;
    }
    true
}

fn canvas_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
    let width = canvas.client_width().max(1) as u32;
    let height = canvas.client_height().max(1) as u32;
    (width, height)
}

struct AppState {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,
    renderer: Renderer,
    game: Game,
    hud: Hud,
    audio: AudioManager,
    canvas: HtmlCanvasElement,
    timer: FrameTimer,
    tick_mode: TickMode,
    palette: Palette,
    raf_closure: Option<Closure<dyn FnMut(f64)>>,
    /// No frame is scheduled while the game-over overlay is up.
    parked: bool,
}

impl AppState {
    /// Draw the pre-tick scene, run the ticks due, then update the score.
    /// Once the round is over the overlay is drawn and the loop parks.
    fn frame(&mut self, time: f64) -> Result<()> {
        self.timer.advance(time);
        self.resize_if_needed();

        let instances = scene::world_instances(&self.game, &self.palette);

        let steps = self.timer.take_steps(self.tick_mode);
        for _ in 0..steps {
            let events = self.game.tick();
            self.dispatch(&events);
            if self.game.is_over() {
                break;
            }
        }

        self.hud.set_score(self.game.score(), self.game.best_score());
        self.hud.set_fps(self.timer.fps());

        if self.game.is_over() {
            self.parked = true;
        }
        self.present(instances)
    }

    /// Draw the finished round again, e.g. after the canvas was resized
    /// while the loop is parked.
    fn redraw_parked(&mut self) -> Result<()> {
        self.resize_if_needed();
        let instances = scene::world_instances(&self.game, &self.palette);
        self.present(instances)
    }

    /// Add the game-over overlay when the round has ended, letterbox and render.
    fn present(&mut self, mut instances: Vec<InstanceData>) -> Result<()> {
        let letterbox = Letterbox::fit(self.config.width, self.config.height);
        if self.game.is_over() {
            instances.extend(scene::overlay_instances(&self.palette));
            let rect = self.canvas.get_bounding_client_rect();
            let anchors = overlay_anchors(&letterbox, [rect.left() as f32, rect.top() as f32]);
            self.hud.show_game_over(self.game.score(), &anchors);
        }
        let instances: Vec<_> = instances.into_iter().map(|q| letterbox.apply(q)).collect();

        match self.renderer.render(
            &self.surface,
            &self.device,
            &self.queue,
            &self.config,
            &instances,
            self.palette.background,
        ) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                // Skip this frame silently.
            }
            Err(err) => return Err(anyhow!("Surface error: {err}")),
        }

        Ok(())
    }

    /// Route simulation events to sounds and the overlay.
    fn dispatch(&mut self, events: &[GameEvent]) {
        self.audio.handle(events);
        for event in events {
            match event {
                GameEvent::Restarted => self.hud.hide_game_over(),
                GameEvent::LevelChanged(level) => info!("level now {}", level.as_str()),
                GameEvent::Jump | GameEvent::Point | GameEvent::Hit => {}
            }
        }
    }

    fn resize_if_needed(&mut self) {
        let (width, height) = canvas_size(&self.canvas);
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

/// Page positions for the game-over texts; `origin` is the canvas's
/// top-left corner in the viewport.
fn overlay_anchors(letterbox: &Letterbox, origin: [f32; 2]) -> OverlayAnchors {
    let anchor = |world: [f32; 2]| {
        let [x, y] = letterbox.to_screen(world);
        Anchor {
            left: origin[0] + x,
            top: origin[1] + y,
            scale: letterbox.scale,
        }
    };
    let layout = scene::overlay_layout();
    OverlayAnchors {
        title: anchor(layout.title),
        final_score: anchor(layout.final_score),
        button_label: anchor(layout.button_label),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use wasm_bindgen_test::*;
    use web_sys::{Document, Event, EventInit};

    use super::*;
    use crate::scene::restart_button;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        window().unwrap().document().unwrap()
    }

    fn touchstart() -> Event {
        let init = EventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        Event::new_with_event_init_dict("touchstart", &init).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_only_canvas_touches_are_taken() {
        let document = document();
        let body = document.body().unwrap();
        let canvas: HtmlCanvasElement = document.create_element("canvas").unwrap().dyn_into().unwrap();
        let button = document.create_element("button").unwrap();
        body.append_child(&canvas).unwrap();
        body.append_child(&button).unwrap();

        let touches = Rc::new(Cell::new(0));
        let counter = touches.clone();
        on_canvas_touch(&canvas, move || counter.set(counter.get() + 1)).unwrap();

        let on_button = touchstart();
        button.dispatch_event(&on_button).unwrap();
        assert_eq!(touches.get(), 0);
        assert!(!on_button.default_prevented());

        let on_canvas = touchstart();
        canvas.dispatch_event(&on_canvas).unwrap();
        assert_eq!(touches.get(), 1);
        assert!(on_canvas.default_prevented());
    }

    #[wasm_bindgen_test]
    fn test_overlay_anchors_follow_canvas_size() {
        let center = restart_button().center();
        for (width, height) in [(400, 600), (1200, 700), (320, 900)] {
            let letterbox = Letterbox::fit(width, height);
            let anchors = overlay_anchors(&letterbox, [10.0, 20.0]);
            let [x, y] = letterbox.to_screen(center);
            assert!((anchors.button_label.left - (x + 10.0)).abs() < 1e-3);
            assert!((anchors.button_label.top - (y + 20.0)).abs() < 1e-3);
            assert_eq!(anchors.button_label.scale, letterbox.scale);
        }
    }

    #[wasm_bindgen_test]
    fn test_hud_error_replaces_score() {
        let hud = Hud::new(&document()).unwrap();
        hud.set_error("WebGPU error");
        let shown = document()
            .query_selector(".hud-score")
            .unwrap()
            .and_then(|el| el.text_content());
        assert_eq!(shown.as_deref(), Some("WebGPU error"));
    }
}
