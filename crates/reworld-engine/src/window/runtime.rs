use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::EngineConfig;
use crate::core::{AppControl, Engine, FramePlan, Game};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::input::platform::translate_window_event;
use crate::render::{RenderCtx, RenderTarget, SpriteRenderer};

/// Entry point: opens the window and runs the game until it exits.
pub struct Runtime;

impl Runtime {
    /// Builds the engine (running `game.create`), then enters the event loop.
    ///
    /// Errors from `create` are returned before any window is opened.
    pub fn run<G>(config: EngineConfig, gpu_init: GpuInit, game: G) -> Result<()>
    where
        G: Game + 'static,
    {
        let engine = Engine::new(&config, game).context("game setup failed")?;
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            gpu_init,
            engine,
            window: None,
            renderer: SpriteRenderer::new(),
            failure: None,
            exit_requested: false,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl WindowEntry {
    fn open(event_loop: &ActiveEventLoop, config: &EngineConfig, gpu_init: GpuInit) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .with_resizable(false);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
    }
}

struct AppState<G: Game + 'static> {
    config: EngineConfig,
    gpu_init: GpuInit,
    engine: Engine<G>,

    window: Option<WindowEntry>,
    renderer: SpriteRenderer,

    /// First fatal error, reported by `Runtime::run` after the loop ends.
    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<G: Game + 'static> AppState<G> {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.exit(event_loop);
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    /// Runs one engine frame and presents it.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (control, plan) = self.engine.frame();

        let Some(entry) = self.window.as_mut() else { return };
        let (engine, renderer) = (&mut self.engine, &mut self.renderer);

        let action = entry.with_mut(|fields| present(fields.window, fields.gpu, renderer, engine, &plan));

        if action == Some(SurfaceErrorAction::Fatal) {
            self.fail(event_loop, anyhow::anyhow!("GPU surface lost for good"));
            return;
        }
        if control == AppControl::Exit {
            log::info!("game requested exit after {} frames", self.engine.frame_index());
            self.exit(event_loop);
        }
    }
}

/// Syncs GPU resources, records the sprite pass and submits.
/// Returns the surface error handling result, if acquisition failed.
fn present<G: Game>(
    window: &Window,
    gpu: &mut Gpu<'_>,
    renderer: &mut SpriteRenderer,
    engine: &mut Engine<G>,
    plan: &FramePlan,
) -> Option<SurfaceErrorAction> {
    let mut frame = match gpu.begin_frame() {
        Ok(f) => f,
        Err(err) => return Some(gpu.handle_surface_error(err)),
    };

    let ctx = RenderCtx::new(gpu.device(), gpu.queue(), gpu.surface_format());
    renderer.sync(&ctx, engine.stage_mut());
    {
        let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
        renderer.render(&ctx, &mut target, plan);
    }

    window.pre_present_notify();
    gpu.submit(frame);
    None
}

impl<G: Game + 'static> ApplicationHandler for AppState<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match WindowEntry::open(event_loop, &self.config, self.gpu_init.clone()) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.window = Some(entry);
            }
            Err(err) => self.fail(event_loop, err.context("failed to open the game window")),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Games animate every frame; keep redrawing.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }
        let Some(entry) = self.window.as_mut() else { return };

        if let Some(raw) = entry.with_window(|w| translate_window_event(w, &event)) {
            self.engine.handle_event(raw);
        }

        match event {
            WindowEvent::CloseRequested => {
                self.window = None;
                self.exit(event_loop);
            }

            WindowEvent::Focused(false) => {
                self.engine.stage_mut().clear_input_latches();
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
