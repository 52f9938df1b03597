use std::num::NonZeroU32;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface as GlSurfaceHandle, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{ContextConfig, FrameDriver, GpuContext, Renderer};
use crate::device::{Device, GlowDevice};
use crate::time::{FrameClock, FramePacer};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Requested core-profile GL version, `(major, minor)`.
    pub gl_version: (u8, u8),
    pub vsync: bool,
    /// Frame rate held by sleeping when vsync is off; `0` runs unpaced.
    pub target_fps: u32,
    pub context: ContextConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            initial_size: LogicalSize::new(1600.0, 900.0),
            gl_version: (4, 3),
            vsync: true,
            target_fps: 60,
            context: ContextConfig::default(),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens a window with a GL context and drives the renderer returned by
    /// `build` until the window closes or a frame fails.
    ///
    /// `build` runs once, after the context is current, and may create GPU
    /// resources through the context it is given.
    pub fn run<R, F>(config: RuntimeConfig, build: F) -> Result<()>
    where
        R: Renderer + 'static,
        F: FnOnce(&mut GpuContext) -> Result<R>,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, build);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Field order is drop order: GPU resources go before the context that owns
/// them.
struct WindowEntry<R> {
    driver: FrameDriver<R>,
    gl_surface: GlSurfaceHandle<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
    clock: FrameClock,
    pacer: FramePacer,
    elapsed: f32,
}

struct AppState<R, F> {
    config: RuntimeConfig,
    build: Option<F>,
    entry: Option<WindowEntry<R>>,
    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<R, F> AppState<R, F>
where
    R: Renderer + 'static,
    F: FnOnce(&mut GpuContext) -> Result<R>,
{
    fn new(config: RuntimeConfig, build: F) -> Self {
        Self {
            config,
            build: Some(build),
            entry: None,
            failure: None,
            exit_requested: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.failure = Some(error);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEntry<R>> {
        let config = &self.config;
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);

        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24)
            .with_stencil_size(8);

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attrs))
            .build(event_loop, template, |configs| {
                // Never empty: config lookup fails inside `build` when
                // nothing matches the template.
                configs
                    .max_by_key(|c| c.num_samples())
                    .expect("display offered no GL configs")
            })
            .map_err(|e| anyhow!("failed to create GL display: {e}"))?;
        let window = window.context("display builder returned no window")?;

        let raw_handle = window.window_handle().ok().map(|h| h.as_raw());
        let gl_display = gl_config.display();
        let (major, minor) = config.gl_version;
        let context_attrs = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .build(raw_handle);

        // SAFETY: the window the handle came from outlives the context.
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attrs) }
            .with_context(|| format!("failed to create a GL {major}.{minor} core context"))?;

        let surface_attrs = window
            .build_surface_attributes(Default::default())
            .context("failed to describe the window surface")?;
        // SAFETY: as above, the surface is dropped before the window.
        let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attrs) }
            .context("failed to create the window surface")?;
        let gl_context = not_current
            .make_current(&gl_surface)
            .context("failed to make the GL context current")?;

        let interval = if config.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = gl_surface.set_swap_interval(&gl_context, interval) {
            log::warn!("could not set swap interval: {e}");
        }

        // SAFETY: the context is current and the loader belongs to it.
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name| gl_display.get_proc_address(name))
        };
        let device: Rc<dyn Device> =
            Rc::new(GlowDevice::new(gl, |name| gl_display.get_proc_address(name)));

        let size = window.inner_size();
        let mut ctx = GpuContext::new(device, size.width, size.height, config.context.clone());
        let build = self.build.take().context("renderer already built")?;
        let renderer = build(&mut ctx).context("failed to build the renderer")?;

        Ok(WindowEntry {
            driver: FrameDriver::new(ctx, renderer),
            gl_surface,
            gl_context,
            window,
            clock: FrameClock::new(),
            pacer: FramePacer::new(if config.vsync { 0 } else { config.target_fps }),
            elapsed: 0.0,
        })
    }
}

impl<R> WindowEntry<R>
where
    R: Renderer,
{
    fn resize(&mut self, size: PhysicalSize<u32>) {
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            return;
        };
        self.gl_surface.resize(&self.gl_context, w, h);
        self.driver.resize(size.width, size.height);
    }

    /// Runs one frame, presents it and sleeps off the rest of the budget.
    fn redraw(&mut self) -> Result<()> {
        self.pacer.frame_started();
        let ft = self.clock.tick();
        self.elapsed += ft.dt;

        let (w, h) = self.driver.ctx().screen().size();
        let ctx = self.driver.ctx_mut();
        ctx.set_uniform_all("viewport", glam::Vec2::new(w as f32, h as f32));
        ctx.set_uniform_all("time", self.elapsed);

        let stats = self.driver.frame().context("frame failed")?;
        self.window.pre_present_notify();
        self.gl_surface
            .swap_buffers(&self.gl_context)
            .context("failed to swap buffers")?;

        log::trace!("frame {} dt {:.4}s", stats.frame_index, ft.dt);

        let sleep = self.pacer.remaining();
        if !sleep.is_zero() {
            std::thread::sleep(sleep);
        }
        Ok(())
    }
}

impl<R, F> ApplicationHandler for AppState<R, F>
where
    R: Renderer + 'static,
    F: FnOnce(&mut GpuContext) -> Result<R>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.window.request_redraw();
                self.entry = Some(entry);
            }
            Err(e) => self.fail(event_loop, e.context("failed to create initial window")),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // continuous redraw
        if let Some(entry) = &self.entry {
            entry.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.entry = None;
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                entry.resize(size);
                entry.window.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = entry.window.inner_size();
                entry.resize(size);
                entry.window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = entry.redraw() {
                    self.entry = None;
                    self.fail(event_loop, e);
                }
            }

            _ => {}
        }
    }
}
