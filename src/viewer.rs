//! Viewer builder and runner.

use crate::camera::OrbitCamera;
use crate::error::ViewerError;
use crate::globe::SnowGlobe;
use crate::gpu::GpuState;
use crate::input::Input;
use crate::snow::DEFAULT_SNOW_CANDIDATES;
use crate::time::Debounce;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

#[cfg(feature = "egui")]
use crate::gpu::EguiIntegration;
#[cfg(feature = "egui")]
use crate::visuals::SkyVariant;

/// How long a resize burst has to stay quiet before the surface follows.
pub const RESIZE_SETTLE: Duration = Duration::from_millis(100);

/// A snow globe viewer builder.
///
/// Use method chaining to configure, then call `.run()` to open the window.
pub struct Viewer {
    title: String,
    snow_candidates: usize,
    seed: Option<u64>,
    camera: Option<OrbitCamera>,
    sunset_sky: Option<PathBuf>,
    night_sky: Option<PathBuf>,
}

impl Viewer {
    /// Create a new viewer with default settings.
    pub fn new() -> Self {
        Self {
            title: "Snow Globe".into(),
            snow_candidates: DEFAULT_SNOW_CANDIDATES,
            seed: None,
            camera: None,
            sunset_sky: None,
            night_sky: None,
        }
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the number of snowflake spawn candidates. Candidates landing
    /// outside the spherical shell are rejected, so the live count is lower.
    pub fn with_snow_candidates(mut self, candidates: usize) -> Self {
        self.snow_candidates = candidates;
        self
    }

    /// Fix the snow layout seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Start from a custom camera pose instead of the default orbit.
    pub fn with_camera(mut self, camera: OrbitCamera) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Load the sunset and night backdrops from image files.
    ///
    /// Files that are missing or unreadable fall back to the built-in
    /// gradient skies.
    pub fn with_sky_paths(
        mut self,
        sunset: impl Into<PathBuf>,
        night: impl Into<PathBuf>,
    ) -> Self {
        self.sunset_sky = Some(sunset.into());
        self.night_sky = Some(night.into());
        self
    }

    /// Open the window and run. This blocks until the window is closed.
    pub fn run(self) -> Result<(), ViewerError> {
        let mut globe = SnowGlobe::new(self.snow_candidates, self.seed);
        if let Some(camera) = self.camera {
            *globe.camera_mut() = camera;
        }

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.title, globe, self.sunset_sky, self.night_sky);
        event_loop.run_app(&mut app)?;

        match app.init_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

/// Application state for the winit event loop.
struct App {
    title: String,
    sunset_sky: Option<PathBuf>,
    night_sky: Option<PathBuf>,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    #[cfg(feature = "egui")]
    egui: Option<EguiIntegration>,
    globe: SnowGlobe,
    input: Input,
    resize_debounce: Debounce,
    pending_resize: Option<PhysicalSize<u32>>,
    init_error: Option<ViewerError>,
}

impl App {
    fn new(
        title: String,
        globe: SnowGlobe,
        sunset_sky: Option<PathBuf>,
        night_sky: Option<PathBuf>,
    ) -> Self {
        Self {
            title,
            sunset_sky,
            night_sky,
            window: None,
            gpu: None,
            #[cfg(feature = "egui")]
            egui: None,
            globe,
            input: Input::new(),
            resize_debounce: Debounce::new(RESIZE_SETTLE),
            pending_resize: None,
            init_error: None,
        }
    }

    /// One frame: apply any settled resize, route the frame's input into
    /// the globe, advance it, then draw.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();

        if self.resize_debounce.ready(now) {
            if let Some(size) = self.pending_resize.take() {
                self.globe.resize(size.width, size.height);
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
            }
        }

        if let Some(position) = self.input.pointer_moved() {
            self.globe.pointer_moved(position);
        }
        for &position in self.input.clicks() {
            self.globe.pointer_clicked(position, now);
        }
        let drag = self.input.drag_delta();
        if drag != Vec2::ZERO {
            self.globe.orbit(drag);
        }
        let scroll = self.input.scroll_delta();
        if scroll != 0.0 {
            self.globe.zoom(scroll);
        }

        self.globe.advance_frame(now);

        let (Some(window), Some(gpu)) = (&self.window, &mut self.gpu) else {
            return;
        };

        if self.globe.take_colors_dirty() {
            gpu.write_snow_colors(self.globe.field());
        }

        #[cfg(feature = "egui")]
        let overlay = self.egui.as_mut().map(|egui| {
            egui.begin_frame(window);
            draw_panel(&egui.ctx, &mut self.globe);
            let frame = egui.end_frame(window);
            (egui, frame)
        });

        #[cfg(feature = "egui")]
        let result = gpu.render(&self.globe, overlay);
        #[cfg(not(feature = "egui"))]
        let result = gpu.render(&self.globe);

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.resize(PhysicalSize {
                    width: gpu.config.width,
                    height: gpu.config.height,
                })
            }
            Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
            Err(e) => eprintln!("Render error: {:?}", e),
        }

        self.input.begin_frame();
        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.init_error = Some(ViewerError::Window(e));
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.globe.resize(size.width, size.height);

        let gpu = pollster::block_on(GpuState::new(
            window.clone(),
            &self.globe,
            self.sunset_sky.as_deref(),
            self.night_sky.as_deref(),
        ));
        let gpu = match gpu {
            Ok(gpu) => gpu,
            Err(e) => {
                self.init_error = Some(ViewerError::Gpu(e));
                event_loop.exit();
                return;
            }
        };

        #[cfg(feature = "egui")]
        {
            self.egui = Some(EguiIntegration::new(
                gpu.device(),
                gpu.surface_format(),
                &window,
            ));
        }

        window.request_redraw();
        self.window = Some(window);
        self.gpu = Some(gpu);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        #[cfg(feature = "egui")]
        let ui_consumed = match (self.window.as_deref(), self.egui.as_mut()) {
            (Some(window), Some(egui)) => egui.on_window_event(window, &event),
            _ => false,
        };
        #[cfg(not(feature = "egui"))]
        let ui_consumed = false;

        if !ui_consumed {
            self.input.handle_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                // Surface reconfiguration waits for the burst to settle;
                // only the last size matters.
                self.pending_resize = Some(size);
                self.resize_debounce.trigger(Instant::now());
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

#[cfg(feature = "egui")]
fn draw_panel(ctx: &egui::Context, globe: &mut SnowGlobe) {
    egui::Window::new("Controls")
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.0}", globe.fps()));
            ui.label(format!("Snowflakes: {}", globe.field().len()));

            ui.separator();
            ui.heading("Bloom");
            let bloom = globe.bloom_mut();
            ui.add(egui::Slider::new(&mut bloom.strength, 0.0..=3.0).text("Strength"));
            ui.add(egui::Slider::new(&mut bloom.radius, 0.0..=1.0).text("Radius"));
            ui.add(egui::Slider::new(&mut bloom.threshold, 0.0..=1.0).text("Threshold"));

            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Sky:");
                let mut sky = globe.sky();
                ui.selectable_value(&mut sky, SkyVariant::Sunset, SkyVariant::Sunset.label());
                ui.selectable_value(&mut sky, SkyVariant::Night, SkyVariant::Night.label());
                if sky != globe.sky() {
                    globe.set_sky(sky);
                }
            });
        });
}
