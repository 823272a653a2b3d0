//! Device, queue and window surface.
//!
//! [`GpuContext`] is created once from a winit [`Window`] when the application
//! resumes and is passed by reference to [`BatchRenderer`](crate::BatchRenderer).
//!
//! [`Window`]: winit::window::Window

use std::sync::Arc;
use winit::window::Window;

use crate::error::ViewerError;

/// The wgpu objects needed to draw into the viewer window.
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// Current surface format, size and present mode.
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Sets up wgpu for `window` and configures its surface with an sRGB
    /// format (when available) and Fifo presentation.
    ///
    /// # Errors
    ///
    /// Fails if the surface cannot be created, no adapter is compatible with
    /// it, the device request is rejected or the surface reports no formats.
    pub fn new(window: Arc<Window>) -> Result<Self, ViewerError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;
        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = Self::request_device(&adapter)?;

        let config = Self::surface_config(&surface.get_capabilities(&adapter), size.width, size.height)
            .ok_or(ViewerError::UnsupportedSurface)?;
        surface.configure(&device, &config);
        log::debug!(
            "surface configured: {}x{} {:?}",
            config.width,
            config.height,
            config.format
        );

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            config,
        })
    }

    fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue), ViewerError> {
        let pair = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Armview Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;
        Ok(pair)
    }

    /// Picks the first sRGB format, else the first supported one.
    fn surface_config(
        caps: &wgpu::SurfaceCapabilities,
        width: u32,
        height: u32,
    ) -> Option<wgpu::SurfaceConfiguration> {
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()?;
        let alpha_mode = caps.alpha_modes.first().copied()?;

        Some(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }

    /// Resizes the surface. Zero sizes (a minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
        log::debug!("surface resized to {width}x{height}");
    }

    /// Applies the current configuration again, after the surface was lost or outdated.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Whether `format` can be rendered to with `sample_count` samples.
    pub fn supports_sample_count(&self, format: wgpu::TextureFormat, sample_count: u32) -> bool {
        self.adapter
            .get_texture_format_features(format)
            .flags
            .sample_count_supported(sample_count)
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }
}
