use std::sync::Arc;
use std::time::Instant;

use glam::{Vec2, Vec3};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::CameraRig;
use crate::config::ViewerConfig;
use crate::controls::ControlState;
use crate::error::ViewerError;
use crate::gpu::GpuContext;
use crate::kinematics::{JOINT_COUNT, JointAngles, Kinematics};
use crate::mesh_builder::{MeshBuilder, ScreenSpace};
use crate::renderer::BatchRenderer;
use crate::robot::RobotDrawer;
use crate::stage::build_frame;

/// Opens the viewer window and runs until it is closed.
///
/// # Example
/// ```no_run
/// armview::run(armview::ViewerConfig::new().title("Cell 3").size(1280, 720))?;
/// # Ok::<(), armview::ViewerError>(())
/// ```
pub fn run(config: ViewerConfig) -> Result<(), ViewerError> {
    config.validate()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::Pending(config);
    event_loop.run_app(&mut app)?;

    match app {
        ViewerApp::Failed(Some(error)) => Err(error),
        _ => Ok(()),
    }
}

/// Everything that lives while the window is open.
struct Viewer {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: BatchRenderer,
    builder: MeshBuilder,
    drawer: RobotDrawer,
    rig: CameraRig,
    controls: ControlState,
    last_frame: Instant,
    last_positions: Option<[Vec3; JOINT_COUNT + 1]>,
}

impl Viewer {
    fn new(event_loop: &ActiveEventLoop, config: &ViewerConfig) -> Result<Self, ViewerError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;
        let renderer = BatchRenderer::new(&gpu, config.sample_count);
        let controls = ControlState::new(config.view, config.angles_deg)
            .with_lighting(config.lighting())
            .with_sample_count(renderer.sample_count());

        let drawer = RobotDrawer::new(
            Kinematics::new(config.dh_table()),
            config.workspace.to_workspace(),
        );

        Ok(Self {
            window,
            gpu,
            renderer,
            builder: MeshBuilder::new(),
            drawer,
            rig: CameraRig::new(config.view),
            controls,
            last_frame: Instant::now(),
            last_positions: None,
        })
    }

    /// Builds and draws one frame. Returns `false` if the viewer must stop.
    fn redraw(&mut self) -> bool {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.rig.update(&self.controls.view, dt);
        self.controls.lighting.camera_position = self.rig.eye();

        if self.controls.sample_count != self.renderer.sample_count() {
            self.controls.sample_count = self.renderer.set_sample_count(&self.gpu, self.controls.sample_count);
        }

        let screen = ScreenSpace::new(
            self.rig.projection_matrix(self.gpu.aspect()),
            self.rig.view_matrix(),
            Vec2::new(self.gpu.width() as f32, self.gpu.height() as f32),
        );
        let angles = JointAngles::from_degrees(self.controls.angles_deg);

        let chain = build_frame(&mut self.builder, &self.drawer, &angles, &self.controls.lighting, &screen);
        if self.last_positions != Some(chain.positions) {
            for (joint, p) in chain.positions.iter().enumerate() {
                log::debug!("joint {}: ({:.2}, {:.2}, {:.2})", joint + 1, p.x, p.y, p.z);
            }
            self.last_positions = Some(chain.positions);
        }

        match self
            .renderer
            .render(&self.gpu, self.builder.batch(), screen.view_proj, &self.controls.lighting)
        {
            Ok(()) => true,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                true
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory");
                false
            }
            Err(error) => {
                log::warn!("skipping frame: {error}");
                true
            }
        }
    }
}

enum ViewerApp {
    Pending(ViewerConfig),
    Running(Box<Viewer>),
    Failed(Option<ViewerError>),
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let ViewerApp::Pending(config) = self {
            match Viewer::new(event_loop, config) {
                Ok(viewer) => {
                    log::info!("viewer started");
                    *self = ViewerApp::Running(Box::new(viewer));
                }
                Err(error) => {
                    log::error!("failed to start viewer: {error}");
                    *self = ViewerApp::Failed(Some(error));
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let ViewerApp::Running(viewer) = self else {
            return;
        };

        if viewer.controls.handle_event(&event) {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                viewer.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if !viewer.redraw() {
                    event_loop.exit();
                    return;
                }
                viewer.window.request_redraw();
            }
            _ => {}
        }
    }
}
