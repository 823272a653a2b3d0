//! # Armview
//!
//! **Forward kinematics and procedural geometry for a 6-axis robot arm viewer.**
//!
//! Joint angles go through a Denavit–Hartenberg chain to joint frames, the
//! [`RobotDrawer`] turns those frames into primitive calls on a
//! [`MeshBuilder`], and the builder fills a [`VertexBatch`] that the
//! [`BatchRenderer`] uploads and draws once per frame.
//!
//! ## Quick Start
//!
//! ```
//! use armview::*;
//!
//! let drawer = RobotDrawer::default();
//! let mut builder = MeshBuilder::new();
//! let screen = ScreenSpace::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec2::new(800.0, 600.0));
//!
//! let angles = JointAngles::from_degrees([0.0, 10.0, -20.0, 0.0, 30.0, 0.0]);
//! let chain = drawer.draw(&mut builder, &angles, &screen);
//!
//! println!("TCP at {}", chain.tcp_position());
//! assert!(!builder.batch().is_empty());
//! ```
//!
//! The `armview` binary wraps all of this in a window with keyboard controls;
//! see [`run`] and [`ViewerConfig`].

mod app;
mod batch;
mod camera;
mod color;
mod config;
mod controls;
mod error;
mod gpu;
mod kinematics;
mod lighting;
mod mesh;
mod mesh_builder;
mod primitive;
mod renderer;
mod robot;
mod stage;
mod transform_stack;

pub use app::run;
pub use batch::{SubBatch, Topology, VertexBatch};
pub use camera::{CameraRig, FOV_Y_DEGREES, LOOK_AT, SphericalView};
pub use color::Color;
pub use config::{ConfigError, LightConfig, ViewerConfig, WorkspaceConfig};
pub use controls::{
    ANGLE_STEP, Action, ControlState, JOINT_STEP_DEG, LIGHT_RANGE, LIGHT_STEP, ZOOM_STEP, action_for_key,
    wrap_degrees,
};
pub use error::ViewerError;
pub use gpu::GpuContext;
pub use kinematics::{DhJoint, DhTable, JOINT_COUNT, JointAngles, JointChain, Kinematics};
pub use lighting::{Light, LightUniform, Lighting, LightingUniforms, MAX_LIGHTS};
pub use mesh::{NO_TEXTURE, ShadeMode, Vertex3d};
pub use mesh_builder::{MeshBuilder, ScreenSpace};
pub use primitive::{LocalVertex, Primitive, PrimitiveKind, Tessellation};
pub use renderer::{BatchRenderer, SAMPLE_COUNTS, SceneUniforms, effective_sample_count};
pub use robot::{BODY_COLOR, LINK_COLOR, RobotDrawer, Workspace, draw_frame, link_basis};
pub use stage::{FLOOR_EXTENT, FLOOR_STEP, build_frame, draw_floor, draw_light_bulbs};
pub use transform_stack::{TransformScope, TransformStack, Transformable};

// Re-export glam math types for convenience
pub use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

// Re-export winit key codes used by the controls
pub use winit::keyboard::KeyCode;
