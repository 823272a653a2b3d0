//! Draws the arm, its coordinate frames and its workspace box.

use glam::{Mat4, Vec3, Vec4};

use crate::color::Color;
use crate::kinematics::{JointAngles, JointChain, Kinematics};
use crate::mesh::ShadeMode;
use crate::mesh_builder::{MeshBuilder, ScreenSpace};
use crate::transform_stack::Transformable;

/// Body color of the base and the joint spheres.
pub const BODY_COLOR: Color = Color::from_rgb8(230, 100, 40);
/// Color of the link cylinders.
pub const LINK_COLOR: Color = Color::GREEN;

const LINK_SLICES: u32 = 10;
const LINK_STACKS: u32 = 10;
const FRAME_LINE_WIDTH: f32 = 2.0;
const WORKSPACE_LINE_WIDTH: f32 = 3.0;
const TCP_FRAME_SIZE: f32 = 0.2;
const BASE_FRAME_SIZE: f32 = 0.4;
/// Lifts the base frame off the floor so its lines are not z-fighting.
const BASE_FRAME_LIFT: f32 = 0.005;

/// One tapered link between two joint positions, with a sphere at its start.
struct Link {
    from: usize,
    to: usize,
    base_radius: f32,
    top_radius: f32,
    sphere_radius: f32,
    sphere_stacks: u32,
    /// Offset of the joint sphere along the link axis.
    sphere_offset: f32,
}

const LINKS: [Link; 4] = [
    Link {
        from: 0,
        to: 1,
        base_radius: 0.05,
        top_radius: 0.05,
        sphere_radius: 0.05 * 1.8,
        sphere_stacks: 5,
        sphere_offset: 0.05,
    },
    Link {
        from: 1,
        to: 2,
        base_radius: 0.05,
        top_radius: 0.03,
        sphere_radius: 0.05 * 1.4,
        sphere_stacks: 3,
        sphere_offset: 0.0,
    },
    Link {
        from: 3,
        to: 5,
        base_radius: 0.03,
        top_radius: 0.02,
        sphere_radius: 0.03 * 1.4,
        sphere_stacks: 5,
        sphere_offset: 0.0,
    },
    Link {
        from: 5,
        to: 6,
        base_radius: 0.02,
        top_radius: 0.01,
        sphere_radius: 0.02 * 1.4,
        sphere_stacks: 3,
        sphere_offset: 0.0,
    },
];

/// Rigid transform placing a link's local z axis along `from -> to`.
///
/// The x axis comes from crossing a reference vector with the link
/// direction: world z, or world x when the link is within about 8° of
/// vertical. Coincident points give a degenerate (zero) basis.
pub fn link_basis(from: Vec3, to: Vec3) -> Mat4 {
    let z = (to - from).normalize_or_zero();
    let reference = if z.dot(Vec3::Z).abs() > 0.99 { Vec3::X } else { Vec3::Z };
    let x = reference.cross(z).normalize_or_zero();
    let y = z.cross(x);
    Mat4::from_cols(x.extend(0.0), y.extend(0.0), z.extend(0.0), from.extend(1.0))
}

/// Axis-aligned reachable volume, stored as world-space corners in metres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Workspace {
    corners: [Vec3; 8],
}

impl Workspace {
    /// Corner pairs forming the 12 edges of the box.
    pub const EDGES: [(usize, usize); 12] = [
        (0, 1),
        (1, 2),
        (2, 3),
        (3, 0),
        (4, 5),
        (5, 6),
        (6, 7),
        (7, 4),
        (0, 4),
        (1, 5),
        (2, 6),
        (3, 7),
    ];

    /// Builds the box from bounds in millimetres, expressed in the frame
    /// `base_to_robot` maps into the robot base frame.
    pub fn new(min_mm: Vec3, max_mm: Vec3, base_to_robot: Mat4) -> Self {
        let [x0, y0, z0] = min_mm.to_array();
        let [x1, y1, z1] = max_mm.to_array();
        let local = [
            Vec3::new(x0, y0, z0),
            Vec3::new(x1, y0, z0),
            Vec3::new(x1, y1, z0),
            Vec3::new(x0, y1, z0),
            Vec3::new(x0, y0, z1),
            Vec3::new(x1, y0, z1),
            Vec3::new(x1, y1, z1),
            Vec3::new(x0, y1, z1),
        ];
        Self {
            corners: local.map(|p| base_to_robot.transform_point3(p) * 0.001),
        }
    }

    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Vec3::splat(-100.0), Vec3::splat(100.0), Mat4::IDENTITY)
    }
}

/// Emits the arm geometry for a set of joint angles.
#[derive(Clone, Debug, Default)]
pub struct RobotDrawer {
    kinematics: Kinematics,
    workspace: Workspace,
}

impl RobotDrawer {
    pub fn new(kinematics: Kinematics, workspace: Workspace) -> Self {
        Self { kinematics, workspace }
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Draws base, links, joint spheres and the TCP and base frames.
    ///
    /// Returns the kinematic chain the geometry was placed with. The
    /// builder's transform stack is left as it was found.
    pub fn draw(&self, builder: &mut MeshBuilder, angles: &JointAngles, screen: &ScreenSpace) -> JointChain {
        let chain = self.kinematics.forward(angles);
        let p = &chain.positions;

        {
            let mut base = builder.scoped();
            base.scale(Vec3::new(1.0, 0.8, 0.3));
            base.translate(Vec3::new(0.0, 0.0, 0.15));
            base.add_solid_cube(0.3, BODY_COLOR);
        }

        for link in &LINKS {
            let mut scope = builder.scoped();
            scope.multiply(link_basis(p[link.from], p[link.to]));
            scope.add_cylinder(
                link.base_radius,
                link.top_radius,
                p[link.from].distance(p[link.to]),
                LINK_SLICES,
                LINK_STACKS,
                LINK_COLOR,
            );
            scope.translate(Vec3::new(0.0, 0.0, link.sphere_offset));
            scope.add_solid_sphere(link.sphere_radius, LINK_SLICES, link.sphere_stacks, BODY_COLOR, ShadeMode::Lit);
        }

        {
            let mut tcp = builder.scoped();
            tcp.translate(chain.tcp_position());
            tcp.add_solid_sphere(0.01 * 1.1, 3, 3, BODY_COLOR, ShadeMode::Lit);
        }

        draw_frame(builder, chain.tcp(), TCP_FRAME_SIZE, screen);
        draw_frame(
            builder,
            Mat4::from_translation(Vec3::new(0.0, 0.0, BASE_FRAME_LIFT)),
            BASE_FRAME_SIZE,
            screen,
        );

        chain
    }

    /// Draws the 12 edges of the workspace box as white thick lines.
    pub fn draw_workspace(&self, builder: &mut MeshBuilder, screen: &ScreenSpace) {
        let corners = self.workspace.corners();
        for (a, b) in Workspace::EDGES {
            builder.add_line(corners[a], corners[b], WORKSPACE_LINE_WIDTH, Color::WHITE, screen);
        }
    }
}

/// Draws the axes of `frame` as red (x), green (y) and blue (z) lines of
/// length `size`.
pub fn draw_frame(builder: &mut MeshBuilder, frame: Mat4, size: f32, screen: &ScreenSpace) {
    let origin = frame.w_axis.truncate();
    let axes: [(Vec4, Color); 3] = [
        (frame.x_axis, Color::RED),
        (frame.y_axis, Color::GREEN),
        (frame.z_axis, Color::BLUE),
    ];
    for (axis, color) in axes {
        builder.add_line(origin, origin + axis.truncate() * size, FRAME_LINE_WIDTH, color, screen);
    }
}
