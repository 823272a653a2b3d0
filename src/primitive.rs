//! Procedural tessellation of the primitives the mesh builder can emit.
//!
//! A [`Primitive`] is a tagged description of a shape in its local frame.
//! [`Primitive::tessellate`] turns it into a [`Tessellation`]: local-space
//! positions and normals plus indices local to the shape. The builder then
//! places that geometry with the current transform, so lit and unlit shapes
//! share one code path.
//!
//! All triangle primitives use counter-clockwise (CCW) winding for outward
//! (front) faces, matching the back-face culling of the renderer.
//!
//! Counts are not validated. A sphere with fewer than 3 stacks or slices, or
//! a cylinder with zero slices, yields degenerate geometry rather than an
//! error.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Vec2, Vec3};

use crate::batch::Topology;

/// A shape request, described in its own local frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// Axis-aligned cube of edge `size` centered on the origin.
    Cube { size: f32 },
    /// Latitude/longitude sphere centered on the origin, poles on ±Y.
    Sphere { radius: f32, slices: u32, stacks: u32 },
    /// Capped, possibly tapered cylinder from `z = 0` to `z = height`.
    Cylinder {
        base_radius: f32,
        top_radius: f32,
        height: f32,
        slices: u32,
        stacks: u32,
    },
    /// Rectangle in the XY plane with its lower-left corner at `position`.
    Rectangle { position: Vec2, size: Vec2 },
    /// Filled disc in the XY plane.
    Circle {
        center: Vec2,
        radius: f32,
        iterations: u32,
        start_angle: f32,
    },
    /// Ring of the given `width` centered on `radius`, in the XY plane.
    CircleOutline {
        center: Vec2,
        radius: f32,
        width: f32,
        iterations: u32,
        start_angle: f32,
    },
    /// Convex polygon in the XY plane, fanned from its first point.
    Polygon { points: Vec<Vec2> },
    /// Polyline in the XY plane drawn with hardware lines.
    PixelLine { points: Vec<Vec2> },
}

/// Discriminant of a [`Primitive`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Cube,
    Sphere,
    Cylinder,
    Rectangle,
    Circle,
    CircleOutline,
    Polygon,
    PixelLine,
}

/// A local-space vertex before placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Geometry of one primitive in its local frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Tessellation {
    pub vertices: Vec<LocalVertex>,
    /// Indices into `vertices`.
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl Tessellation {
    fn new(topology: Topology) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            topology,
        }
    }

    fn vertex(&mut self, position: Vec3, normal: Vec3) {
        self.vertices.push(LocalVertex { position, normal });
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Cube { .. } => PrimitiveKind::Cube,
            Primitive::Sphere { .. } => PrimitiveKind::Sphere,
            Primitive::Cylinder { .. } => PrimitiveKind::Cylinder,
            Primitive::Rectangle { .. } => PrimitiveKind::Rectangle,
            Primitive::Circle { .. } => PrimitiveKind::Circle,
            Primitive::CircleOutline { .. } => PrimitiveKind::CircleOutline,
            Primitive::Polygon { .. } => PrimitiveKind::Polygon,
            Primitive::PixelLine { .. } => PrimitiveKind::PixelLine,
        }
    }

    /// Generates local-space geometry for this primitive.
    pub fn tessellate(&self) -> Tessellation {
        match self {
            Primitive::Cube { size } => cube(*size),
            Primitive::Sphere {
                radius,
                slices,
                stacks,
            } => sphere(*radius, *slices, *stacks),
            Primitive::Cylinder {
                base_radius,
                top_radius,
                height,
                slices,
                stacks,
            } => cylinder(*base_radius, *top_radius, *height, *slices, *stacks),
            Primitive::Rectangle { position, size } => rectangle(*position, *size),
            Primitive::Circle {
                center,
                radius,
                iterations,
                start_angle,
            } => circle(*center, *radius, *iterations, *start_angle),
            Primitive::CircleOutline {
                center,
                radius,
                width,
                iterations,
                start_angle,
            } => circle_outline(*center, *radius, *width, *iterations, *start_angle),
            Primitive::Polygon { points } => polygon(points),
            Primitive::PixelLine { points } => pixel_line(points),
        }
    }
}

fn cube(size: f32) -> Tessellation {
    let h = size * 0.5;
    // Each face has its own vertices for flat normals
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // Front (Z+)
        ([ 0.0,  0.0,  1.0], [[-h, -h,  h], [ h, -h,  h], [ h,  h,  h], [-h,  h,  h]]),
        // Back (Z-)
        ([ 0.0,  0.0, -1.0], [[ h, -h, -h], [-h, -h, -h], [-h,  h, -h], [ h,  h, -h]]),
        // Top (Y+)
        ([ 0.0,  1.0,  0.0], [[-h,  h,  h], [ h,  h,  h], [ h,  h, -h], [-h,  h, -h]]),
        // Bottom (Y-)
        ([ 0.0, -1.0,  0.0], [[-h, -h, -h], [ h, -h, -h], [ h, -h,  h], [-h, -h,  h]]),
        // Right (X+)
        ([ 1.0,  0.0,  0.0], [[ h, -h,  h], [ h, -h, -h], [ h,  h, -h], [ h,  h,  h]]),
        // Left (X-)
        ([-1.0,  0.0,  0.0], [[-h, -h, -h], [-h, -h,  h], [-h,  h,  h], [-h,  h, -h]]),
    ];

    let mut t = Tessellation::new(Topology::Triangles);
    for (face, (normal, corners)) in faces.iter().enumerate() {
        let normal = Vec3::from(*normal);
        for corner in corners {
            t.vertex(Vec3::from(*corner), normal);
        }
        let base = face as u32 * 4;
        t.triangle(base, base + 1, base + 2);
        t.triangle(base + 2, base + 3, base);
    }
    t
}

fn sphere(radius: f32, slices: u32, stacks: u32) -> Tessellation {
    let mut t = Tessellation::new(Topology::Triangles);

    t.vertex(Vec3::new(0.0, radius, 0.0), Vec3::Y);

    for stack in 1..stacks {
        let stack_angle = FRAC_PI_2 - PI * stack as f32 / stacks as f32;
        let ring = radius * stack_angle.cos();
        let y = radius * stack_angle.sin();

        for slice in 0..=slices {
            let slice_angle = TAU * slice as f32 / slices as f32;
            let position = Vec3::new(ring * slice_angle.cos(), y, ring * slice_angle.sin());
            t.vertex(position, position.normalize());
        }
    }

    t.vertex(Vec3::new(0.0, -radius, 0.0), Vec3::NEG_Y);

    // No rings to connect.
    if stacks < 2 {
        return t;
    }

    let row = slices + 1;

    // Top cap: fan around the north pole.
    for slice in 0..slices {
        t.triangle(0, slice + 2, slice + 1);
    }

    for stack in 0..stacks.saturating_sub(2) {
        let k1 = 1 + stack * row;
        let k2 = k1 + row;
        for slice in 0..slices {
            t.triangle(k1 + slice, k2 + slice + 1, k2 + slice);
            t.triangle(k2 + slice + 1, k1 + slice, k1 + slice + 1);
        }
    }

    // Bottom cap: fan into the south pole.
    let bottom = 1 + (stacks - 1) * row;
    let last_ring = 1 + (stacks - 2) * row;
    for slice in 0..slices {
        t.triangle(last_ring + slice, last_ring + slice + 1, bottom);
    }

    t
}

fn cylinder(base_radius: f32, top_radius: f32, height: f32, slices: u32, stacks: u32) -> Tessellation {
    let mut t = Tessellation::new(Topology::Triangles);
    let row = slices + 1;

    for stack in 0..=stacks {
        let fraction = stack as f32 / stacks as f32;
        let z = height * fraction;
        let r = base_radius + (top_radius - base_radius) * fraction;
        for slice in 0..=slices {
            let angle = TAU * slice as f32 / slices as f32;
            let (sin, cos) = angle.sin_cos();
            // Radial normal, independent of taper.
            t.vertex(Vec3::new(r * cos, r * sin, z), Vec3::new(cos, sin, 0.0));
        }
    }

    for stack in 0..stacks {
        for slice in 0..slices {
            let current = stack * row + slice;
            let next = current + row;
            t.triangle(current, next + 1, next);
            t.triangle(next + 1, current, current + 1);
        }
    }

    // Bottom cap faces -Z.
    let bottom = t.vertices.len() as u32;
    t.vertex(Vec3::ZERO, Vec3::NEG_Z);
    for slice in 0..=slices {
        let angle = TAU * slice as f32 / slices as f32;
        let (sin, cos) = angle.sin_cos();
        t.vertex(Vec3::new(base_radius * cos, base_radius * sin, 0.0), Vec3::NEG_Z);
    }
    for slice in 0..slices {
        t.triangle(bottom, bottom + slice + 2, bottom + slice + 1);
    }

    // Top cap faces +Z, wound opposite to the bottom.
    let top = t.vertices.len() as u32;
    t.vertex(Vec3::new(0.0, 0.0, height), Vec3::Z);
    for slice in 0..=slices {
        let angle = TAU * slice as f32 / slices as f32;
        let (sin, cos) = angle.sin_cos();
        t.vertex(Vec3::new(top_radius * cos, top_radius * sin, height), Vec3::Z);
    }
    for slice in 0..slices {
        t.triangle(top, top + slice + 1, top + slice + 2);
    }

    t
}

fn rectangle(position: Vec2, size: Vec2) -> Tessellation {
    let mut t = Tessellation::new(Topology::Triangles);
    let p = position.extend(0.0);
    t.vertex(p, Vec3::Z);
    t.vertex(p + Vec3::new(size.x, 0.0, 0.0), Vec3::Z);
    t.vertex(p + Vec3::new(size.x, size.y, 0.0), Vec3::Z);
    t.vertex(p + Vec3::new(0.0, size.y, 0.0), Vec3::Z);
    t.triangle(0, 1, 2);
    t.triangle(2, 3, 0);
    t
}

fn circle(center: Vec2, radius: f32, iterations: u32, start_angle: f32) -> Tessellation {
    let mut t = Tessellation::new(Topology::Triangles);
    t.vertex(center.extend(0.0), Vec3::Z);
    for i in 0..=iterations {
        let angle = start_angle + TAU * i as f32 / iterations as f32;
        let p = center + radius * Vec2::from_angle(angle);
        t.vertex(p.extend(0.0), Vec3::Z);
    }
    for i in 0..iterations {
        t.triangle(0, i + 1, i + 2);
    }
    t
}

fn circle_outline(center: Vec2, radius: f32, width: f32, iterations: u32, start_angle: f32) -> Tessellation {
    let mut t = Tessellation::new(Topology::Triangles);
    let inner = radius - width * 0.5;
    let outer = radius + width * 0.5;
    for i in 0..=iterations {
        let angle = start_angle + TAU * i as f32 / iterations as f32;
        let direction = Vec2::from_angle(angle);
        t.vertex((center + inner * direction).extend(0.0), Vec3::Z);
        t.vertex((center + outer * direction).extend(0.0), Vec3::Z);
    }
    for i in 0..iterations {
        let base = i * 2;
        t.triangle(base, base + 1, base + 3);
        t.triangle(base + 3, base + 2, base);
    }
    t
}

fn polygon(points: &[Vec2]) -> Tessellation {
    let mut t = Tessellation::new(Topology::Triangles);
    for p in points {
        t.vertex(p.extend(0.0), Vec3::Z);
    }
    for i in 1..points.len().saturating_sub(1) as u32 {
        t.triangle(0, i, i + 1);
    }
    t
}

fn pixel_line(points: &[Vec2]) -> Tessellation {
    let mut t = Tessellation::new(Topology::Lines);
    for p in points {
        t.vertex(p.extend(0.0), Vec3::Z);
    }
    for i in 1..points.len() as u32 {
        t.indices.extend_from_slice(&[i - 1, i]);
    }
    t
}
