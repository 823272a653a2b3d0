//! Immediate-mode mesh builder.
//!
//! [`MeshBuilder`] combines a [`TransformStack`] with a [`VertexBatch`]. Each
//! `add_*` call tessellates a [`Primitive`], places it with the current top
//! matrix and appends it as a new sub-batch. Normals are carried through the
//! inverse-transpose of the model matrix so non-uniform scales keep them
//! perpendicular to the surface.
//!
//! Thick lines are different: [`MeshBuilder::add_line`] projects its end points
//! to normalized device coordinates and extrudes a quad of constant pixel
//! width, so it needs a [`ScreenSpace`] describing the current camera.

use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::batch::{Topology, VertexBatch};
use crate::color::Color;
use crate::mesh::{ShadeMode, Vertex3d};
use crate::primitive::Primitive;
use crate::transform_stack::{TransformStack, Transformable};

/// Directions shorter than this in NDC are treated as degenerate.
const MIN_NDC_LENGTH: f32 = 1e-6;

/// Camera state needed to build screen-space geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenSpace {
    /// Projection multiplied by view.
    pub view_proj: Mat4,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

impl ScreenSpace {
    pub fn new(projection: Mat4, view: Mat4, viewport: Vec2) -> Self {
        Self {
            view_proj: projection * view,
            viewport,
        }
    }
}

/// Transform stack plus vertex batch for one frame of procedural geometry.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    stack: TransformStack,
    batch: VertexBatch,
}

impl Transformable for MeshBuilder {
    fn transform_stack(&mut self) -> &mut TransformStack {
        &mut self.stack
    }
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the batch and resets the transform stack to identity.
    pub fn clear(&mut self) {
        self.batch.clear();
        self.stack.load_identity();
    }

    pub fn batch(&self) -> &VertexBatch {
        &self.batch
    }

    pub fn stack(&self) -> &TransformStack {
        &self.stack
    }

    pub fn load_identity(&mut self) {
        self.stack.load_identity();
    }

    pub fn translate(&mut self, translation: Vec3) {
        self.stack.translate(translation);
    }

    pub fn rotate(&mut self, angle: f32, axis: Vec3) {
        self.stack.rotate(angle, axis);
    }

    pub fn scale(&mut self, scale: Vec3) {
        self.stack.scale(scale);
    }

    pub fn multiply(&mut self, matrix: Mat4) {
        self.stack.multiply(matrix);
    }

    /// Tessellates `primitive` and appends it under the current transform.
    pub fn add(&mut self, primitive: &Primitive, color: Color, shade: ShadeMode) {
        let tessellation = primitive.tessellate();
        let model = self.stack.current();
        let normal_matrix = Mat3::from_mat4(model).inverse().transpose();

        self.batch.start_batch(tessellation.topology);
        for v in &tessellation.vertices {
            let position = model.transform_point3(v.position);
            let normal = (normal_matrix * v.normal).normalize_or_zero();
            self.batch
                .push_vertex(Vertex3d::new(position.to_array(), normal.to_array(), color, shade));
        }
        self.batch.insert_indices(&tessellation.indices);
    }

    pub fn add_solid_cube(&mut self, size: f32, color: Color) {
        self.add(&Primitive::Cube { size }, color, ShadeMode::Lit);
    }

    pub fn add_solid_sphere(&mut self, radius: f32, slices: u32, stacks: u32, color: Color, shade: ShadeMode) {
        self.add(
            &Primitive::Sphere {
                radius,
                slices,
                stacks,
            },
            color,
            shade,
        );
    }

    pub fn add_cylinder(
        &mut self,
        base_radius: f32,
        top_radius: f32,
        height: f32,
        slices: u32,
        stacks: u32,
        color: Color,
    ) {
        self.add(
            &Primitive::Cylinder {
                base_radius,
                top_radius,
                height,
                slices,
                stacks,
            },
            color,
            ShadeMode::Lit,
        );
    }

    pub fn add_rectangle(&mut self, position: Vec2, size: Vec2, color: Color, shade: ShadeMode) {
        self.add(&Primitive::Rectangle { position, size }, color, shade);
    }

    pub fn add_circle(&mut self, center: Vec2, radius: f32, iterations: u32, start_angle: f32, color: Color) {
        self.add(
            &Primitive::Circle {
                center,
                radius,
                iterations,
                start_angle,
            },
            color,
            ShadeMode::Unlit,
        );
    }

    pub fn add_circle_outline(
        &mut self,
        center: Vec2,
        radius: f32,
        width: f32,
        iterations: u32,
        start_angle: f32,
        color: Color,
    ) {
        self.add(
            &Primitive::CircleOutline {
                center,
                radius,
                width,
                iterations,
                start_angle,
            },
            color,
            ShadeMode::Unlit,
        );
    }

    pub fn add_polygon(&mut self, points: &[Vec2], color: Color) {
        self.add(
            &Primitive::Polygon {
                points: points.to_vec(),
            },
            color,
            ShadeMode::Unlit,
        );
    }

    /// Appends a hardware-line polyline (one pixel wide on most backends).
    pub fn add_pixel_line(&mut self, points: &[Vec2], color: Color) {
        self.add(
            &Primitive::PixelLine {
                points: points.to_vec(),
            },
            color,
            ShadeMode::Unlit,
        );
    }

    /// Appends a `size` by `size` square centered on `point`.
    pub fn add_pixel(&mut self, point: Vec2, size: f32, color: Color) {
        let half = Vec2::splat(size * 0.5);
        self.add_rectangle(point - half, Vec2::splat(size), color, ShadeMode::Unlit);
    }

    /// Appends a line of constant on-screen `width` (in pixels) from `p1` to `p2`.
    ///
    /// The end points are placed with the current transform and projected with
    /// `screen`. The quad is emitted directly in NDC, so it is unaffected by
    /// lighting and by later camera changes in the same frame.
    ///
    /// Returns `false` and emits nothing if either end point lies behind the
    /// camera or both project to the same NDC point.
    pub fn add_line(&mut self, p1: Vec3, p2: Vec3, width: f32, color: Color, screen: &ScreenSpace) -> bool {
        let mvp = screen.view_proj * self.stack.current();
        let c1 = mvp * p1.extend(1.0);
        let c2 = mvp * p2.extend(1.0);

        if c1.w <= 0.0 || c2.w <= 0.0 {
            log::trace!("line {p1} -> {p2} crosses the camera plane, skipped");
            return false;
        }

        let n1 = c1.truncate() / c1.w;
        let n2 = c2.truncate() / c2.w;

        let direction = n2.truncate() - n1.truncate();
        let length = direction.length();
        if length < MIN_NDC_LENGTH {
            log::trace!("line {p1} -> {p2} is degenerate on screen, skipped");
            return false;
        }

        let perpendicular = Vec2::new(-direction.y, direction.x) / length;
        let offset = (perpendicular * width / screen.viewport).extend(0.0);

        let corners = [n1 - offset, n2 - offset, n2 + offset, n1 + offset];

        self.batch.start_batch(Topology::Triangles);
        for corner in corners {
            self.batch.push_vertex(Vertex3d::new(
                corner.to_array(),
                [0.0; 3],
                color,
                ShadeMode::Projected,
            ));
        }
        self.batch.insert_indices(&[0, 1, 2, 2, 3, 0]);
        true
    }
}
