//! Per-frame scene assembly: robot, floor, light bulbs and workspace.

use glam::Vec2;

use crate::color::Color;
use crate::kinematics::{JointAngles, JointChain};
use crate::lighting::Lighting;
use crate::mesh::ShadeMode;
use crate::mesh_builder::{MeshBuilder, ScreenSpace};
use crate::robot::RobotDrawer;
use crate::transform_stack::Transformable;

/// Half the side length of the floor.
pub const FLOOR_EXTENT: f32 = 5.0;
/// Side length of one checker square.
pub const FLOOR_STEP: f32 = 0.5;

const BULB_RADIUS: f32 = 0.1;
const BULB_SEGMENTS: u32 = 10;

/// Checkerboard on `z = 0` covering `[-FLOOR_EXTENT, FLOOR_EXTENT)²`.
pub fn draw_floor(builder: &mut MeshBuilder) {
    let squares = (2.0 * FLOOR_EXTENT / FLOOR_STEP).round() as u32;
    for i in 0..squares {
        for j in 0..squares {
            let corner = Vec2::new(
                -FLOOR_EXTENT + i as f32 * FLOOR_STEP,
                -FLOOR_EXTENT + j as f32 * FLOOR_STEP,
            );
            let color = if (i + j) % 2 == 0 { Color::LIGHT_GRAY } else { Color::GRAY };
            builder.add_rectangle(corner, Vec2::splat(FLOOR_STEP), color, ShadeMode::Lit);
        }
    }
}

/// Unlit spheres marking every enabled light.
pub fn draw_light_bulbs(builder: &mut MeshBuilder, lighting: &Lighting) {
    for light in lighting.enabled() {
        let mut bulb = builder.scoped();
        bulb.translate(light.position);
        bulb.add_solid_sphere(BULB_RADIUS, BULB_SEGMENTS, BULB_SEGMENTS, light.color, ShadeMode::Unlit);
    }
}

/// Rebuilds the whole frame into `builder` and returns the arm's joint chain.
pub fn build_frame(
    builder: &mut MeshBuilder,
    drawer: &RobotDrawer,
    angles: &JointAngles,
    lighting: &Lighting,
    screen: &ScreenSpace,
) -> JointChain {
    builder.clear();
    let chain = drawer.draw(builder, angles, screen);
    draw_floor(builder);
    draw_light_bulbs(builder, lighting);
    drawer.draw_workspace(builder, screen);
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::Light;

    #[test]
    fn floor_is_a_20_by_20_checkerboard() {
        let mut builder = MeshBuilder::new();
        draw_floor(&mut builder);
        let batch = builder.batch();
        assert_eq!(batch.sub_batches().len(), 400);
        assert_eq!(batch.vertices().len(), 1600);

        let first = batch.vertices()[0];
        assert_eq!(first.position, [-5.0, -5.0, 0.0]);
        assert_eq!(first.color, Color::LIGHT_GRAY.to_array());
        let second = batch.vertices()[4];
        assert_eq!(second.color, Color::GRAY.to_array());
    }

    #[test]
    fn only_enabled_lights_get_bulbs() {
        let mut lighting = Lighting::new();
        lighting.add(Light::default());
        lighting.add(Light {
            enabled: false,
            ..Default::default()
        });
        let mut builder = MeshBuilder::new();
        draw_light_bulbs(&mut builder, &lighting);
        assert_eq!(builder.batch().sub_batches().len(), 1);
        assert!(
            builder
                .batch()
                .vertices()
                .iter()
                .all(|v| v.shade_mode() == ShadeMode::Unlit)
        );
        assert_eq!(builder.stack().depth(), 1);
    }
}
