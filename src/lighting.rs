//! Point lights and their GPU uniform layout.

use glam::Vec3;

use crate::color::Color;

/// Maximum number of simultaneous lights.
pub const MAX_LIGHTS: usize = 4;

/// A point light with distance attenuation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Color,
    /// Distance at which the light's contribution reaches zero.
    pub radius: f32,
    pub ambient_strength: f32,
    pub shininess: f32,
    /// Disabled lights neither illuminate nor get a bulb.
    pub enabled: bool,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::new(2.0, 2.0, 3.0),
            color: Color::WHITE,
            radius: 10.0,
            ambient_strength: 0.3,
            shininess: 32.0,
            enabled: true,
        }
    }
}

/// All lights in the scene plus the viewer position used for specular terms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lighting {
    lights: Vec<Light>,
    pub camera_position: Vec3,
}

impl Lighting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a light. Returns `false` if [`MAX_LIGHTS`] are already present.
    pub fn add(&mut self, light: Light) -> bool {
        if self.lights.len() >= MAX_LIGHTS {
            return false;
        }
        self.lights.push(light);
        true
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut [Light] {
        &mut self.lights
    }

    pub fn enabled(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter().filter(|l| l.enabled)
    }

    /// Packs the enabled lights into the shader's uniform layout.
    pub fn to_uniforms(&self) -> LightingUniforms {
        let mut uniforms = LightingUniforms {
            camera_position: self.camera_position.extend(1.0).to_array(),
            ..Default::default()
        };
        let mut count = 0;
        for (slot, light) in uniforms.lights.iter_mut().zip(self.enabled()) {
            *slot = LightUniform::from(light);
            count += 1;
        }
        uniforms.light_count[0] = count;
        uniforms
    }
}

/// One light as laid out for WGSL (std140 compatible).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// xyz + padding.
    pub position: [f32; 4],
    pub color: [f32; 4],
    /// radius, ambient strength, shininess, padding.
    pub params: [f32; 4],
}

impl From<&Light> for LightUniform {
    fn from(light: &Light) -> Self {
        Self {
            position: light.position.extend(1.0).to_array(),
            color: light.color.to_array(),
            params: [light.radius, light.ambient_strength, light.shininess, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniforms {
    pub lights: [LightUniform; MAX_LIGHTS],
    pub camera_position: [f32; 4],
    /// Number of active entries in `lights`, padded to 16 bytes.
    pub light_count: [u32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_most_four_lights() {
        let mut lighting = Lighting::new();
        for _ in 0..MAX_LIGHTS {
            assert!(lighting.add(Light::default()));
        }
        assert!(!lighting.add(Light::default()));
        assert_eq!(lighting.lights().len(), MAX_LIGHTS);
    }

    #[test]
    fn uniforms_pack_only_enabled_lights() {
        let mut lighting = Lighting::new();
        lighting.add(Light {
            enabled: false,
            ..Default::default()
        });
        lighting.add(Light {
            position: Vec3::new(1.0, 2.0, 3.0),
            radius: 5.0,
            ..Default::default()
        });
        lighting.camera_position = Vec3::new(0.0, 0.0, 4.0);

        let u = lighting.to_uniforms();
        assert_eq!(u.light_count[0], 1);
        assert_eq!(u.lights[0].position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(u.lights[0].params[0], 5.0);
        assert_eq!(u.camera_position, [0.0, 0.0, 4.0, 1.0]);
    }

    #[test]
    fn uniform_size_is_multiple_of_16() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 48);
        assert_eq!(std::mem::size_of::<LightingUniforms>() % 16, 0);
    }
}
