//! Viewer configuration loaded from TOML.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```toml
//! title = "Cell 3"
//! angles_deg = [0.0, 20.0, -10.0, 0.0, 45.0, 0.0]
//!
//! [view]
//! r = 2.5
//!
//! [workspace]
//! min = [-300.0, -300.0, 0.0]
//! max = [300.0, 300.0, 600.0]
//!
//! [[lights]]
//! position = [2.0, -1.0, 3.0]
//! color = [1.0, 0.9, 0.8, 1.0]
//! ```

use std::path::Path;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::SphericalView;
use crate::kinematics::{DhTable, JOINT_COUNT};
use crate::lighting::{Light, Lighting, MAX_LIGHTS};
use crate::renderer::SAMPLE_COUNTS;
use crate::robot::Workspace;

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Workspace box bounds in millimetres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub min: [f32; 3],
    pub max: [f32; 3],
    /// Translation from the workspace frame to the robot base, in millimetres.
    pub base_offset: [f32; 3],
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            min: [-100.0; 3],
            max: [100.0; 3],
            base_offset: [0.0; 3],
        }
    }
}

impl WorkspaceConfig {
    pub fn to_workspace(&self) -> Workspace {
        Workspace::new(
            Vec3::from(self.min),
            Vec3::from(self.max),
            Mat4::from_translation(Vec3::from(self.base_offset)),
        )
    }
}

/// A light as written in the config file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub radius: f32,
    pub ambient_strength: f32,
    pub shininess: f32,
    pub enabled: bool,
}

impl Default for LightConfig {
    fn default() -> Self {
        let light = Light::default();
        Self {
            position: light.position.to_array(),
            color: light.color.to_array(),
            radius: light.radius,
            ambient_strength: light.ambient_strength,
            shininess: light.shininess,
            enabled: light.enabled,
        }
    }
}

impl From<&LightConfig> for Light {
    fn from(c: &LightConfig) -> Self {
        Light {
            position: Vec3::from(c.position),
            color: c.color.into(),
            radius: c.radius,
            ambient_strength: c.ambient_strength,
            shininess: c.shininess,
            enabled: c.enabled,
        }
    }
}

/// Settings for the viewer window and scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Initial joint angles in degrees.
    pub angles_deg: [f32; JOINT_COUNT],
    /// Initial camera position.
    pub view: SphericalView,
    pub workspace: WorkspaceConfig,
    pub lights: Vec<LightConfig>,
    /// Replaces the built-in DH table when present.
    pub dh: Option<DhTable>,
    /// Requested MSAA sample count, one of [`SAMPLE_COUNTS`]. Lowered to 1 if
    /// the surface cannot use it.
    pub sample_count: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Robot".to_string(),
            width: 1024,
            height: 1024,
            angles_deg: [0.0; JOINT_COUNT],
            view: SphericalView::default(),
            workspace: WorkspaceConfig::default(),
            lights: vec![LightConfig::default()],
            dh: None,
            sample_count: 4,
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn angles_deg(mut self, angles: [f32; JOINT_COUNT]) -> Self {
        self.angles_deg = angles;
        self
    }

    pub fn view(mut self, view: SphericalView) -> Self {
        self.view = view;
        self
    }

    pub fn sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn light(mut self, light: LightConfig) -> Self {
        self.lights.push(light);
        self
    }

    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !SAMPLE_COUNTS.contains(&self.sample_count) {
            return Err(ConfigError::Invalid(format!(
                "sample count must be one of {SAMPLE_COUNTS:?}, got {}",
                self.sample_count
            )));
        }
        if self.lights.len() > MAX_LIGHTS {
            return Err(ConfigError::Invalid(format!(
                "at most {MAX_LIGHTS} lights are supported, got {}",
                self.lights.len()
            )));
        }
        if let Some(light) = self.lights.iter().find(|l| l.radius <= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "light radius must be positive, got {}",
                light.radius
            )));
        }
        let WorkspaceConfig { min, max, .. } = self.workspace;
        if min.iter().zip(max).any(|(lo, hi)| *lo > hi) {
            return Err(ConfigError::Invalid(format!(
                "workspace min {min:?} exceeds max {max:?}"
            )));
        }
        if !(self.view.theta > 0.0 && self.view.theta < std::f32::consts::PI) || self.view.r < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "camera view out of range: theta {} r {}",
                self.view.theta, self.view.r
            )));
        }
        Ok(())
    }

    /// The configured lights. Entries past [`MAX_LIGHTS`] are dropped.
    pub fn lighting(&self) -> Lighting {
        let mut lighting = Lighting::new();
        for light in &self.lights {
            if !lighting.add(light.into()) {
                log::warn!("ignoring light beyond the first {MAX_LIGHTS}");
            }
        }
        lighting
    }

    pub fn dh_table(&self) -> DhTable {
        self.dh.unwrap_or_default()
    }
}
