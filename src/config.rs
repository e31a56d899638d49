use crate::physics::body::{BodyControls, DEFAULT_MAX_DISTANCE, DEFAULT_MIN_DISTANCE, DistanceClamp};
use crate::physics::math::{Scalar, Vector};
use bevy::prelude::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "{e}"),
            ConfigError::Parse(e) => write!(f, "invalid configuration: {e}"),
            ConfigError::Serialize(e) => write!(f, "could not serialize configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigError::Serialize(e)
    }
}

/// RGBA color stored as four bytes, e.g. `[253, 184, 19, 255]`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }
}

impl From<Rgba> for Color {
    fn from(Rgba([r, g, b, a]): Rgba) -> Self {
        Color::srgba_u8(r, g, b, a)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ButtonBinding {
    Left,
    Right,
    Middle,
}

impl From<ButtonBinding> for MouseButton {
    fn from(binding: ButtonBinding) -> Self {
        match binding {
            ButtonBinding::Left => MouseButton::Left,
            ButtonBinding::Right => MouseButton::Right,
            ButtonBinding::Middle => MouseButton::Middle,
        }
    }
}

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub window: WindowConfig,
    pub physics: PhysicsConfig,
    pub interaction: InteractionConfig,
    pub scenario: ScenarioConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub resolution: [u32; 2],
    pub fullscreen: bool,
    pub msaa_samples: u32,
    /// Caps update and render frequency when set.
    pub frame_rate_limit: Option<u32>,
    pub background: Rgba,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::from("gravitoy"),
            resolution: [1920, 1080],
            fullscreen: true,
            msaa_samples: 8,
            frame_rate_limit: None,
            background: Rgba::rgb(255, 255, 255),
        }
    }
}

impl WindowConfig {
    pub fn size(&self) -> Vector {
        Vector::new(self.resolution[0] as Scalar, self.resolution[1] as Scalar)
    }

    pub fn msaa(&self) -> Msaa {
        match self.msaa_samples {
            0 | 1 => Msaa::Off,
            2 => Msaa::Sample2,
            3 | 4 => Msaa::Sample4,
            _ => Msaa::Sample8,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub min_distance: Scalar,
    pub max_distance: Scalar,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }
}

impl PhysicsConfig {
    pub fn distance_clamp(&self) -> DistanceClamp {
        DistanceClamp {
            min: self.min_distance,
            max: self.max_distance,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    pub drag_button: ButtonBinding,
    pub select_button: ButtonBinding,
    pub highlight_thickness: Scalar,
    pub outline_color: Rgba,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_button: ButtonBinding::Left,
            select_button: ButtonBinding::Right,
            highlight_thickness: 2.0,
            outline_color: Rgba::rgb(255, 0, 0),
        }
    }
}

impl InteractionConfig {
    pub fn controls(&self) -> BodyControls {
        BodyControls {
            drag_button: self.drag_button.into(),
            select_button: self.select_button.into(),
            highlight_thickness: self.highlight_thickness,
            outline_color: self.outline_color.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BodyConfig {
    pub name: String,
    pub radius: Scalar,
    pub mass: Scalar,
    pub gravitational_constant: Scalar,
    pub color: Rgba,
    /// Initial position relative to the window center.
    #[serde(default)]
    pub offset: [Scalar; 2],
    #[serde(default)]
    pub velocity: [Scalar; 2],
    /// Color of the marks left behind; bodies without one leave no trail.
    #[serde(default)]
    pub trail: Option<Rgba>,
}

/// Bodies pulling on `receiver`, applied in the listed order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AttractionConfig {
    pub receiver: String,
    pub attractors: Vec<String>,
}

/// Which bodies exist and how they interact.
///
/// Bodies that are never a receiver stay put and only act as attractors.
/// Only bodies listed in `dispatch_order` react to the mouse.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    pub bodies: Vec<BodyConfig>,
    pub interactions: Vec<AttractionConfig>,
    pub dispatch_order: Vec<String>,
    pub render_order: Vec<String>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|name| name.to_string()).collect();

        Self {
            bodies: vec![
                BodyConfig {
                    name: String::from("sun"),
                    radius: 60.0,
                    mass: 40.0,
                    gravitational_constant: 0.1,
                    color: Rgba::rgb(253, 184, 19),
                    offset: [0.0, 0.0],
                    velocity: [0.0, 0.0],
                    trail: None,
                },
                BodyConfig {
                    name: String::from("planet"),
                    radius: 25.0,
                    mass: 10.0,
                    gravitational_constant: 0.01,
                    color: Rgba::rgb(255, 0, 255),
                    offset: [-300.0, 200.0],
                    velocity: [-2.0, 0.0],
                    trail: Some(Rgba::rgb(122, 76, 26)),
                },
                BodyConfig {
                    name: String::from("earth"),
                    radius: 25.0,
                    mass: 10.0,
                    gravitational_constant: 0.01,
                    color: Rgba::rgb(0, 255, 255),
                    offset: [300.0, -200.0],
                    velocity: [2.0, 0.0],
                    trail: Some(Rgba::rgb(164, 25, 61)),
                },
            ],
            interactions: vec![
                AttractionConfig {
                    receiver: String::from("earth"),
                    attractors: names(&["planet", "sun"]),
                },
                AttractionConfig {
                    receiver: String::from("planet"),
                    attractors: names(&["earth", "sun"]),
                },
            ],
            dispatch_order: names(&["earth", "planet"]),
            render_order: names(&["sun", "earth", "planet"]),
        }
    }
}

impl SimulationConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from a file, falling back to defaults if the file doesn't exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io(_)) => {
                info!("Config file {} not found. Using defaults.", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Failed to parse config file {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Path of `config.toml` inside the platform's per-user configuration directory
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gravitoy").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn load_from_user_config() -> Self {
        match Self::user_config_path() {
            Some(path) => Self::load_or_default(path),
            None => {
                warn!("No user configuration directory available. Using defaults.");
                Self::default()
            }
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
