use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceWeights {
    pub spring: f64,
    pub repulsion: f64,
    pub frame_magnet: f64,
}

/// Host-tunable physics limits.
///
/// Deserializing accepts an optional `"preset"` name whose values act as the base for any
/// explicitly given field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawConstraints")]
pub struct Constraints {
    /// Hard bound on the distance between a simulated node and its target.
    pub max_offset: f64,
    /// How long a released node is expected to take to return home. Informational for hosts;
    /// the stepper never reads it.
    pub return_duration_ms: f64,
    pub physics_enabled: bool,
    pub grid_snap: f64,
    pub repulsion_radius: f64,
    pub weights: ForceWeights,
}

impl Default for Constraints {
    fn default() -> Self {
        Preset::Tactile.constraints()
    }
}

impl Constraints {
    pub fn preset(preset: Preset) -> Self {
        preset.constraints()
    }

    pub fn frozen(mut self) -> Self {
        self.physics_enabled = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    /// Physics off: every node sits exactly on its target.
    Static,
    #[default]
    Tactile,
    /// Loose bound and strong repulsion, for a lively canvas.
    Storm,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Self::Static, Self::Tactile, Self::Storm];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Tactile => "tactile",
            Self::Storm => "storm",
        }
    }

    pub const fn constraints(self) -> Constraints {
        match self {
            Self::Static => Constraints {
                max_offset: 0.0,
                return_duration_ms: 0.0,
                physics_enabled: false,
                grid_snap: 20.0,
                repulsion_radius: 0.0,
                weights: ForceWeights {
                    spring: 0.0,
                    repulsion: 0.0,
                    frame_magnet: 0.0,
                },
            },
            Self::Tactile => Constraints {
                max_offset: 48.0,
                return_duration_ms: 320.0,
                physics_enabled: true,
                grid_snap: 20.0,
                repulsion_radius: 120.0,
                weights: ForceWeights {
                    spring: 0.1,
                    repulsion: 600.0,
                    frame_magnet: 0.04,
                },
            },
            Self::Storm => Constraints {
                max_offset: 120.0,
                return_duration_ms: 900.0,
                physics_enabled: true,
                grid_snap: 20.0,
                repulsion_radius: 220.0,
                weights: ForceWeights {
                    spring: 0.05,
                    repulsion: 2400.0,
                    frame_magnet: 0.08,
                },
            },
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "tactile" => Ok(Self::Tactile),
            "storm" => Ok(Self::Storm),
            _ => Err(Error::UnknownPreset {
                name: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConstraints {
    preset: Option<String>,
    max_offset: Option<f64>,
    return_duration_ms: Option<f64>,
    physics_enabled: Option<bool>,
    grid_snap: Option<f64>,
    repulsion_radius: Option<f64>,
    #[serde(default)]
    weights: RawWeights,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWeights {
    spring: Option<f64>,
    repulsion: Option<f64>,
    frame_magnet: Option<f64>,
}

impl TryFrom<RawConstraints> for Constraints {
    type Error = Error;

    fn try_from(raw: RawConstraints) -> Result<Self> {
        let base = match raw.preset.as_deref() {
            Some(name) => name.parse::<Preset>()?.constraints(),
            None => Constraints::default(),
        };
        Ok(Constraints {
            max_offset: raw.max_offset.unwrap_or(base.max_offset),
            return_duration_ms: raw.return_duration_ms.unwrap_or(base.return_duration_ms),
            physics_enabled: raw.physics_enabled.unwrap_or(base.physics_enabled),
            grid_snap: raw.grid_snap.unwrap_or(base.grid_snap),
            repulsion_radius: raw.repulsion_radius.unwrap_or(base.repulsion_radius),
            weights: ForceWeights {
                spring: raw.weights.spring.unwrap_or(base.weights.spring),
                repulsion: raw.weights.repulsion.unwrap_or(base.weights.repulsion),
                frame_magnet: raw.weights.frame_magnet.unwrap_or(base.weights.frame_magnet),
            },
        })
    }
}
