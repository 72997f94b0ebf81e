// ============================================================================
// PARAMETER PRESETS — versioned JSON files for shareable glass settings
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Magic/version tag written into every preset file.
pub const PRESET_MAGIC_V1: &str = "GLASSMAP1";

/// Shape selection with its pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeParams {
    /// Square output of `size` pixels; radius defaults to `size / 2`.
    Circle { size: u32, radius: Option<f32> },
    /// `width` x `height` output; corner radius defaults to `height / 2`
    /// (a pill).
    Pill {
        width: u32,
        height: u32,
        corner_radius: Option<f32>,
    },
}

impl ShapeParams {
    pub fn output_size(&self) -> (u32, u32) {
        match *self {
            ShapeParams::Circle { size, .. } => (size, size),
            ShapeParams::Pill { width, height, .. } => (width, height),
        }
    }
}

/// One full set of generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlassPreset {
    /// Format tag, always [`PRESET_MAGIC_V1`].
    pub magic: String,
    /// Profile resolution. 127 pairs naturally with 8-bit channels.
    pub samples: usize,
    /// Bezel width as a fraction of the interior radius, 0..=1.
    pub bezel_width: f32,
    /// Glass thickness in pixels.
    pub glass_thickness: f32,
    /// feDisplacementMap scale recorded for the SVG wrapper.
    pub scale: f32,
    pub shape: ShapeParams,
}

impl Default for GlassPreset {
    fn default() -> Self {
        Self {
            magic: PRESET_MAGIC_V1.to_string(),
            samples: 127,
            bezel_width: 0.3,
            glass_thickness: 50.0,
            scale: 44.0,
            shape: ShapeParams::Circle {
                size: 420,
                radius: None,
            },
        }
    }
}

impl GlassPreset {
    /// Default parameters for the header-bar pill demo.
    pub fn default_pill() -> Self {
        Self {
            scale: 30.0,
            shape: ShapeParams::Pill {
                width: 800,
                height: 80,
                corner_radius: None,
            },
            ..Self::default()
        }
    }
}

/// Error type for preset file operations.
#[derive(Debug)]
pub enum PresetError {
    Io(std::io::Error),
    Serialize(String),
    InvalidFormat(String),
}

impl std::fmt::Display for PresetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresetError::Io(e) => write!(f, "I/O error: {}", e),
            PresetError::Serialize(e) => write!(f, "Serialization error: {}", e),
            PresetError::InvalidFormat(e) => write!(f, "Invalid format: {}", e),
        }
    }
}

impl From<std::io::Error> for PresetError {
    fn from(e: std::io::Error) -> Self {
        PresetError::Io(e)
    }
}

impl From<serde_json::Error> for PresetError {
    fn from(e: serde_json::Error) -> Self {
        PresetError::Serialize(e.to_string())
    }
}

/// Write a preset as pretty-printed JSON.
pub fn save_preset(preset: &GlassPreset, path: &Path) -> Result<(), PresetError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, preset)?;
    Ok(())
}

/// Load a preset, checking the magic tag before trusting the rest.
pub fn load_preset(path: &Path) -> Result<GlassPreset, PresetError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let preset: GlassPreset = serde_json::from_reader(reader)?;

    if preset.magic != PRESET_MAGIC_V1 {
        return Err(PresetError::InvalidFormat(format!(
            "unknown preset tag '{}' (expected '{}')",
            preset.magic, PRESET_MAGIC_V1
        )));
    }

    Ok(preset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip() {
        let preset = GlassPreset::default_pill();
        let json = serde_json::to_string(&preset).unwrap();
        let back: GlassPreset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, preset);
    }

    #[test]
    fn file_round_trip() {
        let dir = std::env::temp_dir();
        let path = dir.join("glassmap_preset_test.json");
        let preset = GlassPreset {
            glass_thickness: 75.0,
            shape: ShapeParams::Circle {
                size: 256,
                radius: Some(100.0),
            },
            ..GlassPreset::default()
        };
        save_preset(&preset, &path).unwrap();
        let back = load_preset(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back, preset);
    }

    #[test]
    fn rejects_unknown_magic() {
        let dir = std::env::temp_dir();
        let path = dir.join("glassmap_preset_bad_magic.json");
        let mut preset = GlassPreset::default();
        preset.magic = "NOTGLASS".to_string();
        save_preset(&preset, &path).unwrap();
        let err = load_preset(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, PresetError::InvalidFormat(_)));
    }

    #[test]
    fn defaults_match_the_demo_values() {
        let d = GlassPreset::default();
        assert_eq!(d.samples, 127);
        assert_eq!(d.bezel_width, 0.3);
        assert_eq!(d.glass_thickness, 50.0);
        assert_eq!(d.shape.output_size(), (420, 420));
    }
}
