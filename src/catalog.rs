use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One catalog entry. `id` must be unique across the catalog; the
/// presentation fields are carried through untouched for renderers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SoundDef {
    pub id: String,
    pub name: String,
    pub file: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
}

/// Named bulk volume assignment. Sounds absent from the map are silenced
/// when the preset is applied.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preset {
    pub name: String,
    pub sounds: HashMap<String, u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Catalog {
    pub sounds: Vec<SoundDef>,
    #[serde(default)]
    pub presets: Vec<Preset>,
}

impl Catalog {
    pub fn from_json_str(data: &str) -> Result<Self, String> {
        serde_json::from_str(data).map_err(|e| format!("Invalid catalog JSON: {e}"))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read catalog {}: {e}", path.display()))?;
        Self::from_json_str(&data)
    }
}

fn sound(id: &str, name: &str, file: &str, description: &str, icon: &str, color: &str) -> SoundDef {
    SoundDef {
        id: id.to_string(),
        name: name.to_string(),
        file: file.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
    }
}

fn preset(name: &str, sounds: &[(&str, u8)]) -> Preset {
    Preset {
        name: name.to_string(),
        sounds: sounds
            .iter()
            .map(|(id, volume)| (id.to_string(), *volume))
            .collect(),
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            sounds: vec![
                sound(
                    "rain",
                    "Rain",
                    "rain.mp3",
                    "Steady rainfall",
                    "fa-cloud-rain",
                    "from-blue-400 to-blue-600",
                ),
                sound(
                    "thunder",
                    "Thunder",
                    "thunder.mp3",
                    "Distant rolling thunder",
                    "fa-bolt",
                    "from-slate-500 to-slate-700",
                ),
                sound(
                    "wind",
                    "Wind",
                    "wind.mp3",
                    "Wind through the trees",
                    "fa-wind",
                    "from-teal-400 to-teal-600",
                ),
                sound(
                    "fire",
                    "Fireplace",
                    "fire.mp3",
                    "Crackling fireplace",
                    "fa-fire",
                    "from-orange-400 to-red-600",
                ),
                sound(
                    "birds",
                    "Birds",
                    "birds.mp3",
                    "Morning birdsong",
                    "fa-dove",
                    "from-green-400 to-green-600",
                ),
                sound(
                    "stream",
                    "Stream",
                    "stream.mp3",
                    "Bubbling forest stream",
                    "fa-water",
                    "from-cyan-400 to-cyan-600",
                ),
                sound(
                    "crickets",
                    "Crickets",
                    "crickets.mp3",
                    "Summer night crickets",
                    "fa-moon",
                    "from-indigo-400 to-indigo-600",
                ),
                sound(
                    "cafe",
                    "Coffee Shop",
                    "cafe.mp3",
                    "Murmuring coffee shop",
                    "fa-mug-hot",
                    "from-amber-400 to-amber-600",
                ),
            ],
            presets: vec![
                preset("Rainy Night", &[("rain", 70), ("thunder", 40), ("crickets", 20)]),
                preset("Forest Morning", &[("birds", 60), ("stream", 50), ("wind", 30)]),
                preset("Campfire", &[("fire", 65), ("wind", 25), ("crickets", 35)]),
                preset("Deep Focus", &[("rain", 50), ("cafe", 30)]),
            ],
        }
    }
}
