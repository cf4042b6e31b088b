//! Named CT presets stored in a JSON library file.
//!
//! A missing file is an empty library. Looking up an unknown name falls
//! back to the built-in default CT so a frontend always has something to
//! show.

use std::collections::BTreeMap;
use std::path::Path;

use ct_sim::{ParameterSet, SimOptions};
use serde::{Deserialize, Serialize};

use crate::StudyResult;

pub const DEFAULT_PRESET_NAME: &str = "default";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    pub params: ParameterSet,
    #[serde(default)]
    pub options: SimOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PresetLibrary {
    #[serde(default)]
    pub presets: BTreeMap<String, Preset>,
}

impl PresetLibrary {
    pub fn load(path: &Path) -> StudyResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> StudyResult<()> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Sorted preset names, or just the default name when the library is empty.
    pub fn names(&self) -> Vec<String> {
        if self.presets.is_empty() {
            vec![DEFAULT_PRESET_NAME.to_string()]
        } else {
            self.presets.keys().cloned().collect()
        }
    }

    /// The named preset, or the built-in default CT.
    pub fn get_or_default(&self, name: &str) -> Preset {
        self.presets.get(name).cloned().unwrap_or_default()
    }

    pub fn insert(&mut self, name: impl Into<String>, preset: Preset) {
        self.presets.insert(name.into(), preset);
    }
}

/// Insert or replace one preset and rewrite the library file.
pub fn save_preset(path: &Path, name: &str, preset: Preset) -> StudyResult<()> {
    let mut library = PresetLibrary::load(path)?;
    library.insert(name, preset);
    library.save(path)
}
