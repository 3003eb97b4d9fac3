//! Built-in scene table

use crate::ProtoError;

/// A named built-in lighting effect
#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneEntry {
    pub name: &'static str,
    pub index: u16,
}

impl SceneEntry {
    pub const fn new(name: &'static str, index: u16) -> Self {
        Self { name, index }
    }
}

/// Scenes known to TG609 firmware, ordered by index
pub const TG609_SCENES: &[SceneEntry] = &[
    SceneEntry::new("symphony", 2),
    SceneEntry::new("energy", 3),
    SceneEntry::new("jump", 4),
    SceneEntry::new("vitality", 7),
    SceneEntry::new("forest", 13),
    SceneEntry::new("accumulation", 16),
    SceneEntry::new("chase", 23),
    SceneEntry::new("rainbow", 26),
    SceneEntry::new("melody", 32),
    SceneEntry::new("ephemeral", 35),
    SceneEntry::new("space-time", 45),
    SceneEntry::new("neon-lights", 48),
    SceneEntry::new("flow", 55),
    SceneEntry::new("aurora", 59),
    SceneEntry::new("green-jade", 71),
    SceneEntry::new("running", 91),
    SceneEntry::new("pink-light", 109),
    SceneEntry::new("alarm", 113),
];

/// Immutable name <-> index table for one firmware variant
#[derive(Debug, Clone, Copy)]
pub struct SceneRegistry {
    entries: &'static [SceneEntry],
}

impl SceneRegistry {
    pub const fn new(entries: &'static [SceneEntry]) -> Self {
        Self { entries }
    }

    /// Resolve a scene name (any case, `-`/`_`/space interchangeable) or a
    /// decimal index to the scene index.
    pub fn resolve(&self, name_or_index: &str) -> Result<u16, ProtoError> {
        let input = name_or_index.trim();

        if let Ok(index) = input.parse::<u16>() {
            return self
                .entries
                .iter()
                .find(|e| e.index == index)
                .map(|e| e.index)
                .ok_or_else(|| ProtoError::UnknownScene(input.to_string()));
        }

        if let Some(entry) = self.entries.iter().find(|e| e.name == input) {
            return Ok(entry.index);
        }

        let key = normalize(input);
        self.entries
            .iter()
            .find(|e| normalize(e.name) == key)
            .map(|e| e.index)
            .ok_or_else(|| ProtoError::UnknownScene(input.to_string()))
    }

    pub fn name_of(&self, index: u16) -> Option<&'static str> {
        self.entries.iter().find(|e| e.index == index).map(|e| e.name)
    }

    pub fn list(&self) -> &'static [SceneEntry] {
        self.entries
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '_' | ' ' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}
