use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::color::model::{Interpolation, Rgb};
use crate::color::palette::{Palette, random_palette};
use crate::encode::export::ExportFormat;
use crate::foundation::core::{AspectRatio, Canvas};
use crate::foundation::error::{FiberError, FiberResult};
use crate::foundation::rng::SeededRandom;
use crate::pattern::config::PatternConfig;
use crate::scene::layer::{LayerSet, LayerSlot};

/// A complete render request: everything needed to produce one frame.
///
/// Renders take a `&Scene`, so every frame sees one consistent snapshot. An empty JSON object
/// deserializes to the basic preset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scene {
    pub pattern: PatternConfig,
    pub palette: Palette,
    pub layers: LayerSet,
    pub aspect_ratio: AspectRatio,
    /// Fills the frame before any layer draws, unless `transparent` is set.
    pub background_color: Rgb,
    pub transparent: bool,
    pub export_format: ExportFormat,
    pub interpolation: Interpolation,
}

impl Scene {
    /// Parse and validate a scene from JSON text.
    pub fn from_json_str(json: &str) -> FiberResult<Self> {
        let scene: Scene = serde_json::from_str(json)
            .map_err(|e| FiberError::serde(format!("invalid scene json: {e}")))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Read, parse and validate a scene file.
    pub fn from_path(path: &Path) -> FiberResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scene '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> FiberResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| FiberError::serde(e.to_string()))
    }

    pub fn canvas(&self) -> Canvas {
        self.aspect_ratio.canvas()
    }

    pub fn validate(&self) -> FiberResult<()> {
        self.pattern.validate()?;
        self.palette.validate()?;
        self.layers.validate()
    }

    /// Toggle the transparent background. Turning it on also hides the background layer;
    /// turning it off shows it again.
    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
        self.layers.base_mut(LayerSlot::Background).visible = !transparent;
    }

    /// Draw a fresh pattern seed. Returns the new seed.
    pub fn regenerate(&mut self, rng: &mut SeededRandom) -> f64 {
        self.pattern.seed = rng.next_f64();
        tracing::debug!(seed = self.pattern.seed, "regenerated pattern seed");
        self.pattern.seed
    }

    /// Replace the palette with a random pick from the fixed pool and draw a new seed.
    pub fn randomize_palette(&mut self, rng: &mut SeededRandom) {
        self.palette = random_palette(rng);
        self.regenerate(rng);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
