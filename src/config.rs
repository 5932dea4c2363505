use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub layout: LayoutConfig,
    pub view: ViewConfig,
}

/// Force-simulation tunables. Defaults are the reference constants of the
/// code-flow view.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub link_distance: f32,
    pub link_distance_per_degree: f32,
    pub charge_strength: f32,
    pub barnes_hut_theta: f32,
    pub center_strength: f32,
    pub collision_radius: f32,
    pub collision_degree_cap: usize,
    pub collision_strength: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
    /// Per-tick cooling rate. Unset means "reach `alpha_min` in 300 ticks".
    pub alpha_decay: Option<f32>,
    pub drag_alpha_target: f32,
    pub initial_spread: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            link_distance: 100.0,
            link_distance_per_degree: 2.0,
            charge_strength: -300.0,
            barnes_hut_theta: 0.9,
            center_strength: 0.1,
            collision_radius: 10.0,
            collision_degree_cap: 20,
            collision_strength: 0.7,
            velocity_decay: 0.4,
            alpha_min: 0.001,
            alpha_decay: None,
            drag_alpha_target: 0.3,
            initial_spread: 10.0,
        }
    }
}

impl LayoutConfig {
    pub fn alpha_decay(&self) -> f32 {
        self.alpha_decay
            .unwrap_or_else(|| 1.0 - self.alpha_min.powf(1.0 / 300.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub label_max_chars: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 4.0,
            label_max_chars: 20,
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let settings = Self::parse(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        log::info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    fn parse(raw: &str) -> Result<Self> {
        let mut settings: Self = toml::from_str(raw)?;
        if settings.view.min_zoom > settings.view.max_zoom {
            std::mem::swap(&mut settings.view.min_zoom, &mut settings.view.max_zoom);
        }
        settings.view.min_zoom = settings.view.min_zoom.max(0.01);
        Ok(settings)
    }
}
