use serde::{Deserialize, Serialize};

use crate::chart::ChartKind;
use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::interaction::{LassoConfig, ZoomLimits};
use crate::theme::ThemeSpec;

/// Public engine bootstrap configuration.
///
/// This type is serializable so host applications can persist/load chart
/// setup without inventing their own ad-hoc format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEngineConfig {
    pub viewport: Viewport,
    pub kind: ChartKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub x_axis_label: Option<String>,
    #[serde(default)]
    pub y_axis_label: Option<String>,
    #[serde(default = "default_tick_count")]
    pub tick_count: usize,
    /// Per-axis overrides for `tick_count`.
    #[serde(default)]
    pub x_tick_count: Option<usize>,
    #[serde(default)]
    pub y_tick_count: Option<usize>,
    /// Whether a line chart may grow an overview strip when the data no
    /// longer fits at zoom level 1. Disabling it pins the chart at fit
    /// zoom 1 with no brush.
    #[serde(default = "default_viewbox")]
    pub viewbox: bool,
    #[serde(default)]
    pub theme: ThemeSpec,
    #[serde(default)]
    pub lasso: LassoConfig,
    #[serde(default)]
    pub zoom_limits: ZoomLimits,
    /// Text shown instead of marks when the bound data set is empty.
    #[serde(default = "default_placeholder_text")]
    pub placeholder_text: String,
}

impl ChartEngineConfig {
    /// Creates a minimal config for one chart variant.
    #[must_use]
    pub fn new(viewport: Viewport, kind: ChartKind) -> Self {
        Self {
            viewport,
            kind,
            title: None,
            x_axis_label: None,
            y_axis_label: None,
            tick_count: default_tick_count(),
            x_tick_count: None,
            y_tick_count: None,
            viewbox: default_viewbox(),
            theme: ThemeSpec::default(),
            lasso: LassoConfig::default(),
            zoom_limits: ZoomLimits::default(),
            placeholder_text: default_placeholder_text(),
        }
    }

    /// Sets the chart title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the x-axis label. Its presence widens the middle margin.
    #[must_use]
    pub fn with_x_axis_label(mut self, label: impl Into<String>) -> Self {
        self.x_axis_label = Some(label.into());
        self
    }

    /// Sets the y-axis label. Its presence widens the side margins.
    #[must_use]
    pub fn with_y_axis_label(mut self, label: impl Into<String>) -> Self {
        self.y_axis_label = Some(label.into());
        self
    }

    /// Sets the target tick count for both axes.
    #[must_use]
    pub fn with_tick_count(mut self, tick_count: usize) -> Self {
        self.tick_count = tick_count;
        self
    }

    /// Overrides the x-axis tick count.
    #[must_use]
    pub fn with_x_tick_count(mut self, tick_count: usize) -> Self {
        self.x_tick_count = Some(tick_count);
        self
    }

    /// Overrides the y-axis tick count.
    #[must_use]
    pub fn with_y_tick_count(mut self, tick_count: usize) -> Self {
        self.y_tick_count = Some(tick_count);
        self
    }

    /// Enables or disables the line chart's overview strip.
    #[must_use]
    pub fn with_viewbox(mut self, viewbox: bool) -> Self {
        self.viewbox = viewbox;
        self
    }

    /// Sets the raw theme resolved at engine construction.
    #[must_use]
    pub fn with_theme(mut self, theme: ThemeSpec) -> Self {
        self.theme = theme;
        self
    }

    /// Sets the lasso close-distance configuration.
    #[must_use]
    pub fn with_lasso(mut self, lasso: LassoConfig) -> Self {
        self.lasso = lasso;
        self
    }

    /// Sets the zoom scale limits.
    #[must_use]
    pub fn with_zoom_limits(mut self, zoom_limits: ZoomLimits) -> Self {
        self.zoom_limits = zoom_limits;
        self
    }

    /// Sets the empty-data placeholder text.
    #[must_use]
    pub fn with_placeholder_text(mut self, text: impl Into<String>) -> Self {
        self.placeholder_text = text.into();
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if self.tick_count == 0
            || self.x_tick_count == Some(0)
            || self.y_tick_count == Some(0)
        {
            return Err(ChartError::InvalidConfig(
                "tick count must be at least 1".to_owned(),
            ));
        }
        if self.zoom_limits.min_scale < 1.0 || self.zoom_limits.max_scale < self.zoom_limits.min_scale
        {
            return Err(ChartError::InvalidConfig(
                "zoom limits must satisfy 1 <= min <= max".to_owned(),
            ));
        }
        if !self.lasso.close_distance.is_finite() || self.lasso.close_distance <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "lasso close distance must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Serializes config to pretty JSON for debug/config files.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to parse config: {e}")))
    }
}

fn default_tick_count() -> usize {
    10
}

fn default_viewbox() -> bool {
    true
}

fn default_placeholder_text() -> String {
    "No data to display".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_json() {
        let config = ChartEngineConfig::new(Viewport::new(800, 600), ChartKind::Line)
            .with_title("Sales")
            .with_x_axis_label("Month")
            .with_tick_count(6);
        let json = config.to_json_pretty().expect("serialize");
        let back = ChartEngineConfig::from_json_str(&json).expect("parse");
        assert_eq!(config, back);
    }

    #[test]
    fn omitted_fields_fall_back_to_defaults() {
        let config = ChartEngineConfig::from_json_str(
            r#"{"viewport":{"width":640,"height":480},"kind":"pie"}"#,
        )
        .expect("parse");
        assert_eq!(config.kind, ChartKind::Pie);
        assert_eq!(config.tick_count, 10);
        assert_eq!(config.x_tick_count, None);
        assert!(config.viewbox);
        assert_eq!(config.lasso.close_distance, 100.0);
        assert_eq!(config.zoom_limits.max_scale, 8.0);
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        let zero = ChartEngineConfig::new(Viewport::new(0, 600), ChartKind::Line);
        assert!(zero.validate().is_err());

        let ticks = ChartEngineConfig::new(Viewport::new(800, 600), ChartKind::Line)
            .with_tick_count(0);
        assert!(ticks.validate().is_err());

        let axis_ticks = ChartEngineConfig::new(Viewport::new(800, 600), ChartKind::Line)
            .with_y_tick_count(0);
        assert!(axis_ticks.validate().is_err());

        let limits = ChartEngineConfig::new(Viewport::new(800, 600), ChartKind::Line)
            .with_zoom_limits(ZoomLimits {
                min_scale: 4.0,
                max_scale: 2.0,
            });
        assert!(limits.validate().is_err());
    }
}
