//! Theme resolution.
//!
//! Raw theme files are permissive: every field is optional and malformed or
//! missing entries fall back to documented defaults, never a hard failure.
//! The engine only ever sees the resolved [`ThemeConfig`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::render::Color;

/// One gradient stop: normalized position plus a CSS color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub at: f64,
    pub color: String,
}

/// Raw, serializable theme as loaded from a theme file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThemeSpec {
    pub background_color: Option<String>,
    pub axis_text: Option<AxisTextSpec>,
    pub axis_lines: Option<AxisLinesSpec>,
    /// `None` disables grid lines entirely.
    pub grid_lines: Option<GridLinesSpec>,
    pub labels: Option<LabelsSpec>,
    pub selection_highlight: Option<String>,
    pub mark_opacity: Option<f64>,
    pub gradients: Option<GradientsSpec>,
    pub viewbox: Option<ViewboxSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AxisTextSpec {
    pub color: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub font_weight: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AxisLinesSpec {
    pub stroke: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GridLinesSpec {
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LabelSpec {
    pub color: Option<String>,
    pub font_size: Option<f64>,
}

/// Per-label overrides; unset fields inherit the shared label style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LabelsSpec {
    pub shared: LabelSpec,
    pub title: LabelSpec,
    pub x_axis: LabelSpec,
    pub y_axis: LabelSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GradientsSpec {
    pub sequential: Option<Vec<GradientStop>>,
    pub diverging: Option<Vec<GradientStop>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewboxSpec {
    pub background_fill: Option<String>,
    pub selection_fill: Option<String>,
    pub selection_stroke: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTextStyle {
    pub color: Color,
    pub font_size_px: f64,
    pub font_weight: u16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLineStyle {
    pub stroke: Color,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub color: Color,
    pub font_size_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewboxStyle {
    pub background_fill: Color,
    pub selection_fill: Color,
    pub selection_stroke: Color,
}

/// Fully resolved theme with every fallback applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeConfig {
    pub background_color: Color,
    pub axis_text: AxisTextStyle,
    pub axis_text_font_family: String,
    pub axis_line_stroke: Color,
    pub grid_lines: Option<GridLineStyle>,
    pub title_label: LabelStyle,
    pub x_axis_label: LabelStyle,
    pub y_axis_label: LabelStyle,
    pub selection_highlight: Color,
    /// Opacity of unselected marks.
    pub base_mark_opacity: f64,
    pub sequential_stops: Vec<(f64, Color)>,
    pub diverging_stops: Vec<(f64, Color)>,
    pub viewbox: ViewboxStyle,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self::resolve(&ThemeSpec::default())
    }
}

impl ThemeConfig {
    /// Applies per-field defaults to a raw theme.
    ///
    /// Unparseable colors are treated the same as missing ones.
    #[must_use]
    pub fn resolve(spec: &ThemeSpec) -> Self {
        let axis_text = spec.axis_text.clone().unwrap_or_default();
        let labels = spec.labels.clone().unwrap_or_default();

        let shared_label_color = color_or(labels.shared.color.as_deref(), "axis label color", || {
            Color::rgb(1.0, 1.0, 1.0)
        });
        let shared_label_size = labels.shared.font_size.unwrap_or(14.0);
        let label = |overrides: &LabelSpec| LabelStyle {
            color: overrides
                .color
                .as_deref()
                .and_then(|raw| Color::from_css(raw).ok())
                .unwrap_or(shared_label_color),
            font_size_px: overrides.font_size.unwrap_or(shared_label_size),
        };

        Self {
            background_color: color_or(spec.background_color.as_deref(), "background", || {
                Color::rgb(1.0, 1.0, 1.0)
            }),
            axis_text: AxisTextStyle {
                color: color_or(axis_text.color.as_deref(), "axis text color", || {
                    Color::rgb(0.2, 0.2, 0.2)
                }),
                font_size_px: axis_text.font_size.unwrap_or(12.0),
                font_weight: axis_text.font_weight.unwrap_or(400),
            },
            axis_text_font_family: axis_text
                .font_family
                .unwrap_or_else(|| "sans-serif".to_owned()),
            axis_line_stroke: color_or(
                spec.axis_lines
                    .as_ref()
                    .and_then(|lines| lines.stroke.as_deref()),
                "axis line stroke",
                || Color::rgb(0.6, 0.6, 0.6),
            ),
            grid_lines: spec.grid_lines.as_ref().map(|grid| GridLineStyle {
                stroke: color_or(grid.stroke.as_deref(), "grid stroke", || {
                    Color::rgb(0.85, 0.85, 0.85)
                }),
                stroke_width: grid.stroke_width.unwrap_or(1.0),
            }),
            title_label: label(&labels.title),
            x_axis_label: label(&labels.x_axis),
            y_axis_label: label(&labels.y_axis),
            selection_highlight: color_or(
                spec.selection_highlight.as_deref(),
                "selection highlight",
                || Color::from_css("#737373").unwrap_or(Color::rgb(0.45, 0.45, 0.45)),
            ),
            base_mark_opacity: spec.mark_opacity.unwrap_or(0.75),
            sequential_stops: resolve_stops(
                spec.gradients
                    .as_ref()
                    .and_then(|g| g.sequential.as_deref()),
                DEFAULT_SEQUENTIAL,
            ),
            diverging_stops: resolve_stops(
                spec.gradients.as_ref().and_then(|g| g.diverging.as_deref()),
                DEFAULT_DIVERGING,
            ),
            viewbox: {
                let viewbox = spec.viewbox.clone().unwrap_or_default();
                ViewboxStyle {
                    background_fill: color_or(
                        viewbox.background_fill.as_deref(),
                        "viewbox fill",
                        Color::transparent,
                    ),
                    selection_fill: color_or(
                        viewbox.selection_fill.as_deref(),
                        "viewbox selection fill",
                        || Color::rgba(0.0, 0.0, 0.0, 0.1),
                    ),
                    selection_stroke: color_or(
                        viewbox.selection_stroke.as_deref(),
                        "viewbox selection stroke",
                        || Color::from_css("#ddd").unwrap_or(Color::rgb(0.87, 0.87, 0.87)),
                    ),
                }
            },
        }
    }

    #[must_use]
    pub fn sequential(&self, domain: (f64, f64)) -> ColorScale {
        ColorScale {
            stops: self.sequential_stops.clone(),
            domain,
        }
    }

    #[must_use]
    pub fn diverging(&self, domain: (f64, f64)) -> ColorScale {
        ColorScale {
            stops: self.diverging_stops.clone(),
            domain,
        }
    }
}

const DEFAULT_SEQUENTIAL: [(f64, &str); 3] =
    [(0.0, "#020024"), (0.37, "#090979"), (1.0, "#00d4ff")];

const DEFAULT_DIVERGING: [(f64, &str); 3] = [(0.0, "#e42d21"), (0.47, "#e8e0bb"), (1.0, "#56d73c")];

fn resolve_stops(spec: Option<&[GradientStop]>, defaults: [(f64, &str); 3]) -> Vec<(f64, Color)> {
    let parsed: Vec<(f64, Color)> = spec
        .unwrap_or(&[])
        .iter()
        .filter_map(|stop| {
            let color = Color::from_css(&stop.color).ok()?;
            stop.at.is_finite().then_some((stop.at.clamp(0.0, 1.0), color))
        })
        .collect();

    let mut stops = if parsed.len() >= 2 {
        parsed
    } else {
        if spec.is_some() {
            debug!("gradient has fewer than two usable stops, using defaults");
        }
        defaults
            .iter()
            .map(|(at, css)| (*at, Color::from_css(css).unwrap_or(Color::rgb(0.0, 0.0, 0.0))))
            .collect()
    };
    stops.sort_by(|a, b| a.0.total_cmp(&b.0));
    stops
}

fn color_or(raw: Option<&str>, field: &str, fallback: impl Fn() -> Color) -> Color {
    match raw {
        Some(css) => Color::from_css(css).unwrap_or_else(|_| {
            debug!(field, value = css, "unparseable theme color, using default");
            fallback()
        }),
        None => fallback(),
    }
}

/// Piecewise-linear RGB interpolation over gradient stops, mapped onto a
/// value domain. A reversed domain flips the gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    stops: Vec<(f64, Color)>,
    domain: (f64, f64),
}

impl ColorScale {
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn color_at(&self, value: f64) -> Color {
        let (d0, d1) = self.domain;
        let t = if d1 == d0 {
            0.5
        } else {
            ((value - d0) / (d1 - d0)).clamp(0.0, 1.0)
        };

        let first = self.stops.first();
        let last = self.stops.last();
        let (Some(&(first_at, first_color)), Some(&(last_at, last_color))) = (first, last) else {
            return Color::rgb(0.0, 0.0, 0.0);
        };
        if t <= first_at {
            return first_color;
        }
        if t >= last_at {
            return last_color;
        }

        for window in self.stops.windows(2) {
            let (a_at, a_color) = window[0];
            let (b_at, b_color) = window[1];
            if t >= a_at && t <= b_at {
                let local = if b_at == a_at {
                    0.0
                } else {
                    (t - a_at) / (b_at - a_at)
                };
                return a_color.lerp(b_color, local);
            }
        }
        last_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_spec_resolves_documented_defaults() {
        let theme = ThemeConfig::resolve(&ThemeSpec::default());
        assert_eq!(theme.base_mark_opacity, 0.75);
        assert_eq!(
            theme.selection_highlight,
            Color::from_css("#737373").expect("default highlight")
        );
        assert_eq!(theme.viewbox.background_fill, Color::transparent());
        assert!(theme.grid_lines.is_none());
    }

    #[test]
    fn color_scale_hits_endpoint_stops() {
        let theme = ThemeConfig::default();
        let scale = theme.sequential((0.0, 10.0));
        assert_eq!(scale.color_at(-5.0), scale.color_at(0.0));
        assert_eq!(scale.color_at(10.0), scale.color_at(99.0));
        assert_ne!(scale.color_at(0.0), scale.color_at(10.0));
    }

    #[test]
    fn reversed_domain_flips_the_gradient() {
        let theme = ThemeConfig::default();
        let forward = theme.sequential((0.0, 10.0));
        let reversed = theme.sequential((10.0, 0.0));
        assert_eq!(forward.color_at(0.0), reversed.color_at(10.0));
    }

    #[test]
    fn spec_round_trips_through_json() {
        let spec = ThemeSpec {
            selection_highlight: Some("#abcdef".to_owned()),
            mark_opacity: Some(0.5),
            ..ThemeSpec::default()
        };
        let json = serde_json::to_string(&spec).expect("serialize");
        let back: ThemeSpec = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(spec, back);
    }
}
