use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Fully transparent; stands in for the CSS `none` fill.
    #[must_use]
    pub const fn transparent() -> Self {
        Self::rgba(0.0, 0.0, 0.0, 0.0)
    }

    /// Parses the CSS color forms themes actually use: `#rgb`, `#rrggbb`,
    /// `#rrggbbaa`, `rgba(r,g,b,a)`, and the keywords `none`/`transparent`.
    pub fn from_css(input: &str) -> ChartResult<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("none") || input.eq_ignore_ascii_case("transparent") {
            return Ok(Self::transparent());
        }

        if let Some(hex) = input.strip_prefix('#') {
            return Self::from_hex(hex)
                .ok_or_else(|| ChartError::InvalidData(format!("malformed hex color `{input}`")));
        }

        if let Some(body) = input
            .strip_prefix("rgba(")
            .or_else(|| input.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<&str> = body.split(',').map(str::trim).collect();
            if parts.len() == 3 || parts.len() == 4 {
                let channel = |s: &str| s.parse::<f64>().ok().map(|v| (v / 255.0).clamp(0.0, 1.0));
                if let (Some(red), Some(green), Some(blue)) =
                    (channel(parts[0]), channel(parts[1]), channel(parts[2]))
                {
                    let alpha = match parts.get(3) {
                        Some(raw) => raw
                            .parse::<f64>()
                            .map_err(|_| {
                                ChartError::InvalidData(format!("malformed alpha in `{input}`"))
                            })?
                            .clamp(0.0, 1.0),
                        None => 1.0,
                    };
                    return Ok(Self::rgba(red, green, blue, alpha));
                }
            }
        }

        Err(ChartError::InvalidData(format!(
            "unrecognized color `{input}`"
        )))
    }

    fn from_hex(hex: &str) -> Option<Self> {
        let expand = |value: u8| f64::from(value) / 255.0;
        match hex.len() {
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok();
                Some(Self::rgb(
                    expand(digit(0)?),
                    expand(digit(1)?),
                    expand(digit(2)?),
                ))
            }
            6 | 8 => {
                let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                let alpha = if hex.len() == 8 {
                    expand(byte(6)?)
                } else {
                    1.0
                };
                Some(Self::rgba(
                    expand(byte(0)?),
                    expand(byte(2)?),
                    expand(byte(4)?),
                    alpha,
                ))
            }
            _ => None,
        }
    }

    /// Channel-wise linear interpolation toward `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self::rgba(
            mix(self.red, other.red),
            mix(self.green, other.green),
            mix(self.blue, other.blue),
            mix(self.alpha, other.alpha),
        )
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Draw command for one circular mark in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePrimitive {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub fill: Color,
    pub opacity: f64,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
}

impl CirclePrimitive {
    pub fn validate(self) -> ChartResult<()> {
        if !self.cx.is_finite() || !self.cy.is_finite() {
            return Err(ChartError::InvalidData(
                "circle center must be finite".to_owned(),
            ));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(ChartError::InvalidData(
                "circle radius must be finite and >= 0".to_owned(),
            ));
        }
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(ChartError::InvalidData(
                "circle opacity must be finite and in [0, 1]".to_owned(),
            ));
        }
        self.fill.validate()?;
        if let Some(stroke) = self.stroke {
            stroke.validate()?;
        }
        Ok(())
    }
}

/// Polyline through already-projected points, for the line chart path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPrimitive {
    pub points: Vec<(f64, f64)>,
    pub stroke: Color,
    pub stroke_width: f64,
}

impl PathPrimitive {
    pub fn validate(&self) -> ChartResult<()> {
        for (x, y) in &self.points {
            if !x.is_finite() || !y.is_finite() {
                return Err(ChartError::InvalidData(
                    "path points must be finite".to_owned(),
                ));
            }
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(ChartError::InvalidData(
                "path stroke width must be finite and > 0".to_owned(),
            ));
        }
        self.stroke.validate()
    }
}

/// Annular sector for the pie chart, angles in radians from 12 o'clock,
/// centered at `(cx, cy)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPrimitive {
    pub cx: f64,
    pub cy: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub fill: Color,
    pub opacity: f64,
    pub stroke: Option<Color>,
}

impl ArcPrimitive {
    /// Mid-arc anchor point in pixel space, matching the d3 arc centroid.
    #[must_use]
    pub fn centroid(self) -> (f64, f64) {
        let radius = (self.inner_radius + self.outer_radius) / 2.0;
        let angle = (self.start_angle + self.end_angle) / 2.0 - std::f64::consts::FRAC_PI_2;
        (
            self.cx + radius * angle.cos(),
            self.cy + radius * angle.sin(),
        )
    }

    pub fn validate(self) -> ChartResult<()> {
        for value in [
            self.cx,
            self.cy,
            self.start_angle,
            self.end_angle,
            self.inner_radius,
            self.outer_radius,
        ] {
            if !value.is_finite() {
                return Err(ChartError::InvalidData(
                    "arc geometry must be finite".to_owned(),
                ));
            }
        }
        if self.inner_radius < 0.0 || self.outer_radius < self.inner_radius {
            return Err(ChartError::InvalidData(
                "arc radii must satisfy 0 <= inner <= outer".to_owned(),
            ));
        }
        self.fill.validate()?;
        if let Some(stroke) = self.stroke {
            stroke.validate()?;
        }
        Ok(())
    }
}

/// Draw command for one filled rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectPrimitive {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Color,
}

impl RectPrimitive {
    pub fn validate(self) -> ChartResult<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(ChartError::InvalidData(
                "rect origin must be finite".to_owned(),
            ));
        }
        if !self.width.is_finite() || !self.height.is_finite() || self.width < 0.0 || self.height < 0.0
        {
            return Err(ChartError::InvalidData(
                "rect size must be finite and >= 0".to_owned(),
            ));
        }
        self.fill.validate()
    }
}

/// Draw command for one line segment in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePrimitive {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke_width: f64,
    pub color: Color,
}

impl LinePrimitive {
    pub fn validate(self) -> ChartResult<()> {
        if !self.x1.is_finite() || !self.y1.is_finite() || !self.x2.is_finite() || !self.y2.is_finite()
        {
            return Err(ChartError::InvalidData(
                "line coordinates must be finite".to_owned(),
            ));
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(ChartError::InvalidData(
                "line stroke width must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Horizontal text alignment relative to `TextPrimitive::x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// Draw command for one label in pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size_px: f64,
    pub color: Color,
    pub h_align: TextHAlign,
}

impl TextPrimitive {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        x: f64,
        y: f64,
        font_size_px: f64,
        color: Color,
        h_align: TextHAlign,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size_px,
            color,
            h_align,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.text.is_empty() {
            return Err(ChartError::InvalidData(
                "text primitive must not be empty".to_owned(),
            ));
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(ChartError::InvalidData(
                "text coordinates must be finite".to_owned(),
            ));
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_rgba_forms_parse() {
        let hex = Color::from_css("#737373").expect("hex");
        assert!((hex.red - 115.0 / 255.0).abs() < 1e-9);

        let rgba = Color::from_css("rgba(0,0,0,0.1)").expect("rgba");
        assert_eq!(rgba.alpha, 0.1);

        assert_eq!(Color::from_css("none").expect("none").alpha, 0.0);
        assert!(Color::from_css("#zzz").is_err());
    }

    #[test]
    fn arc_centroid_points_up_at_twelve_o_clock() {
        let arc = ArcPrimitive {
            cx: 0.0,
            cy: 0.0,
            start_angle: -0.1,
            end_angle: 0.1,
            inner_radius: 0.0,
            outer_radius: 10.0,
            fill: Color::rgb(0.0, 0.0, 0.0),
            opacity: 1.0,
            stroke: None,
        };
        let (x, y) = arc.centroid();
        assert!(x.abs() < 1e-9);
        assert!(y < 0.0);
    }
}
