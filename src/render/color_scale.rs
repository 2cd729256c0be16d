use image::Rgba;

/// A color anchored at a relative position (0 = low end, 1 = high end) of a scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub position: f32,
    pub color: [u8; 3],
}

/// Piecewise linear color ramp used to paint frames.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    stops: Vec<ColorStop>,
}

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

impl ColorScale {
    /// Stops are sorted by position. `None` if `stops` is empty or a position
    /// is not finite.
    pub fn new(mut stops: Vec<ColorStop>) -> Option<Self> {
        if stops.is_empty() || stops.iter().any(|s| !s.position.is_finite()) {
            return None;
        }
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Some(Self { stops })
    }

    /// Builds a scale from `(position, "#rrggbb")` pairs.
    pub fn from_hex(stops: &[(f32, &str)]) -> Option<Self> {
        let stops = stops
            .iter()
            .map(|(position, hex)| {
                hex_to_rgb(hex).map(|(r, g, b)| ColorStop {
                    position: *position,
                    color: [r, g, b],
                })
            })
            .collect::<Option<Vec<_>>>()?;
        Self::new(stops)
    }

    /// Purple through blue, cyan, green, yellow to red.
    pub fn temperature() -> Self {
        Self::preset(&[
            (0.0, [25, 0, 76]),
            (0.2, [0, 0, 255]),
            (0.4, [0, 255, 255]),
            (0.55, [0, 255, 0]),
            (0.7, [255, 255, 0]),
            (0.85, [255, 165, 0]),
            (1.0, [200, 0, 0]),
        ])
    }

    /// White through light blue to dark blue and purple.
    pub fn precipitation() -> Self {
        Self::preset(&[
            (0.0, [255, 255, 255]),
            (0.25, [160, 210, 255]),
            (0.5, [30, 110, 230]),
            (0.75, [10, 40, 150]),
            (1.0, [120, 0, 140]),
        ])
    }

    pub fn grayscale() -> Self {
        Self::preset(&[(0.0, [0, 0, 0]), (1.0, [255, 255, 255])])
    }

    fn preset(stops: &[(f32, [u8; 3])]) -> Self {
        Self {
            stops: stops
                .iter()
                .map(|&(position, color)| ColorStop { position, color })
                .collect(),
        }
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color at relative position `t`, clamped to the first and last stops.
    pub fn color_at(&self, t: f32) -> [u8; 3] {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return [0, 0, 0],
        };
        if t.is_nan() || t <= first.position {
            return first.color;
        }
        if t >= last.position {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (low, high) = (pair[0], pair[1]);
            if t <= high.position {
                let span = high.position - low.position;
                let f = if span > 0.0 { (t - low.position) / span } else { 1.0 };
                return interpolate(low.color, high.color, f);
            }
        }
        last.color
    }

    /// Paints `value` within `[min, max]`. Non-finite values are transparent.
    pub fn map(&self, value: f32, min: f32, max: f32) -> Rgba<u8> {
        if !value.is_finite() {
            return TRANSPARENT;
        }
        let t = if max > min { (value - min) / (max - min) } else { 0.5 };
        let [r, g, b] = self.color_at(t);
        Rgba([r, g, b, 255])
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::temperature()
    }
}

fn interpolate(from: [u8; 3], to: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| (f32::from(a) * (1.0 - t) + f32::from(b) * t).round() as u8;
    [
        channel(from[0], to[0]),
        channel(from[1], to[1]),
        channel(from[2], to[2]),
    ]
}

/// Parses `#rrggbb` (leading `#` optional).
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}
