//! Color schemes and multi-stop interpolation engine.

use std::fmt;
use std::str::FromStr;

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

/// Available color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorScheme {
    /// Red -> Yellow -> Green, the usual scale for vegetation indices
    #[default]
    RdYlGn,
    /// Brown -> Yellow -> Green
    Ndvi,
    /// Blue -> White -> Red (signed differences)
    BlueWhiteRed,
    /// White -> Cyan -> Blue (water and moisture indices)
    Water,
    /// Black -> White
    Grayscale,
}

impl ColorScheme {
    pub const ALL: &[ColorScheme] = &[
        Self::RdYlGn,
        Self::Ndvi,
        Self::BlueWhiteRed,
        Self::Water,
        Self::Grayscale,
    ];

    /// Human-readable name, also accepted by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RdYlGn => "rdylgn",
            Self::Ndvi => "ndvi",
            Self::BlueWhiteRed => "blue-white-red",
            Self::Water => "water",
            Self::Grayscale => "grayscale",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|scheme| scheme.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown color scheme '{}'", s))
    }
}

// ─── Color stop definitions ───────────────────────────────────────────

/// Eleven-class diverging red-yellow-green ramp.
const RDYLGN_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 165, 0, 38),
    ColorStop::new(0.1, 215, 48, 39),
    ColorStop::new(0.2, 244, 109, 67),
    ColorStop::new(0.3, 253, 174, 97),
    ColorStop::new(0.4, 254, 224, 139),
    ColorStop::new(0.5, 255, 255, 191),
    ColorStop::new(0.6, 217, 239, 139),
    ColorStop::new(0.7, 166, 217, 106),
    ColorStop::new(0.8, 102, 189, 99),
    ColorStop::new(0.9, 26, 152, 80),
    ColorStop::new(1.0, 0, 104, 55),
];

const NDVI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 120, 70, 20),
    ColorStop::new(0.3, 200, 170, 60),
    ColorStop::new(0.5, 240, 230, 100),
    ColorStop::new(0.7, 100, 180, 50),
    ColorStop::new(1.0, 10, 100, 20),
];

const BLUE_WHITE_RED_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 33, 102, 172),
    ColorStop::new(0.25, 103, 169, 207),
    ColorStop::new(0.50, 247, 247, 247),
    ColorStop::new(0.75, 239, 138, 98),
    ColorStop::new(1.00, 178, 24, 43),
];

const WATER_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 240, 249, 255),
    ColorStop::new(0.25, 186, 228, 250),
    ColorStop::new(0.50, 80, 180, 230),
    ColorStop::new(0.75, 30, 120, 200),
    ColorStop::new(1.00, 8, 48, 107),
];

// ─── Interpolation engine ──────────────────────────────────────────────

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    let first = stops[0].color;
    let last = stops[stops.len() - 1].color;
    if t <= 0.0 {
        return first;
    }
    if t >= 1.0 {
        return last;
    }
    stops
        .windows(2)
        .find(|pair| t <= pair[1].t)
        .map(|pair| {
            let ratio = (t - pair[0].t) / (pair[1].t - pair[0].t);
            lerp_color(pair[0].color, pair[1].color, ratio)
        })
        .unwrap_or(last)
}

/// Evaluate a color scheme at normalized position `t` ∈ [0, 1].
///
/// Positions outside the unit interval clamp to the end colors.
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    match scheme {
        ColorScheme::RdYlGn => multi_stop(RDYLGN_STOPS, t),
        ColorScheme::Ndvi => multi_stop(NDVI_STOPS, t),
        ColorScheme::BlueWhiteRed => multi_stop(BLUE_WHITE_RED_STOPS, t),
        ColorScheme::Water => multi_stop(WATER_STOPS, t),
        ColorScheme::Grayscale => {
            let v = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgb::new(v, v, v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rdylgn_endpoints_and_center() {
        assert_eq!(evaluate(ColorScheme::RdYlGn, 0.0), Rgb::new(165, 0, 38));
        assert_eq!(evaluate(ColorScheme::RdYlGn, 0.5), Rgb::new(255, 255, 191));
        assert_eq!(evaluate(ColorScheme::RdYlGn, 1.0), Rgb::new(0, 104, 55));
    }

    #[test]
    fn rdylgn_interpolates_between_stops() {
        // halfway between (255,255,191) and (217,239,139)
        assert_eq!(evaluate(ColorScheme::RdYlGn, 0.55), Rgb::new(236, 247, 165));
    }

    #[test]
    fn grayscale_midpoint() {
        let c = evaluate(ColorScheme::Grayscale, 0.5);
        assert_eq!(c, Rgb::new(128, 128, 128));
    }

    #[test]
    fn clamping() {
        assert_eq!(evaluate(ColorScheme::Water, -0.5), Rgb::new(240, 249, 255));
        assert_eq!(evaluate(ColorScheme::Water, 1.5), Rgb::new(8, 48, 107));
    }

    #[test]
    fn names_round_trip() {
        for &scheme in ColorScheme::ALL {
            assert_eq!(scheme.name().parse::<ColorScheme>(), Ok(scheme));
        }
        assert_eq!("RdYlGn".parse::<ColorScheme>(), Ok(ColorScheme::RdYlGn));
        assert!("viridis".parse::<ColorScheme>().is_err());
    }
}
