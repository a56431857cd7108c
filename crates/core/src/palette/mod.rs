use serde::{Deserialize, Serialize};

use crate::{RingRecord, RingSeries};

/// Stress above which a year is painted with a dry, brown tone.
const STRESS_THRESHOLD: f64 = 0.3;
/// Weather above which a low-stress year is painted green.
const GOOD_WEATHER_THRESHOLD: f64 = 1.2;
/// Growth above which a good-weather year gets the brighter green.
const VIGOROUS_GROWTH_THRESHOLD: f64 = 1.2;

/// Seasonal tones as `(hue degrees, saturation, value)`.
const SEASONAL_TONES: [Tone; 8] = [
    Tone::new(45.0, 0.40, 0.45),  // dry brown
    Tone::new(35.0, 0.35, 0.50),  // light brown
    Tone::new(25.0, 0.30, 0.55),  // orange brown
    Tone::new(60.0, 0.25, 0.45),  // yellow brown
    Tone::new(90.0, 0.30, 0.40),  // olive green
    Tone::new(120.0, 0.25, 0.35), // forest green
    Tone::new(30.0, 0.35, 0.50),  // ochre
    Tone::new(40.0, 0.30, 0.45),  // amber
];

/// Index of the first "normal" tone; normal years cycle through four tones.
const NORMAL_TONE_OFFSET: usize = 2;
const NORMAL_TONE_CYCLE: usize = 4;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` representation.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tone {
    hue: f64,
    saturation: f64,
    value: f64,
}

impl Tone {
    const fn new(hue: f64, saturation: f64, value: f64) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    fn with_hue_offset(self, degrees: f64) -> Self {
        Self {
            hue: (self.hue + degrees).rem_euclid(360.0),
            ..self
        }
    }

    fn to_rgb(self) -> Color {
        let h = self.hue / 60.0;
        let c = self.value * self.saturation;
        let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
        let m = self.value - c;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Color::new(channel(r + m), channel(g + m), channel(b + m))
    }
}

fn channel(unit: f64) -> u8 {
    // Truncates toward zero.
    (unit * 255.0).clamp(0.0, 255.0) as u8
}

/// Index-aligned colour table for a ring series.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, ring: usize) -> Option<Color> {
        self.colors.get(ring).copied()
    }

    /// Colour lookup that wraps past the end of the table.
    pub fn color_for(&self, ring: usize) -> Color {
        if self.colors.is_empty() {
            return Color::default();
        }
        self.colors[ring % self.colors.len()]
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        self.colors.iter().copied()
    }
}

/// Derives ring colours from growth conditions.
///
/// Generation is a pure function of the records and their positions: there is
/// no random source, so the same series always yields the same palette.
#[derive(Debug, Default, Clone, Copy)]
pub struct PaletteGenerator;

impl PaletteGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, series: &RingSeries) -> Palette {
        Palette {
            colors: series
                .iter()
                .enumerate()
                .map(|(index, record)| ring_color(index, record))
                .collect(),
        }
    }
}

/// Colour for the ring at `index`.
pub fn ring_color(index: usize, record: &RingRecord) -> Color {
    let tone = SEASONAL_TONES[tone_index(index, record) % SEASONAL_TONES.len()];
    tone.with_hue_offset(hue_variation(index)).to_rgb()
}

fn tone_index(index: usize, record: &RingRecord) -> usize {
    if record.stress_factor > STRESS_THRESHOLD {
        if record.growth_rate < 1.0 {
            0
        } else {
            1
        }
    } else if record.weather_factor > GOOD_WEATHER_THRESHOLD {
        if record.growth_rate > VIGOROUS_GROWTH_THRESHOLD {
            4
        } else {
            5
        }
    } else {
        index % NORMAL_TONE_CYCLE + NORMAL_TONE_OFFSET
    }
}

/// Hue shift in `[-7, 7]` degrees so neighbouring rings in the same bucket
/// still differ.
fn hue_variation(index: usize) -> f64 {
    let step = (index as u64).wrapping_mul(11) % 15;
    step as f64 - 7.0
}
