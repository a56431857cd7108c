use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{timeline::sanitize_seconds, Result, TreeRingError};

/// Tempo used by the simulated soundtrack.
pub const DEFAULT_BPM: u32 = 120;
/// Beats per measure in the simulated 4/4 meter.
pub const BEATS_PER_MEASURE: u64 = 4;
/// Length of one intro/verse/chorus/outro cycle.
pub const SECTION_CYCLE_SECONDS: f64 = 32.0;
/// Length of a single section within the cycle.
pub const SECTION_SECONDS: f64 = 8.0;

const STRONG_BEAT_STRENGTH: f64 = 1.0;
const WEAK_BEAT_STRENGTH: f64 = 0.6;
const INTENSITY_BASE: f64 = 0.7;
const INTENSITY_SWING: f64 = 0.3;
const INTENSITY_RATE: f64 = 0.1;

/// Song section, each tagged with a mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Intro,
    Verse,
    Chorus,
    Outro,
}

impl Section {
    /// Section active at `seconds` into the song. Boundaries are half-open.
    pub fn at(seconds: f64) -> Self {
        let section_time = seconds.rem_euclid(SECTION_CYCLE_SECONDS);
        match (section_time / SECTION_SECONDS) as u32 {
            0 => Self::Intro,
            1 => Self::Verse,
            2 => Self::Chorus,
            _ => Self::Outro,
        }
    }

    pub fn mood(self) -> &'static str {
        match self {
            Self::Intro => "gentle",
            Self::Verse => "building",
            Self::Chorus => "energetic",
            Self::Outro => "calm",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Verse => "verse",
            Self::Chorus => "chorus",
            Self::Outro => "outro",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Musical state at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RhythmState {
    pub beat_strength: f64,
    pub emotional_intensity: f64,
    pub section: Section,
    pub mood: &'static str,
    /// Position within the current beat, in `[0, 1)`.
    pub beat_phase: f64,
    pub is_strong_beat: bool,
    pub beat_index: u64,
    pub bpm: u32,
    pub time_elapsed: f64,
}

/// Stateless sampler for the simulated soundtrack rhythm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RhythmEngine {
    bpm: u32,
    beat_interval: f64,
}

impl RhythmEngine {
    /// Creates an engine for `bpm` beats per minute. Zero is rejected.
    pub fn new(bpm: u32) -> Result<Self> {
        if bpm == 0 {
            return Err(TreeRingError::invalid_config("bpm must be positive"));
        }
        Ok(Self {
            bpm,
            beat_interval: 60.0 / f64::from(bpm),
        })
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Seconds between two beats.
    pub fn beat_interval(&self) -> f64 {
        self.beat_interval
    }

    /// Samples the rhythm `elapsed_seconds` into the song. Negative or
    /// non-finite times are treated as the start of the song.
    pub fn sample(&self, elapsed_seconds: f64) -> RhythmState {
        let t = sanitize_seconds(elapsed_seconds);

        let beat_index = (t / self.beat_interval).floor() as u64;
        let beat_phase =
            ((t % self.beat_interval) / self.beat_interval).clamp(0.0, 1.0 - f64::EPSILON);
        let is_strong_beat = beat_index % BEATS_PER_MEASURE == 0;
        let section = Section::at(t);

        RhythmState {
            beat_strength: if is_strong_beat {
                STRONG_BEAT_STRENGTH
            } else {
                WEAK_BEAT_STRENGTH
            },
            emotional_intensity: INTENSITY_BASE + INTENSITY_SWING * (t * INTENSITY_RATE).sin(),
            section,
            mood: section.mood(),
            beat_phase,
            is_strong_beat,
            beat_index,
            bpm: self.bpm,
            time_elapsed: t,
        }
    }
}

impl Default for RhythmEngine {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            beat_interval: 60.0 / f64::from(DEFAULT_BPM),
        }
    }
}
