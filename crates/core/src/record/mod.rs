use std::{fs, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{Result, TreeRingError};

/// First year of the synthetic fallback series.
pub const SYNTHETIC_FIRST_YEAR: i32 = 1990;
/// Last year (inclusive) of the synthetic fallback series.
pub const SYNTHETIC_LAST_YEAR: i32 = 2023;

/// Measurements for a single annual growth ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingRecord {
    pub year: i32,
    /// Visual magnitude driver, always positive.
    pub thickness: f64,
    /// Wood density in `[0, 1]`.
    pub density: f64,
    /// Relative growth, `1.0` is a nominal year.
    pub growth_rate: f64,
    /// Relative weather quality, `1.0` is a nominal year.
    pub weather_factor: f64,
    /// Environmental stress in `[0, 1]`.
    pub stress_factor: f64,
}

impl RingRecord {
    /// Deterministic stand-in record for `year`, used by the synthetic series.
    pub fn synthetic(year: i32) -> Self {
        let y = f64::from(year);
        Self {
            year,
            thickness: 3.0 + 2.0 * (y * 0.1).sin(),
            density: 0.7 + 0.3 * (y * 0.15).cos(),
            growth_rate: 1.0 + 0.3 * (y * 0.2).sin(),
            weather_factor: 0.8 + 0.4 * (y * 0.25).cos(),
            stress_factor: 0.1 + 0.2 * (y * 0.3).sin().abs(),
        }
    }

    fn validate(&self, index: usize) -> Result<()> {
        let fields = [
            ("thickness", self.thickness),
            ("density", self.density),
            ("growth_rate", self.growth_rate),
            ("weather_factor", self.weather_factor),
            ("stress_factor", self.stress_factor),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(TreeRingError::invalid_record(
                index,
                format!("`{name}` must be finite"),
            ));
        }

        if self.thickness <= 0.0 {
            return Err(TreeRingError::invalid_record(index, "`thickness` must be positive"));
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(TreeRingError::invalid_record(index, "`density` must lie in [0, 1]"));
        }
        if self.growth_rate <= 0.0 {
            return Err(TreeRingError::invalid_record(index, "`growth_rate` must be positive"));
        }
        if self.weather_factor <= 0.0 {
            return Err(TreeRingError::invalid_record(
                index,
                "`weather_factor` must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.stress_factor) {
            return Err(TreeRingError::invalid_record(
                index,
                "`stress_factor` must lie in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// On-disk layouts accepted by the loader: a bare array or `{"years": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RingDocument {
    List(Vec<RingRecord>),
    Wrapped { years: Vec<RingRecord> },
}

/// Validated, chronologically ordered and immutable sequence of ring records.
///
/// Cloning is cheap; the records are shared. A reload produces a new series
/// rather than mutating an existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct RingSeries {
    records: Arc<[RingRecord]>,
}

impl RingSeries {
    /// Validates `records` and freezes them into a series.
    pub fn new(records: Vec<RingRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(TreeRingError::EmptyData);
        }

        for (index, record) in records.iter().enumerate() {
            record.validate(index)?;
        }

        if let Some(index) = records
            .windows(2)
            .position(|pair| pair[1].year <= pair[0].year)
        {
            return Err(TreeRingError::invalid_record(
                index + 1,
                format!(
                    "year {} does not follow {}",
                    records[index + 1].year,
                    records[index].year
                ),
            ));
        }

        Ok(Self {
            records: records.into(),
        })
    }

    /// The 34-year fallback series (1990 through 2023).
    pub fn synthetic() -> Self {
        let records = (SYNTHETIC_FIRST_YEAR..=SYNTHETIC_LAST_YEAR)
            .map(RingRecord::synthetic)
            .collect::<Vec<_>>();
        Self {
            records: records.into(),
        }
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records = match serde_json::from_str::<RingDocument>(json)? {
            RingDocument::List(records) => records,
            RingDocument::Wrapped { years } => years,
        };
        Self::new(records)
    }

    /// Reads and validates a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let series = Self::from_json_str(&text)?;
        tracing::info!(
            path = %path.as_ref().display(),
            rings = series.len(),
            first_year = series.first_year(),
            last_year = series.last_year(),
            "loaded ring data"
        );
        Ok(series)
    }

    /// Loads `path`, substituting the synthetic series when the file is
    /// missing or unusable. Never fails.
    pub fn load_or_synthetic(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::warn!("no ring data file configured, using synthetic data");
            return Self::synthetic();
        };

        match Self::load(path) {
            Ok(series) => series,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "ring data unusable, using synthetic data"
                );
                Self::synthetic()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RingRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[RingRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RingRecord> {
        self.records.iter()
    }

    pub fn first_year(&self) -> i32 {
        self.records[0].year
    }

    pub fn last_year(&self) -> i32 {
        self.records[self.records.len() - 1].year
    }
}

impl<'a> IntoIterator for &'a RingSeries {
    type Item = &'a RingRecord;
    type IntoIter = std::slice::Iter<'a, RingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
