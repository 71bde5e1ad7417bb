//! Per-frame audio level series and their global statistics.
//!
//! The measurement engine prints one block of `category=value` lines per
//! analysis window, each block introduced by a frame marker carrying the
//! window's `pts_time`. This module turns that log into ordered time series
//! ([`parser`]) and then into a read-only [`CategorySet`] whose per-category
//! extrema are computed exactly once over the whole track ([`stats`]).
//!
//! The two-step type flow (`ParsedLevels` -> `CategorySet`) is what keeps the
//! extrema global: only a `CategorySet` can be spliced into chunks, and chunk
//! sets copy the extrema of the full set instead of recomputing them.

pub mod parser;
pub mod stats;

use serde::Serialize;
use std::collections::BTreeMap;

pub use parser::{parse_levels, parse_levels_file, parse_levels_str};
pub use stats::compute_statistics;

/// astats overall minimum sample level (dB).
pub const MIN_LEVEL: &str = "lavfi.astats.Overall.Min_level";
/// astats overall maximum sample level (dB).
pub const MAX_LEVEL: &str = "lavfi.astats.Overall.Max_level";
/// astats overall peak level (dBFS).
pub const PEAK_LEVEL: &str = "lavfi.astats.Overall.Peak_level";
/// astats overall RMS level (dBFS).
pub const RMS_LEVEL: &str = "lavfi.astats.Overall.RMS_level";

/// One measurement sample at an absolute (or chunk-relative) time in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeLevelPoint {
    pub time_point: f64,
    pub level_value: f64,
}

impl TimeLevelPoint {
    pub fn new(time_point: f64, level_value: f64) -> Self {
        Self {
            time_point,
            level_value,
        }
    }
}

/// Time series of a single category straight out of the parser, before any
/// statistics have been computed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLevels {
    pub(crate) series: BTreeMap<String, Vec<TimeLevelPoint>>,
}

impl ParsedLevels {
    /// Category names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Points of a category, sorted ascending by time.
    pub fn points(&self, name: &str) -> Option<&[TimeLevelPoint]> {
        self.series.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// A category's ordered points plus the extrema of the full, unspliced series.
#[derive(Debug, Clone, PartialEq)]
pub struct AstatsCategory {
    points: Vec<TimeLevelPoint>,
    min_value: f64,
    max_value: f64,
    normal_range: (f64, f64),
}

impl AstatsCategory {
    pub(crate) fn with_normal_range(
        points: Vec<TimeLevelPoint>,
        min_value: f64,
        max_value: f64,
        normal_range: (f64, f64),
    ) -> Self {
        Self {
            points,
            min_value,
            max_value,
            normal_range,
        }
    }

    pub fn points(&self) -> &[TimeLevelPoint] {
        &self.points
    }

    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lower and upper bound used for normalisation: the finite extrema when
    /// the category has finite samples, otherwise `min_value`/`max_value`.
    pub fn normal_range(&self) -> (f64, f64) {
        self.normal_range
    }

    /// Normalises `value` against this category's global normalisation range.
    pub fn normal(&self, value: f64) -> f64 {
        let (low, high) = self.normal_range;
        normal(value, low, high)
    }

    /// True when normalisation against this category is undefined.
    pub fn is_degenerate(&self) -> bool {
        let (low, high) = self.normal_range;
        let range = high - low;
        range == 0.0 || !range.is_finite()
    }

    /// Copies points `from_i..=to_i` (clamped to the series) with their times
    /// shifted back by `time_offset`. Extrema and the normalisation range are
    /// carried over unchanged.
    pub(crate) fn window(&self, from_i: usize, to_i: usize, time_offset: f64) -> Self {
        let points = self
            .points
            .iter()
            .enumerate()
            .filter(|(i, _)| *i >= from_i && *i <= to_i)
            .map(|(_, p)| TimeLevelPoint::new(p.time_point - time_offset, p.level_value))
            .collect();
        Self::with_normal_range(points, self.min_value, self.max_value, self.normal_range)
    }
}

/// `(value - min) / (max - min)`, unclamped.
pub fn normal(value: f64, min_value: f64, max_value: f64) -> f64 {
    (value - min_value) / (max_value - min_value)
}

/// Per-category row used for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub samples: usize,
    pub min_value: f64,
    pub max_value: f64,
    /// Finite range the mapper normalises against.
    pub normal_min: f64,
    pub normal_max: f64,
}

/// Named categories with their global statistics. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySet {
    categories: BTreeMap<String, AstatsCategory>,
}

impl CategorySet {
    pub(crate) fn from_categories(categories: BTreeMap<String, AstatsCategory>) -> Self {
        Self { categories }
    }

    pub fn get(&self, name: &str) -> Option<&AstatsCategory> {
        self.categories.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AstatsCategory)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn summary(&self) -> Vec<CategorySummary> {
        self.categories
            .iter()
            .map(|(name, category)| CategorySummary {
                name: name.clone(),
                samples: category.len(),
                min_value: category.min_value(),
                max_value: category.max_value(),
                normal_min: category.normal_range().0,
                normal_max: category.normal_range().1,
            })
            .collect()
    }

    /// Windowed, time-rebased copy of every category.
    pub(crate) fn window(&self, from_i: usize, to_i: usize, time_offset: f64) -> Self {
        let categories = self
            .categories
            .iter()
            .map(|(name, category)| (name.clone(), category.window(from_i, to_i, time_offset)))
            .collect();
        Self { categories }
    }
}
