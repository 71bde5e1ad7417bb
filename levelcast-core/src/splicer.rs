// ============================================================================
// levelcast-core/src/splicer.rs
// ============================================================================
//
// CHUNK SPLICER: Fixed-length, time-rebased windows over the level series
//
// The full track is rendered in chunks of `chunk_length` seconds. Each chunk
// holds a copy of every category's points for its time range, rebased so the
// chunk starts at local time zero, and shares the global extrema of the full
// set. Consecutive chunks overlap at each seam: the first sample at or past a
// boundary closes one chunk, and the next chunk opens on the last sample at or
// before the boundary, so every chunk has a value at its local time zero.
//
// AI-ASSISTANT-INFO: Splits a CategorySet into overlapping render chunks

use crate::error::{CoreError, CoreResult};
use crate::levels::{CategorySet, TimeLevelPoint};

/// A bounded, time-rebased window of every category.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Position of the chunk in render order.
    pub index: usize,
    /// Absolute start time of the chunk in seconds.
    pub time_offset: f64,
    /// Nominal chunk length in seconds.
    pub chunk_length: f64,
    /// First index (inclusive) copied from the full series.
    pub from_i: usize,
    /// Last index (inclusive) copied from the full series.
    pub to_i: usize,
    /// Windowed categories; times are relative to `time_offset`.
    pub categories: CategorySet,
}

impl Chunk {
    /// End of the nominal time range `[time_offset, time_offset + chunk_length)`.
    pub fn time_end(&self) -> f64 {
        self.time_offset + self.chunk_length
    }

    /// Number of points in each category of this chunk.
    pub fn point_count(&self) -> usize {
        self.categories
            .iter()
            .next()
            .map(|(_, category)| category.len())
            .unwrap_or(0)
    }

    /// Points of `category` with their absolute (un-rebased) times.
    pub fn absolute_points(&self, category: &str) -> Option<Vec<TimeLevelPoint>> {
        self.categories.get(category).map(|c| {
            c.points()
                .iter()
                .map(|p| TimeLevelPoint::new(p.time_point + self.time_offset, p.level_value))
                .collect()
        })
    }
}

/// Accumulates chunk boundaries while walking the reference series.
struct ChunkBuilder<'a> {
    source: &'a CategorySet,
    chunk_length: f64,
    chunks: Vec<Chunk>,
}

impl<'a> ChunkBuilder<'a> {
    fn new(source: &'a CategorySet, chunk_length: f64) -> Self {
        Self {
            source,
            chunk_length,
            chunks: Vec::new(),
        }
    }

    fn close(&mut self, from_i: usize, to_i: usize, time_offset: f64) {
        log::debug!(
            "Chunk {} spans {:.3}s to {:.3}s (points {}..={})",
            self.chunks.len(),
            time_offset,
            time_offset + self.chunk_length,
            from_i,
            to_i
        );
        self.chunks.push(Chunk {
            index: self.chunks.len(),
            time_offset,
            chunk_length: self.chunk_length,
            from_i,
            to_i,
            categories: self.source.window(from_i, to_i, time_offset),
        });
    }

    fn finish(self) -> Vec<Chunk> {
        self.chunks
    }
}

/// Verifies that every category shares the reference category's timestamps.
pub fn validate_alignment(set: &CategorySet, reference: &str) -> CoreResult<()> {
    let reference_points = set
        .get(reference)
        .ok_or_else(|| CoreError::MissingCategory(reference.to_string()))?
        .points();

    for (name, category) in set.iter() {
        if name == reference {
            continue;
        }
        let unaligned = |detail: String| CoreError::UnalignedCategories {
            reference: reference.to_string(),
            category: name.to_string(),
            detail,
        };
        if category.len() != reference_points.len() {
            return Err(unaligned(format!(
                "{} points vs {} in the reference",
                category.len(),
                reference_points.len()
            )));
        }
        if let Some((i, (a, b))) = category
            .points()
            .iter()
            .zip(reference_points)
            .enumerate()
            .find(|(_, (a, b))| a.time_point != b.time_point)
        {
            return Err(unaligned(format!(
                "point {} is at {}s, reference is at {}s",
                i, a.time_point, b.time_point
            )));
        }
    }

    Ok(())
}

/// Splits `set` into chunks of `chunk_length` seconds, timed by `reference`.
///
/// For each point `i` of the reference, once `time(i) - offset >= chunk_length`
/// the range `[last, i]` becomes a chunk rebased by `offset` and `offset`
/// advances by `chunk_length`. The next chunk opens at `i` when that point
/// sits exactly on the boundary and at `i - 1` otherwise, so its first point
/// is at or before its local time zero. Whatever remains
/// after the walk forms the final chunk, so a track shorter than one chunk
/// yields exactly one.
pub fn splice_chunks(set: &CategorySet, reference: &str, chunk_length: f64) -> CoreResult<Vec<Chunk>> {
    if !(chunk_length.is_finite() && chunk_length > 0.0) {
        return Err(CoreError::Config(format!(
            "chunk length must be a positive number of seconds, got {chunk_length}"
        )));
    }
    validate_alignment(set, reference)?;

    let points = set
        .get(reference)
        .ok_or_else(|| CoreError::MissingCategory(reference.to_string()))?
        .points();
    if points.is_empty() {
        return Err(CoreError::EmptyCategory(reference.to_string()));
    }

    let mut builder = ChunkBuilder::new(set, chunk_length);
    let mut current_time_offset = 0.0;
    let mut last_offset_index = 0;

    for (i, point) in points.iter().enumerate() {
        if point.time_point - current_time_offset >= chunk_length {
            let on_boundary = point.time_point - current_time_offset == chunk_length;
            builder.close(last_offset_index, i, current_time_offset);
            last_offset_index = if on_boundary { i } else { i.saturating_sub(1) };
            current_time_offset += chunk_length;
        }
    }
    builder.close(last_offset_index, points.len() - 1, current_time_offset);

    let chunks = builder.finish();
    log::info!(
        "Spliced {} points into {} chunks of {}s",
        points.len(),
        chunks.len(),
        chunk_length
    );
    Ok(chunks)
}
