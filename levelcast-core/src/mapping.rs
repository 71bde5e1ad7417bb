//! Normalised level to renderer parameter mapping.
//!
//! Two response curves drive the animation:
//!
//! - the zoom curve, a deterministic linear map from the normalised peak level
//!   to a ball scale factor in `[0.5, 1.0]`;
//! - the jitter curve, which draws a fresh uniform sample per call and weights
//!   it by the square of the normalised level, so quiet frames stay near the
//!   curve's centre and loud frames spread across the full scale.
//!
//! Randomness is always injected. A run either derives one seeded stream per
//! chunk (reproducible output) or draws every stream from entropy.

use crate::error::{CoreError, CoreResult};
use crate::levels::{AstatsCategory, TimeLevelPoint};
use crate::splicer::Chunk;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Default spread of the jitter curve around its centre.
pub const DEFAULT_JITTER_SCALE: f64 = 0.2;

/// Clamps to `[0, 1]`; NaN (an undefined normalisation) clamps to 0.
pub fn clamp_unit(normal: f64) -> f64 {
    if normal.is_nan() {
        0.0
    } else {
        normal.clamp(0.0, 1.0)
    }
}

/// Ball scale factor for a normalised level.
pub fn zoom(normal: f64) -> f64 {
    0.5 + clamp_unit(normal) * 0.5
}

/// Converging-random displacement curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterCurve {
    scale: f64,
}

impl Default for JitterCurve {
    fn default() -> Self {
        Self::new(DEFAULT_JITTER_SCALE)
    }
}

impl JitterCurve {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// `0.5 + U(-0.5, 0.5) * clamp(normal)^2 * scale`, one fresh draw per call.
    pub fn sample<R: Rng + ?Sized>(&self, normal: f64, rng: &mut R) -> f64 {
        let weight = clamp_unit(normal).powi(2);
        let random_value: f64 = rng.gen_range(-0.5..=0.5);
        0.5 + random_value * weight * self.scale
    }
}

/// Random stream for one chunk: seeded from `seed + chunk_index` when a seed
/// is configured, otherwise from entropy.
pub fn chunk_rng(seed: Option<u64>, chunk_index: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(chunk_index as u64)),
        None => StdRng::from_entropy(),
    }
}

/// Renderer parameters for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameParameters {
    /// Chunk-relative time in seconds.
    pub time: f64,
    /// Ball scale applied to both width and height.
    pub zoom: f64,
    /// Horizontal displacement map r/g/b levels.
    pub displace_x: [f64; 3],
    /// Vertical displacement map r/g/b levels.
    pub displace_y: [f64; 3],
}

/// Category names the mapper reads its inputs from.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelBindings {
    /// Drives the zoom curve.
    pub zoom_category: String,
    /// Drives all six jitter channels.
    pub jitter_category: String,
}

impl Default for ChannelBindings {
    fn default() -> Self {
        Self {
            zoom_category: crate::levels::PEAK_LEVEL.to_string(),
            jitter_category: crate::levels::MAX_LEVEL.to_string(),
        }
    }
}

/// Maps one chunk's points to per-frame parameters.
#[derive(Debug)]
pub struct ParameterMapper<'a> {
    zoom_source: &'a AstatsCategory,
    jitter_source: &'a AstatsCategory,
    jitter: JitterCurve,
}

impl<'a> ParameterMapper<'a> {
    /// Binds the mapper to a chunk, rejecting missing or degenerate categories.
    pub fn new(chunk: &'a Chunk, bindings: &ChannelBindings, jitter: JitterCurve) -> CoreResult<Self> {
        let lookup = |name: &str| -> CoreResult<&'a AstatsCategory> {
            let category = chunk
                .categories
                .get(name)
                .ok_or_else(|| CoreError::MissingCategory(name.to_string()))?;
            if category.is_degenerate() {
                return Err(CoreError::DegenerateRange {
                    category: name.to_string(),
                    value: category.normal_range().0,
                });
            }
            Ok(category)
        };

        let zoom_source = lookup(&bindings.zoom_category)?;
        let jitter_source = lookup(&bindings.jitter_category)?;
        if zoom_source.len() != jitter_source.len() {
            return Err(CoreError::UnalignedCategories {
                reference: bindings.zoom_category.clone(),
                category: bindings.jitter_category.clone(),
                detail: format!(
                    "{} points vs {} in chunk {}",
                    jitter_source.len(),
                    zoom_source.len(),
                    chunk.index
                ),
            });
        }

        Ok(Self {
            zoom_source,
            jitter_source,
            jitter,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.zoom_source.len()
    }

    /// Parameters for frame `index`, or `None` past the end of the chunk.
    pub fn map_frame<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> Option<FrameParameters> {
        let zoom_point: &TimeLevelPoint = self.zoom_source.points().get(index)?;
        let jitter_point = self.jitter_source.points().get(index)?;

        let zoom_normal = self.zoom_source.normal(zoom_point.level_value);
        let jitter_normal = self.jitter_source.normal(jitter_point.level_value);

        // Six independent draws: x r/g/b then y r/g/b.
        let mut channels = [0.0; 6];
        for channel in channels.iter_mut() {
            *channel = self.jitter.sample(jitter_normal, rng);
        }

        Some(FrameParameters {
            // A seam point just before the chunk start applies from its first frame.
            time: jitter_point.time_point.max(0.0),
            zoom: zoom(zoom_normal),
            displace_x: [channels[0], channels[1], channels[2]],
            displace_y: [channels[3], channels[4], channels[5]],
        })
    }

    /// Parameters for every frame of the chunk, in time order.
    pub fn map_all<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<FrameParameters> {
        (0..self.frame_count())
            .filter_map(|i| self.map_frame(i, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{MAX_LEVEL, PEAK_LEVEL, compute_statistics, parse_levels_str};
    use crate::splicer::splice_chunks;

    fn variance(samples: &[f64]) -> f64 {
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / samples.len() as f64
    }

    fn example_chunk() -> Chunk {
        let log = "frame:0 pts:0 pts_time:0.0\n\
                   lavfi.astats.Overall.Peak_level=-10\nlavfi.astats.Overall.Max_level=0.1\n\
                   frame:1 pts:1 pts_time:0.1\n\
                   lavfi.astats.Overall.Peak_level=-5\nlavfi.astats.Overall.Max_level=0.5\n\
                   frame:2 pts:2 pts_time:0.2\n\
                   lavfi.astats.Overall.Peak_level=0\nlavfi.astats.Overall.Max_level=0.9\n";
        let set = compute_statistics(parse_levels_str(log).unwrap()).unwrap();
        splice_chunks(&set, PEAK_LEVEL, 30.0).unwrap().remove(0)
    }

    #[test]
    fn test_zoom_curve_bounds_and_monotonicity() {
        let mut previous = zoom(0.0);
        assert_eq!(previous, 0.5);
        for step in 1..=1000 {
            let value = zoom(step as f64 / 1000.0);
            assert!(value >= previous);
            assert!((0.5..=1.0).contains(&value));
            previous = value;
        }
        assert_eq!(zoom(1.0), 1.0);
        assert_eq!(zoom(-3.0), 0.5);
        assert_eq!(zoom(7.0), 1.0);
        assert_eq!(zoom(f64::NAN), 0.5);
    }

    #[test]
    fn test_example_zoom_values() {
        let chunk = example_chunk();
        let mapper = ParameterMapper::new(&chunk, &ChannelBindings::default(), JitterCurve::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let zooms: Vec<f64> = mapper.map_all(&mut rng).iter().map(|f| f.zoom).collect();
        assert_eq!(zooms, vec![0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_jitter_concentrates_at_zero_and_spreads_at_one() {
        let curve = JitterCurve::default();
        let mut rng = StdRng::seed_from_u64(42);

        let quiet: Vec<f64> = (0..5000).map(|_| curve.sample(0.0, &mut rng)).collect();
        let loud: Vec<f64> = (0..5000).map(|_| curve.sample(1.0, &mut rng)).collect();

        assert!(quiet.iter().all(|&v| v == 0.5));
        // Uniform over a width of `scale` has variance scale^2 / 12.
        let expected = curve.scale().powi(2) / 12.0;
        let observed = variance(&loud);
        assert!((observed - expected).abs() < expected * 0.1, "{observed} vs {expected}");
        assert!(loud.iter().all(|&v| (v - 0.5).abs() <= curve.scale() / 2.0));
        assert!(loud.iter().any(|&v| v > 0.5 + curve.scale() * 0.45));
        assert!(loud.iter().any(|&v| v < 0.5 - curve.scale() * 0.45));
    }

    #[test]
    fn test_six_channels_are_independent_draws() {
        let chunk = example_chunk();
        let mapper = ParameterMapper::new(&chunk, &ChannelBindings::default(), JitterCurve::new(1.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let frame = mapper.map_frame(2, &mut rng).unwrap();

        let mut channels: Vec<f64> = frame.displace_x.iter().chain(&frame.displace_y).copied().collect();
        channels.sort_by(f64::total_cmp);
        channels.dedup();
        assert_eq!(channels.len(), 6);
    }

    #[test]
    fn test_seeded_chunk_streams_are_reproducible() {
        let chunk = example_chunk();
        let mapper = ParameterMapper::new(&chunk, &ChannelBindings::default(), JitterCurve::default()).unwrap();

        let first = mapper.map_all(&mut chunk_rng(Some(99), chunk.index));
        let second = mapper.map_all(&mut chunk_rng(Some(99), chunk.index));
        let other = mapper.map_all(&mut chunk_rng(Some(99), chunk.index + 1));
        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn test_seam_point_before_chunk_start_maps_to_time_zero() {
        let mut log = String::new();
        for i in 0..5 {
            log.push_str(&format!(
                "frame:{i} pts:{i} pts_time:{}\nlavfi.astats.Overall.Peak_level={}\n\
                 lavfi.astats.Overall.Max_level={}\n",
                i as f64 * 0.7,
                -(i as f64),
                i as f64 * 0.1
            ));
        }
        let set = compute_statistics(parse_levels_str(&log).unwrap()).unwrap();
        let chunks = splice_chunks(&set, PEAK_LEVEL, 1.0).unwrap();
        let chunk = &chunks[1];
        assert!(chunk.categories.get(PEAK_LEVEL).unwrap().points()[0].time_point < 0.0);

        let mapper = ParameterMapper::new(chunk, &ChannelBindings::default(), JitterCurve::default()).unwrap();
        let times: Vec<f64> = mapper.map_all(&mut chunk_rng(Some(5), 1)).iter().map(|f| f.time).collect();
        assert_eq!(times[0], 0.0);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_degenerate_and_missing_categories() {
        let log = "frame:0 pts:0 pts_time:0\nlavfi.astats.Overall.Peak_level=-3\n\
                   lavfi.astats.Overall.Max_level=0.2\n\
                   frame:1 pts:1 pts_time:1\nlavfi.astats.Overall.Peak_level=-3\n\
                   lavfi.astats.Overall.Max_level=0.4\n";
        let set = compute_statistics(parse_levels_str(log).unwrap()).unwrap();
        let chunk = splice_chunks(&set, MAX_LEVEL, 30.0).unwrap().remove(0);

        let err = ParameterMapper::new(&chunk, &ChannelBindings::default(), JitterCurve::default()).unwrap_err();
        assert!(matches!(err, CoreError::DegenerateRange { value, .. } if value == -3.0));

        let bindings = ChannelBindings {
            zoom_category: MAX_LEVEL.to_string(),
            jitter_category: "missing".to_string(),
        };
        let err = ParameterMapper::new(&chunk, &bindings, JitterCurve::default()).unwrap_err();
        assert!(matches!(err, CoreError::MissingCategory(name) if name == "missing"));
    }
}
