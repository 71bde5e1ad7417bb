//! Global per-category extrema.

use super::{AstatsCategory, CategorySet, ParsedLevels, TimeLevelPoint};
use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;

/// Computes min/max per category over the full track and freezes the result
/// into a [`CategorySet`].
///
/// `min_value`/`max_value` cover every sample, including the `-inf` astats
/// reports for digital silence. Normalisation uses the extrema of the finite
/// samples instead, so silence sits below the range and clamps during mapping.
/// A category made only of infinite samples normalises against its
/// `min_value`/`max_value`.
pub fn compute_statistics(parsed: ParsedLevels) -> CoreResult<CategorySet> {
    let mut categories = BTreeMap::new();

    for (name, points) in parsed.series {
        let (min_value, max_value) =
            extrema(&points, |_| true).ok_or_else(|| CoreError::EmptyCategory(name.clone()))?;
        let normal_range = extrema(&points, |v| v.is_finite()).unwrap_or((min_value, max_value));
        log::debug!(
            "Category {}: {} samples, min {}, max {}, normalised over {:?}",
            name,
            points.len(),
            min_value,
            max_value,
            normal_range
        );
        categories.insert(
            name,
            AstatsCategory::with_normal_range(points, min_value, max_value, normal_range),
        );
    }

    Ok(CategorySet::from_categories(categories))
}

fn extrema(points: &[TimeLevelPoint], keep: fn(&f64) -> bool) -> Option<(f64, f64)> {
    points
        .iter()
        .map(|p| p.level_value)
        .filter(keep)
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{PEAK_LEVEL, parse_levels_str};

    #[test]
    fn test_statistics_of_example_log() {
        let log = "frame:0 pts:0 pts_time:0.0\n\
                   lavfi.astats.Overall.Peak_level=-10\n\
                   frame:1 pts:1 pts_time:0.1\n\
                   lavfi.astats.Overall.Peak_level=-5\n\
                   frame:2 pts:2 pts_time:0.2\n\
                   lavfi.astats.Overall.Peak_level=0\n";
        let set = compute_statistics(parse_levels_str(log).unwrap()).unwrap();
        let peak = set.get(PEAK_LEVEL).unwrap();

        assert_eq!(peak.min_value(), -10.0);
        assert_eq!(peak.max_value(), 0.0);
        let normals: Vec<f64> = peak.points().iter().map(|p| peak.normal(p.level_value)).collect();
        assert_eq!(normals, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_empty_category_is_rejected() {
        let mut parsed = ParsedLevels::default();
        parsed.series.insert("empty".to_string(), Vec::new());
        let err = compute_statistics(parsed).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCategory(name) if name == "empty"));
    }

    #[test]
    fn test_silence_counts_toward_extrema_but_not_normal_range() {
        let log = "frame:0 pts:0 pts_time:0\nx=-inf\nframe:1 pts:1 pts_time:1\nx=-20\n\
                   frame:2 pts:2 pts_time:2\nx=-4\n";
        let set = compute_statistics(parse_levels_str(log).unwrap()).unwrap();
        let x = set.get("x").unwrap();
        assert_eq!((x.min_value(), x.max_value()), (f64::NEG_INFINITY, -4.0));
        assert_eq!(x.normal_range(), (-20.0, -4.0));
        for p in x.points() {
            assert!(x.min_value() <= p.level_value && p.level_value <= x.max_value());
        }
        assert_eq!(x.normal(-12.0), 0.5);
        assert!(!x.is_degenerate());
    }

    #[test]
    fn test_only_infinite_samples_use_them_as_extrema() {
        let log = "frame:0 pts:0 pts_time:0\nx=-inf\nframe:1 pts:1 pts_time:1\nx=-inf\n";
        let set = compute_statistics(parse_levels_str(log).unwrap()).unwrap();
        let x = set.get("x").unwrap();
        assert_eq!(x.min_value(), f64::NEG_INFINITY);
        assert_eq!(x.normal_range(), (f64::NEG_INFINITY, f64::NEG_INFINITY));
        assert!(x.is_degenerate());
    }

    #[test]
    fn test_every_point_within_extrema() {
        let mut log = String::new();
        for i in 0..200 {
            let value = ((i * 37) % 101) as f64 * -0.5;
            log.push_str(&format!("frame:{i} pts:{i} pts_time:{}\n", i as f64 / 60.0));
            if i % 17 == 0 {
                log.push_str("a=-inf\n");
            } else {
                log.push_str(&format!("a={value}\n"));
            }
            log.push_str(&format!("b={}\n", value * 2.0 + 1.0));
        }
        let set = compute_statistics(parse_levels_str(&log).unwrap()).unwrap();
        for (_, category) in set.iter() {
            let times: Vec<f64> = category.points().iter().map(|p| p.time_point).collect();
            assert!(times.windows(2).all(|w| w[0] <= w[1]));
            for p in category.points() {
                assert!(category.min_value() <= p.level_value);
                assert!(p.level_value <= category.max_value());
            }
        }
    }
}
