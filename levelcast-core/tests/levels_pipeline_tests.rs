// levelcast-core/tests/levels_pipeline_tests.rs
//
// Runs the pure stages (parse, statistics, splice, map, emit) over a
// synthetic levels log shaped like real astats output and checks the
// properties that hold across stage boundaries.

use levelcast_core::emitter::{ChannelGroup, render_stream};
use levelcast_core::levels::{MAX_LEVEL, PEAK_LEVEL, RMS_LEVEL, compute_statistics, parse_levels_str};
use levelcast_core::mapping::{ChannelBindings, JitterCurve, ParameterMapper, chunk_rng};
use levelcast_core::splicer::splice_chunks;
use levelcast_core::CategorySet;

const FPS: f64 = 60.0;

/// `seconds` of one-frame windows with a slow swell and a silent first frame.
fn synthetic_log(seconds: f64) -> String {
    let mut log = String::new();
    let count = (seconds * FPS).round() as usize;
    for i in 0..count {
        let t = i as f64 / FPS;
        let swell = (t / seconds * std::f64::consts::PI).sin();
        log.push_str(&format!("frame:{i}    pts:{}    pts_time:{t}\n", i * 800));
        log.push_str(&format!("lavfi.astats.Overall.Max_level={}\n", swell * 0.9));
        if i == 0 {
            log.push_str("lavfi.astats.Overall.Peak_level=-inf\n");
            log.push_str("lavfi.astats.Overall.RMS_level=-inf\n");
        } else {
            log.push_str(&format!("lavfi.astats.Overall.Peak_level={}\n", -40.0 + 38.0 * swell));
            log.push_str(&format!("lavfi.astats.Overall.RMS_level={}\n", -50.0 + 30.0 * swell));
        }
    }
    log
}

fn category_set(seconds: f64) -> CategorySet {
    compute_statistics(parse_levels_str(&synthetic_log(seconds)).unwrap()).unwrap()
}

#[test]
fn test_silent_frames_widen_extrema_but_not_normal_range() {
    let set = category_set(10.0);
    let peak = set.get(PEAK_LEVEL).unwrap();
    assert_eq!(peak.min_value(), f64::NEG_INFINITY);
    let (low, high) = peak.normal_range();
    assert!(low.is_finite());
    assert!(low > -41.0);
    assert!(high <= -2.0 + 1e-9);
    assert_eq!(high, peak.max_value());
    assert_eq!(peak.len(), 600);
    assert_eq!(set.len(), 3);
}

#[test]
fn test_chunks_cover_track_and_share_seam_points() {
    let set = category_set(95.0);
    let chunks = splice_chunks(&set, PEAK_LEVEL, 30.0).unwrap();

    assert_eq!(chunks.len(), 4);
    for (index, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index, index);
        assert_eq!(chunk.time_offset, 30.0 * index as f64);
    }

    for pair in chunks.windows(2) {
        assert_eq!(pair[0].to_i, pair[1].from_i);
        for name in [MAX_LEVEL, PEAK_LEVEL, RMS_LEVEL] {
            let prev = pair[0].absolute_points(name).unwrap();
            let next = pair[1].absolute_points(name).unwrap();
            assert_eq!(prev.last(), next.first());
        }
    }

    // Chunks keep the whole track's normalisation.
    let whole = set.get(RMS_LEVEL).unwrap();
    for chunk in &chunks {
        let windowed = chunk.categories.get(RMS_LEVEL).unwrap();
        assert_eq!(windowed.min_value(), whole.min_value());
        assert_eq!(windowed.max_value(), whole.max_value());
    }
}

#[test]
fn test_mapped_chunks_stay_in_range_and_emit_in_time_order() {
    let set = category_set(65.0);
    let chunks = splice_chunks(&set, PEAK_LEVEL, 30.0).unwrap();
    let bindings = ChannelBindings::default();

    for chunk in &chunks {
        let mapper = ParameterMapper::new(chunk, &bindings, JitterCurve::default()).unwrap();
        let frames = mapper.map_all(&mut chunk_rng(Some(7), chunk.index));
        assert_eq!(frames.len(), chunk.point_count());

        for frame in &frames {
            assert!((0.5..=1.0).contains(&frame.zoom));
            for value in frame.displace_x.iter().chain(frame.displace_y.iter()) {
                assert!((0.4..=0.6).contains(value), "jitter {value} out of range");
            }
        }

        let stream = render_stream(&frames, ChannelGroup::All);
        let times: Vec<f64> = stream
            .lines()
            .map(|line| line.split(' ').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(times.len(), frames.len());
        assert_eq!(times[0], 0.0);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert!(*times.last().unwrap() <= 30.0 + 1e-9);
    }
}

#[test]
fn test_silent_first_frame_maps_to_smallest_zoom() {
    let set = category_set(5.0);
    let chunks = splice_chunks(&set, PEAK_LEVEL, 30.0).unwrap();
    let mapper = ParameterMapper::new(&chunks[0], &ChannelBindings::default(), JitterCurve::default()).unwrap();
    let first = mapper.map_frame(0, &mut chunk_rng(Some(1), 0)).unwrap();
    assert_eq!(first.zoom, 0.5);
}
