// ============================================================================
// levelcast-core/src/orchestrator.rs
// ============================================================================
//
// RENDER ORCHESTRATOR: Drives the measurement, mapping and render stages
//
// A run proceeds strictly in order:
//   probe -> measure -> parse -> statistics -> splice
//   -> for each chunk: map -> emit -> render
//   -> stitch
//
// Chunks are processed one at a time. Render plans (start time, duration and
// first frame number of every chunk) are computed up front from the chunk
// offsets, so frame numbering never depends on what a render produced.
//
// AI-ASSISTANT-INFO: Pipeline orchestration over injected ffmpeg/ffprobe collaborators

use crate::config::CoreConfig;
use crate::emitter::{CommandStreamFiles, write_command_streams};
use crate::error::{CoreError, CoreResult, engine_output_missing_error};
use crate::external::{
    AudioInfo, AudioProber, FfmpegSpawner, FfprobeAudioProber, SidecarSpawner, check_dependency,
    run_engine,
};
use crate::graphs::{Layout, MEASURE_OUTPUT, RENDER_OUTPUT, RenderGraphSpec, measurement_graph, render_graph};
use crate::levels::{CategorySet, CategorySummary, ParsedLevels, compute_statistics, parse_levels_file};
use crate::mapping::{ParameterMapper, chunk_rng};
use crate::progress::ChunkProgress;
use crate::splicer::{Chunk, splice_chunks};
use crate::temp_files::create_work_dir;
use crate::utils::{format_elapsed, format_timestr};
use ffmpeg_sidecar::command::FfmpegCommand;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File name pattern of the numbered frame sequence.
pub const FRAME_PATTERN: &str = "frame_%06d.png";

/// Engine invocation parameters for one chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub chunk_index: usize,
    /// Absolute start of the chunk in seconds.
    pub start_time: f64,
    /// Rendered length in seconds; the final chunk is truncated to the track.
    pub duration: f64,
    /// Number of the chunk's first frame in the shared sequence.
    pub start_number: u64,
    pub frame_count: u64,
}

impl RenderPlan {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Computes the render plan of every chunk.
///
/// Chunks starting at or past the end of the track render nothing and are
/// left out.
pub fn plan_renders(chunks: &[Chunk], track_duration: f64, frame_rate: f64) -> Vec<RenderPlan> {
    chunks
        .iter()
        .filter_map(|chunk| {
            let duration = chunk.chunk_length.min(track_duration - chunk.time_offset);
            let frame_count = (duration * frame_rate).round();
            if frame_count < 1.0 {
                log::warn!(
                    "Chunk {} starts at {} past the end of the track ({}); skipping",
                    chunk.index,
                    format_timestr(chunk.time_offset),
                    format_timestr(track_duration)
                );
                return None;
            }
            Some(RenderPlan {
                chunk_index: chunk.index,
                start_time: chunk.time_offset,
                duration,
                start_number: (chunk.time_offset * frame_rate).round() as u64,
                frame_count: frame_count as u64,
            })
        })
        .collect()
}

fn require_file(label: &str, path: &Path) -> CoreResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CoreError::Config(format!(
            "{label} file not found: {}",
            path.display()
        )))
    }
}

/// Verifies that every input file of a render exists.
pub fn check_inputs(config: &CoreConfig) -> CoreResult<()> {
    require_file("audio", &config.audio_path)?;
    require_file("background", &config.background_path)?;
    require_file("ball", &config.ball_path)?;
    require_file("art", &config.art_path)?;
    if let Some(title) = &config.title_path {
        require_file("title", title)?;
    }
    Ok(())
}

/// Runs the measurement graph over `audio` and parses the resulting levels log.
pub fn measure_levels<S: FfmpegSpawner>(
    spawner: &S,
    audio: &Path,
    levels_log: &Path,
    frame_rate: f64,
) -> CoreResult<ParsedLevels> {
    log::info!("Measuring levels of {}", audio.display());

    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner()
        .overwrite()
        .input(audio.to_string_lossy().into_owned())
        .args(["-filter_complex", &measurement_graph(levels_log, frame_rate)])
        .args(["-map", &format!("[{MEASURE_OUTPUT}]")])
        .args(["-map_metadata", "-1", "-map_chapters", "-1"])
        .args(["-f", "null"])
        .output("-");

    let run = run_engine(spawner, cmd, "ffmpeg (measure)")?;

    let usable = std::fs::metadata(levels_log).map(|m| m.len() > 0).unwrap_or(false);
    if !usable {
        return Err(engine_output_missing_error(
            "ffmpeg (measure)",
            format!(
                "levels log {} is missing or empty. {}",
                levels_log.display(),
                run.diagnostics_text()
            ),
        ));
    }

    let parsed = parse_levels_file(levels_log)?;
    log::info!(
        "Measured {} categories from {}",
        parsed.len(),
        levels_log.display()
    );
    Ok(parsed)
}

/// Renders one chunk's frames into `frames_dir`.
pub fn render_chunk<S: FfmpegSpawner>(
    spawner: &S,
    config: &CoreConfig,
    plan: &RenderPlan,
    streams: &CommandStreamFiles,
    track_duration: f64,
    frames_dir: &Path,
) -> CoreResult<()> {
    let fps = config.frame_rate.to_string();
    let start = plan.start_time.to_string();
    let duration = plan.duration.to_string();

    let graph = render_graph(&RenderGraphSpec {
        streams,
        title_path: config.title_path.as_deref(),
        frame_rate: config.frame_rate,
        layout: Layout::new(config.video_width, config.video_height),
        chunk_start: plan.start_time,
        track_duration,
    });

    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner().overwrite();
    // Input order is fixed by the render graph: background, audio, ball, art.
    for (path, looped) in [
        (&config.background_path, true),
        (&config.audio_path, false),
        (&config.ball_path, true),
        (&config.art_path, true),
    ] {
        cmd.args(["-ss", &start, "-t", &duration]);
        if looped {
            cmd.args(["-loop", "1", "-r", &fps]);
        }
        cmd.input(path.to_string_lossy().into_owned());
    }
    cmd.args(["-filter_complex", &graph])
        .args(["-map", &format!("[{RENDER_OUTPUT}]")])
        .args(["-c:v", "png", "-r", &fps])
        .args(["-frames:v", &plan.frame_count.to_string()])
        .args(["-map_metadata", "-1", "-map_chapters", "-1"])
        .args(["-start_number", &plan.start_number.to_string()])
        .output(frames_dir.join(FRAME_PATTERN).to_string_lossy().into_owned());

    let label = format!("ffmpeg (render chunk {})", plan.chunk_index);
    run_engine(spawner, cmd, &label)?;
    Ok(())
}

/// Muxes the numbered frame sequence with the original audio into `output`.
pub fn stitch<S: FfmpegSpawner>(
    spawner: &S,
    config: &CoreConfig,
    frames_dir: &Path,
    output: &Path,
) -> CoreResult<()> {
    log::info!("Stitching frames into {}", output.display());
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let fps = config.frame_rate.to_string();
    let gop = ((config.frame_rate / 2.0).round() as u64).max(1).to_string();

    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner()
        .overwrite()
        .args(["-framerate", &fps, "-start_number", "0"])
        .input(frames_dir.join(FRAME_PATTERN).to_string_lossy().into_owned())
        .input(config.audio_path.to_string_lossy().into_owned())
        .args(["-map", "0:v", "-map", "1:a"])
        .args(["-c:a", "aac", "-ac", "2", "-ar", "48000", "-b:a", "512K"])
        .args(["-c:v", "libx264", "-profile:v", "high", "-pix_fmt", "yuv420p"])
        .args(["-bf", "2", "-g", &gop, "-keyint_min", &gop])
        .args(["-crf", "1", "-b:v", "20M", "-r", &fps])
        .args(["-movflags", "+faststart"])
        .args(["-map_metadata", "-1", "-map_chapters", "-1"])
        .args(["-shortest"])
        .output(output.to_string_lossy().into_owned());

    let run = run_engine(spawner, cmd, "ffmpeg (stitch)")?;
    if !output.is_file() {
        return Err(engine_output_missing_error(
            "ffmpeg (stitch)",
            format!("{} was not created. {}", output.display(), run.diagnostics_text()),
        ));
    }
    Ok(())
}

/// Outcome of a complete render.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub audio_path: PathBuf,
    pub output_path: PathBuf,
    pub audio: AudioInfo,
    pub chunk_count: usize,
    pub frame_count: u64,
    pub categories: Vec<CategorySummary>,
    /// Work directory, when it outlives the run.
    pub work_dir: Option<PathBuf>,
    pub elapsed_secs: f64,
}

/// Runs the whole pipeline with the given engine and prober.
pub fn run_pipeline<S: FfmpegSpawner, P: AudioProber>(
    spawner: &S,
    prober: &P,
    config: &CoreConfig,
) -> CoreResult<PipelineSummary> {
    let started = Instant::now();
    config.validate()?;
    check_inputs(config)?;

    let work = create_work_dir(config)?;
    log::info!("Work directory: {}", work.path().display());

    let audio = prober.probe_audio(&config.audio_path)?;
    log::info!(
        "Audio {} lasts {} (bit rate {})",
        config.audio_path.display(),
        format_timestr(audio.duration),
        audio
            .bit_rate
            .map(|b| format!("{} kb/s", b / 1000))
            .unwrap_or_else(|| "unknown".to_string())
    );

    let parsed = measure_levels(spawner, &config.audio_path, &work.levels_log(), config.frame_rate)?;
    let set = compute_statistics(parsed)?;
    let chunks = splice_chunks(&set, &config.reference_category, config.chunk_length)?;
    let plans = plan_renders(&chunks, audio.duration, config.frame_rate);

    let frames_dir = work.frames_dir();
    std::fs::create_dir_all(&frames_dir)?;

    let bindings = config.channel_bindings();
    let jitter = config.jitter_curve();
    let progress = ChunkProgress::new(plans.len() as u64, config.show_progress);

    let rendered: CoreResult<u64> = plans.iter().try_fold(0, |frames_so_far, plan| {
        let chunk = &chunks[plan.chunk_index];
        progress.start_chunk(format!(
            "{} - {}",
            format_timestr(plan.start_time),
            format_timestr(plan.end_time())
        ));

        let mapper = ParameterMapper::new(chunk, &bindings, jitter)?;
        let mut rng = chunk_rng(config.seed, chunk.index);
        let frames = mapper.map_all(&mut rng);
        let streams = write_command_streams(&frames, &work.chunk_dir(chunk.index))?;

        log::debug!(
            "Rendering chunk {}: {} frames from #{}",
            plan.chunk_index,
            plan.frame_count,
            plan.start_number
        );
        render_chunk(spawner, config, plan, &streams, audio.duration, &frames_dir)?;
        progress.finish_chunk();
        Ok(frames_so_far + plan.frame_count)
    });

    let frame_count = match rendered {
        Ok(count) => {
            progress.finish();
            count
        }
        Err(e) => {
            progress.abandon();
            return Err(e);
        }
    };

    stitch(spawner, config, &frames_dir, &config.output_path)?;

    let work_dir = if config.keep_work_dir || config.work_dir.is_some() {
        Some(work.persist())
    } else {
        None
    };

    let elapsed = started.elapsed();
    log::info!(
        "Rendered {} chunks ({} frames) into {} in {}",
        plans.len(),
        frame_count,
        config.output_path.display(),
        format_elapsed(elapsed)
    );

    Ok(PipelineSummary {
        audio_path: config.audio_path.clone(),
        output_path: config.output_path.clone(),
        audio,
        chunk_count: plans.len(),
        frame_count,
        categories: set.summary(),
        work_dir,
        elapsed_secs: elapsed.as_secs_f64(),
    })
}

/// Runs the whole pipeline with the installed ffmpeg and ffprobe.
pub fn run_render(config: &CoreConfig) -> CoreResult<PipelineSummary> {
    check_dependency("ffmpeg")?;
    check_dependency("ffprobe")?;
    run_pipeline(&SidecarSpawner, &FfprobeAudioProber::new(), config)
}

/// One chunk as reported by `analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkSummary {
    pub index: usize,
    pub time_offset: f64,
    pub from_i: usize,
    pub to_i: usize,
    pub points: usize,
}

/// Statistics and chunk layout of a levels log.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub reference_category: String,
    pub chunk_length: f64,
    pub frames_per_chunk: u64,
    pub categories: Vec<CategorySummary>,
    pub chunks: Vec<ChunkSummary>,
}

/// Splices `set` and summarises it.
pub fn analyze_levels(set: &CategorySet, config: &CoreConfig) -> CoreResult<AnalysisReport> {
    let chunks = splice_chunks(set, &config.reference_category, config.chunk_length)?;
    Ok(AnalysisReport {
        reference_category: config.reference_category.clone(),
        chunk_length: config.chunk_length,
        frames_per_chunk: config.frames_per_chunk(),
        categories: set.summary(),
        chunks: chunks
            .iter()
            .map(|c| ChunkSummary {
                index: c.index,
                time_offset: c.time_offset,
                from_i: c.from_i,
                to_i: c.to_i,
                points: c.point_count(),
            })
            .collect(),
    })
}

/// Analyses an existing levels log.
pub fn analyze_levels_file(levels_log: &Path, config: &CoreConfig) -> CoreResult<AnalysisReport> {
    config.validate()?;
    let set = compute_statistics(parse_levels_file(levels_log)?)?;
    analyze_levels(&set, config)
}

/// Measures `config.audio_path` and analyses the result.
pub fn analyze_audio<S: FfmpegSpawner>(spawner: &S, config: &CoreConfig) -> CoreResult<AnalysisReport> {
    config.validate()?;
    require_file("audio", &config.audio_path)?;
    let work = create_work_dir(config)?;
    let parsed = measure_levels(spawner, &config.audio_path, &work.levels_log(), config.frame_rate)?;
    let set = compute_statistics(parsed)?;
    let report = analyze_levels(&set, config)?;
    if config.keep_work_dir {
        let kept = work.persist();
        log::info!("Kept work directory {}", kept.display());
    }
    Ok(report)
}

/// Command streams written for one chunk by `emit`.
#[derive(Debug, Clone, Serialize)]
pub struct EmittedChunk {
    pub index: usize,
    pub time_offset: f64,
    pub frames: usize,
    pub dir: PathBuf,
}

/// Maps every chunk of an existing levels log and writes its command streams
/// under `out_dir/chunk_NNNN/`, without rendering.
pub fn emit_command_streams(
    levels_log: &Path,
    out_dir: &Path,
    config: &CoreConfig,
) -> CoreResult<Vec<EmittedChunk>> {
    config.validate()?;
    let set = compute_statistics(parse_levels_file(levels_log)?)?;
    let chunks = splice_chunks(&set, &config.reference_category, config.chunk_length)?;
    let bindings = config.channel_bindings();
    let jitter = config.jitter_curve();

    let mut emitted = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        let mapper = ParameterMapper::new(chunk, &bindings, jitter)?;
        let frames = mapper.map_all(&mut chunk_rng(config.seed, chunk.index));
        let dir = out_dir.join(format!("chunk_{:04}", chunk.index));
        write_command_streams(&frames, &dir)?;
        emitted.push(EmittedChunk {
            index: chunk.index,
            time_offset: chunk.time_offset,
            frames: frames.len(),
            dir,
        });
    }

    log::info!(
        "Wrote command streams for {} chunks to {}",
        emitted.len(),
        out_dir.display()
    );
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::parse_levels_str;

    fn chunks_for(duration: f64, step: f64, chunk_length: f64) -> Vec<Chunk> {
        let mut log = String::new();
        let count = (duration / step).round() as usize;
        for i in 0..count {
            log.push_str(&format!("frame:{i} pts:{i} pts_time:{}\n", i as f64 * step));
            log.push_str(&format!("lavfi.astats.Overall.Peak_level={}\n", -(i as f64)));
        }
        let set = compute_statistics(parse_levels_str(&log).unwrap()).unwrap();
        splice_chunks(&set, crate::levels::PEAK_LEVEL, chunk_length).unwrap()
    }

    #[test]
    fn test_plans_are_contiguous_and_truncated() {
        let chunks = chunks_for(65.0, 0.5, 30.0);
        let plans = plan_renders(&chunks, 65.0, 60.0);

        assert_eq!(plans.len(), 3);
        assert_eq!(
            plans.iter().map(|p| p.start_number).collect::<Vec<_>>(),
            vec![0, 1800, 3600]
        );
        assert_eq!(
            plans.iter().map(|p| p.frame_count).collect::<Vec<_>>(),
            vec![1800, 1800, 300]
        );
        for pair in plans.windows(2) {
            assert_eq!(pair[0].start_number + pair[0].frame_count, pair[1].start_number);
        }
        assert_eq!(plans[2].end_time(), 65.0);
    }

    #[test]
    fn test_chunk_past_track_end_is_skipped() {
        let chunks = chunks_for(61.0, 0.5, 30.0);
        assert_eq!(chunks.len(), 3);
        let plans = plan_renders(&chunks, 60.0, 60.0);
        assert_eq!(plans.len(), 2);
    }

    #[test]
    fn test_missing_input_is_reported() {
        let scratch = tempfile::tempdir().unwrap();
        let config = CoreConfig {
            audio_path: scratch.path().join("missing.wav"),
            ..Default::default()
        };
        let err = check_inputs(&config).unwrap_err();
        assert!(matches!(err, CoreError::Config(msg) if msg.contains("audio")));
    }
}
