// ============================================================================
// levelcast-core/src/graphs.rs
// ============================================================================
//
// FILTER GRAPHS: ffmpeg filter graphs for measurement and chunk rendering
//
// The measurement graph band-limits the audio and prints per-window astats
// levels into the levels log. The render graph composes one chunk's frames:
// two sendcmd-driven displacement maps, the background, a sendcmd-scaled
// ball travelling with track progress, cover art, frequency and waveform
// panels and an optional title.
//
// Positions are laid out on a 1920x1080 canvas and scaled to the configured
// output size.
//
// AI-ASSISTANT-INFO: Filter graph construction for ffmpeg measurement/render runs

use crate::emitter::{BALL_TARGET, CommandStreamFiles, DISPLACE_X_TARGET, DISPLACE_Y_TARGET};
use crate::levels::{MAX_LEVEL, MIN_LEVEL, PEAK_LEVEL, RMS_LEVEL};
use crate::utils::filter_escape_path;
use std::path::Path;

/// Output label of the measurement graph.
pub const MEASURE_OUTPUT: &str = "TO_OUT";

/// Output label of the render graph.
pub const RENDER_OUTPUT: &str = "VIDEO_OUT";

/// Lower edge of the analysed band in Hz.
pub const BAND_LOW_HZ: u32 = 20;

/// Upper edge of the analysed band in Hz.
pub const BAND_HIGH_HZ: u32 = 100;

/// Scaler flags: bicubic with accurate rounding and full chroma interpolation.
const SCALE_FLAGS: u32 = 16388;

const REFERENCE_WIDTH: f64 = 1920.0;
const REFERENCE_HEIGHT: f64 = 1080.0;

/// One labelled chain: `[in1][in2] f1, f2 [out]`.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    inputs: Vec<String>,
    filters: Vec<String>,
    output: Option<String>,
}

impl FilterChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an input pad label (without brackets).
    #[must_use]
    pub fn input(mut self, label: &str) -> Self {
        self.inputs.push(label.to_string());
        self
    }

    /// Adds a filter; empty filters are skipped.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    #[must_use]
    pub fn output(mut self, label: &str) -> Self {
        self.output = Some(label.to_string());
        self
    }

    fn render(&self) -> String {
        let inputs: String = self.inputs.iter().map(|l| format!("[{l}]")).collect();
        let output = self
            .output
            .as_ref()
            .map(|l| format!("[{l}]"))
            .unwrap_or_default();
        format!("{inputs}{}{output}", self.filters.join(","))
    }
}

/// A complete graph of chains separated by `;`.
#[derive(Debug, Clone, Default)]
pub struct FilterGraph {
    chains: Vec<FilterChain>,
}

impl FilterGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn chain(mut self, chain: FilterChain) -> Self {
        self.chains.push(chain);
        self
    }

    #[must_use]
    pub fn build(&self) -> String {
        self.chains
            .iter()
            .map(FilterChain::render)
            .collect::<Vec<_>>()
            .join(";")
    }
}

fn quoted(path: &Path) -> String {
    format!("'{}'", filter_escape_path(path))
}

/// Builds the audio measurement graph writing astats levels to `levels_log`.
///
/// Each astats stage measures one overall level over windows of one frame
/// (`1/frame_rate` seconds) and resets after every window.
pub fn measurement_graph(levels_log: &Path, frame_rate: f64) -> String {
    let mut chain = FilterChain::new().input("0:a").filter(format!(
        "firequalizer=gain_entry='entry({}, -INF); entry({}, 0); entry({}, 0); entry({}, -INF)'",
        BAND_LOW_HZ - 1,
        BAND_LOW_HZ,
        BAND_HIGH_HZ,
        BAND_HIGH_HZ + 1
    ));

    for key in [MIN_LEVEL, MAX_LEVEL, PEAK_LEVEL, RMS_LEVEL] {
        let measure = key.rsplit('.').next().unwrap_or(key);
        chain = chain.filter(format!(
            "astats=length=1/{frame_rate}:metadata=1:reset=1:measure_perchannel=none:measure_overall={measure}"
        ));
    }

    FilterGraph::new()
        .chain(
            chain
                .filter(format!("ametadata=mode=print:file={}", quoted(levels_log)))
                .output(MEASURE_OUTPUT),
        )
        .build()
}

/// Pixel positions of the render layout for one output size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    sx: f64,
    sy: f64,
}

impl Layout {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sx: f64::from(width) / REFERENCE_WIDTH,
            sy: f64::from(height) / REFERENCE_HEIGHT,
        }
    }

    fn x(&self, reference: f64) -> f64 {
        reference * self.sx
    }

    fn y(&self, reference: f64) -> f64 {
        reference * self.sy
    }

    fn w(&self, reference: f64) -> u32 {
        (reference * self.sx).round() as u32
    }

    fn h(&self, reference: f64) -> u32 {
        (reference * self.sy).round() as u32
    }
}

/// Everything the render graph of one chunk depends on.
#[derive(Debug, Clone)]
pub struct RenderGraphSpec<'a> {
    pub streams: &'a CommandStreamFiles,
    pub title_path: Option<&'a Path>,
    pub frame_rate: f64,
    pub layout: Layout,
    /// Absolute start of the chunk in the track, in seconds.
    pub chunk_start: f64,
    /// Duration of the whole track, in seconds.
    pub track_duration: f64,
}

fn scale(width: u32, height: u32) -> String {
    format!("scale=flags={SCALE_FLAGS}:width={width}:height={height}")
}

fn overlay_at(x: f64, y: f64) -> String {
    format!("overlay=format=auto:alpha=straight:eval=init:x={x}:y={y}")
}

fn displacement_map(target: &str, commands: &Path, layout: &Layout, frame_rate: f64, output: &str) -> FilterChain {
    FilterChain::new()
        .filter(format!(
            "nullsrc=size={}x{}:rate={frame_rate}",
            layout.width, layout.height
        ))
        .filter(format!("sendcmd=filename={}", quoted(commands)))
        .filter(format!(
            "{target}=r='random(1)*255':g='random(1)*255':b='random(1)*255'"
        ))
        .output(output)
}

/// Builds the render graph for one chunk.
///
/// Inputs are expected in the order background image, audio, ball image, art
/// image. The ball travels from left to right across the whole track, so its
/// position uses the chunk's absolute start time.
pub fn render_graph(spec: &RenderGraphSpec<'_>) -> String {
    let l = &spec.layout;
    let panel_w = l.w(917.0);
    let panel_h = l.h(387.0);

    let title = spec
        .title_path
        .map(|path| {
            format!(
                "drawtext=fontsize={}:textfile={}:fix_bounds=true:fontcolor=#FFFFFFFF:x={}-(text_w/2):y={}-(text_h/2)",
                l.h(60.0),
                quoted(path),
                l.x(1437.0),
                l.y(217.0)
            )
        })
        .unwrap_or_default();

    let travel_start = l.x(114.5);
    let travel_end = l.x(1804.5);
    let ball_overlay = format!(
        "overlay=format=auto:alpha=straight:eval=frame:y={}-(overlay_h/2):x={}+(({}-{})*((t+{})/{}))-(overlay_w/2)",
        l.y(964.5),
        travel_start,
        travel_end,
        travel_start,
        spec.chunk_start,
        spec.track_duration
    );

    FilterGraph::new()
        .chain(displacement_map(
            DISPLACE_X_TARGET,
            &spec.streams.displace_x,
            l,
            spec.frame_rate,
            "DISPLACE_X",
        ))
        .chain(displacement_map(
            DISPLACE_Y_TARGET,
            &spec.streams.displace_y,
            l,
            spec.frame_rate,
            "DISPLACE_Y",
        ))
        .chain(
            FilterChain::new()
                .input("0:v")
                .filter("format=rgba")
                .filter(scale(l.width, l.height))
                .output("BG"),
        )
        .chain(
            FilterChain::new()
                .input("2:v")
                .filter("format=rgba")
                .filter(format!("sendcmd=filename={}", quoted(&spec.streams.ball)))
                .filter(format!(
                    "{BALL_TARGET}=flags={SCALE_FLAGS}:width=in_w:height=in_h"
                ))
                .output("BALL"),
        )
        .chain(
            FilterChain::new()
                .input("3:v")
                .filter("format=rgba")
                .filter(scale(l.w(917.0), l.h(812.0)))
                .output("ART"),
        )
        .chain(
            FilterChain::new()
                .input("1:a")
                .filter(format!(
                    "showwaves=size={panel_w}x{panel_h}:rate={}:mode=p2p:draw=full:colors=#FF0000FF|#AA0000FF",
                    spec.frame_rate
                ))
                .filter("format=rgba")
                .filter("dilation")
                .filter(scale(panel_w, panel_h))
                .output("WAVES"),
        )
        .chain(
            FilterChain::new()
                .input("1:a")
                .filter(format!(
                    "showfreqs=size={panel_w}x{panel_h}:rate={}:fscale=log:win_size=4096:win_func=flattop:colors=#600000FF|#400000FF",
                    spec.frame_rate
                ))
                .filter("format=rgba")
                .filter(scale(panel_w, panel_h))
                .output("FREQS"),
        )
        .chain(
            FilterChain::new()
                .input("BG")
                .input("FREQS")
                .filter(overlay_at(l.x(979.0), l.y(24.0)))
                .filter(title)
                .output("BG_FREQS"),
        )
        .chain(
            FilterChain::new()
                .input("BG_FREQS")
                .input("WAVES")
                .filter(overlay_at(l.x(979.0), l.y(449.0)))
                .output("BG_WAVES"),
        )
        .chain(
            FilterChain::new()
                .input("BG_WAVES")
                .input("ART")
                .filter(overlay_at(l.x(24.0), l.y(24.0)))
                .output("BG_ART"),
        )
        .chain(
            FilterChain::new()
                .input("BG_ART")
                .input("BALL")
                .filter(ball_overlay)
                .output("COMPOSED"),
        )
        .chain(
            FilterChain::new()
                .input("COMPOSED")
                .input("DISPLACE_X")
                .input("DISPLACE_Y")
                .filter("displace=edge=wrap")
                .filter("yadif")
                .filter("format=pix_fmts=yuv420p:color_spaces=bt709")
                .output(RENDER_OUTPUT),
        )
        .build()
}
