// ============================================================================
// levelcast-core/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Chunk render progress bar
//
// Rendering is the slow stage of a run, one engine invocation per chunk.
// The bar advances once per rendered chunk and shows the time range being
// rendered. A hidden bar is used when progress output is disabled, so callers
// never branch on the setting.
//
// AI-ASSISTANT-INFO: indicatif progress bar for chunk rendering

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TEMPLATE: &str = "Rendering [{bar:40}] {pos}/{len} chunks | {elapsed_precise} | {msg}";

/// Progress over the chunks of one run.
#[derive(Debug, Clone)]
pub struct ChunkProgress {
    bar: ProgressBar,
}

impl ChunkProgress {
    /// Creates a bar for `total_chunks`; hidden when `visible` is false.
    pub fn new(total_chunks: u64, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(total_chunks);
        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// Announces the chunk about to be rendered.
    pub fn start_chunk(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    pub fn finish_chunk(&self) {
        self.bar.inc(1);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("done");
    }

    /// Clears the bar after a failed run.
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_still_counts() {
        let progress = ChunkProgress::new(3, false);
        progress.start_chunk("0:0:0.000 - 0:0:30.000");
        progress.finish_chunk();
        progress.finish_chunk();
        assert_eq!(progress.position(), 2);
        progress.finish();
    }
}
