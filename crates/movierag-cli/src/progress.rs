use indicatif::{ProgressBar, ProgressStyle};
use movierag_retrieval::{IndexPhase, IndexProgress};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a progress bar for determinate progress
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{msg}\n[{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA: {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Finish a progress bar with success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Progress display for an index build, driven by [`IndexProgress`] events
///
/// Hidden when `visible` is false so JSON output is not interleaved with bars.
pub struct BuildProgress {
    visible: bool,
    embeddings: Option<ProgressBar>,
    finalize: Option<ProgressBar>,
}

impl BuildProgress {
    pub fn new(visible: bool) -> Self {
        Self { visible, embeddings: None, finalize: None }
    }

    pub fn update(&mut self, event: IndexProgress) {
        if !self.visible {
            return;
        }

        match event.phase {
            IndexPhase::GeneratingEmbeddings => {
                let total = event.total as u64;
                let pb = self
                    .embeddings
                    .get_or_insert_with(|| create_progress_bar(total, "Generating embeddings"));
                pb.set_position(event.current as u64);
            }
            IndexPhase::BuildingIndex => {
                if let Some(pb) = &self.embeddings {
                    finish_success(pb, &format!("Generated {} embeddings", pb.position()));
                }
                self.finalize = Some(create_spinner(&event.message));
            }
            IndexPhase::Finalizing => {
                if let Some(pb) = &self.finalize {
                    finish_success(pb, &event.message);
                }
            }
        }
    }

    /// Clear any bar left running by a failed build
    pub fn abandon(&self) {
        for pb in [&self.embeddings, &self.finalize].into_iter().flatten() {
            if !pb.is_finished() {
                pb.abandon();
            }
        }
    }
}
