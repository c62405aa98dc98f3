use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a progress bar for determinate progress
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg}\n[{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA: {eta}")
    {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb.set_message(message.to_string());
    pb
}

/// Finish a progress bar with success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Finish a progress bar with error message
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✗ {}", message));
}

/// Progress tracker for a cover run: reading, covering, then writing
pub struct CoverProgress {
    enabled: bool,
    current: Option<ProgressBar>,
}

impl CoverProgress {
    /// A tracker that draws nothing when `enabled` is false (JSON output)
    pub fn new(enabled: bool) -> Self {
        Self { enabled, current: None }
    }

    pub fn start_read(&mut self, path: &str) {
        if self.enabled {
            self.current = Some(create_spinner(&format!("Reading {}...", path)));
        }
    }

    pub fn finish_read(&mut self, features: usize, fields: usize) {
        if let Some(pb) = self.current.take() {
            finish_success(&pb, &format!("Read {} features with {} fields", features, fields));
        }
    }

    /// Start the per-feature bar; returns a handle the batch callback can tick
    pub fn start_cover(&mut self, total: usize) -> Option<ProgressBar> {
        if !self.enabled {
            return None;
        }
        let pb = create_progress_bar(total as u64, "Covering features");
        self.current = Some(pb.clone());
        Some(pb)
    }

    pub fn finish_cover(&mut self, cells: usize, failed: usize) {
        if let Some(pb) = self.current.take() {
            if failed == 0 {
                finish_success(&pb, &format!("Generated {} cells", cells));
            } else {
                finish_error(
                    &pb,
                    &format!("Generated {} cells, {} features failed", cells, failed),
                );
            }
        }
    }

    pub fn start_write(&mut self, path: &str) {
        if self.enabled {
            self.current = Some(create_spinner(&format!("Writing {}...", path)));
        }
    }

    pub fn finish_write(&mut self, rows: usize) {
        if let Some(pb) = self.current.take() {
            finish_success(&pb, &format!("Wrote {} rows", rows));
        }
    }

    /// Clear whatever is on screen after an error
    pub fn abandon(&mut self) {
        if let Some(pb) = self.current.take() {
            pb.finish_and_clear();
        }
    }
}
