//! Progress reporting: a count-style bar over post groups.

use indicatif::{ProgressBar, ProgressStyle};

/// Count-style progress bar (items processed out of total), with an optional label.
pub fn make_count_progress(total: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  \
         it/s: {per_sec}  elapsed: {elapsed_precise}  eta: {eta_precise}"
    ) {
        pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
    }
    if !label.is_empty() {
        pb.set_message(label.to_string());
    }
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Optional bar: a no-op when progress is disabled.
pub struct ProgressScope {
    pb: Option<ProgressBar>,
}

impl ProgressScope {
    pub fn count(enabled: bool, label: &str, total: u64) -> Self {
        Self { pb: enabled.then(|| make_count_progress(total, label)) }
    }
    #[inline]
    pub fn inc_items(&self, delta: u64) {
        if let Some(pb) = &self.pb { pb.inc(delta); }
    }
    pub fn finish(&self, msg: &str) {
        if let Some(pb) = &self.pb { pb.finish_with_message(msg.to_string()); }
    }
}
