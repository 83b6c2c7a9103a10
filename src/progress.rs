//! Progress bar display for downloads

use indicatif::{ProgressBar, ProgressStyle};

/// Byte-count progress for one download.
///
/// Shows a bar when the total size is known; when the server uses chunked
/// transfer and the size is unknown, falls back to a spinner with a running
/// byte count.
pub struct DownloadProgress {
    bar: ProgressBar,
}

impl DownloadProgress {
    /// Create a progress display for a transfer of `total` bytes, if known
    pub fn new(total: Option<u64>) -> Self {
        let bar = match total {
            Some(len) => {
                let style = ProgressStyle::default_bar()
                    .template("[{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")
                    .unwrap()
                    .progress_chars("#>-");
                let bar = ProgressBar::new(len);
                bar.set_style(style);
                bar
            }
            None => {
                let style = ProgressStyle::default_spinner()
                    .template("{spinner} {bytes} downloaded")
                    .unwrap();
                let bar = ProgressBar::new_spinner();
                bar.set_style(style);
                bar
            }
        };
        Self { bar }
    }

    /// Record `bytes` more bytes transferred
    pub fn advance(&self, bytes: u64) {
        self.bar.inc(bytes);
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
