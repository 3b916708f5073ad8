use std::io::{stderr, IsTerminal};

use indicatif::{ProgressBar, ProgressStyle};

/// A progress bar over `total` files, hidden unless stderr is interactive.
pub fn file_progress(total: usize, message: &'static str) -> ProgressBar {
    if total <= 1 || !stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:30}] {pos}/{len} ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#> ");
    pb.set_style(style);
    pb.set_message(message);
    pb
}
