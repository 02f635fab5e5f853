//! Progress bar wiring for CLI operations.

use indicatif::{ProgressBar, ProgressStyle};
use varc::ProgressFn;

/// A progress bar fed by the archive's between-entry callback.
pub struct Reporter {
    bar: ProgressBar,
}

impl Reporter {
    /// Creates a reporter; a quiet reporter draws nothing.
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template("[{bar:40}] {percent:>3}% {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            bar
        };
        Self { bar }
    }

    /// Returns the callback to install on an archive.
    pub fn callback(&self) -> ProgressFn {
        let bar = self.bar.clone();
        Box::new(move |current, total, _bytes_done, _bytes_total, path| {
            if bar.length() != Some(total) {
                bar.set_length(total);
            }
            bar.set_position(current);
            bar.set_message(shorten(path));
        })
    }

    /// Clears the bar once the operation completes.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn shorten(path: &str) -> String {
    let chars = path.chars().count();
    if chars > 30 {
        let tail: String = path.chars().skip(chars - 27).collect();
        format!("...{tail}")
    } else {
        path.to_string()
    }
}
