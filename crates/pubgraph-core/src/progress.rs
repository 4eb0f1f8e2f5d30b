//! Progress display for a single identifier batch.
//!
//! On a terminal the batch gets an indicatif bar; otherwise the bar is
//! hidden and progress is only visible through the log.

use std::io::IsTerminal;
use std::sync::Arc;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const BATCH_TEMPLATE: &str =
    "{prefix:<10.dim} {bar:30.green/dim} {pos:>7}/{len:7} {eta:>4} {wide_msg:.dim}";

fn batch_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(BATCH_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("--")
}

/// Owns the `MultiProgress` that bars and the log bridge draw through.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: std::io::stderr().is_terminal(),
        }
    }

    /// Bar for `total` identifiers, labelled `name`.
    ///
    /// Returns a hidden bar when stderr is not a terminal or `visible` is off,
    /// so callers can drive it unconditionally.
    pub fn batch_bar(&self, name: &str, total: u64, visible: bool) -> ProgressBar {
        if !(self.is_tty && visible) {
            return ProgressBar::hidden();
        }
        let bar = self
            .multi
            .add(ProgressBar::new(total).with_style(batch_style()));
        bar.set_prefix(name.to_owned());
        bar
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedProgress = Arc<ProgressContext>;

/// `19717` -> `"19,717"`
pub fn fmt_num(n: usize) -> String {
    let digits = n.to_string();
    let lead = match digits.len() % 3 {
        0 => 3,
        r => r,
    };
    let mut out = String::from(&digits[..lead]);
    for group in digits.as_bytes()[lead..].chunks(3) {
        out.push(',');
        out.extend(group.iter().map(|&b| b as char));
    }
    out
}
