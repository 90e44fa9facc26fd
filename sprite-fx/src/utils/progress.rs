//! Simulation progress display

use indicatif::{ProgressBar, ProgressStyle};

use super::format_ms;

const STEP_TEMPLATE: &str = "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} steps {msg}";

/// Bar counting update calls; hidden when `visible` is false
///
/// The message shows how much host time the whole run feeds the manager.
pub fn create_step_bar(steps: u32, dt_ms: f32, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(u64::from(steps));
    let style = ProgressStyle::default_bar()
        .template(STEP_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message(format!("of {}", format_ms(dt_ms * steps as f32)));
    pb
}
