use tokio::time::{Duration, sleep};

use std::io::{self, Write};

const STEPS: u32 = 20;

/// `"Loading... NN%"` for a fraction of the loading time.
pub fn progress_label(elapsed: Duration, total: Duration) -> String {
    let progress = if total.is_zero() {
        1.0
    } else {
        (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
    };
    format!("Loading... {:.0}%", progress * 100.0)
}

/// Draws a progress bar that fills over `duration`, then announces `destination`.
pub async fn show(out: &mut impl Write, duration: Duration, destination: &str) -> io::Result<()> {
    log::trace!("[loading] Loading {destination} over {}ms...", duration.as_millis());
    let step = duration / STEPS;

    for i in 0..=STEPS {
        write!(out, "\r{}", progress_label(step * i, duration))?;
        out.flush()?;

        if i < STEPS && !step.is_zero() {
            sleep(step).await;
        }
    }

    writeln!(out, "\r{destination} ready.      ")?;
    Ok(())
}
