//! Keyboard speed control for the full UI.
//!
//! `+` and `-` move the speed control value by one nudge and retune the shared
//! scheduler, so the next step picks up the new delay. `q` is ignored while a
//! run is in flight and ends the session once it has finished.

use console::Term;
use sortviz::scheduler::{SpeedControl, StepScheduler};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use tracing::debug;

/// Handle to the key reader thread.
pub struct SpeedKeys {
    finished: Arc<AtomicBool>,
    quit_rx: mpsc::Receiver<()>,
}

impl SpeedKeys {
    /// Start reading keys, or return `None` when stdout is not a terminal.
    pub fn spawn(scheduler: StepScheduler, control: SpeedControl) -> Option<Self> {
        let term = Term::stdout();
        if !term.is_term() {
            return None;
        }

        let finished = Arc::new(AtomicBool::new(false));
        let (quit_tx, quit_rx) = mpsc::channel();
        let thread_finished = finished.clone();

        std::thread::spawn(move || {
            let mut value = control.value_for(scheduler.delay());
            while let Ok(key) = term.read_char() {
                let next = match key {
                    '+' | '=' => (value + control.nudge()).min(control.control_max),
                    '-' | '_' => value.saturating_sub(control.nudge()),
                    'q' | 'Q' => {
                        if thread_finished.load(Ordering::SeqCst) {
                            quit_tx.send(()).ok();
                            return;
                        }
                        continue;
                    }
                    _ => continue,
                };
                if let Ok(delay) = scheduler.set_control_value(&control, next) {
                    value = next;
                    debug!(value, delay_ms = delay.as_millis() as u64, "Speed changed");
                }
            }
        });

        Some(Self { finished, quit_rx })
    }

    /// Mark the run finished and block until the user presses `q`.
    pub async fn wait_for_quit(self) {
        self.finished.store(true, Ordering::SeqCst);
        let quit_rx = self.quit_rx;
        tokio::task::spawn_blocking(move || quit_rx.recv().ok())
            .await
            .ok();
    }
}
