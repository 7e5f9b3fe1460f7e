use gloo_timers::callback::Timeout;

/// Holds at most one pending browser timeout.
///
/// Scheduling cancels whatever was pending. Dropping the holder cancels too,
/// so a timer never outlives the component that owns it.
#[derive(Default)]
pub struct Debounce {
    pending: Option<Timeout>,
}

impl Debounce {
    pub fn schedule(&mut self, delay_ms: u32, f: impl FnOnce() + 'static) {
        self.cancel();
        self.pending = Some(Timeout::new(delay_ms, f));
    }

    pub fn cancel(&mut self) {
        // Dropping a gloo Timeout clears it
        drop(self.pending.take());
    }
}
