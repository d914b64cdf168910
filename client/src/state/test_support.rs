use super::session::Environment;

/// Deterministic ids (`id-1`, `id-2`, ...) and a clock that ticks by one
/// millisecond per read.
#[derive(Debug, Default)]
pub struct SeqEnv {
    next: u64,
    clock: std::cell::Cell<u64>,
}

impl Environment for SeqEnv {
    fn new_id(&mut self) -> String {
        self.next += 1;
        format!("id-{}", self.next)
    }

    fn now_ms(&self) -> u64 {
        let now = self.clock.get() + 1;
        self.clock.set(now);
        now
    }
}
