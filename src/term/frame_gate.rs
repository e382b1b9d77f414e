/// Decides whether a frame is worth flushing to the terminal.
///
/// Animating frames always draw. Static frames draw when the snapshot
/// fingerprint moved, otherwise at most once per idle interval so the
/// clock-less parts of the panel still refresh.
#[derive(Debug, Clone)]
pub struct FrameGate {
    idle_interval_ms: u64,
    last_draw_ms: u64,
    last_fingerprint: u64,
    has_drawn: bool,
}

impl FrameGate {
    pub fn new(idle_interval_ms: u64) -> Self {
        Self {
            idle_interval_ms,
            last_draw_ms: 0,
            last_fingerprint: 0,
            has_drawn: false,
        }
    }

    pub fn should_draw(&mut self, now_ms: u64, fingerprint: u64, animating: bool) -> bool {
        if !self.has_drawn {
            self.has_drawn = true;
            self.last_draw_ms = now_ms;
            self.last_fingerprint = fingerprint;
            return true;
        }

        if animating {
            self.last_draw_ms = now_ms;
            self.last_fingerprint = fingerprint;
            return true;
        }

        if fingerprint != self.last_fingerprint {
            self.last_draw_ms = now_ms;
            self.last_fingerprint = fingerprint;
            return true;
        }

        if now_ms.saturating_sub(self.last_draw_ms) >= self.idle_interval_ms {
            self.last_draw_ms = now_ms;
            return true;
        }

        false
    }
}
