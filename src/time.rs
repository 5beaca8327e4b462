// src/time.rs
//! Frame clock. Feeds the render loop callback with elapsed and delta time
//! in milliseconds; the loop itself owns no timing logic.

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

pub struct FrameClock {
    #[cfg(not(target_arch = "wasm32"))]
    start: Instant,
    #[cfg(target_arch = "wasm32")]
    start_ms: f64,
    last_ms: f64,
}

impl FrameClock {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last_ms: 0.0,
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        Self {
            start_ms: performance_now(),
            last_ms: 0.0,
        }
    }

    fn now_ms(&self) -> f64 {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.start.elapsed().as_secs_f64() * 1000.0
        }
        #[cfg(target_arch = "wasm32")]
        {
            performance_now() - self.start_ms
        }
    }

    /// Call once per frame: total milliseconds since start and milliseconds
    /// since the previous tick.
    pub fn tick(&mut self) -> (f32, f32) {
        let now = self.now_ms();
        let delta = now - self.last_ms;
        self.last_ms = now;
        (now as f32, delta as f32)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_grows_and_delta_is_non_negative() {
        let mut clock = FrameClock::new();
        let (elapsed_a, delta_a) = clock.tick();
        let (elapsed_b, delta_b) = clock.tick();

        assert!(elapsed_b >= elapsed_a);
        assert!(delta_a >= 0.0);
        assert!(delta_b >= 0.0);
    }
}
