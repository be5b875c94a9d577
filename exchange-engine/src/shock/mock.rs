use super::ShockSource;

/// Always returns the same shock, clamped to the requested bound.
#[derive(Debug, Clone, Copy)]
pub struct FixedShock(pub f64);

impl FixedShock {
    pub fn none() -> Self {
        Self(0.0)
    }
}

impl ShockSource for FixedShock {
    fn draw(&self, bound: f64) -> f64 {
        let bound = bound.abs();
        self.0.clamp(-bound, bound)
    }
}
