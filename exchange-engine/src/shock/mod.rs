use rand::Rng;

pub mod mock;

/// Source of the random component of a periodic price update.
pub trait ShockSource: Send + Sync {
    /// Draws a relative shock in `[-bound, bound]`.
    fn draw(&self, bound: f64) -> f64;
}

/// Uniform shocks from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformShock;

impl ShockSource for UniformShock {
    fn draw(&self, bound: f64) -> f64 {
        if bound.is_nan() || bound <= 0.0 {
            return 0.0;
        }
        rand::thread_rng().gen_range(-bound..=bound)
    }
}
