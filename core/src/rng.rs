use rand::Rng;

// Scalar random source used by foliage placement.
// Anything implementing `rand::Rng` works, so tests can pass a seeded StdRng.
pub trait RandomSource {
    // Uniform value in [min, max). Returns `min` for an empty range.
    fn get_random(&mut self, min: f32, max: f32) -> f32;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn get_random(&mut self, min: f32, max: f32) -> f32 {
        if !(max > min) {
            return min;
        }
        self.random_range(min..max)
    }
}
