/// Source of the simulation's randomness: sender selection, failure
/// targets and the collision draw all go through here so runs can be
/// replayed exactly.
pub trait RandomSource {
    /// Uniform index in `0..len`. Callers never pass `len == 0`.
    fn pick_index(&mut self, len: usize) -> usize;

    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    fn chance(&mut self, probability: f64) -> bool {
        probability > 0.0 && self.next_unit() < probability
    }
}
