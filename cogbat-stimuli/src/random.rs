use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};
use uuid::Builder;

/// Uniform randomness consumed by every generator.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..n`. `n` must be non-zero.
    fn below(&mut self, n: usize) -> usize {
        debug_assert!(n > 0);
        ((self.next_f64() * n as f64) as usize).min(n.saturating_sub(1))
    }

    /// Uniform draw in `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
    fn below(&mut self, n: usize) -> usize {
        (**self).below(n)
    }
}

/// Production source: the thread-local `rand` generator.
pub type ThreadSource = RngSource<ThreadRng>;

/// Adapts any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RngSource<ThreadRng> {
    pub fn thread() -> Self {
        Self(rand::rng())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_f64(&mut self) -> f64 {
        self.0.random::<f64>()
    }

    fn below(&mut self, n: usize) -> usize {
        self.0.random_range(0..n)
    }
}

/// Replays a fixed list of draws, cycling when it runs out.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    pos: usize,
}

impl SequenceSource {
    /// Values are clamped into `[0, 1)`. An empty list always yields 0.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let values = values
            .into()
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values, pos: 0 }
    }
}

impl RandomSource for SequenceSource {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }
}

/// Random version-4 UUID in canonical hyphenated form, drawn from `rng`
/// so seeded sessions get reproducible ids.
pub fn uuid_v4<R: RandomSource + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    for b in &mut bytes {
        *b = rng.below(256) as u8;
    }
    Builder::from_random_bytes(bytes).into_uuid().to_string()
}

/// Unbiased in-place Fisher-Yates shuffle.
pub fn shuffle<T, R: RandomSource + ?Sized>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.below(i + 1);
        items.swap(i, j);
    }
}

/// `n` distinct elements of `pool` in random order; `n` is capped at the pool size.
pub fn sample<T: Clone, R: RandomSource + ?Sized>(rng: &mut R, pool: &[T], n: usize) -> Vec<T> {
    let mut all = pool.to_vec();
    shuffle(rng, &mut all);
    all.truncate(n);
    all
}
