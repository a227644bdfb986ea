use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

const PERIOD: usize = 256;

/// Seeded two-dimensional gradient noise with values in `0.0..=1.0`.
///
/// The field repeats every 256 units along each axis.
#[derive(Clone)]
pub struct PerlinNoise {
    permutation: [u8; PERIOD * 2],
}

impl PerlinNoise {
    /// Builds the permutation table for the provided seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut values: Vec<u8> = (0..=u8::MAX).collect();
        values.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));

        let mut permutation = [0u8; PERIOD * 2];
        for (slot, value) in permutation.iter_mut().zip(values.iter().cycle()) {
            *slot = *value;
        }
        Self { permutation }
    }

    /// Samples the noise field.
    #[must_use]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let x_floor = x.floor();
        let y_floor = y.floor();
        let xi = wrap(x_floor);
        let yi = wrap(y_floor);
        let x = x - x_floor;
        let y = y - y_floor;
        let u = fade(x);
        let v = fade(y);

        let aa = self.hash(self.hash(xi) + yi);
        let ab = self.hash(self.hash(xi) + yi + 1);
        let ba = self.hash(self.hash(xi + 1) + yi);
        let bb = self.hash(self.hash(xi + 1) + yi + 1);

        let top = lerp(u, gradient(aa, x, y), gradient(ba, x - 1.0, y));
        let bottom = lerp(u, gradient(ab, x, y - 1.0), gradient(bb, x - 1.0, y - 1.0));
        let value = lerp(v, top, bottom);

        ((value + 1.0) / 2.0).clamp(0.0, 1.0)
    }

    fn hash(&self, index: usize) -> usize {
        usize::from(self.permutation[index])
    }
}

impl std::fmt::Debug for PerlinNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerlinNoise").finish_non_exhaustive()
    }
}

fn wrap(value: f32) -> usize {
    (value as i64).rem_euclid(PERIOD as i64) as usize
}

fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

fn gradient(hash: usize, x: f32, y: f32) -> f32 {
    match hash & 3 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        _ => -x - y,
    }
}
