/// Fast 2-value hash with xorshift
#[inline(always)]
pub fn hash2(a: u64, b: u64) -> u64 {
    let mut seed = a.wrapping_mul(2654435761).wrapping_add(b.wrapping_mul(2246822519));
    seed ^= seed << 13;
    seed ^= seed >> 7;
    seed ^= seed << 17;
    seed
}

/// splitmix64 finalizer, spreads small differences over all bits
#[inline(always)]
pub fn mix(seed: u64) -> u64 {
    let mut x = seed.wrapping_mul(0x9e3779b97f4a7c15);
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    x
}

/// Order-sensitive running hash over a sequence of words
#[derive(Clone, Copy)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn new() -> Self {
        Self(0x243f6a8885a308d3)
    }

    pub fn word(self, value: u64) -> Self {
        Self(mix(hash2(self.0, value)))
    }

    pub fn float(self, value: f64) -> Self {
        // -0.0 and 0.0 draw the same map
        let value = if value == 0.0 { 0.0 } else { value };
        self.word(value.to_bits())
    }

    pub fn str(self, value: &str) -> Self {
        value
            .bytes()
            .fold(self.word(value.len() as u64), |fp, b| fp.word(b as u64))
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self::new()
    }
}
