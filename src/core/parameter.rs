use alloc::sync::Arc;
use core::sync::atomic::{AtomicI32, AtomicU32, Ordering};

/// A thread-safe floating point control value.
///
/// Clones share the same storage, so a control thread can write while the
/// audio thread reads once per block.
#[derive(Clone, Debug)]
pub struct Parameter {
    value: Arc<AtomicU32>,
}

impl Parameter {
    /// Creates a new Parameter with an initial value.
    pub fn new(value: f32) -> Self {
        Parameter {
            value: Arc::new(AtomicU32::new(value.to_bits())),
        }
    }

    /// Sets the parameter value.
    pub fn set(&self, value: f32) {
        self.value.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Gets the current parameter value.
    pub fn get(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Relaxed))
    }
}

/// A thread-safe integer seed shared between a control thread and a generator.
#[derive(Clone, Debug)]
pub struct SeedParameter {
    value: Arc<AtomicI32>,
}

impl SeedParameter {
    pub fn new(seed: i32) -> Self {
        SeedParameter {
            value: Arc::new(AtomicI32::new(seed)),
        }
    }

    pub fn set(&self, seed: i32) {
        self.value.store(seed, Ordering::Relaxed);
    }

    pub fn get(&self) -> i32 {
        self.value.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_value() {
        let a = Parameter::new(2000.0);
        let b = a.clone();
        b.set(440.0);
        assert_eq!(a.get(), 440.0);

        let seed = SeedParameter::new(-1);
        let handle = seed.clone();
        handle.set(42);
        assert_eq!(seed.get(), 42);
    }

    #[test]
    fn test_negative_and_special_values_survive() {
        let p = Parameter::new(-0.0);
        assert!(p.get().is_sign_negative());
        p.set(f32::INFINITY);
        assert_eq!(p.get(), f32::INFINITY);
    }
}
