//! Growth configuration.

use crate::error::MapError;

/// When the map grows, and by how much.
///
/// Before every `put` the map computes `len / capacity`; once that reaches
/// `max_load_factor` the root array is multiplied by `growth_factor` and
/// every entry is rehashed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthPolicy {
    max_load_factor: f64,
    growth_factor: usize,
}

impl GrowthPolicy {
    pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.9;
    pub const DEFAULT_GROWTH_FACTOR: usize = 2;

    pub fn new(max_load_factor: f64, growth_factor: usize) -> Result<Self, MapError> {
        if !max_load_factor.is_finite() || max_load_factor <= 0.0 {
            return Err(MapError::InvalidArgument(
                "max load factor must be finite and positive",
            ));
        }
        validate_factor(growth_factor)?;
        Ok(Self {
            max_load_factor,
            growth_factor,
        })
    }

    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    pub fn growth_factor(&self) -> usize {
        self.growth_factor
    }

    pub(crate) fn should_grow(&self, len: usize, capacity: usize) -> bool {
        len as f64 / capacity as f64 >= self.max_load_factor
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            max_load_factor: Self::DEFAULT_MAX_LOAD_FACTOR,
            growth_factor: Self::DEFAULT_GROWTH_FACTOR,
        }
    }
}

pub(crate) fn validate_factor(factor: usize) -> Result<(), MapError> {
    if factor < 2 {
        return Err(MapError::InvalidArgument("growth factor must be at least 2"));
    }
    Ok(())
}
