//! Construction-time configuration: default constants, resize policy and
//! validation errors.

use core::fmt;

/// Bucket count used by `ChainedHashMap::new`.
pub const DEFAULT_CAPACITY: usize = 4;

/// Load factor threshold used by `ResizePolicy::grow`.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Smallest load factor threshold `ResizePolicy::Grow` accepts.
pub const MIN_LOAD_FACTOR: f64 = 1.0 / (1u64 << 20) as f64;

/// Upper bound on the bucket count. `Grow` stops doubling here and chains
/// instead; constructors and `rebucket` reject anything larger.
pub const MAX_BUCKET_COUNT: usize = 1 << 28;

/// What happens to the bucket array as entries accumulate.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum ResizePolicy {
    /// The bucket count is fixed at construction. Chains grow without bound.
    #[default]
    Fixed,
    /// Double the bucket count before an insert would push
    /// `len / bucket_count` above `max_load_factor`.
    Grow { max_load_factor: f64 },
}

impl ResizePolicy {
    /// `Grow` with `DEFAULT_LOAD_FACTOR`.
    pub const fn grow() -> Self {
        ResizePolicy::Grow {
            max_load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    /// Load factor at which a resize happens, if any.
    pub fn threshold(&self) -> Option<f64> {
        match *self {
            ResizePolicy::Fixed => None,
            ResizePolicy::Grow { max_load_factor } => Some(max_load_factor),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            ResizePolicy::Fixed => Ok(()),
            ResizePolicy::Grow { max_load_factor } => {
                if max_load_factor.is_finite() && max_load_factor >= MIN_LOAD_FACTOR {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidLoadFactor(max_load_factor))
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A map needs at least one bucket.
    ZeroCapacity,
    /// Load factor thresholds must be finite and at least `MIN_LOAD_FACTOR`.
    InvalidLoadFactor(f64),
    /// More buckets than `MAX_BUCKET_COUNT`.
    TooManyBuckets(usize),
}

impl ConfigError {
    pub(crate) fn check_bucket_count(bucket_count: usize) -> Result<(), ConfigError> {
        match bucket_count {
            0 => Err(ConfigError::ZeroCapacity),
            n if n > MAX_BUCKET_COUNT => Err(ConfigError::TooManyBuckets(n)),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCapacity => f.write_str("bucket capacity must be at least 1"),
            ConfigError::InvalidLoadFactor(lf) => {
                write!(
                    f,
                    "load factor must be finite and >= {}, got {}",
                    MIN_LOAD_FACTOR, lf
                )
            }
            ConfigError::TooManyBuckets(n) => {
                write!(f, "{} buckets exceeds the limit of {}", n, MAX_BUCKET_COUNT)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Builder-style configuration for `ChainedHashMap::with_config`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MapConfig {
    capacity: usize,
    resize: ResizePolicy,
}

impl MapConfig {
    pub const fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            resize: ResizePolicy::Fixed,
        }
    }

    /// Number of buckets allocated at construction.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn resize(mut self, policy: ResizePolicy) -> Self {
        self.resize = policy;
        self
    }

    pub fn bucket_capacity(&self) -> usize {
        self.capacity
    }

    pub fn resize_policy(&self) -> ResizePolicy {
        self.resize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_bucket_count(self.capacity)?;
        self.resize.validate()
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new()
    }
}
