//! Environment-driven runtime knobs.
//!
//! Routing behavior flags live on [`Router`](crate::Router) itself; this
//! module only covers resource tuning that depends on where the process
//! runs.
//!
//! - `SWBK_STACK_SIZE` — stack size for the server's request coroutines,
//!   decimal or `0x`-prefixed hex. Default `0x10000` (64 KiB).
//! - `SWBK_POOL_LIMIT` — how many request contexts the router keeps pooled.
//!   Default 64.

/// Tunables read from the environment at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size in bytes for request-handling coroutines.
    pub stack_size: usize,
    /// Maximum number of pooled contexts retained between requests.
    pub pool_limit: usize,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let stack_size = std::env::var("SWBK_STACK_SIZE")
            .ok()
            .and_then(|s| {
                if let Some(hex) = s.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).ok()
                } else {
                    s.parse().ok()
                }
            })
            .unwrap_or(0x10000);

        let pool_limit = std::env::var("SWBK_POOL_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(64);

        Self {
            stack_size,
            pool_limit,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: 0x10000,
            pool_limit: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.stack_size, 0x10000);
        assert_eq!(config.pool_limit, 64);
    }
}
