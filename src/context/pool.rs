use std::sync::Mutex;

use super::ContextState;

/// Freelist of recycled context states.
///
/// Acquire/release happen on every request from concurrent tasks; the
/// freelist is the only mutable state the router shares between them. States
/// keep their parameter-buffer capacity while pooled, so dispatch reuses
/// allocations instead of making new ones.
pub(crate) struct ContextPool {
    free: Mutex<Vec<Box<ContextState>>>,
    limit: usize,
}

impl ContextPool {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            limit,
        }
    }

    /// Pop a recycled state (or build one) and reset it for a request whose
    /// parameter buffer must hold `max_params` values.
    pub(crate) fn acquire(&self, max_params: usize) -> Box<ContextState> {
        let recycled = match self.free.lock() {
            Ok(mut free) => free.pop(),
            Err(poisoned) => poisoned.into_inner().pop(),
        };
        let mut state = recycled.unwrap_or_else(|| Box::new(ContextState::new()));
        state.reset(max_params);
        state
    }

    /// Return a state to the freelist. States past the retention limit are
    /// dropped instead.
    pub(crate) fn release(&self, state: Box<ContextState>) {
        let mut free = match self.free.lock() {
            Ok(free) => free,
            Err(poisoned) => poisoned.into_inner(),
        };
        if free.len() < self.limit {
            free.push(state);
        }
    }

    #[cfg(test)]
    pub(crate) fn pooled(&self) -> usize {
        match self.free.lock() {
            Ok(free) => free.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}
