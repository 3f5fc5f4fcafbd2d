//! One-shot asset load completion
//!
//! Streamed assets (the vehicle model, audio buffers) resolve asynchronously
//! outside the core. The core only polls "loaded?" and obtains a reference
//! once ready. A failed load is terminal: the slot stays unusable forever and
//! dependents must treat "not loaded" as a valid steady state rather than an
//! error to recover from.

use thiserror::Error;

/// Asset loading failures reported by the host's loader
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset fetch failed: {0}")]
    Fetch(String),
    #[error("asset decode failed: {0}")]
    Decode(String),
}

/// Completion state of a streamed asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loaded,
    Failed,
}

/// A slot the host's asset loader fills in exactly once.
///
/// `T` is whatever handle the presentation layer hands back (a mesh id, a
/// buffer key). The core never inspects it, it only gates logic on
/// [`AssetSlot::is_loaded`].
#[derive(Debug)]
pub struct AssetSlot<T> {
    value: Option<T>,
    state: LoadState,
}

impl<T> Default for AssetSlot<T> {
    fn default() -> Self {
        Self::pending()
    }
}

impl<T> AssetSlot<T> {
    /// A slot still waiting on the loader
    pub fn pending() -> Self {
        Self {
            value: None,
            state: LoadState::NotLoaded,
        }
    }

    /// A slot that never needed loading (cube player, procedural assets)
    pub fn ready(value: T) -> Self {
        Self {
            value: Some(value),
            state: LoadState::Loaded,
        }
    }

    /// Complete the load. Later calls are ignored; the first outcome wins.
    pub fn fulfill(&mut self, value: T) {
        if self.state == LoadState::NotLoaded {
            self.value = Some(value);
            self.state = LoadState::Loaded;
        }
    }

    /// Mark the load as failed. The slot stays empty indefinitely.
    pub fn fail(&mut self, err: AssetError) {
        if self.state == LoadState::NotLoaded {
            log::warn!("asset load failed, entity stays unloaded: {err}");
            self.state = LoadState::Failed;
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }
}
