//! Back-navigation target resolution.
//!
//! Anything that back-navigation may dismiss (open drawers, visible alerts,
//! visible notices) registers a surface here with the z-index it was created
//! with. Resolving picks the surface painted on top, removes it and runs its
//! dismiss action.

use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type DismissFn = Arc<dyn Fn() + Send + Sync>;

struct Surface {
    key: String,
    z_index: Option<i64>,
    dismiss: DismissFn,
}

/// Registration order is kept; later registrations win ties
#[derive(Clone, Default)]
pub struct ClosableRegistry {
    surfaces: Arc<Mutex<Vec<Surface>>>,
}

impl ClosableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Surface>> {
        self.surfaces.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register (or re-register) a dismissible surface under `key`
    pub fn register(&self, key: impl Into<String>, z_index: Option<i64>, dismiss: DismissFn) {
        let key = key.into();
        let mut surfaces = self.lock();
        surfaces.retain(|surface| surface.key != key);
        debug!("closable registered: {} (z={:?})", key, z_index);
        surfaces.push(Surface {
            key,
            z_index,
            dismiss,
        });
    }

    /// Returns true when a surface was registered under `key`
    pub fn deregister(&self, key: &str) -> bool {
        let mut surfaces = self.lock();
        let before = surfaces.len();
        surfaces.retain(|surface| surface.key != key);
        before != surfaces.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().iter().any(|surface| surface.key == key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Key of the surface the next back action would dismiss
    pub fn top(&self) -> Option<String> {
        let surfaces = self.lock();
        select_target(surfaces.iter().map(|surface| surface.z_index))
            .map(|index| surfaces[index].key.clone())
    }

    /// Dismiss the top-most surface.
    ///
    /// Returns false when nothing is registered, meaning the back action
    /// should fall through to the platform's default navigation.
    pub fn resolve_and_dismiss(&self) -> bool {
        let target = {
            let mut surfaces = self.lock();
            select_target(surfaces.iter().map(|surface| surface.z_index))
                .map(|index| surfaces.remove(index))
        };

        match target {
            Some(surface) => {
                debug!("back navigation dismisses '{}' (z={:?})", surface.key, surface.z_index);
                (surface.dismiss)();
                true
            }
            None => false,
        }
    }
}

/// Index of the surface with the strictly greatest z-index.
///
/// Scans newest-first, so among equal z-indices the most recent registration
/// wins. When no surface carries a z-index the most recent one is chosen.
pub fn select_target<I>(z_indices: I) -> Option<usize>
where
    I: IntoIterator<Item = Option<i64>>,
    I::IntoIter: DoubleEndedIterator + ExactSizeIterator,
{
    let iter = z_indices.into_iter();
    let len = iter.len();
    if len == 0 {
        return None;
    }

    let mut best: Option<(usize, i64)> = None;
    for (index, z_index) in iter.enumerate().rev() {
        if let Some(z) = z_index {
            if best.is_none_or(|(_, max)| z > max) {
                best = Some((index, z));
            }
        }
    }

    Some(best.map_or(len - 1, |(index, _)| index))
}
