//! Resources shared between nodes (sample tables, impulse responses, ...).

use alloc::sync::Arc;

use hashbrown::HashMap;

/// Name → immutable sample data, shared by reference count.
///
/// Only touched on the control thread, while setting properties. A node that
/// needs the data on the audio thread keeps its own `Arc` clone.
#[derive(Debug)]
pub struct SharedResourceMap<F> {
    resources: HashMap<String, Arc<[F]>>,
}

impl<F> Default for SharedResourceMap<F> {
    fn default() -> Self {
        Self {
            resources: HashMap::new(),
        }
    }
}

impl<F> SharedResourceMap<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `data` under `name` unless the name is taken.
    ///
    /// Existing resources are immutable, so returns `false` and leaves the
    /// map untouched when `name` is already present.
    pub fn add(&mut self, name: &str, data: Arc<[F]>) -> bool {
        if self.resources.contains_key(name) {
            return false;
        }

        self.resources.insert(name.to_owned(), data);
        true
    }

    pub fn get(&self, name: &str) -> Option<Arc<[F]>> {
        self.resources.get(name).cloned()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Drop every resource no node holds a reference to anymore.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self) -> usize {
        let before = self.resources.len();
        self.resources.retain(|_, data| Arc::strong_count(data) > 1);
        before - self.resources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_does_not_replace() {
        let mut map = SharedResourceMap::<f32>::new();
        assert!(map.add("ir", Arc::from(vec![1.0, 0.5])));
        assert!(!map.add("ir", Arc::from(vec![0.0])));
        assert_eq!(&*map.get("ir").unwrap(), &[1.0, 0.5]);
    }

    #[test]
    fn prune_keeps_referenced() {
        let mut map = SharedResourceMap::<f64>::new();
        map.add("a", Arc::from(vec![1.0]));
        map.add("b", Arc::from(vec![2.0]));

        let held = map.get("a");
        assert_eq!(map.prune(), 1);
        assert!(map.contains("a"));
        assert!(!map.contains("b"));
        drop(held);

        assert_eq!(map.prune(), 1);
        assert!(map.is_empty());
    }
}
