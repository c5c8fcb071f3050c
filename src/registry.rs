//! Node factory keyed by kind name

use alloc::boxed::Box;

use hashbrown::HashMap;

use crate::error::{Error, Result};
use crate::node::{GraphNode, NodeId, Sample};
use crate::nodes::{CutoffPrewarp, Meter, MultiMode1p, UniformNoise};

/// Builds a node from `(id, sample_rate, block_size)`.
pub type NodeConstructor<F> = fn(NodeId, f64, usize) -> Box<dyn GraphNode<F>>;

/// Maps node kind names (`"mm1p"`, `"prewarp"`, ...) to constructors.
pub struct NodeRegistry<F: Sample> {
    constructors: HashMap<String, NodeConstructor<F>>,
}

impl<F: Sample> Default for NodeRegistry<F> {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl<F: Sample> NodeRegistry<F> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// A registry with every built-in node kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("prewarp", |id, sr, bs| -> Box<dyn GraphNode<F>> {
            Box::new(CutoffPrewarp::<F>::new(id, sr, bs))
        });
        registry.register("mm1p", |id, sr, bs| -> Box<dyn GraphNode<F>> {
            Box::new(MultiMode1p::<F>::new(id, sr, bs))
        });
        registry.register("rand", |id, sr, bs| -> Box<dyn GraphNode<F>> {
            Box::new(UniformNoise::<F>::new(id, sr, bs))
        });
        registry.register("meter", |id, sr, bs| -> Box<dyn GraphNode<F>> {
            Box::new(Meter::<F>::new(id, sr, bs))
        });
        registry
    }

    /// Register `constructor` under `kind`, returning the one it replaces.
    pub fn register(&mut self, kind: &str, constructor: NodeConstructor<F>) -> Option<NodeConstructor<F>> {
        self.constructors.insert(kind.to_owned(), constructor)
    }

    pub fn create(&self, kind: &str, id: NodeId, sample_rate: f64, block_size: usize) -> Result<Box<dyn GraphNode<F>>> {
        let constructor = self
            .constructors
            .get(kind)
            .ok_or_else(|| Error::UnknownNodeKind(kind.to_owned()))?;

        Ok(constructor(id, sample_rate, block_size))
    }

    #[inline]
    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}
