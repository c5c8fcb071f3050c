//! Minimal node host
//!
//! Owns nodes by id and drives them through the [`GraphNode`] contract:
//! creation from the registry, property updates with access to shared
//! resources, event relay, resets, and per-node block rendering with a
//! running sample clock. Wiring and scheduling are left to the caller.

use alloc::boxed::Box;
use alloc::sync::Arc;

use hashbrown::HashMap;

use crate::error::{Error, Result};
use crate::node::{BlockContext, GraphNode, NodeId, Sample};
use crate::registry::NodeRegistry;
use crate::resources::SharedResourceMap;
use crate::value::Value;

/// Stream format every node created by a [`NodeHost`] is bound to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostConfig {
    /// Sample rate in Hz (e.g., 44100, 48000)
    pub sample_rate: f64,
    /// Largest block the host will ask a node to render
    pub block_size: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            block_size: 512,
        }
    }
}

impl HostConfig {
    pub fn new(sample_rate: f64, block_size: usize) -> Self {
        Self {
            sample_rate,
            block_size,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }
}

struct NodeSlot<F: Sample> {
    node: Box<dyn GraphNode<F>>,
    kind: String,
    /// Sample time of the next block this node renders
    sample_time: i64,
}

/// Owns a set of nodes and routes control and audio calls to them.
///
/// Control operations take `&mut self`, so property writes, resets and event
/// flushes are always serialized with rendering. A host that renders on a
/// dedicated audio thread should hand lock-free state (such as
/// [`ModeHandle`](crate::nodes::ModeHandle)) to its control thread instead
/// of sharing the host.
pub struct NodeHost<F: Sample> {
    config: HostConfig,
    registry: NodeRegistry<F>,
    resources: SharedResourceMap<F>,
    nodes: HashMap<NodeId, NodeSlot<F>>,
}

impl<F: Sample> NodeHost<F> {
    /// Create a host with every built-in node kind available.
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            registry: NodeRegistry::with_builtins(),
            resources: SharedResourceMap::new(),
            nodes: HashMap::new(),
        }
    }

    /// Replace the node registry (builder pattern).
    pub fn with_registry(mut self, registry: NodeRegistry<F>) -> Self {
        self.registry = registry;
        self
    }

    #[inline]
    pub fn config(&self) -> HostConfig {
        self.config
    }

    pub fn registry_mut(&mut self) -> &mut NodeRegistry<F> {
        &mut self.registry
    }

    /// Instantiate a node of `kind` under `id`.
    pub fn create_node(&mut self, id: NodeId, kind: &str) -> Result<()> {
        if self.nodes.contains_key(&id) {
            return Err(Error::DuplicateNode(id));
        }

        let node = self
            .registry
            .create(kind, id, self.config.sample_rate, self.config.block_size)
            .map_err(|e| {
                tracing::warn!(node = %id, kind, "cannot create node: {}", e);
                e
            })?;

        tracing::debug!(node = %id, kind, "created node");
        self.nodes.insert(
            id,
            NodeSlot {
                node,
                kind: kind.to_owned(),
                sample_time: 0,
            },
        );
        Ok(())
    }

    /// Take a node out of the host.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Box<dyn GraphNode<F>>> {
        let slot = self.nodes.remove(&id).ok_or(Error::NodeNotFound(id))?;
        tracing::debug!(node = %id, kind = %slot.kind, "removed node");
        Ok(slot.node)
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&dyn GraphNode<F>> {
        self.nodes.get(&id).map(|slot| slot.node.as_ref())
    }

    /// Kind name the node was created from.
    pub fn kind(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|slot| slot.kind.as_str())
    }

    /// Sample time the node's next block will start at.
    pub fn sample_time(&self, id: NodeId) -> Option<i64> {
        self.nodes.get(&id).map(|slot| slot.sample_time)
    }

    /// Forward a property to a node, giving it access to shared resources.
    pub fn set_property(&mut self, id: NodeId, key: &str, value: &Value) -> Result<()> {
        let slot = self.nodes.get_mut(&id).ok_or(Error::NodeNotFound(id))?;
        tracing::trace!(node = %id, key, %value, "set property");
        slot.node
            .set_property_with_resources(key, value, &mut self.resources)
    }

    /// Register a resource. Returns `false` if the name is already taken.
    pub fn add_shared_resource(&mut self, name: &str, data: Arc<[F]>) -> bool {
        let added = self.resources.add(name, data);
        if !added {
            tracing::debug!(name, "shared resource already exists, keeping the original");
        }
        added
    }

    pub fn resources(&self) -> &SharedResourceMap<F> {
        &self.resources
    }

    /// Drop shared resources no node references anymore.
    pub fn prune_resources(&mut self) -> usize {
        self.resources.prune()
    }

    pub fn reset(&mut self, id: NodeId) -> Result<()> {
        let slot = self.nodes.get_mut(&id).ok_or(Error::NodeNotFound(id))?;
        tracing::debug!(node = %id, "reset");
        slot.node.reset();
        Ok(())
    }

    pub fn reset_all(&mut self) {
        tracing::debug!(nodes = self.nodes.len(), "reset all");
        for slot in self.nodes.values_mut() {
            slot.node.reset();
        }
    }

    /// Relay every node's pending events, tagged with the node's id.
    ///
    /// Nodes are visited in no particular order.
    pub fn process_queued_events(&mut self, handler: &mut dyn FnMut(NodeId, &str, Value)) {
        for (&id, slot) in self.nodes.iter_mut() {
            slot.node
                .process_events(&mut |name: &str, value: Value| handler(id, name, value));
        }
    }

    /// Render one block of node `id` into `output`.
    ///
    /// `output.len()` is the block length; it may not exceed the configured
    /// block size and every input channel must be at least that long. The
    /// node's sample clock advances by the block length.
    pub fn render(&mut self, id: NodeId, inputs: &[&[F]], output: &mut [F]) -> Result<()> {
        if output.len() > self.config.block_size {
            return Err(Error::Invariant("block exceeds the configured block size"));
        }

        if inputs.iter().any(|ch| ch.len() < output.len()) {
            return Err(Error::Invariant("input channel shorter than the output block"));
        }

        let slot = self.nodes.get_mut(&id).ok_or(Error::NodeNotFound(id))?;
        let num_samples = output.len();

        let mut ctx = BlockContext::new(inputs, output, slot.sample_time);
        slot.node.process(&mut ctx);
        slot.sample_time += num_samples as i64;

        Ok(())
    }
}

impl<F: Sample> Default for NodeHost<F> {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> NodeHost<f32> {
        NodeHost::new(HostConfig::new(48000.0, 8))
    }

    #[test]
    fn nodes_are_bound_to_host_format() {
        let mut host = host();
        host.create_node(NodeId(1), "mm1p").unwrap();

        let node = host.node(NodeId(1)).unwrap();
        assert_eq!(node.sample_rate(), 48000.0);
        assert_eq!(node.block_size(), 8);
        assert_eq!(host.kind(NodeId(1)), Some("mm1p"));
    }

    #[test]
    fn duplicate_and_missing_ids() {
        let mut host = host();
        host.create_node(NodeId(1), "rand").unwrap();

        assert_eq!(host.create_node(NodeId(1), "mm1p"), Err(Error::DuplicateNode(NodeId(1))));
        assert_eq!(host.reset(NodeId(2)), Err(Error::NodeNotFound(NodeId(2))));
        assert_eq!(
            host.create_node(NodeId(3), "nope"),
            Err(Error::UnknownNodeKind("nope".into()))
        );
        assert_eq!(host.len(), 1);

        assert!(host.remove_node(NodeId(1)).is_ok());
        assert!(host.is_empty());
    }

    #[test]
    fn render_advances_clock() {
        let mut host = host();
        host.create_node(NodeId(1), "rand").unwrap();

        let mut out = [0.0f32; 8];
        host.render(NodeId(1), &[], &mut out).unwrap();
        host.render(NodeId(1), &[], &mut out[..5]).unwrap();
        assert_eq!(host.sample_time(NodeId(1)), Some(13));
    }

    #[test]
    fn render_rejects_bad_buffers() {
        let mut host = host();
        host.create_node(NodeId(1), "prewarp").unwrap();

        let mut big = [0.0f32; 16];
        assert!(matches!(host.render(NodeId(1), &[], &mut big), Err(Error::Invariant(_))));

        let short = [100.0f32; 4];
        let inputs: [&[f32]; 1] = [&short];
        let mut out = [0.0f32; 8];
        assert!(matches!(
            host.render(NodeId(1), &inputs, &mut out),
            Err(Error::Invariant(_))
        ));
        assert_eq!(host.sample_time(NodeId(1)), Some(0));
    }

    #[test]
    fn shared_resources_are_kept_once() {
        let mut host = host();
        assert!(host.add_shared_resource("table", Arc::from(vec![0.0f32, 1.0])));
        assert!(!host.add_shared_resource("table", Arc::from(vec![2.0f32])));
        assert_eq!(&*host.resources().get("table").unwrap(), &[0.0, 1.0]);
        assert_eq!(host.prune_resources(), 1);
    }

    #[test]
    fn events_are_tagged_with_node() {
        let mut host = host();
        host.create_node(NodeId(0xa), "meter").unwrap();
        host.create_node(NodeId(0xb), "mm1p").unwrap();

        let x = [0.5f32; 8];
        let inputs: [&[f32]; 1] = [&x];
        let mut out = [0.0f32; 8];
        host.render(NodeId(0xa), &inputs, &mut out).unwrap();

        let mut events = Vec::new();
        host.process_queued_events(&mut |id: NodeId, name: &str, value: Value| {
            events.push((id, name.to_owned(), value))
        });

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, NodeId(0xa));
        assert_eq!(events[0].1, "meter");
    }
}
