//! Core node trait and context types.

use core::fmt;

use dasp_sample::FloatSample;

use crate::error::Result;
use crate::props::PropertyStore;
use crate::resources::SharedResourceMap;
use crate::value::{FromValue, Value};

/// Host-assigned identifier of a node, unique within one graph.
///
/// Purely a label. Renders as eight zero-padded lowercase hex digits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl fmt::LowerHex for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        NodeId(id)
    }
}

/// Sample types a node can process.
///
/// Any [`FloatSample`] that can be moved to the audio thread, which in
/// practice means `f32` and `f64`.
pub trait Sample: FloatSample + Send + Sync + 'static {}

impl<F> Sample for F where F: FloatSample + Send + Sync + 'static {}

/// Everything a node gets for one call to [`GraphNode::process`].
///
/// Each entry of `inputs` is one input channel, and `output` holds exactly
/// `num_samples`. Input channels should be at least that long; output past
/// the end of a short channel is silence. The context borrows the host's buffers for the duration of the call only.
#[derive(Debug)]
pub struct BlockContext<'a, F> {
    pub inputs: &'a [&'a [F]],
    pub output: &'a mut [F],
    pub num_samples: usize,
    /// Sample time of the first sample in this block.
    pub sample_time: i64,
}

impl<'a, F: Sample> BlockContext<'a, F> {
    pub fn new(inputs: &'a [&'a [F]], output: &'a mut [F], sample_time: i64) -> Self {
        let num_samples = output.len();
        debug_assert!(inputs.iter().all(|ch| ch.len() >= num_samples));

        Self {
            inputs,
            output,
            num_samples,
            sample_time,
        }
    }

    #[inline]
    pub fn num_input_channels(&self) -> usize {
        self.inputs.len()
    }

    /// Zero the whole output buffer.
    #[inline]
    pub fn silence(&mut self) {
        self.output.iter_mut().for_each(|s| *s = F::EQUILIBRIUM);
    }

    /// Zero the output from sample `start` on.
    ///
    /// Nodes call this after their main loop so that a short input channel
    /// still leaves every output sample written.
    #[inline]
    pub fn silence_from(&mut self, start: usize) {
        if let Some(tail) = self.output.get_mut(start..) {
            tail.iter_mut().for_each(|s| *s = F::EQUILIBRIUM);
        }
    }
}

/// State every node carries: identity, stream format and property store.
///
/// Concrete nodes embed one of these and hand it out through
/// [`GraphNode::base`].
#[derive(Debug)]
pub struct NodeBase {
    id: NodeId,
    sample_rate: f64,
    block_size: usize,
    props: PropertyStore,
}

impl NodeBase {
    pub fn new(id: NodeId, sample_rate: f64, block_size: usize) -> Self {
        Self {
            id,
            sample_rate,
            block_size,
            props: PropertyStore::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn props(&self) -> &PropertyStore {
        &self.props
    }

    /// Store `value` under `key`. This is the behaviour every node falls back
    /// to for keys it does not intercept.
    pub fn set_property(&mut self, key: &str, value: &Value) {
        self.props.set(key, value.clone());
    }

    pub fn get_property_with_default<T: FromValue>(&self, key: &str, default: T) -> Result<T> {
        self.props.get_or(key, default)
    }
}

/// A single audio processing operation within the larger graph.
///
/// # Threads
///
/// [`process`](Self::process) runs on the audio thread, once per block and
/// never re-entrantly. Everything else runs on a control thread. Since these
/// methods take `&mut self`, the host serializes them with `process`; state
/// that a control thread must change *while* the node is processing lives in
/// atomics the node hands out (see
/// [`MultiMode1p::mode_handle`](crate::nodes::MultiMode1p::mode_handle)).
///
/// # Implementing
///
/// ```
/// use knoten::{BlockContext, GraphNode, NodeBase, NodeId};
///
/// struct Invert {
///     base: NodeBase,
/// }
///
/// impl GraphNode<f32> for Invert {
///     fn base(&self) -> &NodeBase { &self.base }
///     fn base_mut(&mut self) -> &mut NodeBase { &mut self.base }
///
///     fn process(&mut self, ctx: &mut BlockContext<'_, f32>) {
///         let inputs = ctx.inputs;
///         match inputs.first() {
///             Some(x) => ctx.output.iter_mut().zip(x.iter()).for_each(|(o, &i)| *o = -i),
///             None => ctx.silence(),
///         }
///     }
/// }
///
/// let mut node = Invert { base: NodeBase::new(NodeId(1), 48000.0, 4) };
/// let x = [1.0, -0.5, 0.0, 2.0];
/// let inputs: [&[f32]; 1] = [&x];
/// let mut out = [0.0; 4];
/// node.process(&mut BlockContext::new(&inputs, &mut out, 0));
/// assert_eq!(out, [-1.0, 0.5, 0.0, -2.0]);
/// ```
pub trait GraphNode<F: Sample>: Send + 'static {
    fn base(&self) -> &NodeBase;

    fn base_mut(&mut self) -> &mut NodeBase;

    #[inline]
    fn id(&self) -> NodeId {
        self.base().id()
    }

    #[inline]
    fn sample_rate(&self) -> f64 {
        self.base().sample_rate()
    }

    #[inline]
    fn block_size(&self) -> usize {
        self.base().block_size()
    }

    fn properties(&self) -> &PropertyStore {
        self.base().props()
    }

    /// Set a property from the control thread.
    ///
    /// The default only stores the value. Nodes override this to translate
    /// keys they care about into audio-thread state, and call
    /// [`NodeBase::set_property`] for the rest.
    fn set_property(&mut self, key: &str, value: &Value) -> Result<()> {
        self.base_mut().set_property(key, value);
        Ok(())
    }

    /// Like [`set_property`](Self::set_property), with access to resources
    /// shared across nodes. The default ignores them.
    fn set_property_with_resources(
        &mut self,
        key: &str,
        value: &Value,
        _resources: &mut SharedResourceMap<F>,
    ) -> Result<()> {
        self.set_property(key, value)
    }

    /// Process the next block.
    ///
    /// Must not block, allocate or panic, and must write every sample of
    /// `ctx.output`. Missing inputs produce silence.
    fn process(&mut self, ctx: &mut BlockContext<'_, F>);

    /// Relay events gathered during earlier `process` calls.
    fn process_events(&mut self, _handler: &mut dyn FnMut(&str, Value)) {}

    /// Clear accumulated audio-rate state.
    fn reset(&mut self) {}
}

/// Typed property lookup for every node, boxed or not.
pub trait GraphNodeExt<F: Sample>: GraphNode<F> {
    /// Read `key` as a `T`, or `default` when it was never set.
    ///
    /// A stored value of the wrong type is an [`Error::TypeMismatch`](crate::Error::TypeMismatch).
    fn get_property_with_default<T: FromValue>(&self, key: &str, default: T) -> Result<T> {
        self.base().get_property_with_default(key, default)
    }
}

impl<F: Sample, N: GraphNode<F> + ?Sized> GraphNodeExt<F> for N {}

/// Narrow an `f64` result to the node's sample type.
#[inline(always)]
pub(crate) fn to_sample<F: Sample>(x: f64) -> F {
    F::from_sample(x)
}

/// Widen a sample to `f64` for internal arithmetic.
#[inline(always)]
pub(crate) fn to_f64<F: Sample>(s: F) -> f64 {
    s.to_sample::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct Dc {
        base: NodeBase,
    }

    impl GraphNode<f64> for Dc {
        fn base(&self) -> &NodeBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut NodeBase {
            &mut self.base
        }

        fn process(&mut self, ctx: &mut BlockContext<'_, f64>) {
            ctx.output.iter_mut().for_each(|s| *s = 1.0);
        }
    }

    fn dc() -> Dc {
        Dc {
            base: NodeBase::new(NodeId(0x2a), 44100.0, 128),
        }
    }

    #[test]
    fn id_renders_as_padded_hex() {
        assert_eq!(NodeId(0).to_string(), "00000000");
        assert_eq!(NodeId(0xbeef).to_string(), "0000beef");
        assert_eq!(NodeId(0x12345678).to_string(), "12345678");
        assert_eq!(format!("{:x}", NodeId(255)), "ff");
    }

    #[test]
    fn accessors_return_construction_values() {
        let mut node = dc();
        assert_eq!(node.id(), NodeId(0x2a));
        assert_eq!(node.sample_rate(), 44100.0);
        assert_eq!(node.block_size(), 128);

        node.set_property("anything", &Value::from(1.0)).unwrap();
        node.reset();
        assert_eq!(node.id(), NodeId(0x2a));
        assert_eq!(node.sample_rate(), 44100.0);
        assert_eq!(node.block_size(), 128);
    }

    #[test]
    fn default_set_property_stores() {
        let mut node = dc();
        assert_eq!(node.get_property_with_default("level", 0.0).unwrap(), 0.0);

        node.set_property("level", &Value::from(0.75)).unwrap();
        assert_eq!(node.get_property_with_default("level", 0.0).unwrap(), 0.75);
        assert_eq!(node.get_property_with_default("level", 0.0).unwrap(), 0.75);
    }

    #[test]
    fn resources_overload_delegates() {
        let mut node = dc();
        let mut resources = SharedResourceMap::new();
        node.set_property_with_resources("name", &Value::from("dc"), &mut resources)
            .unwrap();

        assert_eq!(node.properties().get("name"), Some(&Value::from("dc")));
        assert!(resources.is_empty());
    }

    #[test]
    fn coercion_failure_through_dyn() {
        let mut node: Box<dyn GraphNode<f64>> = Box::new(dc());
        node.set_property("level", &Value::from("loud")).unwrap();

        let err = node.get_property_with_default("level", 1.0f64).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { found: "string", .. }));

        node.set_property("level", &Value::from(0.5)).unwrap();
        assert_eq!(node.get_property_with_default("level", 1.0f64).unwrap(), 0.5);
        assert_eq!(node.get_property_with_default("missing", 1.0f64).unwrap(), 1.0);
    }

    fn boxed<F: Sample>(node: impl GraphNode<F>) -> Box<dyn GraphNode<F>> {
        Box::new(node)
    }

    #[test]
    fn nodes_box_and_cross_threads() {
        let node = boxed(dc());
        let node = std::thread::spawn(move || node).join().unwrap();
        assert_eq!(node.id(), NodeId(0x2a));
    }

    #[test]
    fn silence_from_clears_tail_only() {
        let inputs: [&[f32]; 0] = [];
        let mut out = [0.5f32; 6];
        let mut ctx = BlockContext::new(&inputs, &mut out, 0);
        ctx.silence_from(4);
        ctx.silence_from(10);
        assert_eq!(out, [0.5, 0.5, 0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn default_events_and_reset_are_noops() {
        let mut node = dc();
        let mut seen = 0;
        node.process_events(&mut |_: &str, _: Value| seen += 1);
        node.reset();
        assert_eq!(seen, 0);

        let inputs: [&[f64]; 0] = [];
        let mut out = [0.0; 8];
        node.process(&mut BlockContext::new(&inputs, &mut out, 0));
        assert!(out.iter().all(|&s| s == 1.0));
    }
}
