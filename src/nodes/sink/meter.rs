//! Peak meter that reports through node events

use core::marker::PhantomData;

use hashbrown::HashMap;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::node::{to_f64, BlockContext, GraphNode, NodeBase, NodeId, Sample};
use crate::value::Value;

/// How many unread block readings a meter holds before dropping new ones.
pub const METER_QUEUE_CAPACITY: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Reading {
    min: f64,
    max: f64,
}

/// Passes channel 0 through and measures each block's minimum and maximum.
///
/// Readings go into a preallocated ring buffer on the audio thread and come
/// out as `"meter"` events in [`process_events`](GraphNode::process_events):
/// `{ "min": number, "max": number, "source": name-or-null }`, where
/// `source` is the node's `"name"` property.
pub struct Meter<F> {
    base: NodeBase,
    readings: Producer<Reading>,
    pending: Consumer<Reading>,
    /// Readings lost to a full queue since the last event flush.
    dropped: usize,
    _sample: PhantomData<F>,
}

impl<F: Sample> Meter<F> {
    pub fn new(id: NodeId, sample_rate: f64, block_size: usize) -> Self {
        let (readings, pending) = RingBuffer::new(METER_QUEUE_CAPACITY);

        Self {
            base: NodeBase::new(id, sample_rate, block_size),
            readings,
            pending,
            dropped: 0,
            _sample: PhantomData,
        }
    }

    /// Number of readings waiting for the next event flush.
    #[inline]
    pub fn queued(&self) -> usize {
        self.pending.slots()
    }
}

impl<F: Sample> GraphNode<F> for Meter<F> {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn process(&mut self, ctx: &mut BlockContext<'_, F>) {
        let inputs = ctx.inputs;
        let input = match inputs.first() {
            Some(ch) => ch,
            None => return ctx.silence(),
        };

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for (out, &x) in ctx.output.iter_mut().zip(input.iter()) {
            let v = to_f64(x);
            min = min.min(v);
            max = max.max(v);
            *out = x;
        }

        ctx.silence_from(input.len());

        if ctx.num_samples == 0 {
            return;
        }

        if self.readings.push(Reading { min, max }).is_err() {
            self.dropped += 1;
        }
    }

    fn process_events(&mut self, handler: &mut dyn FnMut(&str, Value)) {
        if self.dropped > 0 {
            tracing::warn!(node = %self.base.id(), dropped = self.dropped, "meter queue overflowed");
            self.dropped = 0;
        }

        if self.pending.is_empty() {
            return;
        }

        let source = self.base.props().get("name").cloned().unwrap_or_default();

        while let Ok(Reading { min, max }) = self.pending.pop() {
            let mut event = HashMap::with_capacity(3);
            event.insert(String::from("min"), Value::Number(min));
            event.insert(String::from("max"), Value::Number(max));
            event.insert(String::from("source"), source.clone());

            handler("meter", Value::Object(event));
        }
    }

    fn reset(&mut self) {
        while self.pending.pop().is_ok() {}
        self.dropped = 0;
    }
}
