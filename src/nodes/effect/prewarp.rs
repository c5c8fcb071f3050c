//! Cutoff prewarping for the bilinear transform

use core::f64::consts::PI;
use core::marker::PhantomData;


use crate::node::{to_f64, to_sample, BlockContext, GraphNode, NodeBase, NodeId, Sample};

/// Turns a cutoff frequency signal (Hz, channel 0) into the per-sample
/// one-pole coefficient `g = tan(π · fc / sample_rate)`.
///
/// Memoryless. Feed its output into channel 0 of a
/// [`MultiMode1p`](super::MultiMode1p).
pub struct CutoffPrewarp<F> {
    base: NodeBase,
    _sample: PhantomData<F>,
}

impl<F: Sample> CutoffPrewarp<F> {
    pub fn new(id: NodeId, sample_rate: f64, block_size: usize) -> Self {
        Self {
            base: NodeBase::new(id, sample_rate, block_size),
            _sample: PhantomData,
        }
    }
}

impl<F: Sample> GraphNode<F> for CutoffPrewarp<F> {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn process(&mut self, ctx: &mut BlockContext<'_, F>) {
        let inputs = ctx.inputs;
        let cutoff = match inputs.first() {
            Some(ch) => ch,
            None => return ctx.silence(),
        };

        let t = 1.0 / self.base.sample_rate();

        for (out, &fc) in ctx.output.iter_mut().zip(cutoff.iter()) {
            let wd = 2.0 * PI * to_f64(fc);
            *out = to_sample((wd * t / 2.0).tan());
        }

        ctx.silence_from(cutoff.len());
    }
}
