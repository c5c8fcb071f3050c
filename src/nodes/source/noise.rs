//! Uniform white noise source

use core::marker::PhantomData;


use crate::error::{Error, Result};
use crate::node::{to_sample, BlockContext, GraphNode, NodeBase, NodeId, Sample};
use crate::value::{FromValue, Value};

/// Uniform random noise in `[0, 1]`.
///
/// A 32-bit linear congruential generator (the MSVC `rand` constants).
/// Cheap and good enough for audio; not for anything else. The `"seed"`
/// property reseeds it; the initial seed is the node id so renders are
/// reproducible.
pub struct UniformNoise<F> {
    base: NodeBase,
    seed: u32,
    _sample: PhantomData<F>,
}

impl<F: Sample> UniformNoise<F> {
    pub fn new(id: NodeId, sample_rate: f64, block_size: usize) -> Self {
        Self {
            base: NodeBase::new(id, sample_rate, block_size),
            seed: id.0 as u32,
            _sample: PhantomData,
        }
    }

    #[inline]
    fn next_raw(&mut self) -> u32 {
        self.seed = self.seed.wrapping_mul(214013).wrapping_add(2531011);
        (self.seed >> 16) & 0x7FFF
    }
}

impl<F: Sample> GraphNode<F> for UniformNoise<F> {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn set_property(&mut self, key: &str, value: &Value) -> Result<()> {
        if key == "seed" {
            self.seed = u32::from_value(value).ok_or_else(|| Error::TypeMismatch {
                key: key.to_owned(),
                expected: u32::EXPECTED,
                found: value.type_name(),
            })?;
        }

        self.base.set_property(key, value);
        Ok(())
    }

    fn process(&mut self, ctx: &mut BlockContext<'_, F>) {
        for out in ctx.output.iter_mut() {
            *out = to_sample(self.next_raw() as f64 / 0x7FFF as f64);
        }
    }
}
