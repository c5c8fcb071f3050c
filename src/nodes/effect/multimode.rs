//! Zero-delay-feedback one-pole multimode filter
//!
//! Trapezoidal integration with the instantaneous feedback solved through
//! `G = g / (1 + g)`:
//!
//! ```text
//! v  = (x - z) * G
//! lp = v + z
//! z  = lp + v
//! ```
//!
//! Lowpass, highpass (`x - lp`) and allpass (`2lp - x`) all fall out of the
//! same integrator, so switching modes never disturbs the filter memory.

use alloc::sync::Arc;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU8, Ordering};

use itertools::izip;

use crate::error::{Error, Result};
use crate::node::{to_f64, to_sample, BlockContext, GraphNode, NodeBase, NodeId, Sample};
use crate::value::Value;

/// Upper bound on the coefficient. Keeps the integrator stable.
const MAX_G: f64 = 0.9999;

/// Response selected by the `"mode"` property.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Low = 0,
    High = 2,
    All = 4,
}

impl FilterMode {
    /// Parse a `"mode"` property value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lowpass" => Some(FilterMode::Low),
            "highpass" => Some(FilterMode::High),
            "allpass" => Some(FilterMode::All),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterMode::Low => "lowpass",
            FilterMode::High => "highpass",
            FilterMode::All => "allpass",
        }
    }

    #[inline]
    fn from_bits(bits: u8) -> Self {
        match bits {
            2 => FilterMode::High,
            4 => FilterMode::All,
            _ => FilterMode::Low,
        }
    }

    /// Output derivation from the lowpass tap and the input sample.
    #[inline]
    fn derive(self) -> fn(f64, f64) -> f64 {
        match self {
            FilterMode::Low => |lp: f64, _xn: f64| lp,
            FilterMode::High => |lp: f64, xn: f64| xn - lp,
            FilterMode::All => |lp: f64, xn: f64| lp + lp - xn,
        }
    }
}

/// Lock-free cell holding a [`FilterMode`].
///
/// Cloning shares the cell. A control thread can keep a clone and switch the
/// mode while the filter is owned by the audio thread; the change is picked
/// up at the start of the next block.
#[derive(Clone, Debug, Default)]
pub struct ModeHandle(Arc<AtomicU8>);

impl ModeHandle {
    pub fn new(mode: FilterMode) -> Self {
        Self(Arc::new(AtomicU8::new(mode as u8)))
    }

    #[inline]
    pub fn load(&self) -> FilterMode {
        FilterMode::from_bits(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn store(&self, mode: FilterMode) {
        self.0.store(mode as u8, Ordering::Release);
    }
}

/// One-pole lowpass/highpass/allpass filter.
///
/// Inputs: channel 0 is the coefficient `g` (see
/// [`CutoffPrewarp`](super::CutoffPrewarp)), channel 1 is the signal. With
/// fewer than two channels the output is silent and the filter memory is
/// left alone.
///
/// All arithmetic and the integrator state are `f64` whatever `F` is.
pub struct MultiMode1p<F> {
    base: NodeBase,
    mode: ModeHandle,
    z: f64,
    _sample: PhantomData<F>,
}

impl<F: Sample> MultiMode1p<F> {
    pub fn new(id: NodeId, sample_rate: f64, block_size: usize) -> Self {
        Self {
            base: NodeBase::new(id, sample_rate, block_size),
            mode: ModeHandle::default(),
            z: 0.0,
            _sample: PhantomData,
        }
    }

    #[inline]
    pub fn mode(&self) -> FilterMode {
        self.mode.load()
    }

    /// A handle to this filter's mode cell, for switching modes from another
    /// thread.
    pub fn mode_handle(&self) -> ModeHandle {
        self.mode.clone()
    }

    /// Current integrator memory.
    #[inline]
    pub fn state(&self) -> f64 {
        self.z
    }
}

impl<F: Sample> GraphNode<F> for MultiMode1p<F> {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn set_property(&mut self, key: &str, value: &Value) -> Result<()> {
        if key == "mode" {
            let name = value
                .as_str()
                .ok_or(Error::Invariant("mode prop must be a string"))?;

            if let Some(mode) = FilterMode::from_name(name) {
                self.mode.store(mode);
                return Ok(());
            }

            tracing::debug!(node = %self.base.id(), mode = name, "unrecognized filter mode, storing as plain property");
        }

        self.base.set_property(key, value);
        Ok(())
    }

    fn process(&mut self, ctx: &mut BlockContext<'_, F>) {
        let inputs = ctx.inputs;
        if inputs.len() < 2 {
            return ctx.silence();
        }

        let derive = self.mode.load().derive();
        let mut z = self.z;

        for (out, &g, &xn) in izip!(ctx.output.iter_mut(), inputs[0].iter(), inputs[1].iter()) {
            // max before min so a NaN coefficient closes the filter
            let g = to_f64(g).max(0.0).min(MAX_G);
            let xn = to_f64(xn);

            let big_g = g / (1.0 + g);
            let v = (xn - z) * big_g;
            let lp = v + z;

            z = lp + v;

            *out = to_sample(derive(lp, xn));
        }

        self.z = z;
        ctx.silence_from(inputs[0].len().min(inputs[1].len()));
    }

    fn reset(&mut self) {
        self.z = 0.0;
    }
}
