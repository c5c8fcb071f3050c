//! Built-in graph nodes.
//!
//! Nodes are organized into three categories:
//!
//! ## Sources ([`source`])
//!
//! Generate signal without inputs:
//! - [`UniformNoise`] - Uniform random noise, reseedable through `"seed"`
//!
//! ## Effects ([`effect`])
//!
//! Transform their input channels:
//! - [`CutoffPrewarp`] - Cutoff in Hz → bilinear-prewarped one-pole coefficient
//! - [`MultiMode1p`] - Zero-delay-feedback one-pole lowpass/highpass/allpass
//!
//! ## Sinks ([`sink`])
//!
//! Observe the signal and report back through events:
//! - [`Meter`] - Per-block min/max as `"meter"` events
//!
//! # Kind names
//!
//! [`NodeRegistry::with_builtins`](crate::NodeRegistry::with_builtins) registers
//! these as `"rand"`, `"prewarp"`, `"mm1p"` and `"meter"`.

pub mod source;
pub mod effect;
pub mod sink;

// Re-export common types at the top level for convenience
pub use source::UniformNoise;
pub use effect::{CutoffPrewarp, FilterMode, ModeHandle, MultiMode1p};
pub use sink::{Meter, METER_QUEUE_CAPACITY};
