//! Real-time audio graph nodes.
//!
//! Every node implements [`GraphNode`]: it is bound to an id, sample rate and
//! block size at construction, keeps a [`PropertyStore`] written from the
//! control thread, and renders one block at a time through
//! [`GraphNode::process`] on the audio thread without locking or allocating.
//!
//! ```
//! use knoten::{BlockContext, GraphNode, NodeId, Value};
//! use knoten::nodes::{CutoffPrewarp, MultiMode1p};
//!
//! let mut prewarp = CutoffPrewarp::<f32>::new(NodeId(1), 48000.0, 64);
//! let mut filter = MultiMode1p::<f32>::new(NodeId(2), 48000.0, 64);
//! filter.set_property("mode", &Value::from("highpass")).unwrap();
//!
//! let cutoff = [1000.0f32; 64];
//! let signal = [1.0f32; 64];
//! let mut g = [0.0f32; 64];
//! let mut out = [0.0f32; 64];
//!
//! let inputs: [&[f32]; 1] = [&cutoff];
//! prewarp.process(&mut BlockContext::new(&inputs, &mut g, 0));
//!
//! let inputs: [&[f32]; 2] = [&g, &signal];
//! filter.process(&mut BlockContext::new(&inputs, &mut out, 0));
//! assert!(out[63] < out[0]);
//! ```

extern crate alloc;

mod error;
mod host;
mod node;
mod props;
mod registry;
mod resources;
mod value;
pub mod nodes;

pub use error::{Error, Result};
pub use host::{HostConfig, NodeHost};
pub use node::{BlockContext, GraphNode, GraphNodeExt, NodeBase, NodeId, Sample};
pub use props::PropertyStore;
pub use registry::{NodeConstructor, NodeRegistry};
pub use resources::SharedResourceMap;
pub use value::{FromValue, Value};
