mod multimode;
mod prewarp;

pub use multimode::*;
pub use prewarp::*;
