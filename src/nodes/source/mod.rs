mod noise;

pub use noise::*;
