mod meter;

pub use meter::*;
