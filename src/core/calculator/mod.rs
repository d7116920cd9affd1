pub mod moving_average;
pub mod ratio;
pub mod spans;
pub mod stats;
