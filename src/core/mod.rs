pub mod aggregator;
pub mod attribution;
pub mod calculator;
pub mod filter;
pub mod labor;
pub mod logic;
pub mod quality;
pub mod rating;
pub mod volume;
pub mod warnings;
