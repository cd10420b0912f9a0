pub mod attacks;
pub mod generator;
pub mod notation;
pub mod perft;
pub mod types;
