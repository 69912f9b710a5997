pub mod circuit;
pub mod common;
pub mod graph;
pub mod level;
pub mod logic;
pub mod scene;
pub mod score;
pub mod simulator;
pub mod utils;
