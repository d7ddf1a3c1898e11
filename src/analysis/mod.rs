pub mod tree;

pub use tree::{CyclePolicy, analyze_tree};
