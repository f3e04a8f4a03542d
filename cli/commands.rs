pub mod check;
pub mod completion;
pub mod config;
pub mod rules;
pub mod stack;
pub mod structure;
pub mod tree;
