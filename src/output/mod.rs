// Output generation module

pub mod mermaid;

pub use mermaid::*;
