mod engine;

pub use engine::{AttentionConfig, AttentionEngine, AttentionSnapshot, Mood};
