mod sampler;

pub use sampler::{
    ActivitySampler, CursorPosition, FixedPointer, PointerPosition, PointerSource, Sample,
    SamplerConfig, ScriptedPointer, WindowBounds,
};
