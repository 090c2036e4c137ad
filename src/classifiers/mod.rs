/// Built-in motion-classification engines.
pub mod frame_diff;
