/// Built-in media sources.
pub mod raw;
