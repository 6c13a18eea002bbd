#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]
pub mod affinity;
pub mod combine;
pub mod config;
pub mod export;
pub mod labels;
pub mod matrix;
pub mod pipeline;
pub mod predict;
pub mod roster;
pub mod types;
