// src/services/mod.rs
pub mod cache;
pub mod chart;
pub mod csv_source;
pub mod distribution;
pub mod pipeline;
pub mod render;
pub mod returns;
pub mod source;
pub mod summary;
pub mod yahoo;
