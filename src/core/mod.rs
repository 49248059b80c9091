pub mod branch;
pub mod builder;
pub mod classify;
pub mod config;
pub mod coreference;
pub mod interval;
pub mod matrix;
pub mod pipeline;
pub mod table;
