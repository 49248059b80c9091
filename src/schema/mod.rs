pub mod annotation;
pub mod event;
pub mod interval;
pub mod relation;
