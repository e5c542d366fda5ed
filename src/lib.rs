pub mod config;
pub mod frame;
pub mod landmark;
pub mod pipeline;
pub mod replay;
pub mod tracker;
