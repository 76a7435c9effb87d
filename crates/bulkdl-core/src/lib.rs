pub mod config;
pub mod logging;

pub mod items;
pub mod pipeline;
pub mod queue;
pub mod storage;
pub mod task;
pub mod transport;
