#![allow(dead_code)]

pub mod body_server;
pub mod fakes;
pub mod log_capture;
