pub mod app;
pub mod audio;
pub mod config;
pub mod event;
pub mod http;
pub mod storage;
pub mod util;
