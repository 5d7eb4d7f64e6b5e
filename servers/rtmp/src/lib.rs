pub mod config;
pub mod consts;
pub mod errors;
pub mod server;
pub mod session;
