pub mod errors;
pub mod events;
pub mod hub;
pub mod observer;
pub mod registry;
