// Service module exports

pub mod delivery;
pub mod layout;
pub mod poller;
pub mod render;
pub mod settings;
pub mod source;
