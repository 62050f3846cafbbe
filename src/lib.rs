// Calendar Image Library
// Lays out a month of events as a Sunday-first grid and renders it to PNG or PDF

pub mod models;
pub mod services;
pub mod utils;
