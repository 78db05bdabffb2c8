//! Domain layer: resources, audiences and entry identity.

pub mod entities;
pub mod error;
pub mod resources;
