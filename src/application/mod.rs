pub mod access;
pub mod emulation;
pub mod env;
pub mod envelope;
pub mod error;
pub mod producer;
pub mod sources;
