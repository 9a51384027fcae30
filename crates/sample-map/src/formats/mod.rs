//! Built-in mapping tables.

pub mod enigma;
pub mod sesar;
