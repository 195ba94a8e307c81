/// The bundled catalog and switching table.
pub mod builtin;
pub mod catalog;

pub use catalog::{Format, LoadError, load};
