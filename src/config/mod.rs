//! Stage catalog configuration loading

mod loader;

pub use loader::load_catalog;
