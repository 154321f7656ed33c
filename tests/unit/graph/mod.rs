pub mod arena;
pub mod walker;
