/// Append-only tile arena with union-find identity
pub mod arena;
/// Oriented positions on the tile graph
pub mod walker;

pub use arena::{DIST_UNKNOWN, ParentDir, Tile, TileArena};
pub use walker::{Walker, gmod};
