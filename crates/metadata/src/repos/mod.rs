//! Repository traits for metadata operations.

pub mod assets;
pub mod resources;

pub use assets::AssetRepo;
pub use resources::ResourceRepo;
