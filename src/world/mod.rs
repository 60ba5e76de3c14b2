//! The field and everything lying on it

pub mod field;
pub mod generators;
pub mod layout;
pub mod objects;

pub use field::{FieldCell, FieldGrid, TerrainType, Territory};
pub use generators::{GenerateKind, GenerationManager, Generator, GeneratorContext};
pub use layout::{generate_field, populate_collectibles};
pub use objects::{Collectible, CollectibleKind, CollectibleStore};
