//! City layer - items, storage, facilities and the request queues that
//! feed the job state machines

pub mod building;
pub mod construction;
pub mod items;
pub mod production;
pub mod recipe;
pub mod requests;
pub mod stockpile;

pub use building::{CraftOrder, Facility, FacilityRegistry, FacilityRole, FacilityType, Workshop};
pub use construction::{BuildManager, BuildOrder, ContributionResult};
pub use items::ItemType;
pub use production::{tick_workshop_orders, PlacedOrder};
pub use recipe::{recipe_for, Recipe};
pub use requests::{RequestId, RequestQueue, RequestRecord, RequestState};
pub use stockpile::Stockpile;
