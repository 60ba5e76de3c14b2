//! Item types carried by villagers and held in storage

use serde::{Deserialize, Serialize};

use crate::world::objects::CollectibleKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemType {
    Wood,
    Stone,
    Grass,
    Meat,
    Grain,
    Meal,
    Roast,
    Tool,
}

impl ItemType {
    pub const ALL: [ItemType; 8] = [
        ItemType::Wood,
        ItemType::Stone,
        ItemType::Grass,
        ItemType::Meat,
        ItemType::Grain,
        ItemType::Meal,
        ItemType::Roast,
        ItemType::Tool,
    ];

    /// Raw materials come from the field or the farm, never from a workshop
    pub fn is_raw(&self) -> bool {
        matches!(
            self,
            ItemType::Wood | ItemType::Stone | ItemType::Grass | ItemType::Meat | ItemType::Grain
        )
    }

    /// Item yielded by gathering one unit of a collectible
    pub fn from_collectible(kind: CollectibleKind) -> ItemType {
        match kind {
            CollectibleKind::Tree => ItemType::Wood,
            CollectibleKind::Rock => ItemType::Stone,
            CollectibleKind::Grass => ItemType::Grass,
            CollectibleKind::Carcass => ItemType::Meat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_split() {
        let crafted: Vec<_> = ItemType::ALL.iter().filter(|i| !i.is_raw()).collect();
        assert_eq!(crafted, vec![&ItemType::Meal, &ItemType::Roast, &ItemType::Tool]);
    }

    #[test]
    fn test_collectible_yield() {
        assert_eq!(ItemType::from_collectible(CollectibleKind::Tree), ItemType::Wood);
        assert_eq!(ItemType::from_collectible(CollectibleKind::Carcass), ItemType::Meat);
    }
}
