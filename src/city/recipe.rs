//! Crafting recipes - what a workshop turns into what
//!
//! The table is fixed at compile time. Asking for the recipe of a raw
//! material means the item table and the workshop code disagree, which is
//! a bug rather than a runtime condition, so it panics.

use serde::Serialize;

use crate::city::items::ItemType;

/// A crafting recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recipe {
    pub output: ItemType,
    /// Inputs consumed per unit of output
    pub inputs: &'static [(ItemType, u32)],
}

impl Recipe {
    /// Total item count a worker has to pull from storage
    pub fn input_count(&self) -> u32 {
        self.inputs.iter().map(|(_, n)| n).sum()
    }
}

const MEAL: Recipe = Recipe {
    output: ItemType::Meal,
    inputs: &[(ItemType::Grain, 2), (ItemType::Grass, 1)],
};

const ROAST: Recipe = Recipe {
    output: ItemType::Roast,
    inputs: &[(ItemType::Meat, 1)],
};

const TOOL: Recipe = Recipe {
    output: ItemType::Tool,
    inputs: &[(ItemType::Wood, 1), (ItemType::Stone, 2)],
};

/// Recipe producing `item`
///
/// # Panics
/// If `item` is a raw material.
pub fn recipe_for(item: ItemType) -> Recipe {
    match item {
        ItemType::Meal => MEAL,
        ItemType::Roast => ROAST,
        ItemType::Tool => TOOL,
        raw => panic!("no recipe produces raw material {raw:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_lookup() {
        let meal = recipe_for(ItemType::Meal);
        assert_eq!(meal.output, ItemType::Meal);
        assert_eq!(meal.input_count(), 3);
        assert_eq!(recipe_for(ItemType::Tool).inputs[1], (ItemType::Stone, 2));
    }

    #[test]
    #[should_panic(expected = "raw material")]
    fn test_raw_material_recipe_panics() {
        recipe_for(ItemType::Wood);
    }
}
