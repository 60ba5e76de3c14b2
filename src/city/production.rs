//! Workshop ordering - kitchens and smithies queue craft orders
//!
//! Each workshop checks storage on its own timer and appends an order for
//! every product that is below its stock target, as long as storage holds
//! the inputs for it and the order book is not full. Orders are never
//! de-duplicated: two pending meal orders mean two meals.

use tracing::debug;

use crate::city::building::{CraftOrder, FacilityRegistry};
use crate::city::items::ItemType;
use crate::city::recipe::recipe_for;
use crate::city::requests::RequestId;
use crate::core::config::FacilityConfig;
use crate::core::types::EntityId;

/// An order placed this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedOrder {
    pub workshop: EntityId,
    pub request: RequestId,
    pub product: ItemType,
}

/// Stock level a workshop aims to keep for a product
pub fn stock_target(product: ItemType, config: &FacilityConfig) -> u32 {
    match product {
        ItemType::Meal | ItemType::Roast => config.meal_target,
        ItemType::Tool => config.tool_target,
        other => panic!("{other:?} is not a workshop product"),
    }
}

/// Advance every workshop's order timer and place orders that fell due
pub fn tick_workshop_orders(
    facilities: &mut FacilityRegistry,
    config: &FacilityConfig,
    dt: f32,
) -> Vec<PlacedOrder> {
    let mut placed = Vec::new();

    // Storage totals are read before any workshop is borrowed mutably
    let stock: Vec<(ItemType, u32)> = ItemType::ALL
        .iter()
        .map(|item| (*item, facilities.stock_of(*item)))
        .collect();
    let stock_of = |item: ItemType| {
        stock
            .iter()
            .find(|(i, _)| *i == item)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    };

    for facility in facilities.iter_mut() {
        let facility_id = facility.id;
        let products = facility.facility_type.products();
        let Some(shop) = facility.workshop_mut() else {
            continue;
        };

        shop.order_timer -= dt;
        if shop.order_timer > 0.0 {
            continue;
        }
        shop.order_timer = config.order_interval_seconds;

        for &product in products {
            if shop.orders.len() >= config.max_pending_orders {
                break;
            }
            let pending = shop
                .orders
                .iter()
                .filter(|r| r.payload.product == product)
                .count() as u32;
            if stock_of(product) + pending >= stock_target(product, config) {
                continue;
            }
            let recipe = recipe_for(product);
            if !recipe.inputs.iter().all(|(item, n)| stock_of(*item) >= *n) {
                continue;
            }

            let request = shop.orders.push(CraftOrder { product });
            debug!(workshop = facility_id.0, request = request.0, ?product, "Craft order placed");
            placed.push(PlacedOrder {
                workshop: facility_id,
                request,
                product,
            });
        }
    }

    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::FacilityType;
    use crate::core::types::CellCoord;
    use glam::Vec3;

    fn village(wood: u32, stone: u32) -> FacilityRegistry {
        let mut reg = FacilityRegistry::new(100);
        reg.spawn(EntityId(1), FacilityType::Storage, Vec3::ZERO, CellCoord::new(0, 0));
        reg.spawn(EntityId(2), FacilityType::Smithy, Vec3::ONE, CellCoord::new(1, 1));
        let stock = reg.get_mut(EntityId(1)).unwrap().stockpile_mut().unwrap();
        stock.add(ItemType::Wood, wood);
        stock.add(ItemType::Stone, stone);
        reg
    }

    #[test]
    fn test_orders_placed_when_timer_expires() {
        let mut reg = village(5, 5);
        let config = FacilityConfig::default();

        let placed = tick_workshop_orders(&mut reg, &config, 0.1);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].product, ItemType::Tool);

        // Timer restarted, nothing new until it runs out again
        assert!(tick_workshop_orders(&mut reg, &config, 0.1).is_empty());
        let placed = tick_workshop_orders(&mut reg, &config, config.order_interval_seconds);
        assert_eq!(placed.len(), 1);

        // Order book is full now
        let placed = tick_workshop_orders(&mut reg, &config, config.order_interval_seconds);
        assert!(placed.is_empty());
        let shop = reg.get(EntityId(2)).unwrap().workshop().unwrap();
        assert_eq!(shop.orders.len(), config.max_pending_orders);
    }

    #[test]
    fn test_no_order_without_inputs() {
        let mut reg = village(5, 1);
        let placed = tick_workshop_orders(&mut reg, &FacilityConfig::default(), 0.1);
        assert!(placed.is_empty());
    }

    #[test]
    fn test_no_order_when_stock_on_target() {
        let mut reg = village(5, 5);
        let config = FacilityConfig::default();
        reg.get_mut(EntityId(1))
            .unwrap()
            .stockpile_mut()
            .unwrap()
            .add(ItemType::Tool, config.tool_target);
        assert!(tick_workshop_orders(&mut reg, &config, 0.1).is_empty());
    }

    #[test]
    #[should_panic]
    fn test_stock_target_rejects_raw() {
        stock_target(ItemType::Wood, &FacilityConfig::default());
    }
}
