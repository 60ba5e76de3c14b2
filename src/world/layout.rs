//! One-shot procedural layout of the field
//!
//! Terrain comes from thresholding Perlin noise per cell. Territory comes
//! from rectangular stamps scattered over the field. Both draw only from the
//! world seed, so a seed always reproduces the same field.

use noise::{NoiseFn, Perlin};
use rand::Rng;
use tracing::info;

use crate::core::config::WorldConfig;
use crate::core::rng::SimRng;
use crate::core::types::{CellCoord, IdAllocator};
use crate::world::field::{FieldGrid, TerrainType, Territory};
use crate::world::objects::{CollectibleKind, CollectibleStore};

/// Terrain band for a noise value
pub fn terrain_for_noise(n: f64, config: &WorldConfig) -> Option<TerrainType> {
    if n < config.tree_max {
        Some(TerrainType::Tree)
    } else if n >= config.grass_min && n < config.grass_max {
        Some(TerrainType::Grass)
    } else if n >= config.rock_min {
        Some(TerrainType::Rock)
    } else {
        None
    }
}

/// Build the field: terrain, village zone, then territory stamps
pub fn generate_field(config: &WorldConfig, seed: u64, rng: &mut SimRng) -> FieldGrid {
    let mut field = FieldGrid::new(config.width, config.height, config.cell_size);
    assign_terrain(&mut field, config, seed);
    stamp_territories(&mut field, config, rng);

    info!(
        trees = field.count_terrain(TerrainType::Tree),
        rocks = field.count_terrain(TerrainType::Rock),
        grass = field.count_terrain(TerrainType::Grass),
        buildable = field.count_terrain(TerrainType::Buildable),
        wolf_cells = field.count_territory(Territory::Wolf),
        deer_cells = field.count_territory(Territory::Deer),
        "Field generated"
    );
    field
}

/// Fold a world seed into the 32 bits Perlin takes
fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Noise terrain, with the village zone cleared to buildable land
fn assign_terrain(field: &mut FieldGrid, config: &WorldConfig, seed: u64) {
    let perlin = Perlin::new(noise_seed(seed));
    let coords: Vec<CellCoord> = field.coords().collect();

    for coord in coords {
        let village = field.in_village(coord, config.village_radius);
        // Offset by half a cell: Perlin is zero on every lattice point
        let n = perlin.get([
            (coord.x as f64 + 0.5) * config.noise_scale,
            (coord.y as f64 + 0.5) * config.noise_scale,
        ]);
        let Some(cell) = field.cell_mut(coord) else {
            continue;
        };
        if village {
            cell.terrain = TerrainType::Buildable;
            cell.territory = Territory::Human;
        } else {
            cell.terrain = terrain_for_noise(n, config).unwrap_or(TerrainType::Empty);
        }
    }
}

/// How many wolf and deer stamps to lay
///
/// The total is split at random, then each side is raised to the floor.
pub fn stamp_counts(config: &WorldConfig, rng: &mut SimRng) -> (u32, u32) {
    let total = rng.gen_range(config.territory_stamps_min..=config.territory_stamps_max);
    let wolf = rng.gen_range(0..=total);
    let deer = total - wolf;
    let floor = config.min_territories_per_species;
    (wolf.max(floor), deer.max(floor))
}

fn stamp_territories(field: &mut FieldGrid, config: &WorldConfig, rng: &mut SimRng) {
    let (wolf, deer) = stamp_counts(config, rng);
    let stamps = std::iter::repeat(Territory::Wolf)
        .take(wolf as usize)
        .chain(std::iter::repeat(Territory::Deer).take(deer as usize));

    for territory in stamps {
        let w = rng.gen_range(config.stamp_size_min..=config.stamp_size_max).min(field.width());
        let h = rng.gen_range(config.stamp_size_min..=config.stamp_size_max).min(field.height());
        let x0 = rng.gen_range(0..=field.width() - w);
        let y0 = rng.gen_range(0..=field.height() - h);

        for y in y0..y0 + h {
            for x in x0..x0 + w {
                let coord = CellCoord::new(x, y);
                // Draw before the skip checks so the stream does not depend on
                // which cells earlier stamps took
                let perforated = rng.gen::<f32>() < config.stamp_perforation;
                if perforated || field.in_village(coord, config.village_radius) {
                    continue;
                }
                if let Some(cell) = field.cell_mut(coord) {
                    if cell.territory == Territory::None {
                        cell.territory = territory;
                    }
                }
            }
        }
    }
}

/// Starting amount for a collectible kind
pub fn initial_amount(kind: CollectibleKind, config: &WorldConfig) -> u32 {
    match kind {
        CollectibleKind::Tree => config.tree_amount,
        CollectibleKind::Rock => config.rock_amount,
        CollectibleKind::Grass => config.grass_amount,
        CollectibleKind::Carcass => config.carcass_amount,
    }
}

/// Grow the starting collectibles on their terrain
pub fn populate_collectibles(
    field: &mut FieldGrid,
    store: &mut CollectibleStore,
    ids: &mut IdAllocator,
    config: &WorldConfig,
    rng: &mut SimRng,
) {
    let coords: Vec<CellCoord> = field.coords().collect();
    for coord in coords {
        let Some(cell) = field.cell(coord) else {
            continue;
        };
        let (kind, density) = match cell.terrain {
            TerrainType::Tree => (CollectibleKind::Tree, config.tree_density),
            TerrainType::Rock => (CollectibleKind::Rock, config.rock_density),
            TerrainType::Grass => (CollectibleKind::Grass, config.grass_density),
            _ => continue,
        };
        if rng.gen::<f32>() >= density {
            continue;
        }
        let id = ids.allocate();
        if field.claim(coord, id) {
            store.spawn(id, kind, field.cell_center(coord), Some(coord), initial_amount(kind, config));
        }
    }
}
