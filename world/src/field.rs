//! Authoritative ore field state and deterministic ore rolling.

use orepit_core::{weighted_ore, total_weight, FieldPoint, OreKind, TileCoord};

/// Number of tiles along each edge of the square field.
pub(crate) const FIELD_SIDE: u32 = 12;
/// Side length of a single square tile in world units.
pub(crate) const TILE_LENGTH: f32 = 64.0;
/// Maximum distance between a click and a tile centre for the hit to land.
pub(crate) const CLICK_DISTANCE: f32 = 32.0;
/// Number of hits required to break a tile.
pub(crate) const TILE_BREAK_HITS: u8 = 6;

/// Single ore tile tracked by the field.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Tile {
    /// Kind currently exposed by the tile.
    pub(crate) kind: OreKind,
    /// Hits accumulated toward the break threshold.
    pub(crate) hits: u8,
}

/// Dense square grid of ore tiles, stored row-major.
#[derive(Clone, Debug)]
pub(crate) struct OreField {
    side: u32,
    tiles: Vec<Tile>,
}

impl OreField {
    /// Generates a fresh field, rolling every tile's kind from the roller.
    pub(crate) fn generate(roller: &mut OreRoller) -> Self {
        let side = FIELD_SIDE;
        let count = (side as usize) * (side as usize);
        let mut tiles = Vec::with_capacity(count);
        for _ in 0..count {
            tiles.push(Tile {
                kind: roller.roll(&OreKind::ALL),
                hits: 0,
            });
        }
        Self { side, tiles }
    }

    /// Number of tiles along each edge.
    pub(crate) fn side(&self) -> u32 {
        self.side
    }

    /// Read-only access to the tile storage.
    pub(crate) fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Mutable access to a tile by dense index.
    pub(crate) fn tile_mut(&mut self, index: usize) -> Option<&mut Tile> {
        self.tiles.get_mut(index)
    }

    /// Converts a dense tile index back into grid coordinates.
    pub(crate) fn coord_of(&self, index: usize) -> TileCoord {
        let side = self.side as usize;
        TileCoord::new((index % side) as u32, (index / side) as u32)
    }

    /// World-unit centre of the provided tile.
    pub(crate) fn centre_of(tile: TileCoord) -> FieldPoint {
        FieldPoint::new(
            tile.column() as f32 * TILE_LENGTH + TILE_LENGTH / 2.0,
            tile.row() as f32 * TILE_LENGTH + TILE_LENGTH / 2.0,
        )
    }

    /// Resolves the first tile whose centre lies within the click threshold.
    pub(crate) fn tile_at(&self, position: FieldPoint) -> Option<usize> {
        (0..self.tiles.len()).find(|index| {
            let centre = Self::centre_of(self.coord_of(*index));
            position.distance_to(centre) < CLICK_DISTANCE
        })
    }
}

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// Deterministic source of weighted ore rolls and percent draws.
#[derive(Clone, Debug)]
pub(crate) struct OreRoller {
    state: u64,
}

impl OreRoller {
    /// Creates a roller seeded with the provided state.
    pub(crate) fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Draws a uniform value from `[0, bound)` using the high state bits.
    pub(crate) fn draw_below(&mut self, bound: u64) -> u64 {
        debug_assert!(bound > 0, "draw_below requires a positive bound");
        self.state = self
            .state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        ((self.state >> 32) * bound) >> 32
    }

    /// Rolls a weighted ore kind from the provided non-empty pool.
    pub(crate) fn roll(&mut self, pool: &[OreKind]) -> OreKind {
        debug_assert!(!pool.is_empty(), "roll requires a non-empty pool");
        let draw = self.draw_below(total_weight(pool));
        weighted_ore(pool, draw).unwrap_or(OreKind::Amethyst)
    }
}
