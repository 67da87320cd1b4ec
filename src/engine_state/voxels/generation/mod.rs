//! # Terrain Generation
//!
//! Deterministic, seeded population of chunks. Every block id is a pure function of the
//! world seed and the block's absolute position, so an evicted and purged chunk comes
//! back byte-identical when it is generated again.
//!
//! ## Passes
//!
//! Each chunk runs the same passes in order, later passes overwriting earlier ones:
//!
//! 1. **Terrain**: stone columns up to the natural height, topped with dirt, sand or
//!    stone depending on moisture and altitude, with beaches on gentle slopes near sea
//!    level and grass on dirt at or above sea level
//! 2. **Caves**: 3D noise carves AIR, more often at depth
//! 3. **Trees**: placed from a padded region so canopies cross chunk borders
//! 4. **Bedrock**: the bottom layer of every column
//! 5. **Water**: floods AIR between the surface and sea level
//!
//! ## Noise Channels
//!
//! Four OpenSimplex channels are derived from the seed: terrain, mountain, moisture and
//! tree. They are seeded with `seed`, `seed * 4`, `seed * 2` and `seed * 3`. The terrain
//! channel is also sampled in 3D for caves.
//!
//! `OpenSimplex` peaks at roughly ±0.54, so every channel is rescaled and clamped to
//! `[-1, 1]` before the height, cave and tree thresholds are applied.

use log::trace;
use noise::{Clamp, NoiseFn, OpenSimplex, ScaleBias};

use super::block::block_type::BlockType;
use super::chunk::{CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH};

mod target;
mod trees;

pub use target::{DetachedChunk, GenerationTarget, SpilledBlock};

/// World height of the water surface.
pub const SEA_LEVEL: i32 = 64;

/// Horizontal scale of the height field, in blocks per noise unit.
const HEIGHT_SCALE: f64 = 48.0;
/// Horizontal scale of the moisture field.
const MOISTURE_SCALE: f64 = 512.0;
/// Scale of the 3D cave noise on every axis.
const CAVE_SCALE: f64 = 16.0;

/// Largest magnitude `OpenSimplex` returns in 2D.
const OPEN_SIMPLEX_PEAK_2D: f64 = 0.544;
/// Largest magnitude `OpenSimplex` returns in 3D.
const OPEN_SIMPLEX_PEAK_3D: f64 = 0.534;

/// An `OpenSimplex` source stretched to `[-1, 1]`.
type Channel<const DIM: usize> = Clamp<f64, ScaleBias<f64, OpenSimplex, DIM>, DIM>;

fn channel<const DIM: usize>(seed: u32, peak: f64) -> Channel<DIM>
where
    OpenSimplex: NoiseFn<f64, DIM>,
{
    Clamp::new(ScaleBias::new(OpenSimplex::new(seed)).set_scale(1.0 / peak))
}

/// Everything the column fill needs to know about one (x, z) column.
#[derive(Copy, Clone, Debug)]
pub struct ColumnSample {
    /// Ground height in blocks.
    pub height: i32,
    /// Moisture in roughly `[0, 1]`.
    pub moisture: f64,
    /// Local steepness. May be NaN or infinite on perfectly flat ground.
    pub slope: f64,
}

/// Seeded terrain generator. Cheap to share between threads.
pub struct TerrainGenerator {
    terrain: Channel<2>,
    caves: Channel<3>,
    mountain: Channel<2>,
    moisture: Channel<2>,
    tree: Channel<2>,
}

impl TerrainGenerator {
    /// Creates a generator for a world seed.
    ///
    /// # Arguments
    /// * `seed` - The world seed; identical seeds produce identical worlds
    pub fn new(seed: i32) -> Self {
        let seeded = |factor: i32| seed.wrapping_mul(factor) as u32;
        TerrainGenerator {
            terrain: channel(seeded(1), OPEN_SIMPLEX_PEAK_2D),
            caves: channel(seeded(1), OPEN_SIMPLEX_PEAK_3D),
            mountain: channel(seeded(4), OPEN_SIMPLEX_PEAK_2D),
            moisture: channel(seeded(2), OPEN_SIMPLEX_PEAK_2D),
            tree: channel(seeded(3), OPEN_SIMPLEX_PEAK_2D),
        }
    }

    /// Populates a freshly created, all-AIR chunk.
    ///
    /// # Arguments
    /// * `target` - The chunk to fill; blocks outside it are passed to its spill route
    pub fn generate<T: GenerationTarget + ?Sized>(&self, target: &mut T) {
        let coord = target.coord();
        self.fill_terrain(target);
        self.carve_caves(target);
        self.place_trees(target);
        self.lay_bedrock(target);
        self.flood_water(target);
        trace!("generated terrain for chunk {coord}");
    }

    fn terrain2(&self, x: f64, z: f64) -> f64 {
        self.terrain.get([x, z])
    }

    /// Moisture at a world column, roughly in `[0, 1]`.
    ///
    /// A broad moisture channel with a little high-frequency terrain detail mixed in.
    pub fn moisture(&self, world_x: i32, world_z: i32) -> f64 {
        let xx = world_x as f64 / MOISTURE_SCALE;
        let zz = world_z as f64 / MOISTURE_SCALE;
        (self.moisture.get([xx, zz]) + self.terrain2(xx * 64.0, zz * 64.0) * 0.1) * 0.5 + 0.5
    }

    /// Ground height of a world column.
    pub fn natural_height(&self, world_x: i32, world_z: i32) -> i32 {
        let xx = world_x as f64 / HEIGHT_SCALE;
        let zz = world_z as f64 / HEIGHT_SCALE;

        let mut e = self.terrain2(xx, zz)
            + 0.5 * self.terrain2(2.0 * xx, 2.0 * zz)
            + 0.25 * self.terrain2(4.0 * xx, 4.0 * zz);
        e += 0.125;

        // Plains versus mountains.
        let flatness = self.terrain2(xx / 2.0, zz / 2.0) * 0.5 + 0.5;
        let flatness = (flatness + 0.25).powf(self.mountain.get([xx / 2.0, zz / 2.0]) + 4.0);
        e *= flatness;

        // Dry land is flatter.
        e *= self.moisture(world_x, world_z).powi(2);
        e *= 32.0;

        e += self.terrain2(-xx / 8.0, -zz / 8.0).powi(3) * 24.0;

        SEA_LEVEL + e.ceil() as i32
    }

    /// Steepness of the height field around a column.
    ///
    /// The ratio of `(max - average)` to `(min - average)` over the column and its four
    /// axis neighbours, where the average covers the neighbours only.
    pub fn slope(&self, world_x: i32, world_z: i32) -> f64 {
        let around = [
            self.natural_height(world_x - 1, world_z),
            self.natural_height(world_x + 1, world_z),
            self.natural_height(world_x, world_z - 1),
            self.natural_height(world_x, world_z + 1),
        ]
        .map(f64::from);
        let center = self.natural_height(world_x, world_z) as f64;

        let average = around.iter().sum::<f64>() / 4.0;
        let min = around.iter().copied().fold(center, f64::min);
        let max = around.iter().copied().fold(center, f64::max);
        (max - average) / (min - average)
    }

    /// Samples everything the column fill needs for one column.
    pub fn sample_column(&self, world_x: i32, world_z: i32) -> ColumnSample {
        ColumnSample {
            height: self.natural_height(world_x, world_z),
            moisture: self.moisture(world_x, world_z),
            slope: self.slope(world_x, world_z),
        }
    }

    /// The block the terrain pass places at height `y` of a column, before caves.
    ///
    /// # Returns
    /// AIR above the ground height.
    pub fn column_block(column: &ColumnSample, y: i32) -> BlockType {
        let height = column.height;
        if y > height || y < 0 {
            return BlockType::AIR;
        }

        let sea_offset = (height - SEA_LEVEL) as f64;
        let block = if column.slope < 1.0 && sea_offset - column.slope <= 1.0 {
            BlockType::SAND
        } else if y < height - 1 {
            BlockType::STONE
        } else if column.moisture > 0.3 {
            BlockType::DIRT
        } else if y < SEA_LEVEL + 12 {
            BlockType::SAND
        } else {
            BlockType::STONE
        };

        if y == height && block == BlockType::DIRT && height >= SEA_LEVEL {
            BlockType::GRASS
        } else {
            block
        }
    }

    /// Whether the cave pass carves the voxel at a world position.
    pub fn is_cave(&self, world_x: i32, world_y: i32, world_z: i32) -> bool {
        let e = self.caves.get([
            world_x as f64 / CAVE_SCALE,
            world_y as f64 / CAVE_SCALE,
            world_z as f64 / CAVE_SCALE,
        ]);
        let threshold = 0.4 + (world_y as f64 / CHUNK_HEIGHT as f64) * 0.5;
        e > threshold
    }

    fn fill_terrain<T: GenerationTarget + ?Sized>(&self, target: &mut T) {
        let coord = target.coord();
        let grid = target.grid_mut();
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                let column = self.sample_column(coord.world_x() + x, coord.world_z() + z);
                for y in 0..=column.height.min(CHUNK_HEIGHT - 1) {
                    grid.set(x, y, z, Self::column_block(&column, y).id());
                }
            }
        }
    }

    fn carve_caves<T: GenerationTarget + ?Sized>(&self, target: &mut T) {
        let coord = target.coord();
        let grid = target.grid_mut();
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                for y in 0..CHUNK_HEIGHT {
                    if self.is_cave(coord.world_x() + x, y, coord.world_z() + z) {
                        grid.set(x, y, z, BlockType::AIR.id());
                    }
                }
            }
        }
    }

    fn lay_bedrock<T: GenerationTarget + ?Sized>(&self, target: &mut T) {
        let grid = target.grid_mut();
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                grid.set(x, 0, z, BlockType::BEDROCK.id());
            }
        }
    }

    fn flood_water<T: GenerationTarget + ?Sized>(&self, target: &mut T) {
        let coord = target.coord();
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                let height = self.natural_height(coord.world_x() + x, coord.world_z() + z);
                let grid = target.grid_mut();
                for y in (height - 1)..=SEA_LEVEL {
                    if grid.block(x, y, z).is_air() {
                        grid.set(x, y, z, BlockType::WATER.id());
                    }
                }
            }
        }
    }
}
