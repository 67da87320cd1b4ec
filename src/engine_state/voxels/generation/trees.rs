//! Tree placement.
//!
//! Trees are decided per column from noise alone, so the chunk that owns a trunk and
//! the chunks its canopy overhangs all agree on where it stands. Each chunk scans a
//! padded region around itself and writes every tree that reaches into it.

use noise::NoiseFn;

use super::{GenerationTarget, TerrainGenerator, SEA_LEVEL};
use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::{CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH};

/// Horizontal scale of the tree noise.
const TREE_SCALE: f64 = 4.0;
/// How far outside the chunk to look for trees. Canopies are at most 2 blocks wide.
const TREE_PADDING: i32 = 3;
/// Number of log blocks in a trunk.
const TRUNK_HEIGHT: i32 = 5;

impl TerrainGenerator {
    /// Whether a tree grows from a world column.
    ///
    /// The column must pass both tree noise thresholds and its surface must be grass that
    /// survived the cave pass.
    ///
    /// # Returns
    /// The height of the trunk's lowest log, or `None`.
    pub fn tree_at(&self, world_x: i32, world_z: i32) -> Option<i32> {
        let xx = world_x as f64 / TREE_SCALE;
        let zz = world_z as f64 / TREE_SCALE;
        let terrain = |f: f64| self.terrain.get([f * xx, f * zz]);
        let tree = |f: f64| self.tree.get([f * xx, f * zz]);

        let moisture = self.moisture(world_x, world_z)
            + 0.1 * terrain(4.0)
            + 0.1 * terrain(8.0)
            + 0.1 * tree(12.0);
        let moisture = moisture.powf(0.5);

        let mut e = tree(1.0)
            + 0.25 * terrain(2.0)
            + 0.125 * tree(4.0)
            + 0.1 * terrain(8.0)
            + 0.025 * tree(16.0);
        e *= moisture;
        e += 0.1;

        let e2 = tree(16.0) + terrain(32.0);

        // NaN moisture fails both comparisons.
        if !(e > 0.6 && e2 > 0.6) {
            return None;
        }

        let column = self.sample_column(world_x, world_z);
        let height = column.height;
        if height < SEA_LEVEL || height >= CHUNK_HEIGHT {
            return None;
        }
        if Self::column_block(&column, height) != BlockType::GRASS
            || self.is_cave(world_x, height, world_z)
        {
            return None;
        }
        Some(height + 1)
    }

    pub(super) fn place_trees<T: GenerationTarget + ?Sized>(&self, target: &mut T) {
        let coord = target.coord();
        for x in -TREE_PADDING..CHUNK_WIDTH + TREE_PADDING {
            for z in -TREE_PADDING..CHUNK_DEPTH + TREE_PADDING {
                let world_x = coord.world_x() + x;
                let world_z = coord.world_z() + z;
                if let Some(base) = self.tree_at(world_x, world_z) {
                    spawn_tree(target, world_x, base, world_z);
                }
            }
        }
    }
}

/// Writes a tree with its lowest log at a world position.
///
/// The trunk is five logs tall. Leaves ring its top two logs in a 5 x 5 square with a
/// 3 x 3 cap above.
pub fn spawn_tree<T: GenerationTarget + ?Sized>(target: &mut T, x: i32, y: i32, z: i32) {
    for dy in 0..TRUNK_HEIGHT {
        target.set_world(x, y + dy, z, BlockType::LOG);
    }
    for dx in -2..=2 {
        for dz in -2..=2 {
            if dx == 0 && dz == 0 {
                continue;
            }
            for dy in 3..5 {
                target.set_world(x + dx, y + dy, z + dz, BlockType::LEAF);
            }
        }
    }
    for dx in -1..=1 {
        for dz in -1..=1 {
            for dy in 5..7 {
                target.set_world(x + dx, y + dy, z + dz, BlockType::LEAF);
            }
        }
    }
}
