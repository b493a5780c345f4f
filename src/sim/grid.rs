//! Uniform grid broad phase
//!
//! The grid is rebuilt from scratch every step. Each body is inserted into its
//! primary tile and the 8 tiles around it, so any two bodies less than one
//! cell apart share the primary tile of either one. Pair candidates are read
//! from a body's primary tile only, which yields every nearby pair exactly
//! once.
//!
//! Sizing contract: cells must be at least as wide and tall as the largest
//! collision diameter, otherwise overlapping pairs more than one cell apart
//! are never tested.

use super::EntityId;
use super::fixed::Fixed;
use super::vector::FixedVec3;
use super::volume::{Tile, Volume};
use crate::error::EngineFault;
use crate::settings::CapacityPolicy;

/// Per-rebuild occupancy statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridStats {
    /// Bodies that landed inside the grid
    pub placed: usize,
    /// Bodies whose tile fell outside the grid
    pub outside: usize,
    /// Cell insertions past nominal capacity (kept or refused per policy)
    pub exhausted: usize,
    /// Largest cell population
    pub peak_cell: usize,
}

#[derive(Debug, Clone)]
pub struct Grid {
    size: u32,
    cell_width: Fixed,
    cell_height: Fixed,
    capacity: usize,
    policy: CapacityPolicy,
    /// Row-major, `size * size` cells
    cells: Vec<Vec<EntityId>>,
    stats: GridStats,
}

impl Grid {
    /// Partition `[0, width] x [0, height]` into `size * size` cells.
    ///
    /// `size` must be non-zero (checked by `Settings::validate`).
    pub fn new(
        width: Fixed,
        height: Fixed,
        size: u32,
        capacity: usize,
        policy: CapacityPolicy,
    ) -> Self {
        let n = Fixed::from_int(size.max(1).min(i32::MAX as u32) as i32);
        let cell_count = (size as usize) * (size as usize);
        Self {
            size,
            cell_width: width / n,
            cell_height: height / n,
            capacity,
            policy,
            cells: (0..cell_count).map(|_| Vec::with_capacity(capacity)).collect(),
            stats: GridStats::default(),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn cell_size(&self) -> (Fixed, Fixed) {
        (self.cell_width, self.cell_height)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> GridStats {
        self.stats
    }

    /// Primary tile for a position, `None` outside the grid
    pub fn tile_of(&self, position: FixedVec3) -> Option<Tile> {
        let tx = (position.x / self.cell_width).floor_to_int();
        let ty = (position.y / self.cell_height).floor_to_int();
        let size = self.size as i64;
        if (0..size).contains(&tx) && (0..size).contains(&ty) {
            Some(Tile {
                x: tx as u32,
                y: ty as u32,
            })
        } else {
            None
        }
    }

    /// Bodies registered in a tile (its own bodies plus its neighbours')
    pub fn cell(&self, tile: Tile) -> &[EntityId] {
        self.index(tile)
            .and_then(|i| self.cells.get(i))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn index(&self, tile: Tile) -> Option<usize> {
        if tile.x < self.size && tile.y < self.size {
            Some(tile.y as usize * self.size as usize + tile.x as usize)
        } else {
            None
        }
    }

    /// Clear and re-bucket every volume, caching each one's primary tile.
    ///
    /// Volumes must come in a stable order (entity id) so cell contents are
    /// reproducible. Capacity overruns are pushed to `faults`.
    pub fn rebuild<'a>(
        &mut self,
        volumes: impl Iterator<Item = (EntityId, &'a mut Volume)>,
        faults: &mut Vec<EngineFault>,
    ) {
        for cell in &mut self.cells {
            cell.clear();
        }
        let mut stats = GridStats::default();

        for (id, volume) in volumes {
            let Some(tile) = self.tile_of(volume.position) else {
                volume.occupied_tile = None;
                stats.outside += 1;
                continue;
            };
            volume.occupied_tile = Some(tile);
            stats.placed += 1;

            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let nx = tile.x as i64 + dx;
                    let ny = tile.y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= self.size as i64 || ny >= self.size as i64 {
                        continue;
                    }
                    let neighbour = Tile {
                        x: nx as u32,
                        y: ny as u32,
                    };
                    self.insert(neighbour, id, &mut stats, faults);
                }
            }
        }

        stats.peak_cell = self.cells.iter().map(Vec::len).max().unwrap_or(0);
        if stats.exhausted > 0 {
            log::warn!(
                "Grid: {} insertions past cell capacity {} ({} policy)",
                stats.exhausted,
                self.capacity,
                self.policy.as_str()
            );
        }
        self.stats = stats;
    }

    fn insert(
        &mut self,
        tile: Tile,
        id: EntityId,
        stats: &mut GridStats,
        faults: &mut Vec<EngineFault>,
    ) {
        let Some(index) = self.index(tile) else {
            return;
        };
        let cell = &mut self.cells[index];
        if cell.len() >= self.capacity {
            stats.exhausted += 1;
            faults.push(EngineFault::GridCellExhausted {
                cell: (tile.x, tile.y),
                capacity: self.capacity,
                entity: id,
            });
            if self.policy == CapacityPolicy::Reject {
                return;
            }
        }
        cell.push(id);
    }

    /// Unordered candidate pairs `(low, high)` for narrow-phase testing.
    ///
    /// `bodies` yields each body's id and cached tile in id order; a pair is
    /// emitted from the lower id's primary tile, so each appears once.
    pub fn candidate_pairs(
        &self,
        bodies: impl Iterator<Item = (EntityId, Option<Tile>)>,
    ) -> Vec<(EntityId, EntityId)> {
        let mut pairs = Vec::new();
        for (id, tile) in bodies {
            let Some(tile) = tile else {
                continue;
            };
            pairs.extend(
                self.cell(tile)
                    .iter()
                    .filter(|&&other| other > id)
                    .map(|&other| (id, other)),
            );
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::volume::{Layer, LayerMask};

    fn grid(policy: CapacityPolicy, capacity: usize) -> Grid {
        Grid::new(
            Fixed::from_int(8),
            Fixed::from_int(8),
            4,
            capacity,
            policy,
        )
    }

    fn circle_at(x: Fixed, y: Fixed, radius: Fixed) -> Volume {
        Volume::circle(
            radius,
            FixedVec3::xy(x, y),
            Layer::new(0).unwrap(),
            LayerMask::ALL,
        )
    }

    fn rebuild(grid: &mut Grid, volumes: &mut [Volume]) -> Vec<EngineFault> {
        let mut faults = Vec::new();
        grid.rebuild(
            volumes
                .iter_mut()
                .enumerate()
                .map(|(i, v)| (i as EntityId + 1, v)),
            &mut faults,
        );
        faults
    }

    fn pairs(grid: &Grid, volumes: &[Volume]) -> Vec<(EntityId, EntityId)> {
        grid.candidate_pairs(
            volumes
                .iter()
                .enumerate()
                .map(|(i, v)| (i as EntityId + 1, v.occupied_tile)),
        )
    }

    #[test]
    fn test_tile_of() {
        let g = grid(CapacityPolicy::Grow, 8);
        assert_eq!(g.cell_size(), (Fixed::from_int(2), Fixed::from_int(2)));
        assert_eq!(
            g.tile_of(FixedVec3::from_ints(3, 7)),
            Some(Tile { x: 1, y: 3 })
        );
        assert_eq!(g.tile_of(FixedVec3::from_ints(-1, 0)), None);
        assert_eq!(g.tile_of(FixedVec3::from_ints(8, 0)), None);
    }

    #[test]
    fn test_halo_insertion() {
        let mut g = grid(CapacityPolicy::Grow, 8);
        let mut volumes = [circle_at(Fixed::from_int(3), Fixed::from_int(3), Fixed::HALF)];
        let faults = rebuild(&mut g, &mut volumes);
        assert!(faults.is_empty());
        assert_eq!(volumes[0].occupied_tile, Some(Tile { x: 1, y: 1 }));
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(g.cell(Tile { x, y }), &[1]);
            }
        }
        assert!(g.cell(Tile { x: 3, y: 3 }).is_empty());
        assert_eq!(g.stats().placed, 1);
    }

    #[test]
    fn test_corner_halo_is_clipped() {
        let mut g = grid(CapacityPolicy::Grow, 8);
        let mut volumes = [circle_at(Fixed::HALF, Fixed::HALF, Fixed::HALF)];
        rebuild(&mut g, &mut volumes);
        let occupied = (0..4)
            .flat_map(|y| (0..4).map(move |x| Tile { x, y }))
            .filter(|&t| !g.cell(t).is_empty())
            .count();
        assert_eq!(occupied, 4);
    }

    #[test]
    fn test_outside_bodies_are_excluded() {
        let mut g = grid(CapacityPolicy::Grow, 8);
        let mut volumes = [
            circle_at(Fixed::from_int(-1), Fixed::ONE, Fixed::HALF),
            circle_at(Fixed::ONE, Fixed::ONE, Fixed::HALF),
        ];
        volumes[0].occupied_tile = Some(Tile { x: 0, y: 0 });
        rebuild(&mut g, &mut volumes);
        assert_eq!(volumes[0].occupied_tile, None);
        assert_eq!(g.stats().outside, 1);
        assert!(pairs(&g, &volumes).is_empty());
    }

    #[test]
    fn test_pairs_across_tile_boundary_found_once() {
        let mut g = grid(CapacityPolicy::Grow, 8);
        // Straddling the x = 2 boundary, different primary tiles
        let mut volumes = [
            circle_at("1.9".parse().unwrap(), Fixed::ONE, Fixed::HALF),
            circle_at("2.1".parse().unwrap(), Fixed::ONE, Fixed::HALF),
            circle_at(Fixed::from_int(7), Fixed::from_int(7), Fixed::HALF),
        ];
        rebuild(&mut g, &mut volumes);
        assert_ne!(volumes[0].occupied_tile, volumes[1].occupied_tile);
        assert_eq!(pairs(&g, &volumes), vec![(1, 2)]);
    }

    #[test]
    fn test_capacity_grow_keeps_bodies() {
        let mut g = grid(CapacityPolicy::Grow, 2);
        let mut volumes: Vec<Volume> = (0..3)
            .map(|_| circle_at(Fixed::from_int(3), Fixed::from_int(3), Fixed::HALF))
            .collect();
        let faults = rebuild(&mut g, &mut volumes);
        // Third body overflows each of its 9 cells
        assert_eq!(faults.len(), 9);
        assert!(matches!(
            faults[0],
            EngineFault::GridCellExhausted { capacity: 2, entity: 3, .. }
        ));
        assert_eq!(g.cell(Tile { x: 1, y: 1 }).len(), 3);
        assert_eq!(pairs(&g, &volumes), vec![(1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_capacity_reject_surfaces_fault() {
        let mut g = grid(CapacityPolicy::Reject, 2);
        let mut volumes: Vec<Volume> = (0..3)
            .map(|_| circle_at(Fixed::from_int(3), Fixed::from_int(3), Fixed::HALF))
            .collect();
        let faults = rebuild(&mut g, &mut volumes);
        assert_eq!(faults.len(), 9);
        assert_eq!(g.stats().exhausted, 9);
        assert_eq!(g.cell(Tile { x: 1, y: 1 }), &[1, 2]);
    }

    #[test]
    fn test_neighbor_guarantee() {
        // Cells 2 wide, radii up to 1: any touching pair shares a cell
        let mut g = grid(CapacityPolicy::Grow, 8);
        let r = Fixed::ONE;
        let step: Fixed = "0.37".parse().unwrap();
        let mut x = Fixed::ZERO;
        while x < Fixed::from_int(6) {
            let mut volumes = [
                circle_at(x, Fixed::from_int(3), r),
                circle_at(x + "1.9".parse().unwrap(), "3.3".parse().unwrap(), r),
            ];
            let d2 = (volumes[0].position - volumes[1].position).length_squared();
            assert!(d2 <= (r + r) * (r + r));
            rebuild(&mut g, &mut volumes);
            assert_eq!(pairs(&g, &volumes), vec![(1, 2)]);
            x += step;
        }
    }
}
