use crate::decomposition::{BlockGeometry, HaloLink};
use rayon::prelude::*;
use std::ops::Range;

// ------------------------------------------------------------------------- STRUCT: Block

/// Cells of one block with a one-cell halo on every side. Interior cells are
/// owned by the block; halo cells are read-only copies of cells owned by the
/// neighboring blocks, refreshed by [`exchange_halos`].
#[derive(Debug, Clone)]
pub struct Block<C> {
    geometry: BlockGeometry,
    grid_n: [usize; 3],
    padded: [usize; 3],
    cells: Vec<C>,
    interior: Vec<usize>,
    halo: Vec<HaloLink>,
}

impl<C> Block<C> {
    /// `cell_at` receives the global voxel index of every padded cell, or
    /// `None` for padding beyond the grid.
    pub fn new<F>(geometry: &BlockGeometry, grid_n: [usize; 3], halo: Vec<HaloLink>, cell_at: F) -> Self
    where
        F: Fn(Option<[usize; 3]>) -> C,
    {
        let padded = geometry.n.map(|n_x| n_x + 2);
        let number_of_cells = padded.iter().product::<usize>();
        let mut cells = Vec::with_capacity(number_of_cells);
        let mut interior = Vec::with_capacity(geometry.n.iter().product());
        for z in 0..padded[2] {
            for y in 0..padded[1] {
                for x in 0..padded[0] {
                    let p = [x, y, z];
                    let global = [0, 1, 2].map(|k| geometry.origin[k] as isize + p[k] as isize - 1);
                    let inside = (0..3).all(|k| global[k] >= 0 && global[k] < grid_n[k] as isize);
                    let global = inside.then(|| global.map(|g| g as usize));
                    if (0..3).all(|k| p[k] >= 1 && p[k] <= geometry.n[k]) {
                        interior.push(cells.len());
                    }
                    cells.push(cell_at(global));
                }
            }
        }
        Block {
            geometry: geometry.clone(),
            grid_n,
            padded,
            cells,
            interior,
            halo,
        }
    }
}

impl<C> Block<C> {
    pub fn get_geometry(&self) -> &BlockGeometry {
        &self.geometry
    }

    pub fn get_padded_n(&self) -> [usize; 3] {
        self.padded
    }

    pub fn get_cells(&self) -> &Vec<C> {
        &self.cells
    }

    pub fn get_cells_mut(&mut self) -> &mut Vec<C> {
        &mut self.cells
    }

    pub fn get_cell(&self, local: usize) -> &C {
        &self.cells[local]
    }

    pub fn get_cell_mut(&mut self, local: usize) -> &mut C {
        &mut self.cells[local]
    }

    /// Local indices of the owned cells.
    pub fn get_interior(&self) -> &Vec<usize> {
        &self.interior
    }

    pub fn get_halo(&self) -> &Vec<HaloLink> {
        &self.halo
    }

    pub fn get_local_index(&self, global: [usize; 3]) -> Option<usize> {
        let p = [0, 1, 2].map(|k| global[k] as isize - self.geometry.origin[k] as isize + 1);
        if (0..3).any(|k| p[k] < 0 || p[k] >= self.padded[k] as isize) {
            return None;
        }
        let p = p.map(|p_k| p_k as usize);
        Some(p[0] + self.padded[0] * (p[1] + self.padded[1] * p[2]))
    }

    pub fn get_global_index(&self, local: usize) -> Option<[usize; 3]> {
        let p = [
            local % self.padded[0],
            (local / self.padded[0]) % self.padded[1],
            local / (self.padded[0] * self.padded[1]),
        ];
        let global = [0, 1, 2].map(|k| self.geometry.origin[k] as isize + p[k] as isize - 1);
        if (0..3).any(|k| global[k] < 0 || global[k] >= self.grid_n[k] as isize) {
            return None;
        }
        Some(global.map(|g| g as usize))
    }

    pub fn get_global_linear_index(&self, local: usize) -> Option<usize> {
        self.get_global_index(local)
            .map(|g| g[0] + self.grid_n[0] * (g[1] + self.grid_n[1] * g[2]))
    }

    pub(crate) fn for_each_interior_mut<F>(&mut self, mut operation: F)
    where
        F: FnMut(usize, &mut C),
    {
        for &local in &self.interior {
            operation(local, &mut self.cells[local]);
        }
    }

    /// Local index of the neighbor of `local` along the discrete velocity
    /// `c_i`. Only valid for owned cells, whose neighbors are all padded.
    pub fn get_neighbor(&self, local: usize, c_i: &[i32; 3]) -> usize {
        let offset = c_i[0] as isize
            + self.padded[0] as isize * (c_i[1] as isize + self.padded[1] as isize * c_i[2] as isize);
        (local as isize + offset) as usize
    }
}

// ----------------------------------------------------------------------------- FUNCTIONS

/// Refreshes every halo cell from its owner: all copies are gathered before
/// any block is written, so each block sees its neighbors' current state.
pub(crate) fn exchange_halos<C>(blocks: &mut [Block<C>])
where
    C: Clone + Send + Sync,
{
    let received = blocks
        .par_iter()
        .map(|block| {
            block
                .halo
                .iter()
                .map(|link| blocks[link.source_block].cells[link.source_local].clone())
                .collect::<Vec<C>>()
        })
        .collect::<Vec<Vec<C>>>();
    blocks
        .par_iter_mut()
        .zip(received.into_par_iter())
        .for_each(|(block, cells)| {
            let Block {
                halo, cells: own, ..
            } = block;
            halo.iter()
                .zip(cells)
                .for_each(|(link, cell)| own[link.local] = cell);
        });
}

/// Values of the owned cells of all blocks, in the linear order of the grid.
/// Voxels no block owns keep `T::default()`.
pub(crate) fn gather<C, T, F>(blocks: &[Block<C>], grid_n: [usize; 3], value: F) -> Vec<T>
where
    C: Sync,
    T: Copy + Default + Send,
    F: Fn(&C) -> T + Sync,
{
    let mut values = vec![T::default(); grid_n.iter().product()];
    let pieces = blocks
        .par_iter()
        .map(|block| {
            block
                .interior
                .iter()
                .filter_map(|&local| {
                    block
                        .get_global_linear_index(local)
                        .map(|g| (g, value(&block.cells[local])))
                })
                .collect::<Vec<(usize, T)>>()
        })
        .collect::<Vec<Vec<(usize, T)>>>();
    pieces
        .into_iter()
        .flatten()
        .for_each(|(g, v)| values[g] = v);
    values
}

/// Runs `operation` on every block, each rank working through its own group
/// of blocks sequentially while the ranks run in parallel.
pub(crate) fn for_each_rank<C, F>(blocks: &mut [Block<C>], rank_ranges: &[Range<usize>], operation: F)
where
    C: Send,
    F: Fn(usize, &mut Block<C>) + Sync,
{
    let mut groups = Vec::with_capacity(rank_ranges.len());
    let mut rest = blocks;
    let mut offset = 0;
    for range in rank_ranges {
        let (group, tail) = std::mem::take(&mut rest).split_at_mut(range.end - offset);
        groups.push((offset, group));
        rest = tail;
        offset = range.end;
    }
    groups.into_par_iter().for_each(|(first, group)| {
        group
            .iter_mut()
            .enumerate()
            .for_each(|(i, block)| operation(first + i, block));
    });
}
