use crate::geometry::{Material, MaterialGrid};
use crate::prelude_crate::*;
use std::ops::Range;

// ----------------------------------------------------------------- STRUCT: BlockGeometry

/// Axis-aligned box of voxels owned by one block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockGeometry {
    pub slab: usize,
    pub origin: [usize; 3],
    pub n: [usize; 3],
    pub cost: usize,
    pub rank: usize,
}

impl BlockGeometry {
    pub fn contains(&self, index: [usize; 3]) -> bool {
        (0..3).all(|x| index[x] >= self.origin[x] && index[x] < self.origin[x] + self.n[x])
    }
}

// --------------------------------------------------------------------- STRUCT: HaloLink

/// Halo cell `local` of a block mirrors cell `source_local` of block
/// `source_block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HaloLink {
    pub local: usize,
    pub source_block: usize,
    pub source_local: usize,
}

// ---------------------------------------------------------- STRUCT: HeuristicLoadBalancer

/// Assigns blocks to ranks, heaviest block first, always to the currently
/// lightest rank.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicLoadBalancer {
    ranks: Vec<usize>,
    loads: Vec<usize>,
}

impl HeuristicLoadBalancer {
    pub fn new(costs: &[usize], number_of_ranks: usize) -> Self {
        let number_of_ranks = number_of_ranks.max(1);
        let mut order = (0..costs.len()).collect::<Vec<usize>>();
        order.sort_by(|&a, &b| costs[b].cmp(&costs[a]).then(a.cmp(&b)));
        let mut ranks = vec![0; costs.len()];
        let mut loads = vec![0; number_of_ranks];
        order.iter().for_each(|&block| {
            let (rank, _) = loads
                .iter()
                .enumerate()
                .min_by(|(ra, la), (rb, lb)| la.cmp(lb).then(ra.cmp(rb)))
                .unwrap_or((0, &0));
            ranks[block] = rank;
            loads[rank] += costs[block];
        });
        HeuristicLoadBalancer { ranks, loads }
    }

    pub fn get_rank(&self, block: usize) -> usize {
        self.ranks[block]
    }

    pub fn get_loads(&self) -> &Vec<usize> {
        &self.loads
    }

    /// Ratio of the heaviest rank load to the mean load.
    pub fn get_imbalance(&self) -> Float {
        let total = self.loads.iter().sum::<usize>();
        if total == 0 {
            return 1.0;
        }
        let mean = total as Float / self.loads.len() as Float;
        self.loads.iter().copied().max().unwrap_or(0) as Float / mean
    }
}

// ---------------------------------------------------------------- STRUCT: Decomposition

/// Slab decomposition of a material grid along its longest axis. Blocks are
/// stored grouped by rank.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    n: [usize; 3],
    axis: usize,
    blocks: Vec<BlockGeometry>,
    slab_starts: Vec<usize>,
    slab_to_block: Vec<usize>,
    rank_ranges: Vec<Range<usize>>,
    load_balancer: HeuristicLoadBalancer,
}

impl Decomposition {
    pub fn new(grid: &MaterialGrid, number_of_blocks: usize, number_of_ranks: usize) -> Self {
        let n = grid.get_n();
        let axis = (0..3).max_by_key(|&x| (n[x], 2 - x)).unwrap_or(0);
        let slice_costs = Self::compute_slice_costs(grid, axis);
        let slab_starts = Self::cut_slabs(&slice_costs, number_of_blocks);

        let slabs = slab_starts
            .iter()
            .enumerate()
            .map(|(slab, &start)| {
                let end = slab_starts.get(slab + 1).copied().unwrap_or(n[axis]);
                let mut origin = [0; 3];
                let mut extent = n;
                origin[axis] = start;
                extent[axis] = end - start;
                BlockGeometry {
                    slab,
                    origin,
                    n: extent,
                    cost: slice_costs[start..end].iter().sum(),
                    rank: 0,
                }
            })
            .collect::<Vec<BlockGeometry>>();

        let costs = slabs.iter().map(|slab| slab.cost).collect::<Vec<usize>>();
        let load_balancer = HeuristicLoadBalancer::new(&costs, number_of_ranks);
        let number_of_ranks = load_balancer.get_loads().len();

        let mut blocks = slabs
            .into_iter()
            .map(|mut slab| {
                slab.rank = load_balancer.get_rank(slab.slab);
                slab
            })
            .collect::<Vec<BlockGeometry>>();
        blocks.sort_by_key(|block| (block.rank, block.slab));

        let mut slab_to_block = vec![0; blocks.len()];
        blocks
            .iter()
            .enumerate()
            .for_each(|(b, block)| slab_to_block[block.slab] = b);
        let rank_ranges = (0..number_of_ranks)
            .map(|rank| {
                let start = blocks.partition_point(|block| block.rank < rank);
                let end = blocks.partition_point(|block| block.rank <= rank);
                start..end
            })
            .collect::<Vec<Range<usize>>>();

        Decomposition {
            n,
            axis,
            blocks,
            slab_starts,
            slab_to_block,
            rank_ranges,
            load_balancer,
        }
    }

    /// Number of non-inert voxels in every slice normal to `axis`.
    fn compute_slice_costs(grid: &MaterialGrid, axis: usize) -> Vec<usize> {
        let n = grid.get_n();
        let mut costs = vec![0; n[axis]];
        grid.get_materials()
            .iter()
            .enumerate()
            .filter(|(_, &m)| m != Material::Inert.id())
            .for_each(|(i, _)| costs[grid.get_index(i)[axis]] += 1);
        costs
    }

    /// First slice of every slab, cutting where the cumulative cost passes the
    /// next equal share. Every slab keeps at least one slice.
    fn cut_slabs(slice_costs: &[usize], number_of_blocks: usize) -> Vec<usize> {
        let number_of_slices = slice_costs.len();
        let number_of_blocks = number_of_blocks.clamp(1, number_of_slices.max(1));
        let total = slice_costs.iter().sum::<usize>().max(1) as Float;
        let mut starts = vec![0];
        let mut cumulative = 0;
        for (slice, cost) in slice_costs.iter().enumerate() {
            let remaining_blocks = number_of_blocks - starts.len();
            if remaining_blocks == 0 {
                break;
            }
            cumulative += cost;
            let share = total * starts.len() as Float / number_of_blocks as Float;
            let remaining_slices = number_of_slices - (slice + 1);
            let must_cut = remaining_slices == remaining_blocks;
            let last_start = *starts.last().unwrap_or(&0);
            if (cumulative as Float >= share || must_cut) && slice + 1 > last_start {
                starts.push(slice + 1);
            }
        }
        starts.retain(|&start| start < number_of_slices.max(1));
        starts
    }
}

impl Decomposition {
    pub fn get_axis(&self) -> usize {
        self.axis
    }

    pub fn get_n(&self) -> [usize; 3] {
        self.n
    }

    pub fn get_blocks(&self) -> &Vec<BlockGeometry> {
        &self.blocks
    }

    pub fn get_number_of_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn get_rank_ranges(&self) -> &Vec<Range<usize>> {
        &self.rank_ranges
    }

    pub fn get_load_balancer(&self) -> &HeuristicLoadBalancer {
        &self.load_balancer
    }

    /// Block owning the voxel `index`.
    pub fn find_owner(&self, index: [usize; 3]) -> Option<usize> {
        if (0..3).any(|x| index[x] >= self.n[x]) {
            return None;
        }
        let slab = self.slab_starts.partition_point(|&start| start <= index[self.axis]) - 1;
        Some(self.slab_to_block[slab])
    }

    /// Halo links of block `b`, for a one-cell padding on every side.
    pub fn compute_halo_links(&self, b: usize) -> Vec<HaloLink> {
        let block = &self.blocks[b];
        let padded = block.n.map(|n_x| n_x + 2);
        let mut links = Vec::new();
        for z in 0..padded[2] {
            for y in 0..padded[1] {
                for x in 0..padded[0] {
                    let p = [x, y, z];
                    let interior = (0..3).all(|k| p[k] >= 1 && p[k] <= block.n[k]);
                    if interior {
                        continue;
                    }
                    let global = [0, 1, 2].map(|k| block.origin[k] as isize + p[k] as isize - 1);
                    if (0..3).any(|k| global[k] < 0 || global[k] >= self.n[k] as isize) {
                        continue;
                    }
                    let global = global.map(|g| g as usize);
                    if let Some(source_block) = self.find_owner(global) {
                        let source = &self.blocks[source_block];
                        let source_p = [0, 1, 2].map(|k| global[k] - source.origin[k] + 1);
                        let source_padded = source.n.map(|n_x| n_x + 2);
                        links.push(HaloLink {
                            local: x + padded[0] * (y + padded[1] * z),
                            source_block,
                            source_local: source_p[0]
                                + source_padded[0] * (source_p[1] + source_padded[1] * source_p[2]),
                        });
                    }
                }
            }
        }
        links
    }

    pub fn print(&self) {
        println!(
            "Decomposition: {} blocks along axis {} on {} ranks (imbalance {:.3})",
            self.blocks.len(),
            self.axis,
            self.rank_ranges.len(),
            self.load_balancer.get_imbalance()
        );
        println!();
    }
}
