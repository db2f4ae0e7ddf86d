/*
 * Neighbor Query Module
 *
 * Flocking asks for the particles that may lie within a radius of a point.
 * The question sits behind the NeighborQuery trait so the default brute force
 * scan can be replaced by a spatial index without touching the flocking math.
 * Implementations only return candidates: the exact radius tests (strict `<`)
 * stay in the particle behaviors.
 *
 * The grid divides the borders into square cells. It is rebuilt at the start
 * of every update, and the system reports each particle as it moves so the
 * cells always hold live positions. Queries therefore see exactly what a
 * brute force scan would see.
 */

use nannou::prelude::*;
use slotmap::SlotMap;

use crate::particle::Particle;
use crate::system::ParticleId;

pub trait NeighborQuery {
    /// Index the live particles. Called once per update, before any query.
    fn rebuild(&mut self, particles: &SlotMap<ParticleId, Particle>, order: &[ParticleId], bounds: Rect);

    /// Append every particle that may lie within `radius` of `position`.
    fn candidates(&self, position: Point2, radius: f32, out: &mut Vec<ParticleId>);

    /// A particle moved from `from` to `to` after the last rebuild.
    fn moved(&mut self, _id: ParticleId, _from: Point2, _to: Point2) {}
}

/// Every live particle is a candidate for every query.
#[derive(Default)]
pub struct BruteForce {
    ids: Vec<ParticleId>,
}

impl NeighborQuery for BruteForce {
    fn rebuild(&mut self, _particles: &SlotMap<ParticleId, Particle>, order: &[ParticleId], _bounds: Rect) {
        self.ids.clear();
        self.ids.extend_from_slice(order);
    }

    fn candidates(&self, _position: Point2, _radius: f32, out: &mut Vec<ParticleId>) {
        out.extend_from_slice(&self.ids);
    }
}

pub struct SpatialGrid {
    pub cell_size: f32,
    pub grid: Vec<Vec<ParticleId>>,
    pub columns: usize,
    pub rows: usize,
    origin: Point2,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            grid: Vec::new(),
            columns: 0,
            rows: 0,
            origin: Point2::ZERO,
        }
    }

    // Resize the grid to cover the given bounds
    fn cover(&mut self, bounds: Rect) {
        let columns = ((bounds.w() / self.cell_size).ceil() as usize).max(1);
        let rows = ((bounds.h() / self.cell_size).ceil() as usize).max(1);

        self.origin = pt2(bounds.left(), bounds.bottom());
        if columns != self.columns || rows != self.rows {
            self.columns = columns;
            self.rows = rows;
            self.grid = vec![Vec::new(); columns * rows];
        } else {
            for cell in &mut self.grid {
                cell.clear();
            }
        }
    }

    // Cell coordinate along one axis, clamped into the grid
    #[inline]
    fn axis_cell(&self, offset: f32, count: usize) -> usize {
        (offset / self.cell_size).floor().clamp(0.0, count as f32 - 1.0) as usize
    }

    // Convert world coordinates to grid cell index
    #[inline]
    pub fn pos_to_cell_index(&self, pos: Point2) -> usize {
        let x = self.axis_cell(pos.x - self.origin.x, self.columns);
        let y = self.axis_cell(pos.y - self.origin.y, self.rows);
        y * self.columns + x
    }
}

impl NeighborQuery for SpatialGrid {
    fn rebuild(&mut self, particles: &SlotMap<ParticleId, Particle>, order: &[ParticleId], bounds: Rect) {
        self.cover(bounds);

        for &id in order {
            if let Some(particle) = particles.get(id) {
                let cell_index = self.pos_to_cell_index(particle.position);
                self.grid[cell_index].push(id);
            }
        }
    }

    fn candidates(&self, position: Point2, radius: f32, out: &mut Vec<ParticleId>) {
        if self.grid.is_empty() {
            return;
        }

        let min_x = self.axis_cell(position.x - radius - self.origin.x, self.columns);
        let max_x = self.axis_cell(position.x + radius - self.origin.x, self.columns);
        let min_y = self.axis_cell(position.y - radius - self.origin.y, self.rows);
        let max_y = self.axis_cell(position.y + radius - self.origin.y, self.rows);

        for y in min_y..=max_y {
            let row = y * self.columns;
            for x in min_x..=max_x {
                out.extend_from_slice(&self.grid[row + x]);
            }
        }
    }

    fn moved(&mut self, id: ParticleId, from: Point2, to: Point2) {
        if self.grid.is_empty() {
            return;
        }

        let old_cell = self.pos_to_cell_index(from);
        let new_cell = self.pos_to_cell_index(to);
        if old_cell == new_cell {
            return;
        }

        if let Some(slot) = self.grid[old_cell].iter().position(|&other| other == id) {
            self.grid[old_cell].swap_remove(slot);
            self.grid[new_cell].push(id);
        }
    }
}
