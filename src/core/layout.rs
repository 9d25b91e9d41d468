use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel-layout")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::Viewport;

/// Simulation-space state of one bubble. The origin is the visual center of
/// the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
}

/// Cooling and force constants of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutTuning {
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub alpha_target: f64,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f64,
    /// Pull toward the origin on each axis.
    pub center_strength: f64,
    /// Pairs closer than this are treated as this far apart by the charge force.
    pub distance_min: f64,
    pub initial_radius: f64,
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self {
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.4,
            center_strength: 0.1,
            distance_min: 1.0,
            initial_radius: 10.0,
        }
    }
}

/// Simulation-space box a node's edge may not leave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl LayoutBounds {
    /// Bounds of `viewport` when the simulation origin is drawn at pixel
    /// (`cx`, `cy`).
    #[must_use]
    pub fn from_viewport(viewport: Viewport, cx: f64, cy: f64) -> Self {
        Self {
            min_x: -cx,
            max_x: f64::from(viewport.width) - cx,
            min_y: -cy,
            max_y: f64::from(viewport.height) - cy,
        }
    }

    /// Pulls the node back inside, inset by its radius, and drops the
    /// outward velocity. A node wider than the box is centered in it.
    fn confine(&self, node: &mut LayoutNode) {
        node.x = confine_axis(node.x, &mut node.vx, self.min_x + node.radius, self.max_x - node.radius);
        node.y = confine_axis(node.y, &mut node.vy, self.min_y + node.radius, self.max_y - node.radius);
    }
}

fn confine_axis(position: f64, velocity: &mut f64, min: f64, max: f64) -> f64 {
    if min > max {
        *velocity = 0.0;
        (min + max) / 2.0
    } else if position < min {
        *velocity = velocity.max(0.0);
        min
    } else if position > max {
        *velocity = velocity.min(0.0);
        max
    } else {
        position
    }
}

/// Many-body force simulation that clusters bubbles around the origin.
///
/// Each [`tick`](Self::tick) applies the charge force, the x/y centering
/// forces and, when configured, a collision force, then integrates velocity
/// and confines nodes to the optional [`LayoutBounds`].
/// The simulation cools by `alpha` and reports itself settled once
/// `alpha < alpha_min`.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    nodes: Vec<LayoutNode>,
    charge_strength: f64,
    collision_padding: Option<f64>,
    bounds: Option<LayoutBounds>,
    tuning: LayoutTuning,
    alpha: f64,
    ticks: u64,
    rng: StdRng,
}

impl LayoutEngine {
    /// Seeds one node per radius on a phyllotaxis spiral around the origin.
    #[must_use]
    pub fn new(radii: &[f64], charge_strength: f64, seed: u64) -> Self {
        Self::with_tuning(radii, charge_strength, seed, LayoutTuning::default())
    }

    #[must_use]
    pub fn with_tuning(radii: &[f64], charge_strength: f64, seed: u64, tuning: LayoutTuning) -> Self {
        let golden_angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
        let nodes = radii
            .iter()
            .enumerate()
            .map(|(index, radius)| {
                let spiral = tuning.initial_radius * (index as f64 + 0.5).sqrt();
                let angle = index as f64 * golden_angle;
                LayoutNode {
                    x: spiral * angle.cos(),
                    y: spiral * angle.sin(),
                    vx: 0.0,
                    vy: 0.0,
                    radius: *radius,
                }
            })
            .collect();

        Self {
            nodes,
            charge_strength,
            collision_padding: None,
            bounds: None,
            tuning,
            alpha: 1.0,
            ticks: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Enables the collision force; bubbles keep `padding` pixels apart.
    #[must_use]
    pub fn with_collision_padding(mut self, padding: Option<f64>) -> Self {
        self.collision_padding = padding;
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: Option<LayoutBounds>) -> Self {
        self.bounds = bounds;
        if let Some(bounds) = self.bounds {
            for node in &mut self.nodes {
                bounds.confine(node);
            }
        }
        self
    }

    #[must_use]
    pub fn bounds(&self) -> Option<LayoutBounds> {
        self.bounds
    }

    #[must_use]
    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    #[must_use]
    pub fn position(&self, index: usize) -> Option<(f64, f64)> {
        self.nodes.get(index).map(|node| (node.x, node.y))
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.alpha < self.tuning.alpha_min
    }

    /// Advances the simulation by one step. Returns `false` once settled; a
    /// settled simulation is left untouched.
    pub fn tick(&mut self) -> bool {
        if self.is_settled() {
            return false;
        }

        self.alpha += (self.tuning.alpha_target - self.alpha) * self.tuning.alpha_decay;
        self.ticks += 1;

        self.apply_charge();
        self.apply_centering();
        if let Some(padding) = self.collision_padding {
            self.apply_collision(padding);
        }

        let retain = 1.0 - self.tuning.velocity_decay;
        for node in &mut self.nodes {
            node.vx *= retain;
            node.vy *= retain;
            node.x += node.vx;
            node.y += node.vy;
            if let Some(bounds) = &self.bounds {
                bounds.confine(node);
            }
        }

        trace!(tick = self.ticks, alpha = self.alpha, "layout tick");
        if self.is_settled() {
            debug!(ticks = self.ticks, nodes = self.nodes.len(), "layout settled");
            return false;
        }
        true
    }

    /// Ticks until settled or `max_ticks` is reached; returns ticks taken.
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut taken = 0;
        while taken < max_ticks && !self.is_settled() {
            self.tick();
            taken += 1;
        }
        taken
    }

    fn apply_charge(&mut self) {
        let strength_alpha = self.charge_strength * self.alpha;
        let distance_min2 = self.tuning.distance_min * self.tuning.distance_min;
        // Antisymmetric nudge for coincident pairs so they separate instead of
        // moving together.
        let jiggle = (
            self.rng.gen_range(-1e-6..1e-6),
            self.rng.gen_range(-1e-6..1e-6),
        );
        let positions: Vec<(f64, f64)> = self.nodes.iter().map(|node| (node.x, node.y)).collect();

        #[cfg(feature = "parallel-layout")]
        let deltas: Vec<(f64, f64)> = (0..positions.len())
            .into_par_iter()
            .map(|index| charge_on(index, &positions, strength_alpha, distance_min2, jiggle))
            .collect();
        #[cfg(not(feature = "parallel-layout"))]
        let deltas: Vec<(f64, f64)> = (0..positions.len())
            .map(|index| charge_on(index, &positions, strength_alpha, distance_min2, jiggle))
            .collect();

        for (node, (dvx, dvy)) in self.nodes.iter_mut().zip(deltas) {
            node.vx += dvx;
            node.vy += dvy;
        }
    }

    fn apply_centering(&mut self) {
        let k = self.tuning.center_strength * self.alpha;
        for node in &mut self.nodes {
            node.vx -= node.x * k;
            node.vy -= node.y * k;
        }
    }

    /// Resolves overlaps using positions predicted from current velocity.
    fn apply_collision(&mut self, padding: f64) {
        let count = self.nodes.len();
        for i in 0..count {
            let ri = self.nodes[i].radius + padding * 0.5;
            let ri2 = ri * ri;
            let xi = self.nodes[i].x + self.nodes[i].vx;
            let yi = self.nodes[i].y + self.nodes[i].vy;
            for j in (i + 1)..count {
                let rj = self.nodes[j].radius + padding * 0.5;
                let reach = ri + rj;
                let mut x = xi - self.nodes[j].x - self.nodes[j].vx;
                let mut y = yi - self.nodes[j].y - self.nodes[j].vy;
                let mut l = x * x + y * y;
                if l >= reach * reach {
                    continue;
                }
                if x == 0.0 {
                    x = self.rng.gen_range(-1e-6..1e-6);
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.rng.gen_range(-1e-6..1e-6);
                    l += y * y;
                }
                let distance = l.sqrt();
                let push = (reach - distance) / distance;
                x *= push;
                y *= push;
                let share = (rj * rj) / (ri2 + rj * rj);
                self.nodes[i].vx += x * share;
                self.nodes[i].vy += y * share;
                self.nodes[j].vx -= x * (1.0 - share);
                self.nodes[j].vy -= y * (1.0 - share);
            }
        }
    }
}

fn charge_on(
    index: usize,
    positions: &[(f64, f64)],
    strength_alpha: f64,
    distance_min2: f64,
    jiggle: (f64, f64),
) -> (f64, f64) {
    let (x, y) = positions[index];
    let mut dvx = 0.0;
    let mut dvy = 0.0;
    for (other, &(ox, oy)) in positions.iter().enumerate() {
        if other == index {
            continue;
        }
        let direction = if other > index { 1.0 } else { -1.0 };
        let mut dx = ox - x;
        let mut dy = oy - y;
        let mut l = dx * dx + dy * dy;
        if dx == 0.0 {
            dx = jiggle.0 * direction;
            l += dx * dx;
        }
        if dy == 0.0 {
            dy = jiggle.1 * direction;
            l += dy * dy;
        }
        if l < distance_min2 {
            l = (distance_min2 * l).sqrt();
        }
        dvx += dx * strength_alpha / l;
        dvy += dy * strength_alpha / l;
    }
    (dvx, dvy)
}

#[cfg(test)]
mod tests {
    use super::{LayoutBounds, LayoutEngine};
    use crate::core::Viewport;

    #[test]
    fn spiral_seeding_never_places_two_nodes_on_the_same_spot() {
        let engine = LayoutEngine::new(&[5.0; 16], -50.0, 1);
        let nodes = engine.nodes();
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                assert!((a.x - b.x).hypot(a.y - b.y) > 1.0);
            }
        }
    }

    #[test]
    fn settled_engine_ignores_further_ticks() {
        let mut engine = LayoutEngine::new(&[4.0, 6.0], -30.0, 3);
        engine.run_until_settled(10_000);
        assert!(engine.is_settled());
        let before = engine.nodes().to_vec();
        assert!(!engine.tick());
        assert_eq!(engine.nodes(), before.as_slice());
    }

    #[test]
    fn single_node_drifts_to_origin() {
        let mut engine = LayoutEngine::new(&[10.0], -50.0, 9);
        engine.run_until_settled(10_000);
        let (x, y) = engine.position(0).expect("one node");
        assert!(x.abs() < 1.0 && y.abs() < 1.0, "node at ({x}, {y})");
    }

    #[test]
    fn bounded_nodes_keep_their_edge_inside_the_box() {
        let bounds = LayoutBounds::from_viewport(Viewport::new(100, 100), 50.0, 50.0);
        let mut engine = LayoutEngine::new(&[8.0; 40], -400.0, 5).with_bounds(Some(bounds));
        engine.run_until_settled(10_000);
        for node in engine.nodes() {
            assert!(node.x - node.radius >= -50.0 && node.x + node.radius <= 50.0, "x = {}", node.x);
            assert!(node.y - node.radius >= -50.0 && node.y + node.radius <= 50.0, "y = {}", node.y);
        }
    }

    #[test]
    fn oversized_node_is_centered_in_the_box() {
        let bounds = LayoutBounds::from_viewport(Viewport::new(20, 40), 10.0, 20.0);
        let mut engine = LayoutEngine::new(&[30.0, 2.0], -50.0, 1).with_bounds(Some(bounds));
        engine.tick();
        let (x, y) = engine.position(0).expect("first node");
        assert_eq!((x, y), (0.0, 0.0));
    }
}
