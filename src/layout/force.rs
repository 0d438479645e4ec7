//! Force-directed layout.
//!
//! A [`Simulation`] owns transient velocities for one graph snapshot. Each
//! [`Simulation::step`] sums, per body:
//!
//! - repulsion `k / d²` between every pair (d floored at `min_distance`)
//! - spring attraction along edges toward `link_distance`
//! - a weak pull toward the center
//! - a weak radial hint toward a ring derived from DAG depth
//!
//! then integrates with velocity decay and resolves collisions with a few
//! relaxation passes. All forces scale with `alpha`, which cools toward
//! `alpha_target`; the simulation is settled once both are below `alpha_min`.
//!
//! Pinned bodies (manual position or active drag) never move but still repel
//! and attract the others.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use crate::config::ForceConfig;
use crate::graph::{Edge, Point, Task};

use super::depth::{compute_depths, siblings_per_depth};
use super::{Bounds, LayoutError, Positions};

#[derive(Debug, Clone)]
struct Body {
    id: String,
    pos: Point,
    vx: f64,
    vy: f64,
    /// Stored manual position, if any
    anchor: Option<Point>,
    /// Where the body is currently held, if pinned
    pin: Option<Point>,
    dragging: bool,
    /// Target distance from the center for the radial hint
    ring: f64,
}

impl Body {
    fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }
}

/// A running force simulation over one graph snapshot.
#[derive(Debug, Clone)]
pub struct Simulation {
    bodies: Vec<Body>,
    index: HashMap<String, usize>,
    links: Vec<(usize, usize)>,
    edge_set: HashSet<(String, String)>,
    config: ForceConfig,
    center: Point,
    alpha: f64,
    alpha_target: f64,
    steps: usize,
}

/// Deterministic initial placement: a sunflower spiral around `center`.
fn phyllotaxis(i: usize, center: Point, spacing: f64) -> Point {
    let golden_angle = PI * (3.0 - 5f64.sqrt());
    let radius = spacing * (0.5 + i as f64).sqrt();
    let angle = i as f64 * golden_angle;
    Point::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// Small fixed direction for bodies sitting exactly on top of each other
fn jiggle(i: usize, j: usize) -> (f64, f64) {
    let angle = (i * 31 + j * 17) as f64;
    (angle.cos() * 1e-3, angle.sin() * 1e-3)
}

impl Simulation {
    /// Build a simulation. Tasks with a manual position start there, pinned.
    pub fn new(tasks: &[Task], edges: &[Edge], config: &ForceConfig, center: Point) -> Self {
        let mut sim = Self {
            bodies: Vec::new(),
            index: HashMap::new(),
            links: Vec::new(),
            edge_set: HashSet::new(),
            config: config.clone(),
            center,
            alpha: 1.0,
            alpha_target: 0.0,
            steps: 0,
        };
        sim.rebuild(tasks, edges, &HashMap::new());
        tracing::debug!(
            bodies = sim.bodies.len(),
            links = sim.links.len(),
            "force simulation initialised"
        );
        sim
    }

    fn seed_spacing(&self) -> f64 {
        2.0 * self.config.collision_radius.max(5.0)
    }

    fn rebuild(&mut self, tasks: &[Task], edges: &[Edge], previous: &HashMap<String, Body>) {
        let spacing = self.seed_spacing();
        let mut bodies = Vec::with_capacity(tasks.len());
        let mut index = HashMap::with_capacity(tasks.len());

        for (i, task) in tasks.iter().enumerate() {
            if index.contains_key(&task.id) {
                continue;
            }
            let body = match previous.get(&task.id) {
                Some(old) => {
                    let mut body = old.clone();
                    body.anchor = task.position;
                    if !body.dragging {
                        body.pin = task.position;
                    }
                    if let Some(pin) = body.pin {
                        body.pos = pin;
                    }
                    body
                }
                None => {
                    let pos = task
                        .position
                        .unwrap_or_else(|| phyllotaxis(i, self.center, spacing));
                    Body {
                        id: task.id.clone(),
                        pos,
                        vx: 0.0,
                        vy: 0.0,
                        anchor: task.position,
                        pin: task.position,
                        dragging: false,
                        ring: 0.0,
                    }
                }
            };
            index.insert(task.id.clone(), bodies.len());
            bodies.push(body);
        }

        let mut links = Vec::new();
        let mut edge_set = HashSet::new();
        for edge in edges {
            if let (Some(&s), Some(&t)) = (index.get(&edge.source), index.get(&edge.target)) {
                if s != t && edge_set.insert((edge.source.clone(), edge.target.clone())) {
                    links.push((s, t));
                }
            }
        }

        // Radial hint: ring radius grows with depth and with sqrt(siblings)
        let ids: Vec<&str> = bodies.iter().map(|b| b.id.as_str()).collect();
        let depths = compute_depths(&ids, edges);
        let siblings = siblings_per_depth(&depths);
        let rings: Vec<f64> = ids
            .iter()
            .map(|id| {
                let depth = depths.get(id).copied().unwrap_or(0);
                let count = siblings.get(&depth).copied().unwrap_or(1);
                depth as f64 * self.config.layer_spacing
                    + (count as f64).sqrt() * self.config.collision_radius
            })
            .collect();
        for (body, ring) in bodies.iter_mut().zip(rings) {
            body.ring = ring;
        }

        self.bodies = bodies;
        self.index = index;
        self.links = links;
        self.edge_set = edge_set;
    }

    /// Replace the graph snapshot. Surviving bodies keep their position and
    /// velocity; new ones are seeded. Reheats only if the topology changed.
    pub fn set_graph(&mut self, tasks: &[Task], edges: &[Edge]) {
        let old_ids: HashSet<&str> = self.bodies.iter().map(|b| b.id.as_str()).collect();
        let new_ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        let new_edges: HashSet<(String, String)> = edges
            .iter()
            .filter(|e| {
                e.source != e.target
                    && new_ids.contains(e.source.as_str())
                    && new_ids.contains(e.target.as_str())
            })
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect();
        let changed = old_ids != new_ids || new_edges != self.edge_set;

        let previous: HashMap<String, Body> = self
            .bodies
            .drain(..)
            .map(|b| (b.id.clone(), b))
            .collect();
        self.rebuild(tasks, edges, &previous);

        // A dragged task removed from the snapshot can never be released
        if !self.bodies.iter().any(|b| b.dragging) {
            self.alpha_target = 0.0;
        }

        if changed {
            tracing::debug!(bodies = self.bodies.len(), "graph changed, reheating");
            self.reheat(1.0);
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Settled once alpha has cooled and nothing holds it warm
    pub fn is_settled(&self) -> bool {
        self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
    }

    /// Sum of velocity magnitudes of free bodies
    pub fn kinetic_energy(&self) -> f64 {
        self.bodies
            .iter()
            .filter(|b| !b.is_pinned())
            .map(|b| (b.vx * b.vx + b.vy * b.vy).sqrt())
            .sum()
    }

    pub fn reheat(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    /// Advance one tick. Returns false without doing any work once settled.
    pub fn step(&mut self) -> bool {
        if self.is_settled() {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;
        let n = self.bodies.len();
        let mut force = vec![(0.0f64, 0.0f64); n];

        self.apply_repulsion(&mut force, alpha);
        self.apply_links(&mut force, alpha);
        self.apply_center_and_radial(&mut force, alpha);

        let keep = 1.0 - self.config.velocity_decay;
        for (body, (fx, fy)) in self.bodies.iter_mut().zip(force) {
            if let Some(pin) = body.pin {
                body.pos = pin;
                body.vx = 0.0;
                body.vy = 0.0;
                continue;
            }
            body.vx = (body.vx + fx) * keep;
            body.vy = (body.vy + fy) * keep;
            body.pos.x += body.vx;
            body.pos.y += body.vy;
        }

        for _ in 0..self.config.collision_iterations {
            self.resolve_collisions();
        }

        self.steps += 1;
        true
    }

    fn apply_repulsion(&self, force: &mut [(f64, f64)], alpha: f64) {
        let min_d2 = self.config.min_distance * self.config.min_distance;
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let (a, b) = (&self.bodies[i], &self.bodies[j]);
                let (mut dx, mut dy) = (a.pos.x - b.pos.x, a.pos.y - b.pos.y);
                if dx == 0.0 && dy == 0.0 {
                    (dx, dy) = jiggle(i, j);
                }
                let d2 = (dx * dx + dy * dy).max(min_d2);
                let d = d2.sqrt();
                let magnitude = self.config.repulsion_strength * alpha / d2;
                let (fx, fy) = (dx / d * magnitude, dy / d * magnitude);
                force[i].0 += fx;
                force[i].1 += fy;
                force[j].0 -= fx;
                force[j].1 -= fy;
            }
        }
    }

    fn apply_links(&self, force: &mut [(f64, f64)], alpha: f64) {
        for &(s, t) in &self.links {
            let (a, b) = (&self.bodies[s], &self.bodies[t]);
            let (dx, dy) = (b.pos.x - a.pos.x, b.pos.y - a.pos.y);
            let d = (dx * dx + dy * dy).sqrt().max(self.config.min_distance);
            let k = (d - self.config.link_distance) / d * self.config.link_strength * alpha;
            let (fx, fy) = (dx * k * 0.5, dy * k * 0.5);
            force[s].0 += fx;
            force[s].1 += fy;
            force[t].0 -= fx;
            force[t].1 -= fy;
        }
    }

    fn apply_center_and_radial(&self, force: &mut [(f64, f64)], alpha: f64) {
        let c = self.center;
        for (i, body) in self.bodies.iter().enumerate() {
            let (dx, dy) = (body.pos.x - c.x, body.pos.y - c.y);
            force[i].0 -= dx * self.config.center_strength * alpha;
            force[i].1 -= dy * self.config.center_strength * alpha;

            let d = (dx * dx + dy * dy).sqrt().max(self.config.min_distance);
            let k = (body.ring - d) / d * self.config.radial_strength * alpha;
            force[i].0 += dx * k;
            force[i].1 += dy * k;
        }
    }

    /// One relaxation pass separating bodies closer than two radii.
    /// Pinned bodies never move; a free body touching one takes the full push.
    fn resolve_collisions(&mut self) {
        let min_sep = 2.0 * self.config.collision_radius;
        if min_sep <= 0.0 {
            return;
        }
        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (pi, pj) = (self.bodies[i].is_pinned(), self.bodies[j].is_pinned());
                if pi && pj {
                    continue;
                }
                let (a, b) = (self.bodies[i].pos, self.bodies[j].pos);
                let (mut dx, mut dy) = (b.x - a.x, b.y - a.y);
                if dx == 0.0 && dy == 0.0 {
                    (dx, dy) = jiggle(i, j);
                }
                let d = (dx * dx + dy * dy).sqrt();
                if d >= min_sep {
                    continue;
                }
                let overlap = min_sep - d;
                let (ux, uy) = (dx / d, dy / d);
                let (share_i, share_j) = match (pi, pj) {
                    (true, false) => (0.0, 1.0),
                    (false, true) => (1.0, 0.0),
                    _ => (0.5, 0.5),
                };
                self.bodies[i].pos.x -= ux * overlap * share_i;
                self.bodies[i].pos.y -= uy * overlap * share_i;
                self.bodies[j].pos.x += ux * overlap * share_j;
                self.bodies[j].pos.y += uy * overlap * share_j;
            }
        }
    }

    /// Step until settled or `max_steps` ticks ran. Returns ticks taken.
    pub fn run_until_settled(&mut self, max_steps: usize) -> usize {
        let mut taken = 0;
        while taken < max_steps && self.step() {
            taken += 1;
        }
        tracing::debug!(
            steps = taken,
            settled = self.is_settled(),
            energy = self.kinetic_energy(),
            "force simulation run"
        );
        taken
    }

    fn body_mut(&mut self, id: &str) -> Result<&mut Body, LayoutError> {
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| LayoutError::UnknownNode(id.to_string()))?;
        Ok(&mut self.bodies[idx])
    }

    /// Pin a body under the cursor and warm the simulation so its
    /// neighbours follow.
    pub fn drag_start(&mut self, id: &str) -> Result<(), LayoutError> {
        let body = self.body_mut(id)?;
        body.dragging = true;
        body.pin = Some(body.pos);
        self.alpha_target = self.config.drag_alpha_target;
        Ok(())
    }

    /// Move a body directly. The rest of the graph keeps simulating.
    pub fn drag_move(&mut self, id: &str, point: Point) -> Result<(), LayoutError> {
        let body = self.body_mut(id)?;
        body.pos = point;
        body.pin = Some(point);
        body.vx = 0.0;
        body.vy = 0.0;
        Ok(())
    }

    /// Release a dragged body. With `stick` the drop point becomes its manual
    /// position and is returned for persisting. Otherwise a body with a stored
    /// manual position snaps back to it and any other body is freed.
    pub fn drag_end(&mut self, id: &str, stick: bool) -> Result<Option<Point>, LayoutError> {
        let body = self.body_mut(id)?;
        body.dragging = false;
        let dropped = if stick {
            body.anchor = Some(body.pos);
            body.pin = Some(body.pos);
            Some(body.pos)
        } else {
            body.pin = body.anchor;
            if let Some(anchor) = body.anchor {
                body.pos = anchor;
            }
            None
        };

        if !self.bodies.iter().any(|b| b.dragging) {
            self.alpha_target = 0.0;
        }
        Ok(dropped)
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.index.get(id).map(|&idx| self.bodies[idx].pos)
    }

    pub fn positions(&self) -> Positions {
        self.bodies
            .iter()
            .map(|b| (b.id.clone(), b.pos))
            .collect()
    }

    /// Consume the simulation and keep only the positions
    pub fn into_positions(self) -> Positions {
        self.bodies.into_iter().map(|b| (b.id, b.pos)).collect()
    }
}

/// Single-shot force layout centred in `bounds`, run until settled.
pub fn compute_layout(
    tasks: &[Task],
    edges: &[Edge],
    bounds: Bounds,
    config: &ForceConfig,
) -> Positions {
    if tasks.is_empty() {
        return Positions::new();
    }
    let mut sim = Simulation::new(tasks, edges, config, bounds.center());
    sim.run_until_settled(config.max_iterations);
    sim.into_positions()
}
