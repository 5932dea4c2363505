mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};

use crate::config::LayoutConfig;
use crate::flow::FlowGraph;
use crate::util::stable_pair;

use forces::{
    ChargeParams, CollisionParams, LinkSpec, accumulate_charge, accumulate_collisions,
    apply_links,
};
use quadtree::Quadtree;

const INITIAL_ANGLE: f32 = std::f32::consts::PI * (3.0 - 2.236_068);
const INITIAL_JITTER: f32 = 1.5;

struct LayoutNode {
    position: Vec2,
    velocity: Vec2,
    pin: Option<Vec2>,
}

#[derive(Default)]
struct LayoutScratch {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    deltas: Vec<Vec2>,
}

/// Cooling force simulation over the nodes of one [`FlowGraph`].
///
/// Each [`tick`](Self::tick) decays `alpha` toward `alpha_target`, applies the
/// link, many-body, centering and collision forces to node velocities and then
/// integrates positions. Pinned nodes keep their pin exactly. Once stopped the
/// engine never moves a node again.
pub(in crate::app) struct LayoutEngine {
    nodes: Vec<LayoutNode>,
    links: Vec<LinkSpec>,
    radii: Vec<f32>,
    center: Vec2,
    config: LayoutConfig,
    alpha: f32,
    alpha_target: f32,
    stopped: bool,
    ticks: u64,
    scratch: LayoutScratch,
}

impl LayoutEngine {
    pub(in crate::app) fn new(graph: &FlowGraph, config: LayoutConfig) -> Self {
        Self::with_center(graph, config, Vec2::ZERO)
    }

    pub(in crate::app) fn with_center(graph: &FlowGraph, config: LayoutConfig, center: Vec2) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let radius = config.initial_spread * (0.5 + index as f32).sqrt();
                let angle = index as f32 * INITIAL_ANGLE;
                let (jx, jy) = stable_pair(&node.id);
                LayoutNode {
                    position: center
                        + vec2(angle.cos(), angle.sin()) * radius
                        + vec2(jx, jy) * INITIAL_JITTER,
                    velocity: Vec2::ZERO,
                    pin: None,
                }
            })
            .collect::<Vec<_>>();

        let links = graph
            .edges
            .iter()
            .filter(|edge| edge.source != edge.target)
            .map(|edge| {
                let source_degree = graph.nodes[edge.source].degree as f32;
                let target_degree = graph.nodes[edge.target].degree as f32;
                LinkSpec {
                    source: edge.source,
                    target: edge.target,
                    distance: config.link_distance
                        + config.link_distance_per_degree * (source_degree + target_degree),
                    strength: 1.0 / source_degree.min(target_degree).max(1.0),
                    bias: source_degree / (source_degree + target_degree),
                }
            })
            .collect::<Vec<_>>();

        let radii = graph
            .nodes
            .iter()
            .map(|node| config.collision_radius + node.degree.min(config.collision_degree_cap) as f32)
            .collect::<Vec<_>>();

        Self {
            nodes,
            links,
            radii,
            center,
            config,
            alpha: 1.0,
            alpha_target: 0.0,
            stopped: false,
            ticks: 0,
            scratch: LayoutScratch::default(),
        }
    }

    #[cfg(test)]
    pub(in crate::app) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(in crate::app) fn position(&self, index: usize) -> Vec2 {
        self.nodes[index].position
    }

    pub(in crate::app) fn pin(&self, index: usize) -> Option<Vec2> {
        self.nodes.get(index).and_then(|node| node.pin)
    }

    pub(in crate::app) fn pinned_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.pin.is_some()).count()
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(in crate::app) fn ticks(&self) -> u64 {
        self.ticks
    }

    pub(in crate::app) fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// True while ticking still changes the layout: not cancelled and either
    /// still above the cool-down threshold or being reheated.
    pub(in crate::app) fn is_running(&self) -> bool {
        !self.is_stopped()
            && !self.nodes.is_empty()
            && (self.alpha >= self.config.alpha_min || self.alpha_target >= self.config.alpha_min)
    }

    /// Cancels the simulation for good. Further ticks are no-ops.
    pub(in crate::app) fn stop(&mut self) {
        if !self.stopped {
            log::debug!("layout stopped after {} ticks", self.ticks);
        }
        self.stopped = true;
    }

    pub(in crate::app) fn drag_start(&mut self, index: usize) {
        let Some(node) = self.nodes.get_mut(index) else {
            return;
        };
        node.pin = Some(node.position);
        self.alpha_target = self.config.drag_alpha_target;
    }

    pub(in crate::app) fn drag_to(&mut self, index: usize, position: Vec2) {
        let Some(node) = self.nodes.get_mut(index) else {
            return;
        };
        node.pin = Some(position);
        node.position = position;
        node.velocity = Vec2::ZERO;
    }

    /// Ends a drag. The node stays pinned where it was released.
    pub(in crate::app) fn drag_end(&mut self, index: usize) {
        if index < self.nodes.len() {
            self.alpha_target = 0.0;
        }
    }

    pub(in crate::app) fn unpin(&mut self, index: usize) {
        let Some(node) = self.nodes.get_mut(index) else {
            return;
        };
        if node.pin.take().is_some() {
            self.warm_up();
        }
    }

    pub(in crate::app) fn unpin_all(&mut self) {
        let mut released = false;
        for node in &mut self.nodes {
            released |= node.pin.take().is_some();
        }
        if released {
            self.warm_up();
        }
    }

    fn warm_up(&mut self) {
        self.alpha = self.alpha.max(self.config.drag_alpha_target * 0.5);
    }

    /// Advances the simulation by one step. Returns false when nothing moved
    /// because the engine is stopped or cooled down.
    pub(in crate::app) fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay();
        let alpha = self.alpha;
        let node_count = self.nodes.len();

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.velocities.clear();
        for node in &self.nodes {
            scratch.positions.push(node.position);
            scratch.velocities.push(node.velocity);
        }

        apply_links(&self.links, &scratch.positions, &mut scratch.velocities, alpha);

        if node_count > 1
            && let Some(tree) = Quadtree::build(&scratch.positions, &self.radii)
        {
            let params = ChargeParams {
                strength: self.config.charge_strength,
                theta: self.config.barnes_hut_theta,
                alpha,
            };
            for (index, velocity) in scratch.velocities.iter_mut().enumerate() {
                accumulate_charge(&tree, index, &scratch.positions, params, velocity);
            }
        }

        self.apply_centering();

        let scratch = &mut self.scratch;
        for (index, node) in self.nodes.iter().enumerate() {
            scratch.positions[index] = node.position + scratch.velocities[index];
        }
        scratch.deltas.clear();
        scratch.deltas.resize(node_count, Vec2::ZERO);
        if node_count > 1
            && let Some(tree) = Quadtree::build(&scratch.positions, &self.radii)
        {
            accumulate_collisions(
                &tree,
                &scratch.positions,
                &self.radii,
                CollisionParams {
                    strength: self.config.collision_strength,
                },
                &mut scratch.deltas,
            );
        }

        let keep = 1.0 - self.config.velocity_decay;
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if let Some(pin) = node.pin {
                node.position = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            let velocity = (scratch.velocities[index] + scratch.deltas[index]) * keep;
            node.velocity = velocity;
            node.position += velocity;
        }

        self.ticks += 1;
        if !self.is_running() {
            log::debug!("layout cooled down after {} ticks", self.ticks);
        }
        true
    }

    /// Shifts free nodes so the mean of all positions drifts toward the
    /// centre.
    fn apply_centering(&mut self) {
        let node_count = self.nodes.len();
        if node_count == 0 || self.config.center_strength <= 0.0 {
            return;
        }

        let mut mean = Vec2::ZERO;
        for node in &self.nodes {
            mean += node.position;
        }
        mean /= node_count as f32;

        let shift = (self.center - mean) * self.config.center_strength;
        for node in &mut self.nodes {
            if node.pin.is_none() {
                node.position += shift;
            }
        }
    }
}
