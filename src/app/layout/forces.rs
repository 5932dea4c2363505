use eframe::egui::{Vec2, vec2};

use super::quadtree::{Cell, Quadtree};

/// Many-body forces never use a squared distance below this.
const DISTANCE_MIN_SQ: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct LinkSpec {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) distance: f32,
    pub(super) strength: f32,
    pub(super) bias: f32,
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) strength: f32,
    pub(super) theta: f32,
    pub(super) alpha: f32,
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
}

/// Deterministic stand-in for a random nudge when two points coincide.
fn jiggle(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * 1e-3
}

/// Springs every link toward its rest length, moving both endpoints'
/// velocities by the bias split.
pub(super) fn apply_links(
    links: &[LinkSpec],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    alpha: f32,
) {
    for (link_index, link) in links.iter().enumerate() {
        let mut delta = (positions[link.target] + velocities[link.target])
            - (positions[link.source] + velocities[link.source]);
        if delta.length_sq() <= f32::EPSILON {
            delta = jiggle(link_index, link.target);
        }

        let length = delta.length();
        let scale = (length - link.distance) / length * alpha * link.strength;
        let correction = delta * scale;

        velocities[link.target] -= correction * link.bias;
        velocities[link.source] += correction * (1.0 - link.bias);
    }
}

fn charge_between(delta: Vec2, mass: f32, params: ChargeParams) -> Vec2 {
    let mut distance_sq = delta.length_sq();
    if distance_sq < DISTANCE_MIN_SQ {
        distance_sq = (DISTANCE_MIN_SQ * distance_sq).sqrt();
    }
    delta * (params.strength * mass * params.alpha / distance_sq)
}

/// Barnes-Hut accumulation of the many-body velocity change for `index`.
/// `delta` points from the node toward the other mass, so a negative
/// strength pushes the node away.
pub(super) fn accumulate_charge(
    tree: &Quadtree,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    charge_from_cell(tree, tree.root(), index, positions, params, velocity);
}

fn charge_from_cell(
    tree: &Quadtree,
    cell: &Cell,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    if cell.count == 0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other_index in &cell.points {
            if other_index == index {
                continue;
            }

            let mut delta = positions[other_index] - point;
            if delta.length_sq() <= f32::EPSILON {
                delta = jiggle(index, other_index);
            }
            *velocity += charge_between(delta, 1.0, params);
        }
        return;
    }

    let delta = cell.centroid - point;
    let distance = delta.length().max(1e-4);
    let can_approximate = !cell.extent.contains(point)
        && (cell.extent.width() / distance) < params.theta
        && cell.count > 1;

    if can_approximate {
        *velocity += charge_between(delta, cell.count as f32, params);
        return;
    }

    for child in tree.children(cell) {
        charge_from_cell(tree, child, index, positions, params, velocity);
    }
}

fn collide_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    let min_distance = radii[from] + radii[to];
    let mut offset = positions[from] - positions[to];
    let mut distance_sq = offset.length_sq();
    if distance_sq >= min_distance * min_distance {
        return;
    }

    if distance_sq <= f32::EPSILON {
        offset = jiggle(from, to);
        distance_sq = offset.length_sq();
    }

    let distance = distance_sq.sqrt();
    let push = offset * ((min_distance - distance) / distance * params.strength);
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let share = to_sq / (from_sq + to_sq);

    deltas[from] += push * share;
    deltas[to] -= push * (1.0 - share);
}

/// Resolves every overlapping node pair. A pair of cells is skipped when the
/// gap between their squares exceeds the sum of their largest radii.
pub(super) fn accumulate_collisions(
    tree: &Quadtree,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    let root = tree.root();
    collide_cells(tree, root, root, true, positions, radii, params, deltas);
}

#[allow(clippy::too_many_arguments)]
fn collide_cells(
    tree: &Quadtree,
    cell_a: &Cell,
    cell_b: &Cell,
    same_cell: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    let reach = cell_a.max_radius + cell_b.max_radius;
    if cell_a.extent.gap_sq(cell_b.extent) > reach * reach {
        return;
    }

    if cell_a.is_leaf() && cell_b.is_leaf() {
        if same_cell {
            for (i, &from) in cell_a.points.iter().enumerate() {
                for &to in &cell_a.points[i + 1..] {
                    collide_pair(from, to, positions, radii, params, deltas);
                }
            }
        } else {
            for &from in &cell_a.points {
                for &to in &cell_b.points {
                    collide_pair(from, to, positions, radii, params, deltas);
                }
            }
        }
        return;
    }

    if same_cell {
        let children = cell_a.children.iter().flatten().copied().collect::<Vec<_>>();
        for (first, &child_a) in children.iter().enumerate() {
            let child_a = tree.cell(child_a);
            collide_cells(tree, child_a, child_a, true, positions, radii, params, deltas);

            for &child_b in &children[first + 1..] {
                let child_b = tree.cell(child_b);
                collide_cells(tree, child_a, child_b, false, positions, radii, params, deltas);
            }
        }
        return;
    }

    let split_a = if cell_a.is_leaf() {
        false
    } else if cell_b.is_leaf() {
        true
    } else {
        cell_a.extent.width() >= cell_b.extent.width()
    };

    if split_a {
        for child in tree.children(cell_a) {
            collide_cells(tree, child, cell_b, false, positions, radii, params, deltas);
        }
    } else {
        for child in tree.children(cell_b) {
            collide_cells(tree, cell_a, child, false, positions, radii, params, deltas);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charge(alpha: f32) -> ChargeParams {
        ChargeParams {
            strength: -300.0,
            theta: 0.9,
            alpha,
        }
    }

    #[test]
    fn negative_charge_pushes_nodes_apart() {
        let positions = [vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let tree = Quadtree::build(&positions, &vec![10.0; positions.len()]).unwrap();

        let mut left = Vec2::ZERO;
        let mut right = Vec2::ZERO;
        accumulate_charge(&tree, 0, &positions, charge(1.0), &mut left);
        accumulate_charge(&tree, 1, &positions, charge(1.0), &mut right);

        assert!(left.x < 0.0);
        assert!(right.x > 0.0);
        assert!((left.x + right.x).abs() < 1e-4);
        assert!((left.x + 30.0).abs() < 1e-3);
    }

    #[test]
    fn charge_falls_off_with_inverse_squared_distance() {
        let near = charge_between(vec2(10.0, 0.0), 1.0, charge(1.0));
        let far = charge_between(vec2(20.0, 0.0), 1.0, charge(1.0));
        let scale_near = near.x / 10.0;
        let scale_far = far.x / 20.0;
        assert!((scale_near / scale_far - 4.0).abs() < 1e-3);
    }

    #[test]
    fn approximation_stays_close_to_exact_sum() {
        let mut positions = vec![vec2(0.0, 0.0)];
        for index in 0..64 {
            positions.push(vec2(
                900.0 + (index % 8) as f32 * 4.0,
                (index / 8) as f32 * 4.0,
            ));
        }
        let tree = Quadtree::build(&positions, &vec![10.0; positions.len()]).unwrap();

        let mut approximate = Vec2::ZERO;
        accumulate_charge(&tree, 0, &positions, charge(1.0), &mut approximate);

        let exact = positions[1..]
            .iter()
            .map(|other| charge_between(*other - positions[0], 1.0, charge(1.0)))
            .fold(Vec2::ZERO, |sum, value| sum + value);

        assert!((approximate - exact).length() < exact.length() * 0.05);
    }

    #[test]
    fn links_pull_stretched_endpoints_together() {
        let positions = [vec2(0.0, 0.0), vec2(300.0, 0.0)];
        let mut velocities = [Vec2::ZERO; 2];
        let links = [LinkSpec {
            source: 0,
            target: 1,
            distance: 100.0,
            strength: 1.0,
            bias: 0.5,
        }];

        apply_links(&links, &positions, &mut velocities, 1.0);

        assert!(velocities[0].x > 0.0);
        assert!(velocities[1].x < 0.0);
    }

    #[test]
    fn links_push_compressed_endpoints_apart() {
        let positions = [vec2(0.0, 0.0), vec2(20.0, 0.0)];
        let mut velocities = [Vec2::ZERO; 2];
        let links = [LinkSpec {
            source: 0,
            target: 1,
            distance: 100.0,
            strength: 1.0,
            bias: 0.5,
        }];

        apply_links(&links, &positions, &mut velocities, 1.0);

        assert!(velocities[0].x < 0.0);
        assert!(velocities[1].x > 0.0);
    }

    #[test]
    fn overlapping_nodes_are_separated() {
        let positions = [vec2(0.0, 0.0), vec2(5.0, 0.0), vec2(500.0, 0.0)];
        let radii = [10.0, 10.0, 10.0];
        let tree = Quadtree::build(&positions, &radii).unwrap();
        let mut deltas = [Vec2::ZERO; 3];

        accumulate_collisions(
            &tree,
            &positions,
            &radii,
            CollisionParams { strength: 1.0 },
            &mut deltas,
        );

        assert!(deltas[0].x < 0.0);
        assert!(deltas[1].x > 0.0);
        assert_eq!(deltas[2], Vec2::ZERO);
        assert!(((deltas[1].x - deltas[0].x) - 15.0).abs() < 1e-3);
    }

    #[test]
    fn collisions_reach_as_far_as_each_cells_largest_radius() {
        let mut positions = (0..12)
            .map(|index| vec2(index as f32 * 10.0, 0.0))
            .collect::<Vec<_>>();
        positions.push(vec2(300.0, 0.0));
        let mut radii = vec![1.0; 12];
        radii.push(200.0);
        let tree = Quadtree::build(&positions, &radii).unwrap();
        assert!(!tree.root().is_leaf());
        let mut deltas = vec![Vec2::ZERO; positions.len()];

        accumulate_collisions(
            &tree,
            &positions,
            &radii,
            CollisionParams { strength: 1.0 },
            &mut deltas,
        );

        assert!(deltas[12].x > 0.0);
        assert!(deltas[11].x < 0.0);
        assert!(deltas[10].x < 0.0);
        assert_eq!(deltas[0], Vec2::ZERO);
        assert_eq!(deltas[9], Vec2::ZERO);
    }
}
