use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: u32 = 12;

/// Index of a cell inside [`Quadtree::cells`].
pub(super) type CellId = usize;

/// Square region `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Extent {
    pub(super) x0: f32,
    pub(super) y0: f32,
    pub(super) x1: f32,
    pub(super) y1: f32,
}

impl Extent {
    /// Smallest padded square around every point, or `None` for no points or
    /// non-finite coordinates.
    fn cover(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for point in rest {
            x0 = x0.min(point.x);
            y0 = y0.min(point.y);
            x1 = x1.max(point.x);
            y1 = y1.max(point.y);
        }
        if ![x0, y0, x1, y1].iter().all(|value| value.is_finite()) {
            return None;
        }

        let side = (x1 - x0).max(y1 - y0).max(1.0) + 2.0;
        let (cx, cy) = ((x0 + x1) * 0.5, (y0 + y1) * 0.5);
        Some(Self {
            x0: cx - side * 0.5,
            y0: cy - side * 0.5,
            x1: cx + side * 0.5,
            y1: cy + side * 0.5,
        })
    }

    pub(super) fn width(self) -> f32 {
        self.x1 - self.x0
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (self.x0..=self.x1).contains(&point.x) && (self.y0..=self.y1).contains(&point.y)
    }

    /// Quadrant numbering: bit 0 is "east of the midpoint", bit 1 "south of
    /// the midpoint".
    fn quadrant_of(self, point: Vec2) -> usize {
        let xm = (self.x0 + self.x1) * 0.5;
        let ym = (self.y0 + self.y1) * 0.5;
        usize::from(point.x >= xm) | (usize::from(point.y >= ym) << 1)
    }

    fn quadrant(self, quadrant: usize) -> Self {
        let xm = (self.x0 + self.x1) * 0.5;
        let ym = (self.y0 + self.y1) * 0.5;
        let (x0, x1) = if quadrant & 1 == 0 { (self.x0, xm) } else { (xm, self.x1) };
        let (y0, y1) = if quadrant & 2 == 0 { (self.y0, ym) } else { (ym, self.y1) };
        Self { x0, y0, x1, y1 }
    }

    /// Squared length of the shortest segment between the two squares; zero
    /// when they touch or overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let gap = vec2(
            (other.x0 - self.x1).max(self.x0 - other.x1).max(0.0),
            (other.y0 - self.y1).max(self.y0 - other.y1).max(0.0),
        );
        gap.length_sq()
    }
}

/// One quadtree cell. Aggregates cover every point below it: the point
/// count and centroid drive the many-body approximation, the largest
/// collision radius bounds how far any of its points can reach.
pub(super) struct Cell {
    pub(super) extent: Extent,
    pub(super) centroid: Vec2,
    pub(super) count: usize,
    pub(super) max_radius: f32,
    /// Point indices, only populated on leaves.
    pub(super) points: Vec<usize>,
    pub(super) children: [Option<CellId>; 4],
}

impl Cell {
    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

/// Arena-backed region quadtree over node positions and radii, rebuilt for
/// every force pass. Leaves hold at most a handful of points unless the
/// points are coincident or the depth cap is reached.
pub(super) struct Quadtree {
    cells: Vec<Cell>,
}

impl Quadtree {
    pub(super) fn build(positions: &[Vec2], radii: &[f32]) -> Option<Self> {
        let extent = Extent::cover(positions)?;
        let mut tree = Self {
            cells: Vec::with_capacity(positions.len() / 2 + 1),
        };
        tree.grow(extent, (0..positions.len()).collect(), 0, positions, radii);
        Some(tree)
    }

    fn grow(
        &mut self,
        extent: Extent,
        points: Vec<usize>,
        depth: u32,
        positions: &[Vec2],
        radii: &[f32],
    ) -> CellId {
        let id = self.cells.len();
        let count = points.len();
        let centroid = points
            .iter()
            .fold(Vec2::ZERO, |sum, &index| sum + positions[index])
            / count.max(1) as f32;
        let max_radius = points
            .iter()
            .map(|&index| radii.get(index).copied().unwrap_or(0.0))
            .fold(0.0_f32, f32::max);

        self.cells.push(Cell {
            extent,
            centroid,
            count,
            max_radius,
            points: Vec::new(),
            children: [None; 4],
        });

        let mut quadrants: [Vec<usize>; 4] = Default::default();
        if count > LEAF_CAPACITY && depth < MAX_DEPTH {
            for &index in &points {
                quadrants[extent.quadrant_of(positions[index])].push(index);
            }
        }

        if quadrants.iter().filter(|members| !members.is_empty()).count() < 2 {
            self.cells[id].points = points;
            return id;
        }

        for (quadrant, members) in quadrants.into_iter().enumerate() {
            if !members.is_empty() {
                let child = self.grow(extent.quadrant(quadrant), members, depth + 1, positions, radii);
                self.cells[id].children[quadrant] = Some(child);
            }
        }
        id
    }

    pub(super) fn root(&self) -> &Cell {
        &self.cells[0]
    }

    pub(super) fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }

    pub(super) fn children<'a>(&'a self, cell: &'a Cell) -> impl Iterator<Item = &'a Cell> + 'a {
        cell.children.iter().flatten().map(move |&id| &self.cells[id])
    }
}
