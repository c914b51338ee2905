//! Barnes–Hut quadtree for approximating inverse-square forces in 2D.
//!
//! Nodes live in a single arena and refer to their children by [`NodeId`]. Every
//! internal node carries the mass-weighted centroid of everything beneath it, kept
//! current after each insertion, so a built tree can be evaluated immediately.
//!
//! # Example
//!
//! ```
//! use rs_barnes_hut::particles::{Particle, ParticleSystem, Quadtree};
//! use rs_barnes_hut::utils::BarnesHutConfig;
//!
//! let mut system = ParticleSystem::from_particles(vec![
//!     Particle::new(0.0, 0.0, 1.0),
//!     Particle::new(1.0, 0.0, 1.0),
//! ]);
//!
//! let mut tree = Quadtree::from_system(&system, BarnesHutConfig::default());
//! tree.set_opening_angle(0.0);
//! tree.evaluate_system(&mut system);
//!
//! let first = system.get(0).expect("Particle 0 exists");
//! assert!((first.fx - 1.0).abs() < 1e-12);
//! ```
use crate::particles::{Particle, ParticleSystem};
use crate::utils::{inverse_square_force, BarnesHutConfig, PhysicsError, MAX_TREE_DEPTH};

/// An axis-aligned rectangle covering `[left, right) × [bottom, top)`.
///
/// # Examples
///
/// ```
/// use rs_barnes_hut::particles::Region;
///
/// // Reversed bounds are swapped on construction.
/// let region = Region::new(1.0, -1.0, 1.0, -1.0);
/// assert_eq!((region.left, region.right), (-1.0, 1.0));
///
/// assert!(region.contains(0.0, 0.0));
/// assert!(!region.contains(1.0, 0.0)); // right edge is exclusive
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Region {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Region {
    pub fn new(left: f64, right: f64, bottom: f64, top: f64) -> Self {
        let (left, right) = if left > right { (right, left) } else { (left, right) };
        let (bottom, top) = if bottom > top { (top, bottom) } else { (bottom, top) };
        Region { left, right, bottom, top }
    }

    /// Expands `bounds` outward by `leeway` on every side and pads the shorter axis
    /// symmetrically so the result is square.
    ///
    /// The padding never drops below a few ULPs of the largest coordinate, so the
    /// upper extremes stay strictly inside the half-open result even when `leeway`
    /// is too small to change them.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_barnes_hut::particles::Region;
    ///
    /// let bounds = Region::new(0.0, 4.0, 0.0, 2.0);
    /// let root = Region::covering(bounds, 0.5);
    /// assert_eq!((root.left, root.right), (-0.5, 4.5));
    /// assert_eq!((root.bottom, root.top), (-1.5, 3.5));
    /// ```
    pub fn covering(bounds: Region, leeway: f64) -> Self {
        let scale = [bounds.left, bounds.right, bounds.bottom, bounds.top]
            .iter()
            .fold(bounds.width().max(bounds.height()), |acc, v| acc.max(v.abs()));
        let pad = leeway.max(scale * f64::EPSILON * 4.0);
        let mut region = Region::new(
            bounds.left - pad,
            bounds.right + pad,
            bounds.bottom - pad,
            bounds.top + pad,
        );
        let (width, height) = (region.width(), region.height());
        if width > height {
            let pad = (width - height) / 2.0;
            region.bottom -= pad;
            region.top += pad;
        } else if height > width {
            let pad = (height - width) / 2.0;
            region.left -= pad;
            region.right += pad;
        }
        region
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.left + self.right) / 2.0, (self.bottom + self.top) / 2.0)
    }

    /// Returns true if the point (x, y) is inside this region.
    ///
    /// Lower bounds are inclusive and upper bounds exclusive, so a point on a shared
    /// edge belongs to exactly one of two neighbouring regions.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right && y >= self.bottom && y < self.top
    }

    /// Quadrant of (x, y), or `None` if the point lies outside this region.
    ///
    /// 0 is upper right, 1 upper left, 2 lower left, 3 lower right. Points on a
    /// midline go to the upper/right side.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_barnes_hut::particles::Region;
    ///
    /// let region = Region::new(0.0, 2.0, 0.0, 2.0);
    /// assert_eq!(region.quadrant(1.5, 1.5), Some(0));
    /// assert_eq!(region.quadrant(0.5, 1.5), Some(1));
    /// assert_eq!(region.quadrant(0.5, 0.5), Some(2));
    /// assert_eq!(region.quadrant(1.5, 0.5), Some(3));
    /// assert_eq!(region.quadrant(1.0, 1.0), Some(0));
    /// assert_eq!(region.quadrant(2.0, 1.0), None);
    /// ```
    pub fn quadrant(&self, x: f64, y: f64) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }
        let (mid_x, mid_y) = self.center();
        Some(match (x < mid_x, y < mid_y) {
            (false, false) => 0,
            (true, false) => 1,
            (true, true) => 2,
            (false, true) => 3,
        })
    }

    /// Splits this region into its four quadrants, indexed as [`Region::quadrant`] numbers them.
    pub fn subdivide(&self) -> [Region; 4] {
        let (mid_x, mid_y) = self.center();
        [
            Region { left: mid_x, right: self.right, bottom: mid_y, top: self.top },
            Region { left: self.left, right: mid_x, bottom: mid_y, top: self.top },
            Region { left: self.left, right: mid_x, bottom: self.bottom, top: mid_y },
            Region { left: mid_x, right: self.right, bottom: self.bottom, top: mid_y },
        ]
    }
}

/// The tree's copy of an inserted particle.
///
/// `index` identifies the particle (its position in the owning [`ParticleSystem`]);
/// a query carrying the same identity never interacts with this body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub mass: f64,
}

impl Body {
    pub fn new(index: usize, particle: &Particle) -> Self {
        Body { index, x: particle.x, y: particle.y, mass: particle.mass }
    }
}

/// Total mass and mass-weighted position of a subtree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Centroid {
    pub mass: f64,
    pub x: f64,
    pub y: f64,
}

impl Centroid {
    fn at((x, y): (f64, f64)) -> Self {
        Centroid { mass: 0.0, x, y }
    }

    /// Aggregates `parts`. When the summed mass is negligible the position of
    /// `previous` is kept instead of dividing by it.
    fn aggregate<I: IntoIterator<Item = Centroid>>(parts: I, previous: Centroid, mass_epsilon: f64) -> Self {
        let (mut mass, mut mx, mut my) = (0.0, 0.0, 0.0);
        for part in parts {
            mass += part.mass;
            mx += part.mass * part.x;
            my += part.mass * part.y;
        }
        if mass.abs() < mass_epsilon {
            Centroid { mass, x: previous.x, y: previous.y }
        } else {
            Centroid { mass, x: mx / mass, y: my / mass }
        }
    }
}

impl From<&Body> for Centroid {
    fn from(body: &Body) -> Self {
        Centroid { mass: body.mass, x: body.x, y: body.y }
    }
}

/// Index into the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    fn new(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize, "NodeId overflow");
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node holds.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// No particles in this region.
    Empty,
    /// Exactly one particle.
    Leaf(Body),
    /// Four children tiling the region, in quadrant order, plus their aggregate.
    Internal { centroid: Centroid, children: [NodeId; 4] },
    /// Several particles at the maximum depth that subdivision cannot separate.
    Bucket { centroid: Centroid, bodies: Vec<Body> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub region: Region,
    pub depth: u32,
    pub kind: NodeKind,
}

impl Node {
    fn empty(region: Region, depth: u32) -> Self {
        Node { region, depth, kind: NodeKind::Empty }
    }

    /// The particle or aggregate standing in for this node, if any.
    pub fn representative(&self) -> Option<Centroid> {
        match &self.kind {
            NodeKind::Empty => None,
            NodeKind::Leaf(body) => Some(body.into()),
            NodeKind::Internal { centroid, .. } | NodeKind::Bucket { centroid, .. } => Some(*centroid),
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self.kind, NodeKind::Internal { .. })
    }
}

/// Copy of a node's occupancy taken before the arena is mutated.
enum Occupant {
    Empty,
    Leaf(Body),
    Internal([NodeId; 4]),
    Bucket,
}

/// Arena-backed Barnes–Hut quadtree.
///
/// # Examples
///
/// ```
/// use rs_barnes_hut::particles::{Body, Particle, Quadtree, Region};
/// use rs_barnes_hut::utils::BarnesHutConfig;
///
/// let region = Region::new(-1.0, 1.0, -1.0, 1.0);
/// let mut tree = Quadtree::new(region, None, BarnesHutConfig::default());
///
/// tree.insert(Body::new(0, &Particle::new(0.5, 0.5, 1.0))).expect("inside the region");
/// tree.insert(Body::new(1, &Particle::new(-0.5, -0.5, 3.0))).expect("inside the region");
/// assert!(tree.insert(Body::new(2, &Particle::new(5.0, 0.0, 1.0))).is_err());
///
/// let root = tree.root_centroid().expect("tree is not empty");
/// assert_eq!(root.mass, 4.0);
/// assert_eq!(root.x, -0.25);
/// ```
#[derive(Clone, Debug)]
pub struct Quadtree {
    nodes: Vec<Node>,
    config: BarnesHutConfig,
    len: usize,
}

impl Quadtree {
    /// Creates a tree over `region`, optionally seeded with one occupant.
    ///
    /// An occupant outside `region` is refused and the root stays empty.
    pub fn new(region: Region, occupant: Option<Body>, config: BarnesHutConfig) -> Self {
        let mut tree = Quadtree {
            nodes: vec![Node::empty(region, 0)],
            config,
            len: 0,
        };
        if let Some(body) = occupant {
            // Refusal is already reported by `insert`.
            let _ = tree.insert(body);
        }
        tree
    }

    /// Builds a tree over a square region covering every particle of `system` and
    /// inserts them all in index order.
    ///
    /// An empty system gives an empty root.
    pub fn from_system(system: &ParticleSystem, config: BarnesHutConfig) -> Self {
        let region = match system.bounds() {
            Some(bounds) => Region::covering(bounds, config.leeway),
            None => Region::default(),
        };
        let mut tree = Self::new(region, None, config);
        let inserted = tree.insert_system(system);
        log::debug!(
            "Built quadtree with {} of {} particles in {} nodes",
            inserted, system.len(), tree.node_count()
        );
        tree
    }

    /// Inserts every particle of `system`, skipping the ones that do not fit.
    ///
    /// Returns the number of particles inserted.
    pub fn insert_system(&mut self, system: &ParticleSystem) -> usize {
        let mut inserted = 0;
        for (index, particle) in system.particles().iter().enumerate() {
            if self.insert(Body::new(index, particle)).is_ok() {
                inserted += 1;
            }
        }
        inserted
    }

    /// Inserts a body, expanding leaves into four children on collision.
    ///
    /// # Errors
    ///
    /// Returns `PhysicsError::GeometryMismatch` if the body lies outside the root region.
    /// The tree is left unchanged in that case.
    pub fn insert(&mut self, body: Body) -> Result<(), PhysicsError> {
        if !self.region().contains(body.x, body.y) {
            log::warn!(
                "Particle {} at ({}, {}) does not fit in the tree region {:?}",
                body.index, body.x, body.y, self.region()
            );
            return Err(PhysicsError::GeometryMismatch { x: body.x, y: body.y });
        }
        self.insert_at(NodeId::ROOT, body)?;
        self.len += 1;
        Ok(())
    }

    fn insert_at(&mut self, id: NodeId, body: Body) -> Result<(), PhysicsError> {
        let node = &self.nodes[id.index()];
        let (region, depth) = (node.region, node.depth);
        if !region.contains(body.x, body.y) {
            return Err(PhysicsError::GeometryMismatch { x: body.x, y: body.y });
        }
        let occupant = match &node.kind {
            NodeKind::Empty => Occupant::Empty,
            NodeKind::Leaf(existing) => Occupant::Leaf(*existing),
            NodeKind::Internal { children, .. } => Occupant::Internal(*children),
            NodeKind::Bucket { .. } => Occupant::Bucket,
        };

        match occupant {
            Occupant::Empty => {
                self.nodes[id.index()].kind = NodeKind::Leaf(body);
            }
            Occupant::Leaf(existing) if depth >= MAX_TREE_DEPTH => {
                log::debug!(
                    "Depth limit reached at ({}, {}); bucketing particles {} and {}",
                    body.x, body.y, existing.index, body.index
                );
                let bodies = vec![existing, body];
                let centroid = Centroid::aggregate(
                    bodies.iter().map(Centroid::from),
                    Centroid::at(region.center()),
                    self.config.mass_epsilon,
                );
                self.nodes[id.index()].kind = NodeKind::Bucket { centroid, bodies };
            }
            Occupant::Leaf(existing) => {
                let children = self.make_children(region, depth);
                self.nodes[id.index()].kind = NodeKind::Internal {
                    centroid: Centroid::at(region.center()),
                    children,
                };
                self.insert_into_child(children, region, existing)?;
                self.insert_into_child(children, region, body)?;
                self.recompute(id);
            }
            Occupant::Internal(children) => {
                self.insert_into_child(children, region, body)?;
                self.recompute(id);
            }
            Occupant::Bucket => {
                let mass_epsilon = self.config.mass_epsilon;
                if let NodeKind::Bucket { centroid, bodies } = &mut self.nodes[id.index()].kind {
                    bodies.push(body);
                    *centroid = Centroid::aggregate(bodies.iter().map(Centroid::from), *centroid, mass_epsilon);
                }
            }
        }
        Ok(())
    }

    fn insert_into_child(&mut self, children: [NodeId; 4], region: Region, body: Body) -> Result<(), PhysicsError> {
        match region.quadrant(body.x, body.y) {
            Some(quadrant) => self.insert_at(children[quadrant], body),
            None => Err(PhysicsError::GeometryMismatch { x: body.x, y: body.y }),
        }
    }

    fn make_children(&mut self, region: Region, depth: u32) -> [NodeId; 4] {
        let first = self.nodes.len();
        self.nodes.extend(region.subdivide().into_iter().map(|quad| Node::empty(quad, depth + 1)));
        [NodeId::new(first), NodeId::new(first + 1), NodeId::new(first + 2), NodeId::new(first + 3)]
    }

    /// Recomputes an internal node's centroid from its children's representatives.
    fn recompute(&mut self, id: NodeId) {
        let (children, previous) = match &self.nodes[id.index()].kind {
            NodeKind::Internal { children, centroid } => (*children, *centroid),
            _ => return,
        };
        let updated = Centroid::aggregate(
            children.iter().filter_map(|child| self.nodes[child.index()].representative()),
            previous,
            self.config.mass_epsilon,
        );
        if let NodeKind::Internal { centroid, .. } = &mut self.nodes[id.index()].kind {
            *centroid = updated;
        }
    }

    /// Removes every particle, keeping the root region and configuration.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[NodeId::ROOT.index()].kind = NodeKind::Empty;
        self.len = 0;
    }

    /// Sets the opening angle (tau) used by every node of the tree.
    pub fn set_opening_angle(&mut self, tau: f64) {
        self.config.opening_angle = tau;
    }

    pub fn opening_angle(&self) -> f64 {
        self.config.opening_angle
    }

    pub fn config(&self) -> &BarnesHutConfig {
        &self.config
    }

    pub fn region(&self) -> Region {
        self.root().region
    }

    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.index()]
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// All nodes in allocation order; the root comes first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of particles stored in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total mass and centroid of the whole tree, or `None` when it is empty.
    pub fn root_centroid(&self) -> Option<Centroid> {
        self.root().representative()
    }

    /// Force exerted by the tree on `particle`.
    ///
    /// `identity` is the particle's index in the system the tree was built from;
    /// the body with that index is skipped. Pass `None` for a probe particle that
    /// is not in the tree.
    pub fn force_on(&self, particle: &Particle, identity: Option<usize>) -> (f64, f64) {
        let mut force = (0.0, 0.0);
        self.accumulate(NodeId::ROOT, particle, identity, &mut force);
        force
    }

    /// Adds the force exerted by the tree on the particle with index `index` to its accumulators.
    pub fn evaluate(&self, index: usize, particle: &mut Particle) {
        let force = self.force_on(particle, Some(index));
        particle.accumulate(force);
    }

    /// Evaluates every particle of `system` in index order.
    pub fn evaluate_system(&self, system: &mut ParticleSystem) {
        for (index, particle) in system.particles_mut().iter_mut().enumerate() {
            self.evaluate(index, particle);
        }
    }

    fn accumulate(&self, id: NodeId, p: &Particle, identity: Option<usize>, force: &mut (f64, f64)) {
        let node = &self.nodes[id.index()];
        match &node.kind {
            NodeKind::Empty => {}
            NodeKind::Leaf(body) => self.accumulate_body(body, p, identity, force),
            NodeKind::Bucket { bodies, .. } => {
                for body in bodies {
                    self.accumulate_body(body, p, identity, force);
                }
            }
            NodeKind::Internal { centroid, children } => {
                if self.must_open(node.region, centroid, p) {
                    for &child in children {
                        self.accumulate(child, p, identity, force);
                    }
                } else {
                    self.accumulate_mass(centroid, p, force);
                }
            }
        }
    }

    /// An internal node is opened when its mass is negligible, when the query lies
    /// inside it, or when `width / distance` is not below tau.
    fn must_open(&self, region: Region, centroid: &Centroid, p: &Particle) -> bool {
        if centroid.mass.abs() < self.config.mass_epsilon || region.contains(p.x, p.y) {
            return true;
        }
        let dx = centroid.x - p.x;
        let dy = centroid.y - p.y;
        let d = (dx * dx + dy * dy).sqrt();
        // A NaN ratio also opens the node.
        !(region.width() / d < self.config.opening_angle)
    }

    fn accumulate_body(&self, body: &Body, p: &Particle, identity: Option<usize>, force: &mut (f64, f64)) {
        if identity == Some(body.index) {
            return;
        }
        self.accumulate_mass(&Centroid::from(body), p, force);
    }

    fn accumulate_mass(&self, source: &Centroid, p: &Particle, force: &mut (f64, f64)) {
        if source.mass.abs() < self.config.mass_epsilon {
            return;
        }
        let (fx, fy) = inverse_square_force(
            p.x,
            p.y,
            p.mass,
            source.x,
            source.y,
            source.mass,
            self.config.gravitational_constant,
            self.config.min_separation,
        );
        force.0 += fx;
        force.1 += fy;
    }
}
