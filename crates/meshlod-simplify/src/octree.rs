//! Point octree over the unit cube.

use glam::{BVec3, Vec3};
use meshlod_mesh::Aabb;

/// A node of the point octree.
///
/// Each node either is a leaf or owns exactly 8 children, one per octant.
/// Octant `i` takes the upper half on x when bit 0 is set, on y when bit 1 is
/// set, and on z when bit 2 is set. Members are indices into the point slice the
/// tree was built from.
#[derive(Debug, Clone)]
pub struct OctreeNode {
    bounds: Aabb,
    /// Per axis, whether the max face is part of this node. Only true on the
    /// outer boundary of the tree.
    upper_closed: BVec3,
    depth: u32,
    members: Vec<u32>,
    children: Option<Box<[OctreeNode; 8]>>,
}

impl OctreeNode {
    fn root(points: &[Vec3]) -> Self {
        let mut root = Self {
            bounds: Aabb::UNIT,
            upper_closed: BVec3::TRUE,
            depth: 0,
            members: Vec::new(),
            children: None,
        };
        root.members = (0..points.len() as u32)
            .filter(|&i| root.contains(points[i as usize]))
            .collect();
        root
    }

    /// Half-open containment test, closed on the tree's outer max faces.
    pub fn contains(&self, p: Vec3) -> bool {
        let below_max = p.cmplt(self.bounds.max) | (self.upper_closed & p.cmple(self.bounds.max));
        p.cmpge(self.bounds.min).all() && below_max.all()
    }

    fn child(&self, octant: usize, points: &[Vec3]) -> Self {
        let upper = BVec3::new(octant & 0b001 != 0, octant & 0b010 != 0, octant & 0b100 != 0);
        let mid = self.bounds.center();
        let bounds = Aabb {
            min: Vec3::select(upper, mid, self.bounds.min),
            max: Vec3::select(upper, self.bounds.max, mid),
        };
        let mut child = Self {
            bounds,
            upper_closed: self.upper_closed & upper,
            depth: self.depth + 1,
            members: Vec::new(),
            children: None,
        };
        child.members = self
            .members
            .iter()
            .copied()
            .filter(|&i| child.contains(points[i as usize]))
            .collect();
        child
    }

    fn split(&mut self, points: &[Vec3], max_depth: u32) {
        if self.members.is_empty() || self.depth >= max_depth {
            return;
        }
        let mut children: Box<[OctreeNode; 8]> =
            Box::new(std::array::from_fn(|octant| self.child(octant, points)));
        for child in children.iter_mut() {
            child.split(points, max_depth);
        }
        self.children = Some(children);
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Depth of this node; the root is depth 0.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Indices of the points inside this node.
    pub fn members(&self) -> &[u32] {
        &self.members
    }

    /// The 8 children, or `None` for a leaf.
    pub fn children(&self) -> Option<&[OctreeNode; 8]> {
        self.children.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a OctreeNode)) {
        f(self);
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.visit(f);
            }
        }
    }
}

/// Octree over a point set normalized into the unit cube.
///
/// A node is a leaf iff it holds no members or sits at `max_depth`. Points
/// outside `[0, 1]^3` are not members of any node.
#[derive(Debug, Clone)]
pub struct Octree {
    root: OctreeNode,
    max_depth: u32,
}

impl Octree {
    /// Build the tree to `max_depth`. Only indices are stored.
    pub fn build(points: &[Vec3], max_depth: u32) -> Self {
        let mut root = OctreeNode::root(points);
        let outside = points.len() - root.members.len();
        if outside > 0 {
            tracing::warn!("{outside} points lie outside the unit cube and were not indexed");
        }
        root.split(points, max_depth);
        Self { root, max_depth }
    }

    pub fn root(&self) -> &OctreeNode {
        &self.root
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// All leaves in depth-first octant order.
    pub fn leaves(&self) -> Vec<&OctreeNode> {
        let mut leaves = Vec::new();
        self.root.visit(&mut |node| {
            if node.is_leaf() {
                leaves.push(node);
            }
        });
        leaves
    }

    /// Total number of materialized nodes, root included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.root.visit(&mut |_| count += 1);
        count
    }
}
