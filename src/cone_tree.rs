//! # `cone_tree` – Maximum inner-product search
//!
//! A binary ball-tree over a fixed set of points which answers "which stored
//! point maximizes the inner product with this query" without scanning the
//! whole set. NSGA-III uses it to find the nearest reference point for every
//! candidate each generation.
//!
//! The implementation is based on:
//! Ram, Parikshit, and Alexander G. Gray. "Maximum inner-product search
//! using cone trees.", 2012.

use std::cell::RefCell;

use ndarray::{Array1, Array2, ArrayView1};

use crate::math;

/// The maximum number of points stored in a leaf node.
const MAX_LEAF_ELEMENTS: usize = 22;

#[derive(Debug, Clone)]
struct Node {
    center: Array1<f64>,
    radius: f64,
    /// Row range `[first, last)` of the points covered by this node.
    first: usize,
    last: usize,
    /// Child node ids; both 0 for leaf nodes.
    left: usize,
    right: usize,
}

/// The best match found for a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FindResult {
    /// Index of the winning point in the point set the tree was built from.
    pub index: usize,
    /// The inner product between the query and the winning point.
    pub prod: f64,
}

#[derive(Debug, Clone)]
pub struct ConeTree {
    /// The stored points, physically reordered during the build.
    points: Array2<f64>,
    /// Maps reordered rows back to the original point indices.
    index_map: Vec<usize>,
    nodes: Vec<Node>,
}

thread_local! {
    static NODE_STACK: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

impl ConeTree {
    /// Build a cone-tree over the rows of `points`.
    pub fn new(points: Array2<f64>) -> Self {
        assert!(points.nrows() > 0, "the point set must not be empty");

        let size = points.nrows();
        let mut tree = Self {
            points,
            index_map: (0..size).collect(),
            nodes: Vec::with_capacity(4 * size / MAX_LEAF_ELEMENTS + 1),
        };
        tree.nodes.push(Node {
            center: Array1::zeros(tree.points.ncols()),
            radius: 0.0,
            first: 0,
            last: size,
            left: 0,
            right: 0,
        });
        tree.build();
        tree
    }

    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    /// Expand the tree from the root, splitting ranges until every node is
    /// small enough to be a leaf.
    fn build(&mut self) {
        let mut node_id = 0;
        while node_id < self.nodes.len() {
            let (first, last) = (self.nodes[node_id].first, self.nodes[node_id].last);

            let center = self.find_center(first, last);
            let radius = self.find_radius(first, last, center.view());

            if last - first <= MAX_LEAF_ELEMENTS {
                let node = &mut self.nodes[node_id];
                node.center = center;
                node.radius = radius;
                node_id += 1;
                continue;
            }

            let middle = self.partition_range(first, last);

            let ncols = self.points.ncols();
            self.nodes.push(Node {
                center: Array1::zeros(ncols),
                radius: 0.0,
                first,
                last: middle,
                left: 0,
                right: 0,
            });
            self.nodes.push(Node {
                center: Array1::zeros(ncols),
                radius: 0.0,
                first: middle,
                last,
                left: 0,
                right: 0,
            });

            let right = self.nodes.len() - 1;
            let left = self.nodes.len() - 2;
            let node = &mut self.nodes[node_id];
            node.center = center;
            node.radius = radius;
            node.left = left;
            node.right = right;
            node_id += 1;
        }
    }

    /// The center of a range of points is the mean of each coordinate.
    fn find_center(&self, first: usize, last: usize) -> Array1<f64> {
        let mut center = Array1::zeros(self.points.ncols());
        for row in first..last {
            center += &self.points.row(row);
        }
        center / (last - first) as f64
    }

    /// The distance between the center and the point furthest from it.
    fn find_radius(&self, first: usize, last: usize, center: ArrayView1<f64>) -> f64 {
        let mut max_distance = 0.0_f64;
        for row in first..last {
            let distance = math::euclidean_distance_sq(center, self.points.row(row));
            max_distance = max_distance.max(distance);
        }
        max_distance.sqrt()
    }

    /// The point in `[first, last)` furthest from `from`.
    fn find_furthest_row(&self, first: usize, last: usize, from: ArrayView1<f64>) -> usize {
        let mut furthest = first;
        let mut max_distance = f64::NEG_INFINITY;
        for row in first..last {
            let distance = math::euclidean_distance_sq(from, self.points.row(row));
            if distance > max_distance {
                furthest = row;
                max_distance = distance;
            }
        }
        furthest
    }

    /// Split the range by nearest-seed assignment, where the seeds are the
    /// point furthest from an arbitrary pivot and the point furthest from
    /// that. Returns the first row of the right half.
    fn partition_range(&mut self, first: usize, last: usize) -> usize {
        let first_seed = self.find_furthest_row(first, last, self.points.row(first));
        let first_seed = self.points.row(first_seed).to_owned();
        let second_seed = self.find_furthest_row(first, last, first_seed.view());
        let second_seed = self.points.row(second_seed).to_owned();

        let mut middle = first;
        for row in first..last {
            let left_dist = math::euclidean_distance_sq(first_seed.view(), self.points.row(row));
            let right_dist = math::euclidean_distance_sq(second_seed.view(), self.points.row(row));
            if left_dist < right_dist {
                self.swap_rows(row, middle);
                middle += 1;
            }
        }

        // All points being identical would leave one side empty.
        if middle == first { middle + 1 } else { middle }
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 0..self.points.ncols() {
            self.points.swap((a, col), (b, col));
        }
        self.index_map.swap(a, b);
    }

    /// The largest possible inner product between the query and any point
    /// inside the node (Cauchy-Schwarz bound).
    fn inner_product_upper_bound(
        &self,
        node: &Node,
        query: ArrayView1<f64>,
        query_norm: f64,
    ) -> f64 {
        query.dot(&node.center) + query_norm * node.radius
    }

    fn is_leaf(node: &Node) -> bool {
        node.left == 0 && node.right == 0
    }

    /// Find the stored point with the largest inner product with `query`.
    pub fn find_best_match(&self, query: ArrayView1<f64>) -> FindResult {
        assert_eq!(query.len(), self.points.ncols());

        let query_norm = math::euclidean_norm(query);
        let mut best = FindResult {
            index: self.index_map[0],
            prod: f64::NEG_INFINITY,
        };

        NODE_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.clear();
            stack.push(0);

            while let Some(node_id) = stack.pop() {
                let node = &self.nodes[node_id];

                // Skip the node if it can't contain anything better.
                if best.prod >= self.inner_product_upper_bound(node, query, query_norm) {
                    continue;
                }

                if Self::is_leaf(node) {
                    for row in node.first..node.last {
                        let prod = query.dot(&self.points.row(row));
                        if prod > best.prod {
                            best.index = self.index_map[row];
                            best.prod = prod;
                        }
                    }
                } else {
                    let left_bound = self
                        .inner_product_upper_bound(&self.nodes[node.left], query, query_norm);
                    let right_bound = self
                        .inner_product_upper_bound(&self.nodes[node.right], query, query_norm);

                    // Visit the more promising child first.
                    if left_bound < right_bound {
                        stack.push(node.left);
                        stack.push(node.right);
                    } else {
                        stack.push(node.right);
                        stack.push(node.left);
                    }
                }
            }
        });

        best
    }
}
