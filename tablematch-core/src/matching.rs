/// Maximum-weight matching on general graphs (Edmonds' blossom algorithm).
///
/// O(V³). Works on integer weights so every dual update is exact: vertex
/// duals are stored doubled, which keeps them integral whenever the edge
/// weights are. With `max_cardinality` set, the matching maximizes the
/// number of matched pairs first and total weight second.
///
/// Operates on `usize` vertex indices, not person ids.

/// Sentinel for "no vertex / edge / endpoint / blossom".
const NONE: usize = usize::MAX;

/// An undirected edge `(u, v, weight)` between vertex indices.
pub type WeightedEdge = (usize, usize, i64);

/// Compute a maximum-weight matching.
///
/// Returns `mate[v]` for every vertex in `0..num_vertices`: the vertex `v` is
/// matched to, or `None`.
pub fn max_weight_matching(
    num_vertices: usize,
    edges: &[WeightedEdge],
    max_cardinality: bool,
) -> Vec<Option<usize>> {
    if num_vertices == 0 || edges.is_empty() {
        return vec![None; num_vertices];
    }
    for &(u, v, _) in edges {
        assert!(u < num_vertices && v < num_vertices, "edge ({}, {}) out of range", u, v);
        assert!(u != v, "self-loop on vertex {}", u);
    }
    BlossomMatcher::new(num_vertices, edges, max_cardinality).solve()
}

/// Which dual adjustment ends the current stage step.
#[derive(Debug, Clone, Copy)]
enum Delta {
    /// A vertex dual reached zero: no further improvement this stage.
    Finish,
    /// Tighten an edge between an S-vertex and a free vertex.
    GrowEdge(usize),
    /// Tighten an edge between two S-blossoms.
    BlossomEdge(usize),
    /// A T-blossom's dual reached zero: expand it.
    ExpandBlossom(usize),
}

/// Labels: 0 = free, 1 = S (outer), 2 = T (inner). Bit 4 marks blossoms
/// visited by `scan_blossom`.
const FREE: u8 = 0;
const OUTER: u8 = 1;
const INNER: u8 = 2;
const BREADCRUMB: u8 = 5;

/// Vertices are `0..n`; non-trivial blossoms are `n..2n`. Endpoint `p` of
/// edge `k` is `2k` (its first vertex) or `2k + 1` (its second); `p ^ 1`
/// is the opposite end.
struct BlossomMatcher<'a> {
    n: usize,
    edges: &'a [WeightedEdge],
    max_cardinality: bool,
    endpoint: Vec<usize>,
    /// Remote endpoints of every edge incident to each vertex.
    neighbor_endpoints: Vec<Vec<usize>>,
    /// Remote endpoint of the matched edge, per vertex.
    mate: Vec<usize>,
    label: Vec<u8>,
    /// Endpoint through which a top-level blossom or vertex got its label.
    label_end: Vec<usize>,
    /// Top-level blossom containing each vertex.
    in_blossom: Vec<usize>,
    blossom_parent: Vec<usize>,
    /// Sub-blossoms in cyclic order, starting at the base.
    blossom_children: Vec<Vec<usize>>,
    blossom_base: Vec<usize>,
    /// `blossom_endpoints[b][i]` joins child `i` to child `i + 1`.
    blossom_endpoints: Vec<Vec<usize>>,
    /// Least-slack edge to a different S-blossom (or, for a free vertex, to any S-vertex).
    best_edge: Vec<usize>,
    /// Least-slack edges from a blossom to each neighbouring S-blossom.
    blossom_best_edges: Vec<Option<Vec<usize>>>,
    unused_blossoms: Vec<usize>,
    /// Doubled vertex duals, then blossom duals.
    dual: Vec<i64>,
    /// Edges known to have zero slack.
    allowed: Vec<bool>,
    /// S-vertices waiting to be scanned.
    queue: Vec<usize>,
}

impl<'a> BlossomMatcher<'a> {
    fn new(n: usize, edges: &'a [WeightedEdge], max_cardinality: bool) -> Self {
        let max_weight = edges.iter().map(|&(_, _, w)| w).max().unwrap_or(0).max(0);

        let mut endpoint = Vec::with_capacity(2 * edges.len());
        let mut neighbor_endpoints = vec![Vec::new(); n];
        for (k, &(u, v, _)) in edges.iter().enumerate() {
            endpoint.push(u);
            endpoint.push(v);
            neighbor_endpoints[u].push(2 * k + 1);
            neighbor_endpoints[v].push(2 * k);
        }

        let mut blossom_base: Vec<usize> = (0..n).collect();
        blossom_base.resize(2 * n, NONE);
        let mut dual = vec![max_weight; n];
        dual.resize(2 * n, 0);

        BlossomMatcher {
            n,
            edges,
            max_cardinality,
            endpoint,
            neighbor_endpoints,
            mate: vec![NONE; n],
            label: vec![FREE; 2 * n],
            label_end: vec![NONE; 2 * n],
            in_blossom: (0..n).collect(),
            blossom_parent: vec![NONE; 2 * n],
            blossom_children: vec![Vec::new(); 2 * n],
            blossom_base,
            blossom_endpoints: vec![Vec::new(); 2 * n],
            best_edge: vec![NONE; 2 * n],
            blossom_best_edges: vec![None; 2 * n],
            unused_blossoms: (n..2 * n).collect(),
            dual,
            allowed: vec![false; edges.len()],
            queue: Vec::new(),
        }
    }

    fn slack(&self, k: usize) -> i64 {
        let (u, v, w) = self.edges[k];
        self.dual[u] + self.dual[v] - 2 * w
    }

    /// All vertices inside blossom `b`, in child order.
    fn leaves(&self, b: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![b];
        while let Some(t) = stack.pop() {
            if t < self.n {
                out.push(t);
            } else {
                stack.extend(self.blossom_children[t].iter().rev());
            }
        }
        out
    }

    /// Label the top-level blossom containing `w` with `t`, reached via endpoint `p`.
    fn assign_label(&mut self, w: usize, t: u8, p: usize) {
        let b = self.in_blossom[w];
        debug_assert!(self.label[w] == FREE && self.label[b] == FREE);
        self.label[w] = t;
        self.label[b] = t;
        self.label_end[w] = p;
        self.label_end[b] = p;
        self.best_edge[w] = NONE;
        self.best_edge[b] = NONE;
        if t == OUTER {
            let leaves = self.leaves(b);
            self.queue.extend(leaves);
        } else if t == INNER {
            // The base's mate becomes an S-vertex.
            let mate_end = self.mate[self.blossom_base[b]];
            debug_assert!(mate_end != NONE);
            let next = self.endpoint[mate_end];
            self.assign_label(next, OUTER, mate_end ^ 1);
        }
    }

    /// Trace back from S-vertices `v` and `w`. Returns the base of a new
    /// blossom, or `NONE` when the trees are disjoint (augmenting path).
    fn scan_blossom(&mut self, mut v: usize, mut w: usize) -> usize {
        let mut path = Vec::new();
        let mut base = NONE;
        while v != NONE || w != NONE {
            let mut b = self.in_blossom[v];
            if self.label[b] & 4 != 0 {
                base = self.blossom_base[b];
                break;
            }
            debug_assert_eq!(self.label[b], OUTER);
            path.push(b);
            self.label[b] = BREADCRUMB;
            if self.label_end[b] == NONE {
                // Reached a tree root.
                v = NONE;
            } else {
                v = self.endpoint[self.label_end[b]];
                b = self.in_blossom[v];
                debug_assert_eq!(self.label[b], INNER);
                v = self.endpoint[self.label_end[b]];
            }
            if w != NONE {
                std::mem::swap(&mut v, &mut w);
            }
        }
        for b in path {
            self.label[b] = OUTER;
        }
        base
    }

    /// Form a new blossom with `base`, closed by edge `k` between two S-vertices.
    fn add_blossom(&mut self, base: usize, k: usize) {
        let (v, w, _) = self.edges[k];
        let bb = self.in_blossom[base];
        let mut bv = self.in_blossom[v];
        let mut bw = self.in_blossom[w];
        let b = self
            .unused_blossoms
            .pop()
            .expect("blossom slots exhausted: at most n non-trivial blossoms can exist");

        self.blossom_base[b] = base;
        self.blossom_parent[b] = NONE;
        self.blossom_parent[bb] = b;

        let mut children = Vec::new();
        let mut endpoints = Vec::new();
        while bv != bb {
            self.blossom_parent[bv] = b;
            children.push(bv);
            endpoints.push(self.label_end[bv]);
            let next = self.endpoint[self.label_end[bv]];
            bv = self.in_blossom[next];
        }
        children.push(bb);
        children.reverse();
        endpoints.reverse();
        endpoints.push(2 * k);
        while bw != bb {
            self.blossom_parent[bw] = b;
            children.push(bw);
            endpoints.push(self.label_end[bw] ^ 1);
            let next = self.endpoint[self.label_end[bw]];
            bw = self.in_blossom[next];
        }

        debug_assert_eq!(self.label[bb], OUTER);
        self.label[b] = OUTER;
        self.label_end[b] = self.label_end[bb];
        self.dual[b] = 0;
        self.blossom_children[b] = children.clone();
        self.blossom_endpoints[b] = endpoints;

        for leaf in self.leaves(b) {
            if self.label[self.in_blossom[leaf]] == INNER {
                // Former T-vertices become S-vertices and need scanning.
                self.queue.push(leaf);
            }
            self.in_blossom[leaf] = b;
        }

        // Least-slack edge from the new blossom to each neighbouring S-blossom.
        let mut best_edge_to = vec![NONE; 2 * self.n];
        for bv in children {
            let cached = self.blossom_best_edges[bv].take();
            let edge_lists: Vec<Vec<usize>> = match cached {
                Some(list) => vec![list],
                None => self
                    .leaves(bv)
                    .into_iter()
                    .map(|leaf| self.neighbor_endpoints[leaf].iter().map(|p| p / 2).collect())
                    .collect(),
            };
            for k in edge_lists.into_iter().flatten() {
                let (i, j, _) = self.edges[k];
                let j = if self.in_blossom[j] == b { i } else { j };
                let bj = self.in_blossom[j];
                if bj != b
                    && self.label[bj] == OUTER
                    && (best_edge_to[bj] == NONE || self.slack(k) < self.slack(best_edge_to[bj]))
                {
                    best_edge_to[bj] = k;
                }
            }
            self.best_edge[bv] = NONE;
        }

        let best: Vec<usize> = best_edge_to.into_iter().filter(|&k| k != NONE).collect();
        self.best_edge[b] = NONE;
        for &k in &best {
            if self.best_edge[b] == NONE || self.slack(k) < self.slack(self.best_edge[b]) {
                self.best_edge[b] = k;
            }
        }
        self.blossom_best_edges[b] = Some(best);
    }

    /// Dissolve blossom `b` into its children.
    fn expand_blossom(&mut self, b: usize, end_stage: bool) {
        let children = self.blossom_children[b].clone();
        for &s in &children {
            self.blossom_parent[s] = NONE;
            if s < self.n {
                self.in_blossom[s] = s;
            } else if end_stage && self.dual[s] == 0 {
                self.expand_blossom(s, end_stage);
            } else {
                for leaf in self.leaves(s) {
                    self.in_blossom[leaf] = s;
                }
            }
        }

        if !end_stage && self.label[b] == INNER {
            // Relabel the children along the even-length path from the
            // entry child to the base; the other children become free
            // unless they are reachable through their own T-vertices.
            let len = children.len() as isize;
            let entry_child = self.in_blossom[self.endpoint[self.label_end[b] ^ 1]];
            let mut j = position(&children, entry_child) as isize;
            let (step, trick): (isize, usize) = if j & 1 == 1 {
                j -= len;
                (1, 0)
            } else {
                (-1, 1)
            };

            let mut p = self.label_end[b];
            while j != 0 {
                let entry = self.endpoint[p ^ 1];
                self.label[entry] = FREE;
                let e = self.blossom_endpoints[b][wrap(j - trick as isize, len)];
                self.label[self.endpoint[e ^ trick ^ 1]] = FREE;
                self.assign_label(entry, INNER, p);
                self.allowed[e / 2] = true;
                j += step;
                p = self.blossom_endpoints[b][wrap(j - trick as isize, len)] ^ trick;
                self.allowed[p / 2] = true;
                j += step;
            }

            let bv = children[wrap(j, len)];
            let entry = self.endpoint[p ^ 1];
            self.label[entry] = INNER;
            self.label[bv] = INNER;
            self.label_end[entry] = p;
            self.label_end[bv] = p;
            self.best_edge[bv] = NONE;
            j += step;

            while children[wrap(j, len)] != entry_child {
                let bv = children[wrap(j, len)];
                if self.label[bv] == OUTER {
                    j += step;
                    continue;
                }
                let labeled = self.leaves(bv).into_iter().find(|&v| self.label[v] != FREE);
                if let Some(v) = labeled {
                    debug_assert_eq!(self.label[v], INNER);
                    self.label[v] = FREE;
                    let base_mate = self.endpoint[self.mate[self.blossom_base[bv]]];
                    self.label[base_mate] = FREE;
                    let via = self.label_end[v];
                    self.assign_label(v, INNER, via);
                }
                j += step;
            }
        }

        self.label[b] = FREE;
        self.label_end[b] = NONE;
        self.blossom_children[b].clear();
        self.blossom_endpoints[b].clear();
        self.blossom_base[b] = NONE;
        self.blossom_best_edges[b] = None;
        self.best_edge[b] = NONE;
        self.unused_blossoms.push(b);
    }

    /// Swap matched and unmatched edges on the path inside blossom `b`
    /// from vertex `v` to the base; `v` becomes the new base.
    fn augment_blossom(&mut self, b: usize, v: usize) {
        let mut t = v;
        while self.blossom_parent[t] != b {
            t = self.blossom_parent[t];
        }
        if t >= self.n {
            self.augment_blossom(t, v);
        }

        let len = self.blossom_children[b].len() as isize;
        let i = position(&self.blossom_children[b], t);
        let mut j = i as isize;
        let (step, trick): (isize, usize) = if j & 1 == 1 {
            j -= len;
            (1, 0)
        } else {
            (-1, 1)
        };

        while j != 0 {
            j += step;
            let t = self.blossom_children[b][wrap(j, len)];
            let p = self.blossom_endpoints[b][wrap(j - trick as isize, len)] ^ trick;
            if t >= self.n {
                self.augment_blossom(t, self.endpoint[p]);
            }
            j += step;
            let t = self.blossom_children[b][wrap(j, len)];
            if t >= self.n {
                self.augment_blossom(t, self.endpoint[p ^ 1]);
            }
            self.mate[self.endpoint[p]] = p ^ 1;
            self.mate[self.endpoint[p ^ 1]] = p;
        }

        self.blossom_children[b].rotate_left(i);
        self.blossom_endpoints[b].rotate_left(i);
        self.blossom_base[b] = self.blossom_base[self.blossom_children[b][0]];
        debug_assert_eq!(self.blossom_base[b], v);
    }

    /// Flip the augmenting path through edge `k` that connects two tree roots.
    fn augment_matching(&mut self, k: usize) {
        let (v, w, _) = self.edges[k];
        for (mut s, mut p) in [(v, 2 * k + 1), (w, 2 * k)] {
            loop {
                let bs = self.in_blossom[s];
                debug_assert_eq!(self.label[bs], OUTER);
                if bs >= self.n {
                    self.augment_blossom(bs, s);
                }
                self.mate[s] = p;
                if self.label_end[bs] == NONE {
                    break;
                }
                let t = self.endpoint[self.label_end[bs]];
                let bt = self.in_blossom[t];
                debug_assert_eq!(self.label[bt], INNER);
                s = self.endpoint[self.label_end[bt]];
                let j = self.endpoint[self.label_end[bt] ^ 1];
                if bt >= self.n {
                    self.augment_blossom(bt, j);
                }
                self.mate[j] = self.label_end[bt];
                p = self.label_end[bt] ^ 1;
            }
        }
    }

    /// Grow alternating trees from every exposed vertex until an augmenting
    /// path is found or the duals prove none helps.
    fn scan_queue(&mut self) -> bool {
        while let Some(v) = self.queue.pop() {
            debug_assert_eq!(self.label[self.in_blossom[v]], OUTER);
            for idx in 0..self.neighbor_endpoints[v].len() {
                let p = self.neighbor_endpoints[v][idx];
                let k = p / 2;
                let w = self.endpoint[p];
                if self.in_blossom[v] == self.in_blossom[w] {
                    continue;
                }
                let mut kslack = 0;
                if !self.allowed[k] {
                    kslack = self.slack(k);
                    if kslack <= 0 {
                        self.allowed[k] = true;
                    }
                }
                if self.allowed[k] {
                    let bw_label = self.label[self.in_blossom[w]];
                    if bw_label == FREE {
                        self.assign_label(w, INNER, p ^ 1);
                    } else if bw_label == OUTER {
                        let base = self.scan_blossom(v, w);
                        if base != NONE {
                            self.add_blossom(base, k);
                        } else {
                            self.augment_matching(k);
                            return true;
                        }
                    } else if self.label[w] == FREE {
                        // w is inside a T-blossom but has no label of its own yet.
                        self.label[w] = INNER;
                        self.label_end[w] = p ^ 1;
                    }
                } else if self.label[self.in_blossom[w]] == OUTER {
                    let b = self.in_blossom[v];
                    if self.best_edge[b] == NONE || kslack < self.slack(self.best_edge[b]) {
                        self.best_edge[b] = k;
                    }
                } else if self.label[w] == FREE
                    && (self.best_edge[w] == NONE || kslack < self.slack(self.best_edge[w]))
                {
                    self.best_edge[w] = k;
                }
            }
        }
        false
    }

    fn choose_delta(&self) -> (Delta, i64) {
        let n = self.n;
        let min_vertex_dual = self.dual[..n].iter().copied().min().unwrap_or(0);
        let mut best: Option<(Delta, i64)> = if self.max_cardinality {
            None
        } else {
            Some((Delta::Finish, min_vertex_dual))
        };
        let mut consider = |delta: Delta, d: i64| {
            let better = match best {
                None => true,
                Some((_, current)) => d < current,
            };
            if better {
                best = Some((delta, d));
            }
        };

        for v in 0..n {
            if self.label[self.in_blossom[v]] == FREE && self.best_edge[v] != NONE {
                consider(Delta::GrowEdge(self.best_edge[v]), self.slack(self.best_edge[v]));
            }
        }
        for b in 0..2 * n {
            if self.blossom_parent[b] == NONE && self.label[b] == OUTER && self.best_edge[b] != NONE {
                let kslack = self.slack(self.best_edge[b]);
                debug_assert_eq!(kslack % 2, 0);
                consider(Delta::BlossomEdge(self.best_edge[b]), kslack / 2);
            }
        }
        for b in n..2 * n {
            if self.blossom_base[b] != NONE && self.blossom_parent[b] == NONE && self.label[b] == INNER {
                consider(Delta::ExpandBlossom(b), self.dual[b]);
            }
        }

        // Only reachable with max_cardinality: no further augmenting path exists.
        best.unwrap_or((Delta::Finish, min_vertex_dual.max(0)))
    }

    fn apply_delta(&mut self, delta: i64) {
        for v in 0..self.n {
            match self.label[self.in_blossom[v]] {
                OUTER => self.dual[v] -= delta,
                INNER => self.dual[v] += delta,
                _ => {}
            }
        }
        for b in self.n..2 * self.n {
            if self.blossom_base[b] != NONE && self.blossom_parent[b] == NONE {
                match self.label[b] {
                    OUTER => self.dual[b] += delta,
                    INNER => self.dual[b] -= delta,
                    _ => {}
                }
            }
        }
    }

    fn solve(mut self) -> Vec<Option<usize>> {
        let n = self.n;

        // Each stage augments the matching by one edge or terminates.
        for _ in 0..n {
            self.label.fill(FREE);
            self.best_edge.fill(NONE);
            for b in n..2 * n {
                self.blossom_best_edges[b] = None;
            }
            self.allowed.fill(false);
            self.queue.clear();

            for v in 0..n {
                if self.mate[v] == NONE && self.label[self.in_blossom[v]] == FREE {
                    self.assign_label(v, OUTER, NONE);
                }
            }

            let augmented = loop {
                if self.scan_queue() {
                    break true;
                }

                let (delta_kind, delta) = self.choose_delta();
                self.apply_delta(delta);

                match delta_kind {
                    Delta::Finish => break false,
                    Delta::GrowEdge(k) => {
                        self.allowed[k] = true;
                        let (i, j, _) = self.edges[k];
                        let i = if self.label[self.in_blossom[i]] == FREE { j } else { i };
                        debug_assert_eq!(self.label[self.in_blossom[i]], OUTER);
                        self.queue.push(i);
                    }
                    Delta::BlossomEdge(k) => {
                        self.allowed[k] = true;
                        let (i, _, _) = self.edges[k];
                        debug_assert_eq!(self.label[self.in_blossom[i]], OUTER);
                        self.queue.push(i);
                    }
                    Delta::ExpandBlossom(b) => self.expand_blossom(b, false),
                }
            };

            if !augmented {
                break;
            }

            // S-blossoms whose dual dropped to zero are no longer needed.
            for b in n..2 * n {
                if self.blossom_parent[b] == NONE
                    && self.blossom_base[b] != NONE
                    && self.label[b] == OUTER
                    && self.dual[b] == 0
                {
                    self.expand_blossom(b, true);
                }
            }
        }

        self.mate
            .iter()
            .map(|&p| if p == NONE { None } else { Some(self.endpoint[p]) })
            .collect()
    }
}

fn position(children: &[usize], child: usize) -> usize {
    children
        .iter()
        .position(|&c| c == child)
        .expect("sub-blossom must be a child of its parent")
}

/// Python-style index: negative values count from the end.
fn wrap(j: isize, len: isize) -> usize {
    j.rem_euclid(len) as usize
}
