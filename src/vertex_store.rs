//! Bidirectional vertex residency: open priority queue <-> standby pool
//! (spec §4.2), rewritten per spec §9's design note as a single canonical
//! array of [`SearchNode`]s plus a handle-based indexed binary heap,
//! instead of the source's two containers with in-place mutation and
//! defensive re-heapify.
//!
//! A vertex's `search_id` always indexes the same slot in `nodes`; moving
//! it between "open" and "standby" only ever changes whether its id
//! appears in `heap`, tracked by `heap_pos`. This makes residency
//! uniqueness (spec §8 invariant 1) true by construction: a `search_id`
//! is in the open queue iff `heap_pos[search_id].is_some()`, full stop.

use crate::graph::NodeId;
use crate::search_node::{Lifecycle, SearchNode};

pub struct VertexStore {
    nodes: Vec<Option<SearchNode>>,
    heap: Vec<NodeId>,
    heap_pos: Vec<Option<usize>>,
}

impl VertexStore {
    /// A store with `capacity` dense slots, all initially empty — vertices
    /// are created lazily via [`VertexStore::ensure`].
    pub fn with_capacity(capacity: usize) -> Self {
        VertexStore {
            nodes: (0..capacity).map(|_| None).collect(),
            heap: Vec::new(),
            heap_pos: vec![None; capacity],
        }
    }

    /// Materializes every vertex up front with `g = rhs = BIG_NUM`,
    /// `state = New` — LPA*/D* Lite's construction-time behavior (spec §3).
    pub fn materialize_all(capacity: usize) -> Self {
        let mut store = VertexStore::with_capacity(capacity);
        for id in 0..capacity {
            store.nodes[id] = Some(SearchNode::new(id));
        }
        store
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes[id].is_some()
    }

    pub fn is_open(&self, id: NodeId) -> bool {
        self.heap_pos[id].is_some()
    }

    /// Returns the existing vertex, or materializes a fresh `New` one.
    pub fn ensure(&mut self, id: NodeId) -> &mut SearchNode {
        self.nodes[id].get_or_insert_with(|| SearchNode::new(id))
    }

    pub fn get(&self, id: NodeId) -> Option<&SearchNode> {
        self.nodes[id].as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SearchNode> {
        self.nodes[id].as_mut()
    }

    /// Promotes `id` onto the open queue. No-op if already open. The
    /// caller is responsible for having set `key_val` beforehand.
    pub fn promote(&mut self, id: NodeId) {
        if self.heap_pos[id].is_some() {
            self.sift_up_or_down(id);
            return;
        }
        if let Some(node) = self.nodes[id].as_mut() {
            node.state = Lifecycle::Open;
        }
        let idx = self.heap.len();
        self.heap.push(id);
        self.heap_pos[id] = Some(idx);
        self.sift_up(idx);
    }

    /// Removes `id` from the open queue if present, leaving it resident
    /// in the standby pool (spec: "demote to standby"). Does not change
    /// `state`; callers set that themselves since the meaning of
    /// "standby" differs between A*/Theta* (closed) and LPA* (consistent).
    pub fn demote(&mut self, id: NodeId) {
        let Some(idx) = self.heap_pos[id] else {
            return;
        };
        self.remove_at(idx);
    }

    /// Smallest-key id currently on the open queue, without removing it.
    pub fn peek(&self) -> Option<NodeId> {
        self.heap.first().copied()
    }

    /// Pops and returns the smallest-key id on the open queue.
    pub fn pop(&mut self) -> Option<NodeId> {
        let top = self.peek()?;
        self.remove_at(0);
        Some(top)
    }

    pub fn open_len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_open_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Re-establishes heap order for `id` after its key changed while it
    /// was already on the open queue (spec §4.2: "any key-changing
    /// mutation must be followed by a heap re-heapify").
    pub fn resift(&mut self, id: NodeId) {
        if self.heap_pos[id].is_some() {
            self.sift_up_or_down(id);
        }
    }

    fn key_of(&self, id: NodeId) -> crate::key::Key {
        self.nodes[id].as_ref().expect("heap entries are always materialized").key_val
    }

    fn remove_at(&mut self, idx: usize) {
        let removed = self.heap[idx];
        self.heap_pos[removed] = None;
        let last = self.heap.len() - 1;
        if idx != last {
            self.heap.swap(idx, last);
            self.heap_pos[self.heap[idx]] = Some(idx);
        }
        self.heap.pop();
        if idx < self.heap.len() {
            self.sift_up_or_down_at(idx);
        }
    }

    fn sift_up_or_down(&mut self, id: NodeId) {
        if let Some(idx) = self.heap_pos[id] {
            self.sift_up_or_down_at(idx);
        }
    }

    fn sift_up_or_down_at(&mut self, idx: usize) {
        let moved_up = self.sift_up(idx);
        if !moved_up {
            self.sift_down(idx);
        }
    }

    /// Returns whether the element moved.
    fn sift_up(&mut self, mut idx: usize) -> bool {
        let start = idx;
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.key_of(self.heap[idx]) < self.key_of(self.heap[parent]) {
                self.swap(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
        idx != start
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.heap.len();
        loop {
            let (left, right) = (2 * idx + 1, 2 * idx + 2);
            let mut smallest = idx;
            if left < len && self.key_of(self.heap[left]) < self.key_of(self.heap[smallest]) {
                smallest = left;
            }
            if right < len && self.key_of(self.heap[right]) < self.key_of(self.heap[smallest]) {
                smallest = right;
            }
            if smallest == idx {
                break;
            }
            self.swap(idx, smallest);
            idx = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.heap_pos[self.heap[a]] = Some(a);
        self.heap_pos[self.heap[b]] = Some(b);
    }
}
