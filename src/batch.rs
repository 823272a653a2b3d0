//! Per-frame vertex/index accumulation grouped into sub-batches.

use std::ops::Range;

use crate::mesh::Vertex3d;

/// How the indices of a sub-batch are assembled into primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Three indices per triangle.
    Triangles,
    /// Two indices per line segment.
    Lines,
}

/// One primitive-emission call inside a [`VertexBatch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubBatch {
    /// Index of the first vertex this sub-batch appended.
    pub first_vertex: u32,
    /// Offset of the first index this sub-batch appended.
    pub first_index: u32,
    /// Number of indices appended by this sub-batch.
    pub index_count: u32,
    pub topology: Topology,
}

impl SubBatch {
    /// The index-buffer range covered by this sub-batch.
    pub fn index_range(&self) -> Range<u32> {
        self.first_index..self.first_index + self.index_count
    }
}

/// Vertices and 32-bit indices for one frame, split into sub-batches.
///
/// Indices are pushed relative to the current sub-batch's first vertex and
/// stored rebased, so the whole batch can be uploaded and drawn as one buffer
/// pair.
#[derive(Clone, Debug, Default)]
pub struct VertexBatch {
    vertices: Vec<Vertex3d>,
    indices: Vec<u32>,
    sub_batches: Vec<SubBatch>,
}

impl VertexBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the batch, keeping allocations for the next frame.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.sub_batches.clear();
    }

    /// Marks the start of a new sub-batch. Following indices are relative to
    /// the next vertex pushed.
    pub fn start_batch(&mut self, topology: Topology) {
        self.sub_batches.push(SubBatch {
            first_vertex: self.vertices.len() as u32,
            first_index: self.indices.len() as u32,
            index_count: 0,
            topology,
        });
    }

    pub fn push_vertex(&mut self, vertex: Vertex3d) {
        self.vertices.push(vertex);
    }

    /// Appends one index relative to the current sub-batch.
    pub fn push_index(&mut self, local: u32) {
        if self.sub_batches.is_empty() {
            self.start_batch(Topology::Triangles);
        }
        let last = self.sub_batches.len() - 1;
        let sub = &mut self.sub_batches[last];
        self.indices.push(sub.first_vertex + local);
        sub.index_count += 1;
    }

    /// Appends several indices relative to the current sub-batch.
    pub fn insert_indices(&mut self, locals: &[u32]) {
        for &local in locals {
            self.push_index(local);
        }
    }

    pub fn vertices(&self) -> &[Vertex3d] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn sub_batches(&self) -> &[SubBatch] {
        &self.sub_batches
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The vertices appended by one sub-batch.
    pub fn sub_batch_vertices(&self, sub: &SubBatch) -> &[Vertex3d] {
        let end = self
            .sub_batches
            .iter()
            .find(|s| s.first_vertex > sub.first_vertex)
            .map_or(self.vertices.len(), |s| s.first_vertex as usize);
        &self.vertices[sub.first_vertex as usize..end]
    }

    /// Merges consecutive sub-batches of the same topology into draw ranges.
    ///
    /// Empty sub-batches (for example a skipped line) are ignored.
    pub fn draw_runs(&self) -> Vec<(Topology, Range<u32>)> {
        let mut runs: Vec<(Topology, Range<u32>)> = Vec::new();
        for sub in self.sub_batches.iter().filter(|s| s.index_count > 0) {
            match runs.last_mut() {
                Some((topology, range)) if *topology == sub.topology && range.end == sub.first_index => {
                    range.end = sub.first_index + sub.index_count;
                }
                _ => runs.push((sub.topology, sub.index_range())),
            }
        }
        runs
    }
}
