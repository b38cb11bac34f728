use std::collections::VecDeque;

/// Output chunks with absolute offsets.
///
/// Keeps at most `capacity` chunks; once full, the oldest chunk is dropped.
/// Offsets count chunks since the session started and never reset, so a
/// reader holding an old offset resumes at the oldest retained chunk.
#[derive(Debug)]
pub(crate) struct OutputBuffer {
    chunks: VecDeque<Vec<u8>>,
    first_offset: u64,
    capacity: usize,
}

impl OutputBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            chunks: VecDeque::new(),
            first_offset: 0,
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn push(&mut self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        self.chunks.push_back(chunk);
        while self.chunks.len() > self.capacity {
            self.chunks.pop_front();
            self.first_offset += 1;
        }
    }

    /// Offset one past the newest chunk.
    pub(crate) fn end_offset(&self) -> u64 {
        self.first_offset + self.chunks.len() as u64
    }

    pub(crate) fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Bytes of every retained chunk at or after `offset`.
    pub(crate) fn bytes_since(&self, offset: u64) -> Vec<u8> {
        let skip = offset.saturating_sub(self.first_offset) as usize;
        self.chunks
            .iter()
            .skip(skip)
            .flat_map(|chunk| chunk.iter().copied())
            .collect()
    }

    pub(crate) fn text_since(&self, offset: u64) -> String {
        String::from_utf8_lossy(&self.bytes_since(offset)).into_owned()
    }
}

#[cfg(test)]
#[path = "buffer.test.rs"]
mod tests;
