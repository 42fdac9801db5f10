//! Partitioning of a file into large-file parts.
//!
//! The service accepts at most [`MAX_PART_COUNT`] parts per file. A plan
//! starts from the recommended part size and only grows the part size when
//! the recommended size would need more parts than that. Every part except
//! the last has exactly `part_size` bytes; the last one carries the
//! remainder, so the parts always cover the file exactly.

use rustb2_core::{B2Error, B2Result, MAX_PART_COUNT};

/// Computes [`UploadPlan`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlanner {
    max_part_count: u64,
}

impl Default for ChunkPlanner {
    fn default() -> Self {
        Self {
            max_part_count: MAX_PART_COUNT,
        }
    }
}

impl ChunkPlanner {
    /// A planner with a custom part-count ceiling.
    #[must_use]
    pub fn with_max_part_count(max_part_count: u64) -> Self {
        Self {
            max_part_count: max_part_count.max(1),
        }
    }

    /// Plan the upload of `file_size` bytes.
    ///
    /// The resulting plan satisfies
    /// `part_size * (part_count - 1) < file_size <= part_size * part_count`
    /// and `part_count <= max_part_count`.
    pub fn plan(&self, file_size: u64, recommended_part_size: u64) -> B2Result<UploadPlan> {
        if file_size == 0 {
            return Err(B2Error::InvalidPlan {
                reason: "file is empty".to_owned(),
            });
        }
        if recommended_part_size == 0 {
            return Err(B2Error::InvalidPlan {
                reason: "recommended part size is zero".to_owned(),
            });
        }

        let mut part_size = recommended_part_size;
        let mut part_count = file_size.div_ceil(part_size);
        if part_count > self.max_part_count {
            part_size = file_size.div_ceil(self.max_part_count);
            part_count = file_size.div_ceil(part_size);
        }

        let part_count = u32::try_from(part_count).map_err(|_| B2Error::InvalidPlan {
            reason: format!("{part_count} parts do not fit a part number"),
        })?;

        Ok(UploadPlan {
            file_size,
            part_size,
            part_count,
        })
    }
}

/// How a file is split into parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPlan {
    file_size: u64,
    part_size: u64,
    part_count: u32,
}

impl UploadPlan {
    /// Total bytes to upload.
    #[must_use]
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Size of every part but the last.
    #[must_use]
    pub fn part_size(&self) -> u64 {
        self.part_size
    }

    /// Number of parts.
    #[must_use]
    pub fn part_count(&self) -> u32 {
        self.part_count
    }

    /// Byte range of a part, numbered from 1.
    #[must_use]
    pub fn range(&self, part_number: u32) -> Option<ChunkRange> {
        if part_number == 0 || part_number > self.part_count {
            return None;
        }
        let offset = self.part_size * u64::from(part_number - 1);
        let len = if part_number == self.part_count {
            self.file_size - offset
        } else {
            self.part_size
        };
        Some(ChunkRange {
            part_number,
            offset,
            len,
        })
    }

    /// Byte ranges of all parts in part-number order.
    pub fn ranges(&self) -> impl Iterator<Item = ChunkRange> + '_ {
        (1..=self.part_count).filter_map(|n| self.range(n))
    }
}

/// One contiguous byte range of the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    /// Part number, starting at 1.
    pub part_number: u32,
    /// Offset of the first byte.
    pub offset: u64,
    /// Number of bytes.
    pub len: u64,
}
