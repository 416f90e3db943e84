//! Sorting-LSH clusters: mapping a sim hash to a FLoC cohort.
//!
//! The cluster file is a stream of protobuf varint32 values. Each value packs
//! one cluster:
//!
//! ```text
//! bit 6      blocked flag
//! bits 0..=5 size exponent k (the cluster covers 2^k consecutive sim hashes)
//! ```
//!
//! Clusters tile the sim-hash space from zero upwards. The cohort of a sim
//! hash is the index of the first cluster whose cumulative size exceeds it.
//!
//! The bytes are held undecoded. Nothing is validated until a cohort is
//! requested, so loading an unusable file never affects the sim hash.

use std::fs;
use std::path::Path;

use crate::config::FlocError;
use crate::fingerprint::CohortId;

const SORTING_LSH_MAX_BITS: u32 = 7;
const SORTING_LSH_BLOCKED_MASK: u32 = 0b100_0000;
const SORTING_LSH_SIZE_MASK: u32 = 0b011_1111;
const MAX_VARINT_BYTES: usize = 10;

/// One decoded cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortingLshCluster {
    /// Size exponent; the cluster spans `2^size_bits` sim hashes.
    pub size_bits: u8,
    /// Cohorts flagged as blocked must not be reported.
    pub blocked: bool,
}

impl SortingLshCluster {
    pub fn new(size_bits: u8, blocked: bool) -> Self {
        Self { size_bits, blocked }
    }

    fn from_combined(combined: u32, index: usize) -> Result<Self, FlocError> {
        if combined >> SORTING_LSH_MAX_BITS > 0 {
            return Err(FlocError::ClusterDecode {
                index,
                reason: "value uses bits above the blocked flag",
            });
        }
        Ok(Self {
            size_bits: (combined & SORTING_LSH_SIZE_MASK) as u8,
            blocked: combined & SORTING_LSH_BLOCKED_MASK != 0,
        })
    }

    fn combined(&self) -> u8 {
        let blocked = if self.blocked {
            SORTING_LSH_BLOCKED_MASK as u8
        } else {
            0
        };
        (self.size_bits & SORTING_LSH_SIZE_MASK as u8) | blocked
    }
}

/// Raw sorting-LSH cluster data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortingLshClusters {
    bytes: Vec<u8>,
}

impl SortingLshClusters {
    /// No clusters at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap raw bytes without decoding them.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Encode decoded clusters back to the varint stream.
    pub fn from_clusters(clusters: &[SortingLshCluster]) -> Self {
        // Every packed value is below 0x80, so each varint is one byte.
        Self {
            bytes: clusters.iter().map(SortingLshCluster::combined).collect(),
        }
    }

    /// Read a cluster file verbatim.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FlocError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| FlocError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lazily decode the cluster stream.
    pub fn clusters(&self) -> Clusters<'_> {
        Clusters {
            bytes: &self.bytes,
            pos: 0,
            index: 0,
            failed: false,
        }
    }

    /// Find the cohort for `sim_hash` over a sim-hash space of `max_bits`.
    pub fn cohort_id(&self, sim_hash: u64, max_bits: u8) -> Result<CohortId, FlocError> {
        let limit = 1u128 << max_bits.min(64);
        let mut cumulative: u128 = 0;

        for (index, cluster) in self.clusters().enumerate() {
            let cluster = cluster?;
            if cluster.size_bits > max_bits {
                return Err(FlocError::ClusterDecode {
                    index,
                    reason: "cluster size exceeds the sim-hash width",
                });
            }
            cumulative += 1u128 << cluster.size_bits;
            if cumulative > limit {
                return Err(FlocError::ClusterDecode {
                    index,
                    reason: "clusters cover more than the sim-hash space",
                });
            }
            if cumulative > u128::from(sim_hash) {
                if cluster.blocked {
                    return Err(FlocError::BlockedCohort {
                        index: index as u64,
                    });
                }
                return Ok(CohortId(index as u64));
            }
        }

        Err(FlocError::NoMatchingCluster { sim_hash })
    }
}

/// Iterator over decoded clusters. Stops after the first error.
pub struct Clusters<'a> {
    bytes: &'a [u8],
    pos: usize,
    index: usize,
    failed: bool,
}

impl Iterator for Clusters<'_> {
    type Item = Result<SortingLshCluster, FlocError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.bytes.len() {
            return None;
        }
        let index = self.index;
        self.index += 1;
        let item = read_varint32(self.bytes, &mut self.pos, index)
            .and_then(|combined| SortingLshCluster::from_combined(combined, index));
        if item.is_err() {
            self.failed = true;
        }
        Some(item)
    }
}

/// Read one varint and keep its low 32 bits, as protobuf's `ReadVarint32`.
fn read_varint32(bytes: &[u8], pos: &mut usize, index: usize) -> Result<u32, FlocError> {
    let mut value: u64 = 0;
    for i in 0..MAX_VARINT_BYTES {
        let Some(&byte) = bytes.get(*pos) else {
            return Err(FlocError::ClusterDecode {
                index,
                reason: "truncated varint",
            });
        };
        *pos += 1;
        let shift = 7 * i as u32;
        if shift < 64 {
            value |= u64::from(byte & 0x7f) << shift;
        }
        if byte & 0x80 == 0 {
            return Ok(value as u32);
        }
    }
    Err(FlocError::ClusterDecode {
        index,
        reason: "varint longer than ten bytes",
    })
}
