//! Fallback search for layer data when resource 1058 is missing.
//!
//! Photoshop's TIFF writer does not always emit the layer-and-mask resource
//! under its usual ID. Some other resources have been seen carrying the same
//! byte layout, occasionally behind a short prefix. Recovery runs an ordered
//! list of [`Strategy`] values and keeps the first one that yields at least
//! one layer record:
//!
//! 1. each candidate in [`FALLBACK_RESOURCE_IDS`] order, parsed as-is;
//! 2. resource 1036 again, at each offset in [`SKIP_OFFSETS`].
//!
//! Candidates that are absent or not larger than [`MIN_CANDIDATE_SIZE`] bytes
//! are never attempted. Every attempt is recorded so callers can see exactly
//! what was tried.

use tracing::{debug, info};

use crate::error::LayerError;

use super::layers::{parse_layer_info, LayerInfo};
use super::resources::{find_resource, ImageResource};

/// Alternative resource IDs, in priority order.
pub const FALLBACK_RESOURCE_IDS: [u16; 4] = [1036, 1050, 1083, 1082];

/// Candidates must be strictly larger than this many bytes.
pub const MIN_CANDIDATE_SIZE: u32 = 100;

/// The one candidate that is also probed behind a leading prefix.
pub const SKIP_PROBE_RESOURCE_ID: u16 = 1036;

/// Leading-byte skips tried on [`SKIP_PROBE_RESOURCE_ID`].
pub const SKIP_OFFSETS: [usize; 6] = [0, 4, 8, 12, 16, 28];

/// A skipped slice must keep at least the two layer-info length fields.
const MIN_REMAINING: usize = 8;

// =============================================================================
// Strategy
// =============================================================================

/// Parse resource `resource_id` starting `skip` bytes into its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub resource_id: u16,
    pub skip: usize,
}

impl Strategy {
    /// Run this strategy against the walked resources.
    ///
    /// Returns `None` when the strategy does not apply: the resource is
    /// absent, too small to be a candidate, or too short for the skip.
    pub fn run(&self, resources: &[ImageResource]) -> Option<Result<LayerInfo, LayerError>> {
        let resource = find_resource(resources, self.resource_id)?;
        if resource.data_size() <= MIN_CANDIDATE_SIZE {
            return None;
        }

        let data = resource.data.get(self.skip..)?;
        if data.len() < MIN_REMAINING {
            return None;
        }

        Some(parse_layer_info(data))
    }
}

/// The fixed, ordered list of fallback strategies.
pub fn fallback_strategies() -> Vec<Strategy> {
    let direct = FALLBACK_RESOURCE_IDS.iter().map(|&resource_id| Strategy {
        resource_id,
        skip: 0,
    });
    let skipped = SKIP_OFFSETS.iter().map(|&skip| Strategy {
        resource_id: SKIP_PROBE_RESOURCE_ID,
        skip,
    });

    direct.chain(skipped).collect()
}

// =============================================================================
// Recovery
// =============================================================================

/// Result of a single attempted strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Parsed with this many layer records; the search stops here
    Accepted { layers: usize },

    /// Parsed, but no layer records came out
    NoLayers,

    /// The parser rejected the buffer
    Failed(LayerError),
}

/// A strategy that was actually run, with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub strategy: Strategy,
    pub outcome: AttemptOutcome,
}

/// Everything recovery tried, and what it found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
    /// Winning strategy and its parse, if any
    pub selected: Option<(Strategy, LayerInfo)>,

    /// Attempts in the order they ran
    pub attempts: Vec<Attempt>,
}

/// Try the fallback strategies in order and keep the first non-empty parse.
pub fn recover_layers(resources: &[ImageResource]) -> Recovery {
    let mut attempts = Vec::new();

    for strategy in fallback_strategies() {
        let Some(result) = strategy.run(resources) else {
            continue;
        };

        let outcome = match result {
            Ok(info) if !info.records.is_empty() => {
                info!(
                    resource_id = strategy.resource_id,
                    skip = strategy.skip,
                    layers = info.records.len(),
                    "Recovered layers from fallback resource"
                );
                attempts.push(Attempt {
                    strategy,
                    outcome: AttemptOutcome::Accepted {
                        layers: info.records.len(),
                    },
                });
                return Recovery {
                    selected: Some((strategy, info)),
                    attempts,
                };
            }
            Ok(_) => AttemptOutcome::NoLayers,
            Err(e) => AttemptOutcome::Failed(e),
        };

        debug!(
            resource_id = strategy.resource_id,
            skip = strategy.skip,
            ?outcome,
            "Fallback strategy rejected"
        );
        attempts.push(Attempt { strategy, outcome });
    }

    debug!(attempts = attempts.len(), "No fallback resource yielded layers");

    Recovery {
        selected: None,
        attempts,
    }
}

// =============================================================================
// Tests
// =============================================================================
