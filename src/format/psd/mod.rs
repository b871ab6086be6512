//! Photoshop structures embedded in TIFF files.
//!
//! The Photoshop private tag carries an 8BIM image resource block. This
//! module walks that block ([`resources`]), decodes the layer-and-mask
//! information it contains ([`layers`]), and falls back to other resources
//! when the usual one is missing ([`recovery`]).

pub mod layers;
pub mod recovery;
pub mod resources;

pub use layers::{
    default_layer_name, parse_layer_info, visible_from_flags, ChannelInfo, LayerInfo,
    LayerRecord, BLEND_NORMAL, FLAG_HIDDEN, LUNI_BYTE_ORDER,
};
pub use recovery::{
    fallback_strategies, recover_layers, Attempt, AttemptOutcome, Recovery, Strategy,
    FALLBACK_RESOURCE_IDS, MIN_CANDIDATE_SIZE, SKIP_OFFSETS, SKIP_PROBE_RESOURCE_ID,
};
pub use resources::{
    find_resource, padded_name_length, resource_kind, walk_resources, ImageResource,
    ResourceSummary, LAYER_INFO_RESOURCE_ID, SIGNATURE_8BIM,
};
