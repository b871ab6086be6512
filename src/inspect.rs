//! Structure diagnostics for layered TIFF files.
//!
//! [`analyze`] summarises what a file contains: every directory's geometry
//! and sample layout, whether it carries the Photoshop tag, and every image
//! resource found in that tag, with short previews of small payloads and the
//! offsets of recognisable Photoshop tokens inside layer-data candidates.
//!
//! The report is for debugging malformed files. It is logged by the
//! extraction pipeline at DEBUG level and rendered by the `inspect` command;
//! it never feeds back into [`TiffLayerData`](crate::TiffLayerData).

use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::error::LayerError;
use crate::extract::{find_photoshop_block, read_file, ExtractOptions};
use crate::format::psd::{
    resource_kind, walk_resources, ImageResource, FALLBACK_RESOURCE_IDS, LAYER_INFO_RESOURCE_ID,
};
use crate::format::tiff::{decode_directories, TiffImageDirectory, TiffTag};
use crate::io::MemoryReader;

/// Payloads up to this size get hex and text previews.
const PREVIEW_RESOURCE_LIMIT: usize = 256;

/// Bytes shown in a preview.
const PREVIEW_BYTES: usize = 32;

/// Tokens searched for inside layer-data candidates.
const SIGNATURE_TOKENS: [&str; 4] = ["8BIM", "lyid", "lnam", "luni"];

/// Offsets recorded per token.
const MAX_HITS_PER_TOKEN: usize = 16;

// =============================================================================
// Report Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureReport {
    pub directories: Vec<DirectoryReport>,
    pub resources: Vec<ResourceReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryReport {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: Option<Vec<u32>>,
    pub samples_per_pixel: Option<u32>,
    pub photometric: Option<u32>,
    pub compression: Option<u32>,
    pub has_photoshop_tag: bool,
    pub photoshop_tag_size: Option<usize>,
    pub software: Option<String>,
    pub tag_ids: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReport {
    pub id: u16,
    pub kind: Option<&'static str>,
    pub name: String,
    pub size: u32,
    pub hex_preview: Option<String>,
    pub text_preview: Option<String>,
    pub signatures: Vec<SignatureHit>,
}

/// Offsets at which `token` occurs in a resource payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureHit {
    pub token: &'static str,
    pub offsets: Vec<usize>,
}

// =============================================================================
// Analysis
// =============================================================================

/// Build a report from decoded directories and walked resources.
pub fn analyze(directories: &[TiffImageDirectory], resources: &[ImageResource]) -> StructureReport {
    StructureReport {
        directories: directories
            .iter()
            .enumerate()
            .map(|(index, dir)| directory_report(index, dir))
            .collect(),
        resources: resources.iter().map(resource_report).collect(),
    }
}

/// Decode a TIFF and report its structure.
///
/// Unlike extraction, a missing Photoshop tag is not an error here: the
/// report simply lists no resources.
pub fn inspect_bytes(
    data: impl Into<Bytes>,
    options: &ExtractOptions,
) -> Result<StructureReport, LayerError> {
    let data = data.into();
    options.check_size(data.len() as u64)?;

    let reader = MemoryReader::new(data, "memory");
    let directories = decode_directories(&reader)?;

    let resources = find_photoshop_block(&directories)
        .map(walk_resources)
        .unwrap_or_default();

    Ok(analyze(&directories, &resources))
}

/// Read a file and report its structure.
pub fn inspect_path(
    path: impl AsRef<std::path::Path>,
    options: &ExtractOptions,
) -> Result<StructureReport, LayerError> {
    let data = read_file(path.as_ref(), options)?;
    inspect_bytes(data, options)
}

fn directory_report(index: usize, dir: &TiffImageDirectory) -> DirectoryReport {
    DirectoryReport {
        index,
        width: dir.width,
        height: dir.height,
        bits_per_sample: dir.sequence(TiffTag::BitsPerSample),
        samples_per_pixel: dir.scalar(TiffTag::SamplesPerPixel),
        photometric: dir.scalar(TiffTag::PhotometricInterpretation),
        compression: dir.scalar(TiffTag::Compression),
        has_photoshop_tag: dir.has_tag(TiffTag::Photoshop),
        photoshop_tag_size: dir.tag(TiffTag::Photoshop).map(|v| v.byte_len()),
        software: dir.text(TiffTag::Software),
        tag_ids: dir.tag_ids(),
    }
}

fn resource_report(resource: &ImageResource) -> ResourceReport {
    let data = &resource.data;
    let small = data.len() <= PREVIEW_RESOURCE_LIMIT;
    let head = &data[..data.len().min(PREVIEW_BYTES)];

    let is_candidate = resource.id == LAYER_INFO_RESOURCE_ID
        || FALLBACK_RESOURCE_IDS.contains(&resource.id);

    ResourceReport {
        id: resource.id,
        kind: resource_kind(resource.id),
        name: resource.name.clone(),
        size: resource.data_size(),
        hex_preview: small.then(|| hex::encode(head)),
        text_preview: small.then(|| printable(head)),
        signatures: if is_candidate {
            scan_signatures(data)
        } else {
            Vec::new()
        },
    }
}

/// Printable ASCII, with everything else shown as `.`.
fn printable(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect()
}

/// Find every known token in `data`, capped per token.
pub fn scan_signatures(data: &[u8]) -> Vec<SignatureHit> {
    SIGNATURE_TOKENS
        .iter()
        .filter_map(|&token| {
            let offsets: Vec<usize> = data
                .windows(token.len())
                .enumerate()
                .filter(|(_, window)| *window == token.as_bytes())
                .map(|(offset, _)| offset)
                .take(MAX_HITS_PER_TOKEN)
                .collect();
            (!offsets.is_empty()).then_some(SignatureHit { token, offsets })
        })
        .collect()
}

/// Emit the report on the DEBUG channel.
pub fn log_report(report: &StructureReport) {
    for dir in &report.directories {
        debug!(
            index = dir.index,
            width = dir.width,
            height = dir.height,
            bits_per_sample = ?dir.bits_per_sample,
            samples_per_pixel = ?dir.samples_per_pixel,
            photometric = ?dir.photometric,
            photoshop_tag_size = ?dir.photoshop_tag_size,
            software = ?dir.software,
            "TIFF directory"
        );
    }

    for res in &report.resources {
        debug!(
            id = res.id,
            kind = res.kind.unwrap_or("unknown"),
            name = %res.name,
            size = res.size,
            hex = ?res.hex_preview,
            "Image resource"
        );
        for hit in &res.signatures {
            debug!(id = res.id, token = hit.token, offsets = ?hit.offsets, "Signature hits");
        }
    }
}

// =============================================================================
// Text Rendering
// =============================================================================

impl fmt::Display for StructureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Directories: {}", self.directories.len())?;
        for dir in &self.directories {
            writeln!(f, "  [{}] {}x{}", dir.index, dir.width, dir.height)?;
            if let Some(ref bits) = dir.bits_per_sample {
                writeln!(f, "      bits per sample:   {:?}", bits)?;
            }
            if let Some(samples) = dir.samples_per_pixel {
                writeln!(f, "      samples per pixel: {}", samples)?;
            }
            if let Some(photometric) = dir.photometric {
                writeln!(f, "      photometric:       {}", photometric)?;
            }
            if let Some(ref software) = dir.software {
                writeln!(f, "      software:          {}", software)?;
            }
            match dir.photoshop_tag_size {
                Some(size) => writeln!(f, "      photoshop tag:     {} bytes", size)?,
                None => writeln!(f, "      photoshop tag:     absent")?,
            }
            writeln!(f, "      tags:              {:?}", dir.tag_ids)?;
        }

        writeln!(f)?;
        writeln!(f, "Resources: {}", self.resources.len())?;
        for res in &self.resources {
            write!(f, "  {:>5}  {:>8} bytes  {}", res.id, res.size, res.kind.unwrap_or("-"))?;
            if !res.name.is_empty() {
                write!(f, " \"{}\"", res.name)?;
            }
            writeln!(f)?;
            if let (Some(hex), Some(text)) = (&res.hex_preview, &res.text_preview) {
                writeln!(f, "         {}  |{}|", hex, text)?;
            }
            for hit in &res.signatures {
                writeln!(f, "         {} at {:?}", hit.token, hit.offsets)?;
            }
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
