//! Test utilities for integration tests.
//!
//! Builders for the three nested layers of a layered TIFF: the TIFF
//! container ([`TiffBuilder`]), the 8BIM resource block stored in tag 34377
//! ([`ResourceBlockBuilder`]), and the layer-and-mask information stored in
//! resource 1058 ([`LayerInfoBuilder`]).

#![allow(dead_code)]

// =============================================================================
// TIFF File Builders
// =============================================================================

pub const TAG_IMAGE_WIDTH: u16 = 256;
pub const TAG_IMAGE_LENGTH: u16 = 257;
pub const TAG_BITS_PER_SAMPLE: u16 = 258;
pub const TAG_COMPRESSION: u16 = 259;
pub const TAG_PHOTOMETRIC: u16 = 262;
pub const TAG_SAMPLES_PER_PIXEL: u16 = 277;
pub const TAG_SOFTWARE: u16 = 305;
pub const TAG_PHOTOSHOP: u16 = 34377;

#[derive(Clone, Copy, Debug)]
pub enum ByteOrderType {
    LittleEndian,
    BigEndian,
}

/// Builder for creating test TIFF files.
///
/// IFDs are laid out in order, each followed by the out-of-line values of
/// its entries.
pub struct TiffBuilder {
    byte_order: ByteOrderType,
    is_bigtiff: bool,
    ifds: Vec<IfdBuilder>,
}

impl TiffBuilder {
    pub fn new() -> Self {
        Self {
            byte_order: ByteOrderType::LittleEndian,
            is_bigtiff: false,
            ifds: Vec::new(),
        }
    }

    pub fn with_byte_order(mut self, order: ByteOrderType) -> Self {
        self.byte_order = order;
        self
    }

    pub fn with_bigtiff(mut self, is_bigtiff: bool) -> Self {
        self.is_bigtiff = is_bigtiff;
        self
    }

    pub fn add_ifd(mut self, ifd: IfdBuilder) -> Self {
        self.ifds.push(ifd);
        self
    }

    /// Build the TIFF file data.
    pub fn build(self) -> Vec<u8> {
        let mut data = Vec::new();

        match self.byte_order {
            ByteOrderType::LittleEndian => data.extend_from_slice(b"II"),
            ByteOrderType::BigEndian => data.extend_from_slice(b"MM"),
        }

        if self.is_bigtiff {
            self.write_u16(&mut data, 43); // BigTIFF version
            self.write_u16(&mut data, 8); // Offset size
            self.write_u16(&mut data, 0); // Reserved
            self.write_offset(&mut data, 16);
        } else {
            self.write_u16(&mut data, 42); // Classic TIFF version
            self.write_offset(&mut data, 8);
        }

        let ifd_count = self.ifds.len();
        for (index, ifd) in self.ifds.iter().enumerate() {
            let entry_count = ifd.entries.len();
            let ifd_size = self.count_size() + entry_count * self.entry_size() + self.offset_size();
            let external_start = data.len() + ifd_size;

            let mut table = Vec::new();
            let mut external = Vec::new();

            if self.is_bigtiff {
                self.write_u64(&mut table, entry_count as u64);
            } else {
                self.write_u16(&mut table, entry_count as u16);
            }

            for entry in &ifd.entries {
                let payload = entry.value.encode(self.byte_order);

                self.write_u16(&mut table, entry.tag);
                self.write_u16(&mut table, entry.value.field_type());
                self.write_offset(&mut table, entry.value.count());

                if payload.len() <= self.offset_size() {
                    let mut inline = payload;
                    inline.resize(self.offset_size(), 0);
                    table.extend(inline);
                } else {
                    let offset = external_start + external.len();
                    self.write_offset(&mut table, offset as u64);
                    external.extend(payload);
                    // Word alignment
                    if external.len() % 2 == 1 {
                        external.push(0);
                    }
                }
            }

            let next_ifd_offset = if index + 1 < ifd_count {
                (external_start + external.len()) as u64
            } else {
                0
            };
            self.write_offset(&mut table, next_ifd_offset);

            data.extend(table);
            data.extend(external);
        }

        data
    }

    fn count_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            2
        }
    }

    fn entry_size(&self) -> usize {
        if self.is_bigtiff {
            20
        } else {
            12
        }
    }

    fn offset_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            4
        }
    }

    fn write_offset(&self, data: &mut Vec<u8>, value: u64) {
        if self.is_bigtiff {
            self.write_u64(data, value);
        } else {
            self.write_u32(data, value as u32);
        }
    }

    fn write_u16(&self, data: &mut Vec<u8>, value: u16) {
        data.extend(value_bytes16(self.byte_order, value));
    }

    fn write_u32(&self, data: &mut Vec<u8>, value: u32) {
        data.extend(value_bytes32(self.byte_order, value));
    }

    fn write_u64(&self, data: &mut Vec<u8>, value: u64) {
        match self.byte_order {
            ByteOrderType::LittleEndian => data.extend(&value.to_le_bytes()),
            ByteOrderType::BigEndian => data.extend(&value.to_be_bytes()),
        }
    }
}

impl Default for TiffBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn value_bytes16(order: ByteOrderType, value: u16) -> [u8; 2] {
    match order {
        ByteOrderType::LittleEndian => value.to_le_bytes(),
        ByteOrderType::BigEndian => value.to_be_bytes(),
    }
}

fn value_bytes32(order: ByteOrderType, value: u32) -> [u8; 4] {
    match order {
        ByteOrderType::LittleEndian => value.to_le_bytes(),
        ByteOrderType::BigEndian => value.to_be_bytes(),
    }
}

/// A tag value, encoded in the file's byte order at build time.
#[derive(Clone, Debug)]
pub enum EntryValue {
    Shorts(Vec<u16>),
    Longs(Vec<u32>),
    Ascii(String),
    Undefined(Vec<u8>),
}

impl EntryValue {
    fn field_type(&self) -> u16 {
        match self {
            EntryValue::Shorts(_) => 3,
            EntryValue::Longs(_) => 4,
            EntryValue::Ascii(_) => 2,
            EntryValue::Undefined(_) => 7,
        }
    }

    fn count(&self) -> u64 {
        match self {
            EntryValue::Shorts(v) => v.len() as u64,
            EntryValue::Longs(v) => v.len() as u64,
            EntryValue::Ascii(s) => s.len() as u64 + 1,
            EntryValue::Undefined(v) => v.len() as u64,
        }
    }

    fn encode(&self, order: ByteOrderType) -> Vec<u8> {
        match self {
            EntryValue::Shorts(v) => v.iter().flat_map(|&x| value_bytes16(order, x)).collect(),
            EntryValue::Longs(v) => v.iter().flat_map(|&x| value_bytes32(order, x)).collect(),
            EntryValue::Ascii(s) => {
                let mut out = s.as_bytes().to_vec();
                out.push(0);
                out
            }
            EntryValue::Undefined(v) => v.clone(),
        }
    }
}

struct PendingEntry {
    tag: u16,
    value: EntryValue,
}

/// Builder for creating IFD entries.
pub struct IfdBuilder {
    entries: Vec<PendingEntry>,
}

impl IfdBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// An RGB image directory with 8 bits per sample.
    pub fn rgb(width: u32, height: u32) -> Self {
        let mut builder = Self::new();
        builder
            .add_long(TAG_IMAGE_WIDTH, width)
            .add_long(TAG_IMAGE_LENGTH, height)
            .add_shorts(TAG_BITS_PER_SAMPLE, &[8, 8, 8])
            .add_short(TAG_COMPRESSION, 1)
            .add_short(TAG_PHOTOMETRIC, 2)
            .add_short(TAG_SAMPLES_PER_PIXEL, 3);
        builder
    }

    pub fn add_short(&mut self, tag: u16, value: u16) -> &mut Self {
        self.add(tag, EntryValue::Shorts(vec![value]))
    }

    pub fn add_shorts(&mut self, tag: u16, values: &[u16]) -> &mut Self {
        self.add(tag, EntryValue::Shorts(values.to_vec()))
    }

    pub fn add_long(&mut self, tag: u16, value: u32) -> &mut Self {
        self.add(tag, EntryValue::Longs(vec![value]))
    }

    pub fn add_ascii(&mut self, tag: u16, value: &str) -> &mut Self {
        self.add(tag, EntryValue::Ascii(value.to_string()))
    }

    /// Attach a Photoshop resource block as tag 34377.
    pub fn add_photoshop(&mut self, block: Vec<u8>) -> &mut Self {
        self.add(TAG_PHOTOSHOP, EntryValue::Undefined(block))
    }

    /// Add a tag entry. Entries are sorted by tag at build time, as TIFF requires.
    pub fn add(&mut self, tag: u16, value: EntryValue) -> &mut Self {
        self.entries.push(PendingEntry { tag, value });
        self.entries.sort_by_key(|e| e.tag);
        self
    }

    /// Finish a chain of `&mut` calls.
    pub fn finish(&mut self) -> Self {
        Self {
            entries: std::mem::take(&mut self.entries),
        }
    }
}

impl Default for IfdBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Photoshop Resource Builders
// =============================================================================

/// Builder for an 8BIM image resource block.
pub struct ResourceBlockBuilder {
    data: Vec<u8>,
}

impl ResourceBlockBuilder {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn resource(self, id: u16, payload: &[u8]) -> Self {
        self.named_resource(id, "", payload)
    }

    pub fn named_resource(mut self, id: u16, name: &str, payload: &[u8]) -> Self {
        self.data.extend_from_slice(b"8BIM");
        self.data.extend_from_slice(&id.to_be_bytes());

        // Length byte + name, padded to an even total
        self.data.push(name.len() as u8);
        self.data.extend_from_slice(name.as_bytes());
        if (name.len() + 1) % 2 == 1 {
            self.data.push(0);
        }

        self.data
            .extend_from_slice(&(payload.len() as u32).to_be_bytes());
        self.data.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            self.data.push(0);
        }
        self
    }

    /// Append bytes that are not a resource.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

impl Default for ResourceBlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// How a test layer carries its name in the extra-data trailer.
#[derive(Clone, Debug)]
pub enum LayerName {
    /// `luni` sub-block at the start of the trailer
    Unicode(String),

    /// `lnam` sub-block at the start of the trailer
    Ascii(String),

    /// Trailer bytes written as given
    Raw(Vec<u8>),

    /// Empty trailer
    None,
}

/// One layer record for [`LayerInfoBuilder`].
#[derive(Clone, Debug)]
pub struct TestLayer {
    pub bounds: [i32; 4],
    pub channels: Vec<(i16, u32)>,
    pub blend_mode: [u8; 4],
    pub opacity: u8,
    pub clipping: u8,
    pub flags: u8,
    pub name: LayerName,
}

impl TestLayer {
    /// A visible RGB layer with normal blending and a Unicode name.
    pub fn new(name: &str, top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            bounds: [top, left, bottom, right],
            channels: vec![(0, 64), (1, 64), (2, 64)],
            blend_mode: *b"norm",
            opacity: 255,
            clipping: 0,
            flags: 0,
            name: LayerName::Unicode(name.to_string()),
        }
    }

    pub fn blend(mut self, mode: &[u8; 4]) -> Self {
        self.blend_mode = *mode;
        self
    }

    pub fn opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn clipping(mut self, clipping: u8) -> Self {
        self.clipping = clipping;
        self
    }

    pub fn channels(mut self, channels: Vec<(i16, u32)>) -> Self {
        self.channels = channels;
        self
    }

    pub fn name(mut self, name: LayerName) -> Self {
        self.name = name;
        self
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for edge in self.bounds {
            out.extend_from_slice(&edge.to_be_bytes());
        }
        out.extend_from_slice(&(self.channels.len() as u16).to_be_bytes());
        for &(id, length) in &self.channels {
            out.extend_from_slice(&id.to_be_bytes());
            out.extend_from_slice(&length.to_be_bytes());
        }
        out.extend_from_slice(b"8BIM");
        out.extend_from_slice(&self.blend_mode);
        out.extend_from_slice(&[self.opacity, self.clipping, self.flags, 0]);

        let trailer = self.trailer();
        out.extend_from_slice(&(trailer.len() as u32).to_be_bytes());
        out.extend(trailer);
        out
    }

    fn trailer(&self) -> Vec<u8> {
        match &self.name {
            LayerName::Unicode(name) => luni_block(name),
            LayerName::Ascii(name) => lnam_block(name),
            LayerName::Raw(bytes) => bytes.clone(),
            LayerName::None => Vec::new(),
        }
    }
}

/// An additional layer information block.
pub fn sub_block(key: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"8BIM");
    out.extend_from_slice(key);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
    out
}

/// `luni` block: BE character count, then little-endian UTF-16 units.
pub fn luni_block(name: &str) -> Vec<u8> {
    let units: Vec<u16> = name.encode_utf16().collect();
    let mut payload = (units.len() as u32).to_be_bytes().to_vec();
    for unit in units {
        payload.extend_from_slice(&unit.to_le_bytes());
    }
    sub_block(b"luni", &payload)
}

pub fn lnam_block(name: &str) -> Vec<u8> {
    let mut payload = vec![name.len() as u8];
    payload.extend_from_slice(name.as_bytes());
    sub_block(b"lnam", &payload)
}

/// Builder for a layer-and-mask information buffer.
pub struct LayerInfoBuilder {
    layers: Vec<TestLayer>,
    merged_alpha: bool,
    prefix: usize,
}

impl LayerInfoBuilder {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            merged_alpha: false,
            prefix: 0,
        }
    }

    pub fn layer(mut self, layer: TestLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Write the layer count negated.
    pub fn merged_alpha(mut self, merged_alpha: bool) -> Self {
        self.merged_alpha = merged_alpha;
        self
    }

    /// Prepend `bytes` zero bytes before the layer info.
    pub fn prefix(mut self, bytes: usize) -> Self {
        self.prefix = bytes;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let body: Vec<u8> = self.layers.iter().flat_map(TestLayer::encode).collect();
        let count = self.layers.len() as i16;
        let count = if self.merged_alpha { -count } else { count };

        let mut out = vec![0u8; self.prefix];
        out.extend_from_slice(&((body.len() + 6) as u32).to_be_bytes());
        out.extend_from_slice(&((body.len() + 2) as u32).to_be_bytes());
        out.extend_from_slice(&count.to_be_bytes());
        out.extend(body);
        out
    }
}

impl Default for LayerInfoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A little-endian RGB TIFF whose first directory carries `block`.
pub fn create_layered_tiff(width: u32, height: u32, block: Vec<u8>) -> Vec<u8> {
    let ifd = IfdBuilder::rgb(width, height)
        .add_ascii(TAG_SOFTWARE, "Adobe Photoshop 25.0")
        .add_photoshop(block)
        .finish();
    TiffBuilder::new().add_ifd(ifd).build()
}

/// The two-layer document used across tests: a background and a text layer.
pub fn two_layer_info() -> Vec<u8> {
    LayerInfoBuilder::new()
        .layer(TestLayer::new("Background", 0, 0, 100, 200))
        .layer(TestLayer::new("Text Layer", 10, 20, 40, 180).opacity(128))
        .build()
}

pub fn create_two_layer_tiff() -> Vec<u8> {
    let block = ResourceBlockBuilder::new()
        .resource(1005, &[0; 16])
        .resource(1058, &two_layer_info())
        .build();
    create_layered_tiff(200, 100, block)
}
