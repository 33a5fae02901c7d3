//! MPEG audio frame header decoding.
//!
//! This crate does not decode audio; it only needs enough of the MPEG
//! frame-header syntax to locate frame boundaries (frame size) and report
//! bitrate/sample-rate/duration for display purposes. The bit layout and
//! lookup tables below are the standard ones used by every MPEG-1/2 Layer
//! I/II/III decoder.

/// MPEG audio version as encoded in a frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    V2_5,
    Reserved,
    V2,
    V1,
}

/// MPEG audio layer as encoded in a frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegLayer {
    Reserved,
    LayerIII,
    LayerII,
    LayerI,
}

/// A decoded 4-byte MPEG audio frame header.
///
/// Constructed with [`MpegFrameHeader::parse`]; all derived accessors
/// (`bitrate`, `sample_rate`, `frame_size`, `duration_secs`) return `0`/`0.0`
/// if the header describes a reserved version, reserved layer, or a
/// reserved/free bitrate or sample-rate index, per the MPEG spec's
/// "not decodable" convention rather than failing outright.
#[derive(Debug, Clone, Copy)]
pub struct MpegFrameHeader {
    bytes: [u8; 4],
}

impl MpegFrameHeader {
    /// Parses a candidate frame header from exactly 4 bytes.
    ///
    /// Returns `None` if the 11-bit sync pattern (`0xFF` followed by the
    /// top 3 bits of the next byte all set) is not present; the bytes are
    /// not otherwise validated at parse time, since version/layer/bitrate
    /// validity are exposed as "reserved"/`0` through the derived accessors
    /// instead of a hard parse failure.
    pub fn parse(bytes: [u8; 4]) -> Option<Self> {
        if bytes[0] != 0xFF || (bytes[1] & 0xE0) != 0xE0 {
            return None;
        }

        Some(Self { bytes })
    }

    pub fn version(&self) -> MpegVersion {
        match (self.bytes[1] >> 3) & 0b11 {
            0b00 => MpegVersion::V2_5,
            0b01 => MpegVersion::Reserved,
            0b10 => MpegVersion::V2,
            0b11 => MpegVersion::V1,
            _ => unreachable!(),
        }
    }

    pub fn layer(&self) -> MpegLayer {
        match (self.bytes[1] >> 1) & 0b11 {
            0b00 => MpegLayer::Reserved,
            0b01 => MpegLayer::LayerIII,
            0b10 => MpegLayer::LayerII,
            0b11 => MpegLayer::LayerI,
            _ => unreachable!(),
        }
    }

    pub fn has_crc(&self) -> bool {
        self.bytes[1] & 0b1 == 0
    }

    fn bitrate_index(&self) -> u8 {
        (self.bytes[2] >> 4) & 0xF
    }

    fn sample_rate_index(&self) -> u8 {
        (self.bytes[2] >> 2) & 0b11
    }

    pub fn padding(&self) -> u32 {
        ((self.bytes[2] >> 1) & 0b1) as u32
    }

    /// Bitrate in kbps; `0` if the index is free (0), bad (15), or the
    /// version/layer is reserved.
    pub fn bitrate(&self) -> u32 {
        bitrate_table(self.version(), self.layer(), self.bitrate_index())
    }

    /// Sample rate in Hz; `0` if the index or version is reserved.
    pub fn sample_rate(&self) -> u32 {
        sample_rate_table(self.version(), self.sample_rate_index())
    }

    /// Total frame size in bytes, including the 4-byte header.
    pub fn frame_size(&self) -> u32 {
        let bitrate = self.bitrate();
        let sample_rate = self.sample_rate();

        if bitrate == 0 || sample_rate == 0 {
            return 0;
        }

        match self.layer() {
            MpegLayer::LayerI => (12_000 * bitrate / sample_rate + self.padding()) * 4,
            MpegLayer::LayerII | MpegLayer::LayerIII => {
                144_000 * bitrate / sample_rate + self.padding()
            }
            MpegLayer::Reserved => 0,
        }
    }

    /// Duration of this frame in seconds.
    pub fn duration_secs(&self) -> f64 {
        let sample_rate = self.sample_rate();
        if sample_rate == 0 {
            return 0.0;
        }

        let samples_per_frame = match self.layer() {
            MpegLayer::LayerI => 384.0,
            MpegLayer::LayerII | MpegLayer::LayerIII => 1152.0,
            MpegLayer::Reserved => return 0.0,
        };

        samples_per_frame / sample_rate as f64
    }
}

fn bitrate_table(version: MpegVersion, layer: MpegLayer, index: u8) -> u32 {
    if index == 0 || index == 15 {
        return 0;
    }

    let i = index as usize;

    let table: &[u32; 15] = match (version, layer) {
        (MpegVersion::V1, MpegLayer::LayerI) => {
            &[0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448]
        }
        (MpegVersion::V1, MpegLayer::LayerII) => {
            &[0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384]
        }
        (MpegVersion::V1, MpegLayer::LayerIII) => {
            &[0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320]
        }
        (MpegVersion::V2 | MpegVersion::V2_5, MpegLayer::LayerI) => {
            &[0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256]
        }
        (MpegVersion::V2 | MpegVersion::V2_5, MpegLayer::LayerII | MpegLayer::LayerIII) => {
            &[0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160]
        }
        (MpegVersion::Reserved, _) | (_, MpegLayer::Reserved) => return 0,
    };

    table[i]
}

fn sample_rate_table(version: MpegVersion, index: u8) -> u32 {
    if index == 0b11 {
        return 0;
    }

    let i = index as usize;

    match version {
        MpegVersion::V1 => [44_100, 48_000, 32_000][i],
        MpegVersion::V2 => [22_050, 24_000, 16_000][i],
        MpegVersion::V2_5 => [11_025, 12_000, 8_000][i],
        MpegVersion::Reserved => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // MPEG1 Layer III, 128kbps, 44.1kHz, no padding, no CRC.
    const FRAME_NO_PAD: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
    // Same, but with the padding bit set.
    const FRAME_PAD: [u8; 4] = [0xFF, 0xFB, 0x92, 0x00];

    #[test]
    fn rejects_bad_sync() {
        assert!(MpegFrameHeader::parse([0x00, 0xFB, 0x90, 0x00]).is_none());
    }

    #[test]
    fn decodes_version_and_layer() {
        let header = MpegFrameHeader::parse(FRAME_NO_PAD).unwrap();
        assert_eq!(header.version(), MpegVersion::V1);
        assert_eq!(header.layer(), MpegLayer::LayerIII);
        assert_eq!(header.bitrate(), 128);
        assert_eq!(header.sample_rate(), 44_100);
    }

    #[test]
    fn frame_size_matches_known_values() {
        let no_pad = MpegFrameHeader::parse(FRAME_NO_PAD).unwrap();
        assert_eq!(no_pad.frame_size(), 417);

        let pad = MpegFrameHeader::parse(FRAME_PAD).unwrap();
        assert_eq!(pad.frame_size(), 418);
    }

    #[test]
    fn duration_matches_known_value() {
        let header = MpegFrameHeader::parse(FRAME_NO_PAD).unwrap();
        let ms = header.duration_secs() * 1000.0;
        assert!((ms - 26.122).abs() < 0.001, "got {}", ms);
    }

    #[test]
    fn reserved_layer_has_zero_derived_fields() {
        // layer bits = 00 (reserved)
        let header = MpegFrameHeader::parse([0xFF, 0xF9, 0x90, 0x00]).unwrap();
        assert_eq!(header.layer(), MpegLayer::Reserved);
        assert_eq!(header.frame_size(), 0);
        assert_eq!(header.duration_secs(), 0.0);
    }
}
