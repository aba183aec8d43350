use derive_more::derive::Display;

use crate::error::Error;

/// Number of samples each channel produces per block
pub const SAMPLES_PER_BLOCK: u64 = 1024;

/// Which layout the compression block uses
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq)]
pub enum CompressionKind {
    #[default]
    #[display("comp")]
    Comp,
    #[display("dec")]
    Dec,
}

/// Cipher descriptor from the `ciph` block
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq)]
pub enum CipherKind {
    /// Not encrypted
    #[default]
    #[display("none")]
    None,
    /// Encrypted with the fixed table
    #[display("static")]
    Static,
    /// Encrypted with a per title key
    #[display("keyed")]
    Keyed,
    #[display("unknown ({_0})")]
    Other(u16),
}

impl CipherKind {
    pub fn code(self) -> u16 {
        match self {
            CipherKind::None => 0,
            CipherKind::Static => 1,
            CipherKind::Keyed => 56,
            CipherKind::Other(code) => code,
        }
    }
}

impl From<u16> for CipherKind {
    fn from(code: u16) -> Self {
        match code {
            0 => CipherKind::None,
            1 => CipherKind::Static,
            56 => CipherKind::Keyed,
            other => CipherKind::Other(other),
        }
    }
}

/// Loop region from the `loop` block, in blocks
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopRegion {
    pub start_block: u32,
    pub end_block: u32,
    pub count: u16,
}

impl LoopRegion {
    pub fn start_sample(&self) -> u64 {
        u64::from(self.start_block) * SAMPLES_PER_BLOCK
    }

    pub fn end_sample(&self) -> u64 {
        u64::from(self.end_block) * SAMPLES_PER_BLOCK
    }
}

/// Parameters from the `vbr` block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VariableBitrate {
    pub max_frame_size: u16,
    pub noise_level: u16,
}

/// Metadata read from the header of a single HCA stream
///
/// Decoding never fails. When a step goes wrong the fields read so far are kept and
/// [`HcaHeader::error`] holds the reason, which makes [`HcaHeader::is_valid`] false.
#[derive(Debug, Clone, PartialEq)]
pub struct HcaHeader {
    /// Size of the buffer the header was read from
    pub size: usize,
    pub version: u16,
    /// Offset of the first audio block
    pub data_offset: u16,
    pub channels: u8,
    pub sample_rate: u32,
    pub block_count: u32,
    pub mute_header: u16,
    pub mute_footer: u16,
    pub block_size: u16,
    pub compression: Option<CompressionKind>,
    pub vbr: Option<VariableBitrate>,
    pub ath_type: Option<u16>,
    pub loop_region: Option<LoopRegion>,
    pub cipher: CipherKind,
    /// Relative volume, `1.0` unless an `rva` block says otherwise
    pub volume: f32,
    pub comment: String,
    pub error: Option<Error>,
}

impl Default for HcaHeader {
    fn default() -> Self {
        Self {
            size: 0,
            version: 0,
            data_offset: 0,
            channels: 0,
            sample_rate: 0,
            block_count: 0,
            mute_header: 0,
            mute_footer: 0,
            block_size: 0,
            compression: None,
            vbr: None,
            ath_type: None,
            loop_region: None,
            cipher: CipherKind::None,
            volume: 1.0,
            comment: String::new(),
            error: None,
        }
    }
}

impl HcaHeader {
    /// A header that could not be read at all
    pub fn invalid(size: usize, error: Error) -> Self {
        Self {
            size,
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn has_loop(&self) -> bool {
        self.loop_region.is_some()
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher != CipherKind::None
    }

    /// Samples per channel, zero for an invalid header
    pub fn total_samples(&self) -> u64 {
        if !self.is_valid() {
            return 0;
        }

        u64::from(self.block_count) * SAMPLES_PER_BLOCK
    }

    /// Playback length in seconds, zero for an invalid header
    pub fn duration_secs(&self) -> f64 {
        if !self.is_valid() || self.sample_rate == 0 {
            return 0.0;
        }

        self.total_samples() as f64 / f64::from(self.sample_rate)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        error::Error,
        types::{CipherKind, HcaHeader, LoopRegion},
    };

    #[test]
    fn cipher_codes() {
        for code in [0, 1, 56, 7] {
            assert_eq!(CipherKind::from(code).code(), code);
        }
        assert_eq!(CipherKind::from(56), CipherKind::Keyed);
        assert_eq!(CipherKind::from(7).to_string(), "unknown (7)");
    }

    #[test]
    fn duration_of_valid_header() {
        let header = HcaHeader {
            sample_rate: 48000,
            block_count: 4688,
            ..Default::default()
        };

        assert_eq!(header.total_samples(), 4_800_512);
        assert!((header.duration_secs() - 100.010_666).abs() < 1e-3);
    }

    #[test]
    fn invalid_header_has_no_duration() {
        let mut header = HcaHeader {
            sample_rate: 48000,
            block_count: 4688,
            ..Default::default()
        };
        header.error = Some(Error::RangeViolation {
            field: "channel count",
            value: 0,
        });

        assert!(!header.is_valid());
        assert_eq!(header.total_samples(), 0);
        assert_eq!(header.duration_secs(), 0.0);
    }

    #[test]
    fn loop_samples() {
        let region = LoopRegion {
            start_block: 2,
            end_block: 10,
            count: 0,
        };

        assert_eq!(region.start_sample(), 2048);
        assert_eq!(region.end_sample(), 10240);
    }
}
