use crate::format::it::compression;
use crate::format::it::flags::{ConvertFlags, SampleFlags};
use crate::format::it::value::{SamplePanValue, Volume};
use crate::format::pointer::{ParaPointer32, Watermark};
use crate::util::BinaryRead;
use crate::Error;

// Sample header:
//
// Offset Size  Description
// 0x00   4     "IMPS"
// 0x04   12    DOS filename
// 0x10   1     reserved
// 0x11   1     global volume (0..64)
// 0x12   1     flags
// 0x13   1     default volume
// 0x14   26    sample name
// 0x2e   1     convert flags
// 0x2f   1     default pan
// 0x30   4     length in samples
// 0x34   4     loop begin
// 0x38   4     loop end
// 0x3c   4     C5 speed
// 0x40   4     sustain loop begin
// 0x44   4     sustain loop end
// 0x48   4     sample data pointer
// 0x4c   4     vibrato speed, depth, rate, waveform

pub const SAMPLE_HEADER_SIZE: usize = 0x50;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItSample {
    pub filename       : String,
    pub global_volume  : Volume,
    pub flags          : SampleFlags,
    pub volume         : Volume,
    pub name           : String,
    pub convert        : ConvertFlags,
    pub default_pan    : SamplePanValue,
    pub length         : u32,
    pub loop_begin     : u32,
    pub loop_end       : u32,
    pub c5_speed       : u32,
    pub sustain_begin  : u32,
    pub sustain_end    : u32,
    pub sample_pointer : ParaPointer32,
    pub vibrato_speed  : u8,
    pub vibrato_depth  : u8,
    pub vibrato_rate   : u8,
    pub vibrato_type   : u8,
    pub data           : Vec<u8>,
}

impl ItSample {
    /// Reads the header only.
    pub fn from_slice(b: &[u8]) -> Result<Self, Error> {
        let b = b.slice(0, SAMPLE_HEADER_SIZE)?;
        if b.slice(0, 4)? != b"IMPS" {
            return Err(Error::InvalidInstrumentFormat("missing IMPS signature".to_owned()));
        }

        Ok(ItSample {
            filename      : b.read_string(0x04, 12)?,
            global_volume : Volume(b.read8(0x11)?),
            flags         : SampleFlags::from_bits_truncate(b.read8(0x12)?),
            volume        : Volume(b.read8(0x13)?),
            name          : b.read_string(0x14, 26)?,
            convert       : ConvertFlags::from_bits_truncate(b.read8(0x2e)?),
            default_pan   : SamplePanValue(b.read8(0x2f)?),
            length        : b.read32l(0x30)?,
            loop_begin    : b.read32l(0x34)?,
            loop_end      : b.read32l(0x38)?,
            c5_speed      : b.read32l(0x3c)?,
            sustain_begin : b.read32l(0x40)?,
            sustain_end   : b.read32l(0x44)?,
            sample_pointer: ParaPointer32::read(b, 0x48)?,
            vibrato_speed : b.read8(0x4c)?,
            vibrato_depth : b.read8(0x4d)?,
            vibrato_rate  : b.read8(0x4e)?,
            vibrato_type  : b.read8(0x4f)?,
            data          : Vec::new(),
        })
    }

    pub fn exists(&self) -> bool {
        self.flags.contains(SampleFlags::EXISTS)
    }

    pub fn is_16bit(&self) -> bool {
        self.flags.contains(SampleFlags::BIT16)
    }

    pub fn is_stereo(&self) -> bool {
        self.flags.contains(SampleFlags::STEREO)
    }

    pub fn is_compressed(&self) -> bool {
        self.flags.contains(SampleFlags::COMPRESSED)
    }

    pub fn has_loop(&self) -> bool {
        self.flags.contains(SampleFlags::LOOP)
    }

    pub fn channels(&self) -> usize {
        if self.is_stereo() { 2 } else { 1 }
    }

    /// Size in bytes of the decoded sample data.
    pub fn data_size(&self) -> usize {
        if !self.exists() {
            return 0
        }
        let width = if self.is_16bit() { 2 } else { 1 };
        (self.length as usize).saturating_mul(width * self.channels())
    }

    /// Loads the sample data from `b`, decompressing it if needed. Stereo
    /// data is stored as the whole left channel followed by the right one.
    pub fn load_data(&mut self, b: &[u8], watermark: &Watermark) -> Result<(), Error> {
        if !self.exists() || self.length == 0 {
            return Ok(())
        }
        let mut ofs = watermark.check("sample data", &self.sample_pointer)?;

        if !self.is_compressed() {
            self.data = b.slice(ofs, self.data_size())?.to_vec();
            return Ok(())
        }

        let it215 = self.convert.contains(ConvertFlags::DELTA);
        let len = self.length as usize;
        let mut data = Vec::new();
        for _ in 0..self.channels() {
            let (chan, n) = if self.is_16bit() {
                compression::decompress16(b, ofs, len, it215)?
            } else {
                compression::decompress8(b, ofs, len, it215)?
            };
            data.extend(chan);
            ofs += n;
        }
        self.data = data;
        Ok(())
    }
}
