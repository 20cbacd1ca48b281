use byteorder::{ByteOrder, LittleEndian};
use crate::format::xm::budget::Budget;
use crate::util::{self, BinaryRead};
use crate::Error;

pub const SAMPLE_HEADER_SIZE: usize = 40;
pub const MIN_INSTRUMENT_SIZE: u32 = 29;

bitflags! {
    #[derive(Default)]
    pub struct EnvelopeFlags: u8 {
        const ON      = 0x01;
        const SUSTAIN = 0x02;
        const LOOP    = 0x04;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SampleFlags: u8 {
        const LOOP_MASK = 0x03;
        const BIT16     = 0x10;
        const STEREO    = 0x20;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopMode {
    Disabled,
    Forward,
    PingPong,
    Unknown,
}

impl SampleFlags {
    pub fn loop_mode(&self) -> LoopMode {
        match self.bits() & 0x03 {
            0 => LoopMode::Disabled,
            1 => LoopMode::Forward,
            2 => LoopMode::PingPong,
            _ => LoopMode::Unknown,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnvPoint {
    pub x: u16,
    pub y: u16,
}


#[derive(Clone, Debug, PartialEq)]
pub struct InstrumentHeader {
    pub size              : u32,
    pub name              : [u8; 22],
    pub typ               : u8,
    pub num_samples       : u16,
    pub sample_header_size: u32,
    pub sample_number     : [u8; 96],
    pub vol_env           : [EnvPoint; 12],
    pub pan_env           : [EnvPoint; 12],
    pub vol_points        : u8,
    pub pan_points        : u8,
    pub vol_sustain       : u8,
    pub vol_loop_start    : u8,
    pub vol_loop_end      : u8,
    pub pan_sustain       : u8,
    pub pan_loop_start    : u8,
    pub pan_loop_end      : u8,
    pub vol_flags         : EnvelopeFlags,
    pub pan_flags         : EnvelopeFlags,
    pub vibrato_type      : u8,
    pub vibrato_sweep     : u8,
    pub vibrato_depth     : u8,
    pub vibrato_rate      : u8,
    pub fadeout           : u16,
    pub reserved          : [u16; 11],
}

impl Default for InstrumentHeader {
    fn default() -> Self {
        InstrumentHeader {
            size              : 0,
            name              : [0; 22],
            typ               : 0,
            num_samples       : 0,
            sample_header_size: 0,
            sample_number     : [0; 96],
            vol_env           : Default::default(),
            pan_env           : Default::default(),
            vol_points        : 0,
            pan_points        : 0,
            vol_sustain       : 0,
            vol_loop_start    : 0,
            vol_loop_end      : 0,
            pan_sustain       : 0,
            pan_loop_start    : 0,
            pan_loop_end      : 0,
            vol_flags         : Default::default(),
            pan_flags         : Default::default(),
            vibrato_type      : 0,
            vibrato_sweep     : 0,
            vibrato_depth     : 0,
            vibrato_rate      : 0,
            fadeout           : 0,
            reserved          : [0; 11],
        }
    }
}

impl InstrumentHeader {
    /// Reads as many fields as the declared size covers. Fields beyond it
    /// keep their default value.
    pub fn from_slice(b: &[u8], ofs: usize) -> Result<Self, Error> {
        let mut h = InstrumentHeader::default();
        h.size = b.read32l(ofs)?;

        let mut bd = Budget::new(b, ofs + 4, h.size, 4);
        bd.bytes(&mut h.name)?;
        bd.u8(&mut h.typ)?;
        bd.u16(&mut h.num_samples)?;
        bd.u32(&mut h.sample_header_size)?;
        for x in h.sample_number.iter_mut() {
            bd.u8(x)?;
        }
        for p in h.vol_env.iter_mut() {
            bd.u16(&mut p.x)?;
            bd.u16(&mut p.y)?;
        }
        for p in h.pan_env.iter_mut() {
            bd.u16(&mut p.x)?;
            bd.u16(&mut p.y)?;
        }
        bd.u8(&mut h.vol_points)?;
        bd.u8(&mut h.pan_points)?;
        bd.u8(&mut h.vol_sustain)?;
        bd.u8(&mut h.vol_loop_start)?;
        bd.u8(&mut h.vol_loop_end)?;
        bd.u8(&mut h.pan_sustain)?;
        bd.u8(&mut h.pan_loop_start)?;
        bd.u8(&mut h.pan_loop_end)?;
        let mut flags = 0;
        bd.u8(&mut flags)?;
        h.vol_flags = EnvelopeFlags::from_bits_truncate(flags);
        flags = 0;
        bd.u8(&mut flags)?;
        h.pan_flags = EnvelopeFlags::from_bits_truncate(flags);
        bd.u8(&mut h.vibrato_type)?;
        bd.u8(&mut h.vibrato_sweep)?;
        bd.u8(&mut h.vibrato_depth)?;
        bd.u8(&mut h.vibrato_rate)?;
        bd.u16(&mut h.fadeout)?;
        for x in h.reserved.iter_mut() {
            bd.u16(x)?;
        }

        Ok(h)
    }

    pub fn name(&self) -> String {
        util::fixed_string(&self.name)
    }
}


#[derive(Clone, Debug, Default, PartialEq)]
pub struct XmSample {
    pub length       : u32,
    pub loop_start   : u32,
    pub loop_length  : u32,
    pub volume       : u8,
    pub finetune     : i8,
    pub flags        : SampleFlags,
    pub panning      : u8,
    pub relative_note: i8,
    pub reserved     : u8,
    pub name         : String,
    pub data         : Vec<u8>,
}

impl XmSample {
    pub fn from_slice(b: &[u8]) -> Result<Self, Error> {
        Ok(XmSample {
            length       : b.read32l(0)?,
            loop_start   : b.read32l(4)?,
            loop_length  : b.read32l(8)?,
            volume       : b.read8(12)?,
            finetune     : b.read8i(13)?,
            flags        : SampleFlags::from_bits_truncate(b.read8(14)?),
            panning      : b.read8(15)?,
            relative_note: b.read8i(16)?,
            reserved     : b.read8(17)?,
            name         : b.read_string(18, 22)?,
            data         : Vec::new(),
        })
    }

    pub fn is_16bit(&self) -> bool {
        self.flags.contains(SampleFlags::BIT16)
    }

    pub fn is_stereo(&self) -> bool {
        self.flags.contains(SampleFlags::STEREO)
    }
}


#[derive(Clone, Debug, PartialEq)]
pub struct XmInstrument {
    pub header : InstrumentHeader,
    pub samples: Vec<XmSample>,
}

impl XmInstrument {
    /// Reads an instrument with its samples. Returns the instrument and the
    /// number of bytes it occupies.
    pub fn from_slice(b: &[u8], ofs: usize) -> Result<(Self, usize), Error> {
        let header = InstrumentHeader::from_slice(b, ofs)?;
        if header.size < MIN_INSTRUMENT_SIZE {
            return Err(Error::OutOfRangeHeader(format!("instrument header size {}", header.size)));
        }

        let mut pos = ofs + header.size as usize;
        let mut samples = Vec::with_capacity(header.num_samples as usize);
        for _ in 0..header.num_samples {
            samples.push(XmSample::from_slice(b.slice(pos, SAMPLE_HEADER_SIZE)?)?);
            pos += SAMPLE_HEADER_SIZE;
        }

        for smp in samples.iter_mut() {
            let len = smp.length as usize;
            let mut data = b.slice(pos, len)?.to_vec();
            if smp.is_16bit() {
                delta_decode16(&mut data);
            } else {
                delta_decode8(&mut data);
            }
            smp.data = data;
            pos += len;
        }

        Ok((XmInstrument { header, samples }, pos - ofs))
    }
}


/// Replaces 8-bit deltas with the running sum.
pub fn delta_decode8(data: &mut [u8]) {
    let mut old = 0u8;
    for x in data.iter_mut() {
        old = old.wrapping_add(*x);
        *x = old;
    }
}

/// Replaces 16-bit little-endian deltas with the running sum. An odd
/// trailing byte is left as-is.
pub fn delta_decode16(data: &mut [u8]) {
    let mut old = 0u16;
    for w in data.chunks_exact_mut(2) {
        old = old.wrapping_add(LittleEndian::read_u16(w));
        LittleEndian::write_u16(w, old);
    }
}
