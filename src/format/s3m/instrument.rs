use std::f64::consts::PI;
use crate::format::pointer::ParaPointer24;
use crate::util::BinaryRead;
use crate::Error;

pub const SCRS_SIZE: usize = 0x50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrsType {
    None,
    Digiplayer,
    Opl2Melody,
    Opl2BassDrum,
    Opl2Snare,
    Opl2Tom,
    Opl2Cymbal,
    Opl2HiHat,
}

impl ScrsType {
    pub fn from_u8(typ: u8) -> Option<Self> {
        Some(match typ {
            0 => ScrsType::None,
            1 => ScrsType::Digiplayer,
            2 => ScrsType::Opl2Melody,
            3 => ScrsType::Opl2BassDrum,
            4 => ScrsType::Opl2Snare,
            5 => ScrsType::Opl2Tom,
            6 => ScrsType::Opl2Cymbal,
            7 => ScrsType::Opl2HiHat,
            _ => return None,
        })
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SampleFlags: u8 {
        const LOOP   = 0x01;
        const STEREO = 0x02;
        const BIT16  = 0x04;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Packing {
    Unpacked,
    Dp30Adpcm,
}

// Reads the two-word value stored low word first.
fn read_hilo32(b: &[u8], ofs: usize) -> Result<u32, Error> {
    let lo = b.read16l(ofs)? as u32;
    let hi = b.read16l(ofs + 2)? as u32;
    Ok((hi << 16) | lo)
}


//  Digiplayer sample
//
//  0x00  type        0x01  filename[12]   0x0d  memseg (hi byte, lo word)
//  0x10  length      0x14  loop begin     0x18  loop end
//  0x1c  volume      0x1e  packing        0x1f  flags
//  0x20  c2spd       0x30  name[28]       0x4c  'SCRS'

#[derive(Clone, Debug, PartialEq)]
pub struct DigiSample {
    pub memseg    : ParaPointer24,
    pub length    : u32,
    pub loop_begin: u32,
    pub loop_end  : u32,
    pub packing   : Packing,
    pub flags     : SampleFlags,
    pub data      : Vec<u8>,
}

impl DigiSample {
    /// Size of the sample data in bytes.
    pub fn data_size(&self) -> usize {
        let mut size = self.length as usize;
        if self.flags.contains(SampleFlags::BIT16) {
            size = size.saturating_mul(2);
        }
        if self.flags.contains(SampleFlags::STEREO) {
            size = size.saturating_mul(2);
        }
        size
    }

    pub fn has_loop(&self) -> bool {
        self.flags.contains(SampleFlags::LOOP)
    }
}


/// The 12 OPL2 register bytes of an Adlib instrument (D00..D0B).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Opl2Specs(pub [u8; 12]);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Modulator = 0,
    Carrier   = 1,
}

impl Opl2Specs {
    fn reg(&self, op: Operator, n: usize) -> u8 {
        self.0[n * 2 + op as usize]
    }

    pub fn key_scale_rate(&self, op: Operator) -> bool {
        self.reg(op, 0) & 0x10 != 0
    }

    pub fn sustain(&self, op: Operator) -> bool {
        self.reg(op, 0) & 0x20 != 0
    }

    pub fn vibrato(&self, op: Operator) -> bool {
        self.reg(op, 0) & 0x40 != 0
    }

    pub fn tremolo(&self, op: Operator) -> bool {
        self.reg(op, 0) & 0x80 != 0
    }

    pub fn frequency_multiplier(&self, op: Operator) -> u8 {
        self.reg(op, 0) & 0x0f
    }

    // KSL bits are stored swapped
    pub fn key_scale_level(&self, op: Operator) -> u8 {
        let v = self.reg(op, 1);
        ((v & 0x40) >> 5) | ((v & 0x80) >> 7)
    }

    pub fn volume(&self, op: Operator) -> u8 {
        63 - (self.reg(op, 1) & 0x3f)
    }

    pub fn attack_rate(&self, op: Operator) -> u8 {
        self.reg(op, 2) >> 4
    }

    pub fn decay_rate(&self, op: Operator) -> u8 {
        self.reg(op, 2) & 0x0f
    }

    pub fn sustain_level(&self, op: Operator) -> u8 {
        15 - (self.reg(op, 3) >> 4)
    }

    pub fn release_rate(&self, op: Operator) -> u8 {
        self.reg(op, 3) & 0x0f
    }

    pub fn waveform(&self, op: Operator) -> u8 {
        self.reg(op, 4) & 0x07
    }

    pub fn feedback(&self) -> u8 {
        (self.0[10] >> 1) & 0x07
    }

    pub fn additive_synthesis(&self) -> bool {
        self.0[10] & 0x01 != 0
    }
}

/// Frequency multiplier for a MULT register value.
pub fn opl2_multiplier(m: u8) -> Option<f64> {
    match m {
        0x00        => Some(0.5),
        0x01..=0x09 => Some(m as f64),
        0x0a..=0x0b => Some(10.0),
        0x0c..=0x0d => Some(12.0),
        0x0e..=0x0f => Some(15.0),
        _           => None,
    }
}

/// Attenuation per octave in dB for a key scale level.
pub fn opl2_attenuation(ksl: u8) -> Option<f64> {
    match ksl {
        0 => Some(0.0),
        1 => Some(1.5),
        2 => Some(3.0),
        3 => Some(6.0),
        _ => None,
    }
}

/// Modulation depth for a feedback value.
pub fn opl2_feedback(fb: u8) -> Option<f64> {
    match fb {
        0     => Some(0.0),
        1..=7 => Some(4.0 * PI / (1 << (7 - fb)) as f64),
        _     => None,
    }
}


#[derive(Clone, Debug, PartialEq)]
pub enum InstrumentKind {
    None,
    Digiplayer(DigiSample),
    Opl2 { specs: Opl2Specs, dsk: u8 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct S3mInstrument {
    pub typ     : ScrsType,
    pub filename: String,
    pub name    : String,
    pub volume  : u8,
    pub c2spd   : u32,
    pub kind    : InstrumentKind,
}

impl S3mInstrument {
    /// Decodes an SCRS record. Sample data is not attached here.
    pub fn from_slice(b: &[u8]) -> Result<Self, Error> {
        let t = b.read8(0)?;
        let typ = match ScrsType::from_u8(t) {
            Some(typ) => typ,
            None      => return Err(Error::UnsupportedVariant(format!("unknown SCRS instrument type {:#04x}", t))),
        };

        let filename = b.read_string(0x01, 12)?;
        let volume   = b.read8(0x1c)?;
        let c2spd    = read_hilo32(b, 0x20)?;
        let name     = b.read_string(0x30, 28)?;

        let kind = match typ {
            ScrsType::None => InstrumentKind::None,
            ScrsType::Digiplayer => {
                check_tag(b, b"SCRS")?;
                let packing = match b.read8(0x1e)? {
                    0 => Packing::Unpacked,
                    1 => Packing::Dp30Adpcm,
                    p => return Err(Error::UnsupportedVariant(format!("unknown sample packing {}", p))),
                };
                InstrumentKind::Digiplayer(DigiSample {
                    memseg    : ParaPointer24::read(b, 0x0d)?,
                    length    : read_hilo32(b, 0x10)?,
                    loop_begin: read_hilo32(b, 0x14)?,
                    loop_end  : read_hilo32(b, 0x18)?,
                    packing,
                    flags     : SampleFlags::from_bits_truncate(b.read8(0x1f)?),
                    data      : Vec::new(),
                })
            }
            _ => {
                check_tag(b, b"SCRI")?;
                let mut regs = [0; 12];
                regs.copy_from_slice(b.slice(0x10, 12)?);
                InstrumentKind::Opl2 { specs: Opl2Specs(regs), dsk: b.read8(0x1d)? }
            }
        };

        Ok(S3mInstrument { typ, filename, name, volume, c2spd, kind })
    }

    pub fn sample(&self) -> Option<&DigiSample> {
        match self.kind {
            InstrumentKind::Digiplayer(ref smp) => Some(smp),
            _                                   => None,
        }
    }
}

fn check_tag(b: &[u8], tag: &[u8]) -> Result<(), Error> {
    let t = b.slice(0x4c, 4)?;
    if t != tag {
        return Err(Error::InvalidInstrumentFormat(format!("expected {:?}, found {:?}",
            String::from_utf8_lossy(tag), String::from_utf8_lossy(t))));
    }
    Ok(())
}
