pub mod load;
mod signature;


pub use self::load::*;
pub use self::signature::{lookup, Signature};

use std::cmp;
use crate::module::event::{self, Event};
use crate::util::{self, BinaryRead};
use crate::Error;

pub const HEADER_SIZE    : usize = 1084;
pub const NUM_INSTRUMENTS: usize = 31;
pub const ROWS           : usize = 64;
pub const ORDERS         : usize = 128;

//  Offset  Size  Description
//  ------  ----  -------------------------------------------------
//       0    20  Song title
//      20   930  31 instruments, 30 bytes each
//     950     1  Song length
//     951     1  Restart position
//     952   128  Order list
//    1080     4  Signature (M.K., FLT8, 6CHN, 16CH ...)
//    1084        Patterns, then sample data in instrument order

pub struct ModData {
    pub song_name  : String,
    pub instruments: Vec<ModInstrument>,
    pub song_length: u8,
    pub restart    : u8,
    pub orders     : [u8; ORDERS],  // rectified
    pub magic      : String,
    pub channels   : usize,
    pub reader     : PatternReader,
    pub patterns   : Vec<ModPattern>,
    pub samples    : Vec<Vec<u8>>,
}

impl ModData {
    /// The song positions in use.
    pub fn orders(&self) -> &[u8] {
        &self.orders[..cmp::min(self.song_length as usize, ORDERS)]
    }

    pub fn event(&self, pat: usize, row: usize, ch: usize) -> Option<Event> {
        self.patterns.get(pat)?.event(row, ch).map(|e| e.to_event())
    }

    pub fn pattern_events(&self, pat: usize) -> Option<Vec<Vec<Event>>> {
        let p = self.patterns.get(pat)?;
        Some(p.rows.iter().map(|r| r.iter().map(|e| e.to_event()).collect()).collect())
    }
}


#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModInstrument {
    pub name       : String,
    pub size       : u16,  // in words
    pub finetune   : u8,
    pub volume     : u8,
    pub loop_start : u16,  // in words
    pub loop_length: u16,  // in words
}

impl ModInstrument {
    pub fn from_slice(b: &[u8]) -> Result<Self, Error> {
        Ok(ModInstrument {
            name       : b.read_string(0, 22)?,
            size       : b.read16b(22)?,
            finetune   : b.read8(24)? & 0x0f,
            volume     : b.read8(25)?,
            loop_start : b.read16b(26)?,
            loop_length: b.read16b(28)?,
        })
    }

    /// Sample length in bytes.
    pub fn length(&self) -> usize {
        self.size as usize * 2
    }

    /// Finetune as a signed value in eighths of a semitone.
    pub fn finetune(&self) -> i8 {
        ((self.finetune << 4) as i8) >> 4
    }

    pub fn has_loop(&self) -> bool {
        self.loop_length > 1
    }
}


/// A four byte pattern cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModEvent(pub [u8; 4]);

impl ModEvent {
    pub fn from_slice(b: &[u8]) -> Result<Self, Error> {
        let mut e = [0; 4];
        e.copy_from_slice(b.slice(0, 4)?);
        Ok(ModEvent(e))
    }

    pub fn instrument(&self) -> u8 {
        (self.0[0] & 0xf0) | (self.0[2] >> 4)
    }

    pub fn period(&self) -> u16 {
        ((self.0[0] as u16 & 0x0f) << 8) | self.0[1] as u16
    }

    pub fn effect(&self) -> u8 {
        self.0[2] & 0x0f
    }

    pub fn effect_parameter(&self) -> u8 {
        self.0[3]
    }

    pub fn note(&self) -> u8 {
        util::period_to_note(self.period())
    }

    pub fn to_event(&self) -> Event {
        let mut e = Event::new();
        if self.period() != 0 {
            e.flags |= event::HAS_NOTE;
            e.note = self.note();
        }
        if self.instrument() != 0 {
            e.flags |= event::HAS_INS;
            e.ins = self.instrument();
        }
        if self.effect() != 0 || self.effect_parameter() != 0 {
            e.flags |= event::HAS_CMD;
            e.fxt = self.effect();
            e.fxp = self.effect_parameter();
        }
        e
    }
}


#[derive(Clone, Debug, PartialEq)]
pub struct ModPattern {
    pub rows: Vec<Vec<ModEvent>>,
}

impl ModPattern {
    pub fn new(channels: usize) -> Self {
        ModPattern {
            rows: vec![vec![ModEvent::default(); channels]; ROWS],
        }
    }

    pub fn event(&self, row: usize, ch: usize) -> Option<&ModEvent> {
        self.rows.get(row)?.get(ch)
    }
}


/// Pattern layout variants, chosen by signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternReader {
    Protracker,
    Fasttracker,
    Startrekker,
}

impl PatternReader {
    pub fn pattern_size(channels: usize) -> usize {
        ROWS * channels * 4
    }

    /// Reads one pattern from the start of `b`.
    pub fn read_pattern(&self, b: &[u8], channels: usize) -> Result<ModPattern, Error> {
        let mut pat = ModPattern::new(channels);
        match *self {
            PatternReader::Protracker | PatternReader::Fasttracker => {
                let mut ofs = 0;
                for row in pat.rows.iter_mut() {
                    for e in row.iter_mut() {
                        *e = ModEvent::from_slice(b.slice(ofs, 4)?)?;
                        ofs += 4;
                    }
                }
            }
            PatternReader::Startrekker => {
                // FLT8 stores two four-channel halves one after the other
                let mut ofs = 0;
                let mut first = 0;
                while first < channels {
                    let last = cmp::min(first + 4, channels);
                    for row in pat.rows.iter_mut() {
                        for e in row[first..last].iter_mut() {
                            *e = ModEvent::from_slice(b.slice(ofs, 4)?)?;
                            ofs += 4;
                        }
                    }
                    first = last;
                }
            }
        }
        Ok(pat)
    }

    pub fn rectify_orders(&self, channels: usize, orders: &[u8; ORDERS]) -> [u8; ORDERS] {
        let mut out = *orders;
        if *self == PatternReader::Startrekker && channels == 8 {
            out.iter_mut().for_each(|x| *x /= 2);
        }
        out
    }
}
