pub mod load;
pub mod budget;
pub mod instrument;
pub mod pattern;

#[cfg(test)]
mod tests;

pub use self::load::*;
pub use self::budget::Budget;
pub use self::instrument::*;
pub use self::pattern::{ChannelData, ChannelFlags, PatternHeader, XmPattern};

use std::cmp;
use crate::module::Event;
use crate::util::BinaryRead;
use crate::Error;

pub const ID_TEXT: &str = "Extended Module: ";
pub const HEADER_OFFSET: usize = 60;

bitflags! {
    #[derive(Default)]
    pub struct HeaderFlags: u16 {
        const LINEAR_SLIDES         = 0x0001;
        const EXTENDED_FILTER_RANGE = 0x1000;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct XmHeader {
    pub id_text     : String,
    pub name        : String,
    pub reserved    : u8,
    pub tracker_name: String,
    pub version     : u16,
    pub header_size : u32,
    pub song_length : u16,
    pub restart     : u16,
    pub channels    : u16,
    pub patterns    : u16,
    pub instruments : u16,
    pub flags       : HeaderFlags,
    pub speed       : u16,
    pub tempo       : u16,
    pub orders      : [u8; 256],
}

impl XmHeader {
    /// Reads the fixed prefix and the size-guarded remainder, without
    /// validating counts.
    pub fn from_slice_partial(b: &[u8]) -> Result<Self, Error> {
        let mut h = XmHeader {
            id_text     : b.read_string(0, 17)?,
            name        : b.read_string(17, 20)?,
            reserved    : b.read8(37)?,
            tracker_name: b.read_string(38, 20)?,
            version     : b.read16l(58)?,
            header_size : b.read32l(HEADER_OFFSET)?,
            song_length : 0,
            restart     : 0,
            channels    : 0,
            patterns    : 0,
            instruments : 0,
            flags       : HeaderFlags::empty(),
            speed       : 0,
            tempo       : 0,
            orders      : [0; 256],
        };

        let mut bd = Budget::new(b, HEADER_OFFSET + 4, h.header_size, 4);
        bd.u16(&mut h.song_length)?;
        bd.u16(&mut h.restart)?;
        bd.u16(&mut h.channels)?;
        bd.u16(&mut h.patterns)?;
        bd.u16(&mut h.instruments)?;
        let mut flags = 0;
        bd.u16(&mut flags)?;
        h.flags = HeaderFlags::from_bits_truncate(flags);
        bd.u16(&mut h.speed)?;
        bd.u16(&mut h.tempo)?;
        for x in h.orders.iter_mut() {
            bd.u8(x)?;
        }

        Ok(h)
    }

    pub fn from_slice(b: &[u8]) -> Result<Self, Error> {
        if b.slice(0, 17)? != ID_TEXT.as_bytes() {
            return Err(Error::InvalidFormat("bad magic".to_owned()));
        }

        let h = Self::from_slice_partial(b)?;
        if h.channels < 1 || h.channels > 32 {
            return Err(Error::OutOfRangeHeader(format!("{} channels", h.channels)));
        }
        if h.patterns > 256 {
            return Err(Error::OutOfRangeHeader(format!("{} patterns", h.patterns)));
        }
        if h.instruments > 128 {
            return Err(Error::OutOfRangeHeader(format!("{} instruments", h.instruments)));
        }
        Ok(h)
    }

    /// File offset of the first pattern.
    pub fn data_offset(&self) -> usize {
        HEADER_OFFSET + self.header_size as usize
    }
}

pub struct XmData {
    pub header     : XmHeader,
    pub patterns   : Vec<XmPattern>,
    pub instruments: Vec<XmInstrument>,
}

impl XmData {
    pub fn orders(&self) -> &[u8] {
        &self.header.orders[..cmp::min(self.header.song_length as usize, 256)]
    }

    pub fn event(&self, pat: usize, row: usize, ch: usize) -> Option<Event> {
        self.patterns.get(pat)?.event(row, ch).map(|cd| cd.to_event())
    }

    pub fn pattern_events(&self, pat: usize) -> Option<Vec<Vec<Event>>> {
        let p = self.patterns.get(pat)?;
        Some(p.rows.iter().map(|r| r.iter().map(|cd| cd.to_event()).collect()).collect())
    }
}
