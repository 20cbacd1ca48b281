use crate::format::xm::budget::Budget;
use crate::module::event::{self, Event};
use crate::util::BinaryRead;
use crate::Error;

pub const NOTE_KEY_OFF: u8 = 97;

bitflags! {
    #[derive(Default)]
    pub struct ChannelFlags: u8 {
        const NOTE             = 0x01;
        const INSTRUMENT       = 0x02;
        const VOLUME           = 0x04;
        const EFFECT           = 0x08;
        const EFFECT_PARAMETER = 0x10;
        const PACKED           = 0x80;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelData {
    pub flags           : ChannelFlags,
    pub note            : u8,
    pub instrument      : u8,
    pub volume          : u8,
    pub effect          : u8,
    pub effect_parameter: u8,
}

impl ChannelData {
    pub fn to_event(&self) -> Event {
        let mut e = Event::new();
        if self.flags.contains(ChannelFlags::NOTE) {
            match self.note {
                0            => (),
                NOTE_KEY_OFF => { e.flags |= event::HAS_NOTE; e.note = event::NOTE_OFF }
                n if n < NOTE_KEY_OFF => { e.flags |= event::HAS_NOTE; e.note = n }
                _            => (),
            }
        }
        if self.flags.contains(ChannelFlags::INSTRUMENT) && self.instrument != 0 {
            e.flags |= event::HAS_INS;
            e.ins = self.instrument;
        }
        if self.flags.contains(ChannelFlags::VOLUME) && self.volume != 0 {
            e.flags |= event::HAS_VOL;
            e.vol = self.volume;
        }
        if self.effect != 0 || self.effect_parameter != 0 {
            e.flags |= event::HAS_CMD;
            e.fxt = self.effect;
            e.fxp = self.effect_parameter;
        }
        e
    }
}


#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatternHeader {
    pub length     : u32,
    pub packing    : u8,
    pub rows       : u16,
    pub packed_size: u16,
}

impl PatternHeader {
    /// Reads the size-guarded part only; no validation.
    pub fn from_slice_partial(b: &[u8], ofs: usize, version: u16) -> Result<Self, Error> {
        let mut h = PatternHeader::default();
        h.length = b.read32l(ofs)?;

        let mut bd = Budget::new(b, ofs + 4, h.length, 4);
        bd.u8(&mut h.packing)?;
        if version == 0x0102 {
            if !bd.exhausted() {
                let mut rows = 0;
                bd.u8(&mut rows)?;
                h.rows = rows as u16 + 1;
            }
        } else {
            bd.u16(&mut h.rows)?;
        }
        bd.u16(&mut h.packed_size)?;

        Ok(h)
    }

    pub fn from_slice(b: &[u8], ofs: usize, version: u16) -> Result<Self, Error> {
        let h = Self::from_slice_partial(b, ofs, version)?;
        if h.packing != 0 {
            return Err(Error::UnsupportedVariant(format!("pattern packing type {}", h.packing)));
        }
        if h.rows < 1 || h.rows > 256 {
            return Err(Error::OutOfRangeHeader(format!("pattern row count {}", h.rows)));
        }
        Ok(h)
    }
}


#[derive(Clone, Debug, PartialEq)]
pub struct XmPattern {
    pub header: PatternHeader,
    pub packed: Vec<u8>,
    pub rows  : Vec<Vec<ChannelData>>,
}

impl XmPattern {
    pub fn new(header: PatternHeader, packed: Vec<u8>, channels: usize) -> Result<Self, Error> {
        let rows = unpack(&packed, header.rows as usize, channels)?;
        Ok(XmPattern { header, packed, rows })
    }

    pub fn event(&self, row: usize, ch: usize) -> Option<&ChannelData> {
        self.rows.get(row)?.get(ch)
    }
}

/// Expands packed pattern data into `rows` rows of `channels` slots.
pub fn unpack(b: &[u8], rows: usize, channels: usize) -> Result<Vec<Vec<ChannelData>>, Error> {
    let mut data = vec![vec![ChannelData::default(); channels]; rows];
    if b.is_empty() {
        return Ok(data)
    }

    let mut ofs = 0;
    for row in data.iter_mut() {
        for cd in row.iter_mut() {
            let x = b.read8(ofs)?; ofs += 1;
            if x & ChannelFlags::PACKED.bits() != 0 {
                cd.flags = ChannelFlags::from_bits_truncate(x);
                if cd.flags.contains(ChannelFlags::NOTE) {
                    cd.note = b.read8(ofs)?; ofs += 1;
                }
            } else {
                // plain note followed by all the other fields
                cd.note = x;
                cd.flags = ChannelFlags::all();
            }
            if cd.flags.contains(ChannelFlags::INSTRUMENT) {
                cd.instrument = b.read8(ofs)?; ofs += 1;
            }
            if cd.flags.contains(ChannelFlags::VOLUME) {
                cd.volume = b.read8(ofs)?; ofs += 1;
            }
            if cd.flags.contains(ChannelFlags::EFFECT) {
                cd.effect = b.read8(ofs)?; ofs += 1;
            }
            if cd.flags.contains(ChannelFlags::EFFECT_PARAMETER) {
                cd.effect_parameter = b.read8(ofs)?; ofs += 1;
            }
        }
    }

    Ok(data)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack() {
        let b = [
            0x31, 0x02, 0x40, 0x0c, 0x20,   // row 0 ch 0: unpacked C-4
            0x80,                           // row 0 ch 1: empty
            0x83, 0x61, 0x03,               // row 1 ch 0: key off, ins 3
            0x98, 0x0f, 0x06,               // row 1 ch 1: F06
        ];
        let rows = unpack(&b, 2, 2).unwrap();
        assert_eq!(rows[0][0].note, 0x31);
        assert_eq!(rows[0][0].instrument, 2);
        assert_eq!(rows[0][0].volume, 0x40);
        assert_eq!((rows[0][0].effect, rows[0][0].effect_parameter), (0x0c, 0x20));
        assert_eq!(rows[0][1].flags, ChannelFlags::PACKED);
        assert_eq!(rows[1][0].note, NOTE_KEY_OFF);
        assert_eq!(rows[1][0].instrument, 3);
        assert_eq!(rows[1][1].effect, 0x0f);
        assert_eq!(rows[1][1].effect_parameter, 0x06);

        assert_eq!(rows[0][0].to_event().to_string(), "C-4 02 40 0C20");
        assert!(rows[0][1].to_event().is_empty());
        assert_eq!(rows[1][0].to_event().note, event::NOTE_OFF);
    }

    #[test]
    fn test_unpack_empty() {
        let rows = unpack(&[], 64, 4).unwrap();
        assert_eq!(rows.len(), 64);
        assert!(rows.iter().all(|r| r.len() == 4 && r.iter().all(|cd| cd.flags.is_empty())));
    }

    #[test]
    fn test_unpack_truncated() {
        assert!(matches!(unpack(&[0x83, 0x30], 1, 1), Err(Error::TruncatedInput { .. })));
        assert!(matches!(unpack(&[0x80], 2, 1), Err(Error::TruncatedInput { .. })));
    }

    #[test]
    fn test_pattern_header() {
        let b = [9, 0, 0, 0, 0, 64, 0, 5, 0];
        let h = PatternHeader::from_slice(&b, 0, 0x0104).unwrap();
        assert_eq!(h, PatternHeader{ length: 9, packing: 0, rows: 64, packed_size: 5 });

        let b = [8, 0, 0, 0, 0, 63, 5, 0];
        let h = PatternHeader::from_slice(&b, 0, 0x0102).unwrap();
        assert_eq!(h.rows, 64);
        assert_eq!(h.packed_size, 5);
    }

    #[test]
    fn test_pattern_header_errors() {
        let b = [9, 0, 0, 0, 1, 64, 0, 0, 0];
        assert!(matches!(PatternHeader::from_slice(&b, 0, 0x0104), Err(Error::UnsupportedVariant(_))));
        let b = [9, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(PatternHeader::from_slice(&b, 0, 0x0104), Err(Error::OutOfRangeHeader(_))));
        let b = [9, 0, 0, 0, 0, 1, 1, 0, 0];
        assert!(matches!(PatternHeader::from_slice(&b, 0, 0x0104), Err(Error::OutOfRangeHeader(_))));
    }
}
