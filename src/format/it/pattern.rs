use crate::format::it::flags::ChannelDataFlags;
use crate::format::it::value::Note;
use crate::module::event::{self, Event};
use crate::util::BinaryRead;
use crate::Error;

pub const ROWS        : usize = 64;
pub const MAX_CHANNELS: usize = 64;

/// One decoded pattern slot. `what` lists the fields present after the
/// use-last bits are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelData {
    pub channel : u8,
    pub what    : ChannelDataFlags,
    pub note    : Note,
    pub ins     : u8,
    pub volpan  : u8,
    pub cmd     : u8,
    pub cmd_data: u8,
}

impl ChannelData {
    pub fn to_event(&self) -> Event {
        let mut e = Event::new();
        if self.what.contains(ChannelDataFlags::NOTE) {
            e.flags |= event::HAS_NOTE;
            e.note = match self.note {
                n if !n.is_special() => n.0 + 1,
                n if n.is_note_off() => event::NOTE_OFF,
                n if n.is_note_cut() => event::NOTE_CUT,
                _                    => event::NOTE_FADE,
            };
        }
        if self.what.contains(ChannelDataFlags::INSTRUMENT) {
            e.flags |= event::HAS_INS;
            e.ins = self.ins;
        }
        if self.what.contains(ChannelDataFlags::VOLPAN) {
            e.flags |= event::HAS_VOL;
            e.vol = self.volpan;
        }
        if self.what.contains(ChannelDataFlags::COMMAND) {
            e.flags |= event::HAS_CMD;
            e.fxt = self.cmd;
            e.fxp = self.cmd_data;
        }
        e
    }
}

/// Mask and values remembered per channel across the rows of one pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelMemory {
    pub mask    : ChannelDataFlags,
    pub note    : Note,
    pub ins     : u8,
    pub volpan  : u8,
    pub cmd     : u8,
    pub cmd_data: u8,
}

pub type PatternMemory = [ChannelMemory; MAX_CHANNELS];

pub fn new_memory() -> PatternMemory {
    [ChannelMemory::default(); MAX_CHANNELS]
}


#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItPattern {
    pub length: u16,
    pub rows  : u16,
    pub data  : Vec<u8>,
}

impl ItPattern {
    /// Pattern synthesized for a null pointer: 64 empty rows.
    pub fn empty() -> Self {
        ItPattern {
            length: ROWS as u16,
            rows  : ROWS as u16,
            data  : vec![0; ROWS],
        }
    }

    /// Reads the 8-byte pattern header and its packed data.
    pub fn from_slice(b: &[u8], ofs: usize) -> Result<Self, Error> {
        let length = b.read16l(ofs)?;
        let rows = b.read16l(ofs + 2)?;
        let data = b.slice(ofs + 8, length as usize)?.to_vec();
        Ok(ItPattern { length, rows, data })
    }

    /// Decodes the slot starting at `pos`.
    ///
    /// Returns the number of bytes consumed and the slot, or `None` at an
    /// end of row marker (one byte) or at the end of the data (zero bytes).
    pub fn read_channel_data(&self, pos: usize, mem: &mut PatternMemory) -> Result<(usize, Option<ChannelData>), Error> {
        let b: &[u8] = &self.data;
        if pos > b.len() {
            return Err(Error::PositionOutOfBounds { pos, len: b.len() });
        }
        if pos == b.len() {
            return Ok((0, None));
        }

        let mut ofs = pos;
        let c = b.read8(ofs)?; ofs += 1;
        if c == 0 {
            return Ok((1, None));
        }

        let channel = ((c & 0x7f).wrapping_sub(1)) & 0x3f;
        let m = &mut mem[channel as usize];
        if c & 0x80 != 0 {
            m.mask = ChannelDataFlags::from_bits_truncate(b.read8(ofs)?);
            ofs += 1;
        }
        let mask = m.mask;
        let mut cd = ChannelData { channel, ..Default::default() };

        if mask.contains(ChannelDataFlags::NOTE) {
            m.note = Note(b.read8(ofs)?); ofs += 1;
            cd.what |= ChannelDataFlags::NOTE;
            cd.note = m.note;
        } else if mask.contains(ChannelDataFlags::LAST_NOTE) {
            cd.what |= ChannelDataFlags::NOTE;
            cd.note = m.note;
        }

        if mask.contains(ChannelDataFlags::INSTRUMENT) {
            m.ins = b.read8(ofs)?; ofs += 1;
            cd.what |= ChannelDataFlags::INSTRUMENT;
            cd.ins = m.ins;
        } else if mask.contains(ChannelDataFlags::LAST_INSTRUMENT) {
            cd.what |= ChannelDataFlags::INSTRUMENT;
            cd.ins = m.ins;
        }

        if mask.contains(ChannelDataFlags::VOLPAN) {
            m.volpan = b.read8(ofs)?; ofs += 1;
            cd.what |= ChannelDataFlags::VOLPAN;
            cd.volpan = m.volpan;
        } else if mask.contains(ChannelDataFlags::LAST_VOLPAN) {
            cd.what |= ChannelDataFlags::VOLPAN;
            cd.volpan = m.volpan;
        }

        if mask.contains(ChannelDataFlags::COMMAND) {
            m.cmd = b.read8(ofs)?;
            m.cmd_data = b.read8(ofs + 1)?;
            ofs += 2;
            cd.what |= ChannelDataFlags::COMMAND;
            cd.cmd = m.cmd;
            cd.cmd_data = m.cmd_data;
        } else if mask.contains(ChannelDataFlags::LAST_COMMAND) {
            cd.what |= ChannelDataFlags::COMMAND;
            cd.cmd = m.cmd;
            cd.cmd_data = m.cmd_data;
        }

        Ok((ofs - pos, Some(cd)))
    }

    /// Expands the packed data into `rows` rows of 64 channels.
    pub fn unpack(&self) -> Result<Vec<Vec<ChannelData>>, Error> {
        let num_rows = self.rows as usize;
        let mut rows = vec![vec![ChannelData::default(); MAX_CHANNELS]; num_rows];
        let mut mem = new_memory();
        let mut pos = 0;
        let mut row = 0;

        while row < num_rows {
            let (n, cd) = self.read_channel_data(pos, &mut mem)?;
            if n == 0 {
                break
            }
            pos += n;
            match cd {
                None     => row += 1,
                Some(cd) => rows[row][cd.channel as usize] = cd,
            }
        }

        Ok(rows)
    }

    /// Highest channel with data plus one, or zero for an empty pattern.
    pub fn channels_used(&self) -> Result<usize, Error> {
        Ok(channels_in(&self.unpack()?))
    }
}

/// Highest channel with data in an unpacked grid plus one.
pub fn channels_in(rows: &[Vec<ChannelData>]) -> usize {
    rows.iter()
        .flat_map(|r| r.iter())
        .filter(|cd| !cd.what.is_empty())
        .map(|cd| cd.channel as usize + 1)
        .max()
        .unwrap_or(0)
}
