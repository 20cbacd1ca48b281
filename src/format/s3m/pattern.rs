use crate::format::s3m::Note;
use crate::module::event::{self, Event};
use crate::util::BinaryRead;
use crate::Error;

pub const ROWS: usize = 64;

bitflags! {
    /// Presence bits packed into the channel selector byte.
    #[derive(Default)]
    pub struct PatternFlags: u8 {
        const NOTE    = 0x20;
        const VOLUME  = 0x40;
        const COMMAND = 0x80;
    }
}

/// One decoded pattern slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelData {
    pub channel: u8,
    pub what   : PatternFlags,
    pub note   : Note,
    pub ins    : u8,
    pub vol    : u8,
    pub cmd    : u8,
    pub info   : u8,
}

impl ChannelData {
    pub fn to_event(&self) -> Event {
        let mut e = Event::new();
        if self.what.contains(PatternFlags::NOTE) {
            if self.note.is_stop() {
                e.flags |= event::HAS_NOTE;
                e.note = event::NOTE_CUT;
            } else if !self.note.is_invalid() {
                e.flags |= event::HAS_NOTE;
                e.note = self.note.semitone() + 1;
            }
            if self.ins != 0 {
                e.flags |= event::HAS_INS;
                e.ins = self.ins;
            }
        }
        if self.what.contains(PatternFlags::VOLUME) {
            e.flags |= event::HAS_VOL;
            e.vol = self.vol;
        }
        if self.what.contains(PatternFlags::COMMAND) {
            e.flags |= event::HAS_CMD;
            e.fxt = self.cmd;
            e.fxp = self.info;
        }
        e
    }
}


#[derive(Clone, Debug, Default, PartialEq)]
pub struct S3mPattern {
    pub length: u16,  // includes the length field itself
    pub data  : Vec<u8>,
}

impl S3mPattern {
    /// Pattern synthesized for a null parapointer: 64 empty rows.
    pub fn empty() -> Self {
        S3mPattern {
            length: ROWS as u16 + 2,
            data  : vec![0; ROWS],
        }
    }

    /// Decodes the slot starting at `pos`. Every field a slot carries is
    /// stored in the slot itself, so no state is kept between calls.
    ///
    /// Returns the number of bytes consumed and the slot, or `None` when the
    /// byte at `pos` ends the row (or `pos` is at the end of the data).
    pub fn read_channel_data(&self, pos: usize) -> Result<(usize, Option<ChannelData>), Error> {
        let b: &[u8] = &self.data;
        if pos > b.len() {
            return Err(Error::PositionOutOfBounds { pos, len: b.len() });
        }
        if pos == b.len() {
            return Ok((0, None));
        }

        let mut ofs = pos;
        let sel = b.read8(ofs)?; ofs += 1;
        if sel == 0 {
            return Ok((1, None));
        }

        let what = PatternFlags::from_bits_truncate(sel);
        let channel = sel & 0x1f;
        let mut cd = ChannelData { channel, what, ..Default::default() };

        if what.contains(PatternFlags::NOTE) {
            cd.note = Note(b.read8(ofs)?);
            cd.ins = b.read8(ofs + 1)?;
            ofs += 2;
        }
        if what.contains(PatternFlags::VOLUME) {
            cd.vol = b.read8(ofs)?; ofs += 1;
        }
        if what.contains(PatternFlags::COMMAND) {
            cd.cmd = b.read8(ofs)?;
            cd.info = b.read8(ofs + 1)?;
            ofs += 2;
        }

        Ok((ofs - pos, Some(cd)))
    }

    /// Expands the packed data into 64 rows of `channels` slots.
    pub fn unpack(&self, channels: usize) -> Result<Vec<Vec<ChannelData>>, Error> {
        let mut rows = vec![vec![ChannelData::default(); channels]; ROWS];
        let mut pos = 0;
        let mut row = 0;

        while row < ROWS {
            let (n, cd) = self.read_channel_data(pos)?;
            if n == 0 {
                break
            }
            pos += n;
            match cd {
                None     => row += 1,
                Some(cd) => {
                    if let Some(slot) = rows[row].get_mut(cd.channel as usize) {
                        *slot = cd;
                    }
                }
            }
        }

        Ok(rows)
    }
}
