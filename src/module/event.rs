use std::fmt;
use crate::util::NOTES;

pub const HAS_NOTE: u8 = 1 << 0;
pub const HAS_INS : u8 = 1 << 1;
pub const HAS_VOL : u8 = 1 << 2;
pub const HAS_CMD : u8 = 1 << 3;

pub const NOTE_FADE: u8 = 253;
pub const NOTE_CUT : u8 = 254;
pub const NOTE_OFF : u8 = 255;

/// A format-neutral pattern cell.
///
/// Notes are numbered from 1 (C-0) to 120 (B-9); `NOTE_FADE`, `NOTE_CUT` and
/// `NOTE_OFF` stand for the special note values. Instrument, volume and
/// effect values are the raw numbers stored by the format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Event {
    pub note : u8,
    pub ins  : u8,
    pub vol  : u8,
    pub fxt  : u8,
    pub fxp  : u8,
    pub flags: u8,
}

impl Event {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn is_empty(&self) -> bool {
        self.flags == 0
    }

    pub fn has(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let note = if !self.has(HAS_NOTE) {
            "---".to_owned()
        } else {
            match self.note {
                NOTE_OFF  => "===".to_owned(),
                NOTE_CUT  => "^^^".to_owned(),
                NOTE_FADE => "~~~".to_owned(),
                1..=120   => {
                    let n = self.note - 1;
                    format!("{}{}", NOTES[n as usize % 12], n / 12)
                }
                _         => "???".to_owned(),
            }
        };

        let ins = if self.has(HAS_INS) && self.ins != 0 {
            format!("{:02X}", self.ins)
        } else {
            "--".to_owned()
        };

        let vol = if self.has(HAS_VOL) {
            format!("{:02X}", self.vol)
        } else {
            "--".to_owned()
        };

        let fx = if self.has(HAS_CMD) {
            format!("{:02X}{:02X}", self.fxt, self.fxp)
        } else {
            "----".to_owned()
        };

        write!(f, "{} {} {} {}", note, ins, vol, fx)
    }
}
