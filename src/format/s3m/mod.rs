pub mod load;
pub mod instrument;
pub mod pattern;


pub use self::load::*;
pub use self::instrument::*;
pub use self::pattern::{ChannelData, PatternFlags, S3mPattern};

use crate::format::pointer::ParaPointer16;
use crate::module::Event;

pub const DEFAULT_C2SPD : u32 = 8363;
pub const DEFAULT_VOLUME: u8 = 64;
pub const EMPTY_VOLUME  : u8 = 255;
pub const DEFAULT_PAN_FLAG: u8 = 252;

//                                S3M Module header
//          0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
//        ,---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---.
//  0000: | Song name, max 28 chars (end with NUL (0))                    |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0010: |                                               |1Ah|Typ| x | x |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0020: |OrdNum |InsNum |PatNum | Flags | Cwt/v | Ffi   |'S'|'C'|'R'|'M'|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0030: |g.v|i.s|i.t|m.v|u.c|d.p| x | x | x | x | x | x | x | x |Special|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0040: |Channel settings for 32 channels, 255=unused,+128=disabled     |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0050: |                                                               |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0060: |Orders; length=OrdNum (should be even)                         |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  xxx1: |Parapointers to instruments; length=InsNum*2                   |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  xxx2: |Parapointers to patterns; length=PatNum*2                      |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  xxx3: |Channel default pan positions                                  |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+

#[derive(Clone, Debug, Default, PartialEq)]
pub struct S3mHeader {
    pub song_name  : String,
    pub typ        : u8,
    pub ord_num    : u16,
    pub ins_num    : u16,
    pub pat_num    : u16,
    pub flags      : u16,
    pub cwt_v      : u16,
    pub ffi        : u16,  // 1 = signed samples, 2 = unsigned samples
    pub g_v        : u8,
    pub i_s        : u8,
    pub i_t        : u8,
    pub m_v        : u8,
    pub u_c        : u8,
    pub d_p        : u8,
    pub special    : ParaPointer16,
    pub ch_settings: [u8; 32],
}

impl S3mHeader {
    pub fn stereo(&self) -> bool {
        self.m_v & 0x80 != 0
    }

    pub fn unsigned_samples(&self) -> bool {
        self.ffi == 2
    }

    /// One more than the highest channel in use.
    pub fn channels(&self) -> usize {
        self.ch_settings.iter().rposition(|&x| x != 255).map(|x| x + 1).unwrap_or(1)
    }
}

pub struct S3mData {
    pub header     : S3mHeader,
    pub orders     : Vec<u8>,
    pub instrum_pp : Vec<ParaPointer16>,
    pub pattern_pp : Vec<ParaPointer16>,
    pub ch_pan     : Option<[u8; 32]>,
    pub instruments: Vec<S3mInstrument>,
    pub patterns   : Vec<S3mPattern>,
    pub channels   : usize,
}

impl S3mData {
    pub fn event(&self, pat: usize, row: usize, ch: usize) -> Option<Event> {
        let rows = self.patterns.get(pat)?.unpack(self.channels).ok()?;
        rows.get(row)?.get(ch).map(|cd| cd.to_event())
    }

    pub fn pattern_events(&self, pat: usize) -> Option<Vec<Vec<Event>>> {
        let rows = self.patterns.get(pat)?.unpack(self.channels).ok()?;
        Some(rows.iter().map(|r| r.iter().map(|cd| cd.to_event()).collect()).collect())
    }
}


/// Packed note: octave in the high nibble, key in the low nibble.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note(pub u8);

impl Default for Note {
    fn default() -> Self {
        Note::EMPTY
    }
}

impl Note {
    pub const EMPTY: Note = Note(255);
    pub const STOP : Note = Note(254);

    pub fn key(&self) -> u8 {
        self.0 & 0x0f
    }

    pub fn octave(&self) -> u8 {
        self.0 >> 4
    }

    pub fn is_stop(&self) -> bool {
        *self == Note::STOP
    }

    pub fn is_invalid(&self) -> bool {
        *self == Note::EMPTY || self.is_stop() || self.key() >= 12
    }

    pub fn semitone(&self) -> u8 {
        self.octave() * 12 + self.key()
    }
}

/// Volume on the 0..=64 scale as a fraction.
pub fn volume_value(v: u8) -> Option<f32> {
    if v > 64 {
        None
    } else {
        Some(v as f32 / 64.0)
    }
}
