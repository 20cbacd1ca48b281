pub mod load;
pub mod block;
pub mod compression;
pub mod flags;
pub mod instrument;
pub mod pattern;
pub mod sample;
pub mod value;

#[cfg(test)]
mod tests;

pub use self::load::*;
pub use self::block::{Block, BlockData, FxPlugin};
pub use self::flags::*;
pub use self::instrument::{Envelope, Instrument, InstrumentNew, InstrumentOld, NodePoint};
pub use self::pattern::{ChannelData, ChannelMemory, ItPattern, PatternMemory};
pub use self::sample::ItSample;
pub use self::value::*;

use crate::format::pointer::ParaPointer32;
use crate::module::Event;

pub const HEADER_SIZE     : usize = 0xc0;
pub const MIDI_CONFIG_SIZE: usize = 4896;
pub const MAX_CHANNELS    : usize = 64;

//                                IT Module header
//          0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
//        ,---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---.
//  0000: |'I'|'M'|'P'|'M'| Song Name, max 26 characters, includes NULL   |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0010: |.......................................................|PHiligt|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0020: |OrdNum |InsNum |SmpNum |PatNum | Cwt/v | Cmwt  | Flags |Special|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0030: |GV |MV |IS |IT |Sep|PWD|MsgLgth|Message Offset |   Reserved    |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0040: | Chnl Pan (64 bytes)...........................................|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0080: | Chnl Vol (64 bytes)...........................................|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  00C0: | Orders, Length = OrdNum                                       |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  xxxx: | 'Long' Offset of instruments, Length = InsNum*4               |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  xxxx: | 'Long' Offset of samples headers, Length = SmpNum*4           |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  xxxx: | 'Long' Offset of patterns, Length = PatNum*4                  |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+

#[derive(Clone, Debug, PartialEq)]
pub struct ItHeader {
    pub song_name        : String,
    pub highlight_minor  : u8,
    pub highlight_major  : u8,
    pub ord_num          : u16,
    pub ins_num          : u16,
    pub smp_num          : u16,
    pub pat_num          : u16,
    pub cwt_v            : u16,
    pub cmwt             : u16,
    pub flags            : HeaderFlags,
    pub special          : SpecialFlags,
    pub global_volume    : FineVolume,
    pub mix_volume       : FineVolume,
    pub initial_speed    : u8,
    pub initial_tempo    : u8,
    pub separation       : PanSeparation,
    pub pitch_wheel_depth: u8,
    pub message_length   : u16,
    pub message_offset   : u32,
    pub channel_pan      : [PanValue; MAX_CHANNELS],
    pub channel_volume   : [Volume; MAX_CHANNELS],
}

impl ItHeader {
    pub fn uses_instruments(&self) -> bool {
        self.flags.contains(HeaderFlags::USE_INSTRUMENTS)
    }

    pub fn stereo(&self) -> bool {
        self.flags.contains(HeaderFlags::STEREO)
    }
}

/// Edit history entry: when the file was opened and for how long.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HistoryEntry {
    pub fat_date: u16,
    pub fat_time: u16,
    pub run_time: u32,  // in DOS timer ticks
}

impl HistoryEntry {
    pub const SIZE: usize = 8;

    /// Year, month, day.
    pub fn date(&self) -> (u16, u8, u8) {
        let d = self.fat_date;
        (1980 + (d >> 9), ((d >> 5) & 0x0f) as u8, (d & 0x1f) as u8)
    }

    /// Hours, minutes, seconds.
    pub fn time(&self) -> (u8, u8, u8) {
        let t = self.fat_time;
        ((t >> 11) as u8, ((t >> 5) & 0x3f) as u8, ((t & 0x1f) * 2) as u8)
    }

    pub fn run_seconds(&self) -> f64 {
        self.run_time as f64 / 18.2
    }
}

pub struct ItData {
    pub header       : ItHeader,
    pub orders       : Vec<u8>,
    pub instrument_pp: Vec<ParaPointer32>,
    pub sample_pp    : Vec<ParaPointer32>,
    pub pattern_pp   : Vec<ParaPointer32>,
    pub history      : Vec<HistoryEntry>,
    pub midi_config  : Option<Vec<u8>>,
    pub blocks       : Vec<Block>,
    pub message      : Option<String>,
    pub instruments  : Vec<Instrument>,
    pub samples      : Vec<ItSample>,
    pub patterns     : Vec<ItPattern>,
    pub channels     : usize,
}

impl ItData {
    pub fn event(&self, pat: usize, row: usize, ch: usize) -> Option<Event> {
        let rows = self.patterns.get(pat)?.unpack().ok()?;
        rows.get(row)?.get(ch).map(|cd| cd.to_event())
    }

    /// Decodes pattern `pat` once into rows of `channels` events.
    pub fn pattern_events(&self, pat: usize) -> Option<Vec<Vec<Event>>> {
        let rows = self.patterns.get(pat)?.unpack().ok()?;
        Some(rows.iter()
            .map(|r| r.iter().take(self.channels).map(|cd| cd.to_event()).collect())
            .collect())
    }

    /// Pattern names from the first `PNAM` block, if any.
    pub fn pattern_names(&self) -> Option<&[String]> {
        self.blocks.iter().find_map(|blk| match &blk.data {
            BlockData::PatternNames(names) => Some(names.as_slice()),
            _ => None,
        })
    }

    pub fn fx_plugins(&self) -> impl Iterator<Item=&FxPlugin> {
        self.blocks.iter().filter_map(|blk| match &blk.data {
            BlockData::Fx(fx) => Some(fx),
            _ => None,
        })
    }
}
