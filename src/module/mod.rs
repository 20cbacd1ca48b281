pub mod event;

pub use self::event::Event;

use crate::format::it::ItData;
use crate::format::mk::{self, ModData};
use crate::format::s3m::{self, S3mData};
use crate::format::xm::XmData;
use crate::format::Format;


/// A decoded module of any supported format.
pub enum Module {
    It(ItData),
    Mod(ModData),
    S3m(S3mData),
    Xm(XmData),
}

impl Module {
    pub fn format(&self) -> Format {
        match self {
            Module::It(_)  => Format::It,
            Module::Mod(_) => Format::Mod,
            Module::S3m(_) => Format::S3m,
            Module::Xm(_)  => Format::Xm,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Module::It(m)  => &m.header.song_name,
            Module::Mod(m) => &m.song_name,
            Module::S3m(m) => &m.header.song_name,
            Module::Xm(m)  => &m.header.name,
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            Module::It(m)  => m.channels,
            Module::Mod(m) => m.channels,
            Module::S3m(m) => m.channels,
            Module::Xm(m)  => m.header.channels as usize,
        }
    }

    /// Pattern numbers in song order.
    pub fn orders(&self) -> &[u8] {
        match self {
            Module::It(m)  => &m.orders,
            Module::Mod(m) => m.orders(),
            Module::S3m(m) => &m.orders,
            Module::Xm(m)  => m.orders(),
        }
    }

    pub fn num_patterns(&self) -> usize {
        match self {
            Module::It(m)  => m.patterns.len(),
            Module::Mod(m) => m.patterns.len(),
            Module::S3m(m) => m.patterns.len(),
            Module::Xm(m)  => m.patterns.len(),
        }
    }

    /// Number of rows in pattern `pat`, or zero if it doesn't exist.
    pub fn rows(&self, pat: usize) -> usize {
        if pat >= self.num_patterns() {
            return 0
        }
        match self {
            Module::It(m)  => m.patterns[pat].rows as usize,
            Module::Mod(_) => mk::ROWS,
            Module::S3m(_) => s3m::pattern::ROWS,
            Module::Xm(m)  => m.patterns[pat].rows.len(),
        }
    }

    pub fn event(&self, pat: usize, row: usize, ch: usize) -> Option<Event> {
        match self {
            Module::It(m)  => m.event(pat, row, ch),
            Module::Mod(m) => m.event(pat, row, ch),
            Module::S3m(m) => m.event(pat, row, ch),
            Module::Xm(m)  => m.event(pat, row, ch),
        }
    }

    /// All events of pattern `pat`, indexed by row then channel. Cheaper
    /// than calling `event` for every cell of a packed pattern.
    pub fn pattern_events(&self, pat: usize) -> Option<Vec<Vec<Event>>> {
        match self {
            Module::It(m)  => m.pattern_events(pat),
            Module::Mod(m) => m.pattern_events(pat),
            Module::S3m(m) => m.pattern_events(pat),
            Module::Xm(m)  => m.pattern_events(pat),
        }
    }
}
