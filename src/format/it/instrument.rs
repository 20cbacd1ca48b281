use crate::format::it::flags::{EnvelopeFlags, OldInstrumentFlags};
use crate::format::it::value::*;
use crate::util::BinaryRead;
use crate::Error;

// Instrument header, format before IT 2.00:
//
// Offset Size  Description
// 0x000  4     "IMPI"
// 0x004  12    DOS filename
// 0x010  1     reserved
// 0x011  1     flags
// 0x012  4     volume loop start/end, sustain loop start/end
// 0x016  2     reserved
// 0x018  2     fadeout
// 0x01a  1     new note action
// 0x01b  1     duplicate note check
// 0x01c  2     tracker version
// 0x01e  1     number of samples
// 0x01f  1     reserved
// 0x020  26    instrument name
// 0x03a  6     reserved
// 0x040  240   note/sample keyboard table
// 0x130  200   volume envelope
// 0x1f8  50    25 node points (tick, magnitude)
//
// Format from IT 2.00 on keeps the first 0x40 bytes but reorders the fields
// and replaces the envelope area with three 82-byte envelopes.

pub const OLD_INSTRUMENT_SIZE: usize = 0x22a;
pub const NEW_INSTRUMENT_SIZE: usize = 0x226;
pub const KEYBOARD_SIZE      : usize = 120;
pub const ENVELOPE_NODES     : usize = 25;
const ENVELOPE_SIZE          : usize = 82;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OldNodePoint {
    pub tick     : u8,
    pub magnitude: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InstrumentOld {
    pub filename       : String,
    pub flags          : OldInstrumentFlags,
    pub vol_loop_start : u8,
    pub vol_loop_end   : u8,
    pub sus_loop_start : u8,
    pub sus_loop_end   : u8,
    pub fadeout        : u16,
    pub nna            : u8,
    pub dnc            : u8,
    pub tracker_version: u16,
    pub num_samples    : u8,
    pub name           : String,
    pub keyboard       : Vec<NoteSample>,
    pub volume_envelope: Vec<u8>,
    pub node_points    : Vec<OldNodePoint>,
}

impl InstrumentOld {
    pub fn from_slice(b: &[u8]) -> Result<Self, Error> {
        check_magic(b)?;
        let b = b.slice(0, OLD_INSTRUMENT_SIZE)?;

        let node_points = (0..ENVELOPE_NODES)
            .map(|i| Ok(OldNodePoint{ tick: b.read8(0x1f8 + 2*i)?, magnitude: b.read8(0x1f9 + 2*i)? }))
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(InstrumentOld {
            filename       : b.read_string(0x04, 12)?,
            flags          : OldInstrumentFlags::from_bits_truncate(b.read8(0x11)?),
            vol_loop_start : b.read8(0x12)?,
            vol_loop_end   : b.read8(0x13)?,
            sus_loop_start : b.read8(0x14)?,
            sus_loop_end   : b.read8(0x15)?,
            fadeout        : b.read16l(0x18)?,
            nna            : b.read8(0x1a)?,
            dnc            : b.read8(0x1b)?,
            tracker_version: b.read16l(0x1c)?,
            num_samples    : b.read8(0x1e)?,
            name           : b.read_string(0x20, 26)?,
            keyboard       : read_keyboard(b)?,
            volume_envelope: b.slice(0x130, 200)?.to_vec(),
            node_points,
        })
    }

    /// Duplicate note check enabled.
    pub fn duplicate_note_check(&self) -> bool {
        self.dnc != 0
    }
}


#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodePoint {
    pub y   : i8,
    pub tick: u16,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Envelope {
    pub flags        : EnvelopeFlags,
    pub num          : u8,
    pub loop_begin   : u8,
    pub loop_end     : u8,
    pub sustain_begin: u8,
    pub sustain_end  : u8,
    pub nodes        : Vec<NodePoint>,
}

impl Envelope {
    fn from_slice(b: &[u8], ofs: usize) -> Result<Self, Error> {
        let b = b.slice(ofs, ENVELOPE_SIZE)?;
        let nodes = (0..ENVELOPE_NODES)
            .map(|i| Ok(NodePoint{ y: b.read8i(6 + 3*i)?, tick: b.read16l(7 + 3*i)? }))
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Envelope {
            flags        : EnvelopeFlags::from_bits_truncate(b.read8(0)?),
            num          : b.read8(1)?,
            loop_begin   : b.read8(2)?,
            loop_end     : b.read8(3)?,
            sustain_begin: b.read8(4)?,
            sustain_end  : b.read8(5)?,
            nodes,
        })
    }

    pub fn enabled(&self) -> bool {
        self.flags.contains(EnvelopeFlags::ON)
    }

    /// Node points in use.
    pub fn points(&self) -> &[NodePoint] {
        let n = (self.num as usize).min(self.nodes.len());
        &self.nodes[..n]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InstrumentNew {
    pub filename        : String,
    pub nna             : u8,
    pub dct             : u8,
    pub dca             : u8,
    pub fadeout         : u16,
    pub pitch_pan_sep   : i8,
    pub pitch_pan_center: Note,
    pub global_volume   : FineVolume,
    pub default_pan     : SamplePanValue,
    pub random_volume   : Percentage8,
    pub random_pan      : Percentage8,
    pub tracker_version : u16,
    pub num_samples     : u8,
    pub name            : String,
    pub filter_cutoff   : u8,
    pub filter_resonance: u8,
    pub midi_channel    : u8,
    pub midi_program    : u8,
    pub midi_bank       : u16,
    pub keyboard        : Vec<NoteSample>,
    pub volume_envelope : Envelope,
    pub pan_envelope    : Envelope,
    pub pitch_envelope  : Envelope,
}

impl InstrumentNew {
    pub fn from_slice(b: &[u8]) -> Result<Self, Error> {
        check_magic(b)?;
        let b = b.slice(0, NEW_INSTRUMENT_SIZE)?;

        Ok(InstrumentNew {
            filename        : b.read_string(0x04, 12)?,
            nna             : b.read8(0x11)?,
            dct             : b.read8(0x12)?,
            dca             : b.read8(0x13)?,
            fadeout         : b.read16l(0x14)?,
            pitch_pan_sep   : b.read8i(0x16)?,
            pitch_pan_center: Note(b.read8(0x17)?),
            global_volume   : FineVolume(b.read8(0x18)?),
            default_pan     : SamplePanValue(b.read8(0x19)?),
            random_volume   : Percentage8(b.read8(0x1a)?),
            random_pan      : Percentage8(b.read8(0x1b)?),
            tracker_version : b.read16l(0x1c)?,
            num_samples     : b.read8(0x1e)?,
            name            : b.read_string(0x20, 26)?,
            filter_cutoff   : b.read8(0x3a)?,
            filter_resonance: b.read8(0x3b)?,
            midi_channel    : b.read8(0x3c)?,
            midi_program    : b.read8(0x3d)?,
            midi_bank       : b.read16l(0x3e)?,
            keyboard        : read_keyboard(b)?,
            volume_envelope : Envelope::from_slice(b, 0x130)?,
            pan_envelope    : Envelope::from_slice(b, 0x130 + ENVELOPE_SIZE)?,
            pitch_envelope  : Envelope::from_slice(b, 0x130 + 2 * ENVELOPE_SIZE)?,
        })
    }

    pub fn new_note_action(&self) -> Option<NewNoteAction> {
        NewNoteAction::from_u8(self.nna)
    }

    pub fn duplicate_check_type(&self) -> Option<DuplicateCheckType> {
        DuplicateCheckType::from_u8(self.dct)
    }

    pub fn duplicate_check_action(&self) -> Option<DuplicateCheckAction> {
        DuplicateCheckAction::from_u8(self.dca)
    }

    /// Filter cutoff, when bit 7 enables it.
    pub fn initial_filter_cutoff(&self) -> Option<u8> {
        if self.filter_cutoff & 0x80 != 0 { Some(self.filter_cutoff & 0x7f) } else { None }
    }

    pub fn initial_filter_resonance(&self) -> Option<u8> {
        if self.filter_resonance & 0x80 != 0 { Some(self.filter_resonance & 0x7f) } else { None }
    }
}

/// Instrument record, in the layout selected by the compatible tracker
/// version.
#[derive(Clone, Debug, PartialEq)]
pub enum Instrument {
    Old(InstrumentOld),
    New(InstrumentNew),
}

impl Instrument {
    pub fn from_slice(b: &[u8], cmwt: u16) -> Result<Self, Error> {
        if cmwt < 0x200 {
            Ok(Instrument::Old(InstrumentOld::from_slice(b)?))
        } else {
            Ok(Instrument::New(InstrumentNew::from_slice(b)?))
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Instrument::Old(ins) => &ins.name,
            Instrument::New(ins) => &ins.name,
        }
    }

    pub fn keyboard(&self) -> &[NoteSample] {
        match self {
            Instrument::Old(ins) => &ins.keyboard,
            Instrument::New(ins) => &ins.keyboard,
        }
    }

    pub fn fadeout(&self) -> u16 {
        match self {
            Instrument::Old(ins) => ins.fadeout,
            Instrument::New(ins) => ins.fadeout,
        }
    }
}

fn check_magic(b: &[u8]) -> Result<(), Error> {
    if b.slice(0, 4)? != b"IMPI" {
        return Err(Error::InvalidInstrumentFormat("missing IMPI signature".to_owned()));
    }
    Ok(())
}

fn read_keyboard(b: &[u8]) -> Result<Vec<NoteSample>, Error> {
    (0..KEYBOARD_SIZE)
        .map(|i| Ok(NoteSample{ note: Note(b.read8(0x40 + 2*i)?), sample: b.read8(0x41 + 2*i)? }))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    fn impi(size: usize) -> Vec<u8> {
        let mut b = vec![0u8; size];
        b[..4].copy_from_slice(b"IMPI");
        b[0x20..0x25].copy_from_slice(b"flute");
        for i in 0..KEYBOARD_SIZE {
            b[0x40 + 2*i] = i as u8;
            b[0x41 + 2*i] = 1;
        }
        b
    }

    #[test]
    fn test_old_instrument() {
        let mut b = impi(OLD_INSTRUMENT_SIZE);
        b[0x11] = 0x03;
        b[0x18] = 0x80;
        b[0x1a] = 2;
        b[0x1e] = 1;
        b[0x130] = 64;
        b[0x1f8] = 0;
        b[0x1f9] = 64;
        b[0x1fa] = 10;
        b[0x1fb] = 32;

        let ins = Instrument::from_slice(&b, 0x100).unwrap();
        assert_eq!(ins.name(), "flute");
        assert_eq!(ins.fadeout(), 0x80);
        assert_eq!(ins.keyboard()[60], NoteSample{ note: Note(60), sample: 1 });
        match ins {
            Instrument::Old(ins) => {
                assert!(ins.flags.contains(OldInstrumentFlags::VOLUME_ENVELOPE | OldInstrumentFlags::VOLUME_LOOP));
                assert_eq!(ins.nna, 2);
                assert_eq!(ins.volume_envelope[0], 64);
                assert_eq!(ins.node_points[1], OldNodePoint{ tick: 10, magnitude: 32 });
            }
            _ => panic!("expected old layout"),
        }
    }

    #[test]
    fn test_new_instrument() {
        let mut b = impi(NEW_INSTRUMENT_SIZE);
        b[0x11] = 3;
        b[0x12] = 1;
        b[0x14] = 0x00;
        b[0x15] = 0x01;
        b[0x16] = 0xf8;
        b[0x18] = 128;
        b[0x19] = 0x80 | 32;
        b[0x3a] = 0x80 | 100;
        // volume envelope: on, 2 nodes
        b[0x130] = 0x01;
        b[0x131] = 2;
        b[0x136] = 64;
        b[0x13a] = 10;
        // pitch envelope drives the filter
        b[0x130 + 2 * ENVELOPE_SIZE] = 0x81;

        let ins = Instrument::from_slice(&b, 0x214).unwrap();
        assert_eq!(ins.fadeout(), 256);
        match ins {
            Instrument::New(ins) => {
                assert_eq!(ins.new_note_action(), Some(NewNoteAction::Fade));
                assert_eq!(ins.duplicate_check_type(), Some(DuplicateCheckType::Note));
                assert_eq!(ins.duplicate_check_action(), Some(DuplicateCheckAction::Cut));
                assert_eq!(ins.pitch_pan_sep, -8);
                assert_eq!(ins.global_volume.value(), Some(1.0));
                assert_eq!(ins.default_pan.value(), Some(0.5));
                assert_eq!(ins.initial_filter_cutoff(), Some(100));
                assert_eq!(ins.initial_filter_resonance(), None);

                let env = &ins.volume_envelope;
                assert!(env.enabled());
                assert_eq!(env.points(), &[NodePoint{ y: 64, tick: 0 }, NodePoint{ y: 0, tick: 10 }]);
                assert!(!ins.pan_envelope.enabled());
                assert!(ins.pitch_envelope.flags.contains(EnvelopeFlags::FILTER));
            }
            _ => panic!("expected new layout"),
        }
    }

    #[test]
    fn test_bad_magic() {
        let mut b = impi(NEW_INSTRUMENT_SIZE);
        b[0] = b'X';
        assert!(matches!(Instrument::from_slice(&b, 0x214), Err(Error::InvalidInstrumentFormat(_))));
    }

    #[test]
    fn test_truncated() {
        let b = impi(NEW_INSTRUMENT_SIZE);
        assert!(matches!(Instrument::from_slice(&b, 0x100), Err(Error::TruncatedInput{ .. })));
        assert!(Instrument::from_slice(&b[..0x200], 0x214).is_err());
    }
}
