use super::*;
use crate::format::{Format, Loader};
use crate::format::it::instrument::NEW_INSTRUMENT_SIZE;
use crate::format::it::sample::SAMPLE_HEADER_SIZE;
use crate::Error;

fn put16(b: &mut [u8], ofs: usize, v: u16) {
    b[ofs..ofs + 2].copy_from_slice(&v.to_le_bytes());
}

fn put32(b: &mut [u8], ofs: usize, v: u32) {
    b[ofs..ofs + 4].copy_from_slice(&v.to_le_bytes());
}

struct Layout {
    pointers  : usize,
    history   : usize,
    blocks_end: usize,
    instrument: usize,
    sample    : usize,
}

fn build_with(cmwt: u16, midi: bool) -> (Vec<u8>, Layout) {
    let mut b = vec![0u8; HEADER_SIZE];
    b[..4].copy_from_slice(b"IMPM");
    b[4..11].copy_from_slice(b"it song");
    b[0x1e] = 4;
    b[0x1f] = 16;
    put16(&mut b, 0x20, 3);
    put16(&mut b, 0x22, 1);
    put16(&mut b, 0x24, 1);
    put16(&mut b, 0x26, 2);
    put16(&mut b, 0x28, 0x0214);
    put16(&mut b, 0x2a, cmwt);
    put16(&mut b, 0x2c, 0x05);                         // stereo, instruments
    put16(&mut b, 0x2e, if midi { 0x0b } else { 0x03 }); // message, history
    b[0x30] = 128;
    b[0x31] = 48;
    b[0x32] = 6;
    b[0x33] = 125;
    b[0x34] = 128;
    for i in 0..64 {
        b[0x40 + i] = 32;
        b[0x80 + i] = 64;
    }
    b[0x40 + 63] = 0x80 | 32;

    b.extend_from_slice(&[0, 1, 255]);
    let pointers = b.len();
    b.extend_from_slice(&[0u8; 16]);

    // one history entry: 2001-05-17 13:45:30, 182 ticks
    let history = b.len();
    b.extend_from_slice(&[1, 0]);
    b.extend_from_slice(&0x2ab1_u16.to_le_bytes());
    b.extend_from_slice(&0x6daf_u16.to_le_bytes());
    b.extend_from_slice(&182_u32.to_le_bytes());

    if midi {
        b.extend(vec![0x55; MIDI_CONFIG_SIZE]);
    }

    let mut names = [0u8; 64];
    names[..5].copy_from_slice(b"intro");
    names[32..36].copy_from_slice(b"main");
    b.extend_from_slice(b"PNAM");
    b.extend_from_slice(&64_u32.to_le_bytes());
    b.extend_from_slice(&names);
    b.extend_from_slice(b"XTPM");
    b.extend_from_slice(&12_u32.to_le_bytes());
    b.extend_from_slice(&[7u8; 12]);
    let blocks_end = b.len();

    let instrument = b.len();
    let mut impi = vec![0u8; NEW_INSTRUMENT_SIZE];
    impi[..4].copy_from_slice(b"IMPI");
    impi[0x18] = 128;
    impi[0x20..0x24].copy_from_slice(b"lead");
    b.extend(impi);

    let sample = b.len();
    let mut imps = vec![0u8; SAMPLE_HEADER_SIZE];
    imps[..4].copy_from_slice(b"IMPS");
    imps[0x12] = 0x01;
    imps[0x13] = 64;
    imps[0x14..0x18].copy_from_slice(b"kick");
    put32(&mut imps, 0x30, 4);
    put32(&mut imps, 0x3c, 8363);
    put32(&mut imps, 0x48, (sample + SAMPLE_HEADER_SIZE) as u32);
    b.extend(imps);
    b.extend_from_slice(&[0x10, 0x20, 0x30, 0x40]);

    let message = b.len();
    b.extend_from_slice(b"hello\rworld\0");
    put16(&mut b, 0x36, 12);
    put32(&mut b, 0x38, message as u32);

    let pattern = b.len();
    let data: &[u8] = &[
        0x81, 0x0f, 60, 1, 64, 1, 6,  // C-5, instrument 1, volume 64, A06
        0x00,
        0x81, 0xf0,                   // same values again
        0x83, 0x08, 20, 0x40,         // T40 on channel 3
        0x00,
    ];
    b.extend_from_slice(&(data.len() as u16).to_le_bytes());
    b.extend_from_slice(&[2, 0, 0, 0, 0, 0]);
    b.extend_from_slice(data);

    put32(&mut b, pointers, instrument as u32);
    put32(&mut b, pointers + 4, sample as u32);
    put32(&mut b, pointers + 8, pattern as u32);

    (b, Layout { pointers, history, blocks_end, instrument, sample })
}

fn build() -> (Vec<u8>, Layout) {
    build_with(0x0214, false)
}

#[test]
fn test_read() {
    let (b, _) = build();
    let m = read(&b).unwrap();
    let h = &m.header;
    assert_eq!(h.song_name, "it song");
    assert_eq!((h.highlight_minor, h.highlight_major), (4, 16));
    assert_eq!((h.ord_num, h.ins_num, h.smp_num, h.pat_num), (3, 1, 1, 2));
    assert!(h.stereo() && h.uses_instruments());
    assert_eq!(h.global_volume.value(), Some(1.0));
    assert_eq!((h.initial_speed, h.initial_tempo), (6, 125));
    assert_eq!(h.channel_pan[0].value(), Some(0.5));
    assert!(h.channel_pan[63].is_disabled());
    assert_eq!(h.channel_volume[0].value(), Some(1.0));
    assert_eq!(m.orders, vec![0, 1, 255]);

    assert_eq!(m.instruments.len(), 1);
    assert_eq!(m.instruments[0].name(), "lead");
    assert!(matches!(m.instruments[0], Instrument::New(_)));
    assert_eq!(m.samples.len(), 1);
    assert_eq!(m.samples[0].name, "kick");
    assert_eq!(m.samples[0].data, vec![0x10, 0x20, 0x30, 0x40]);
    assert_eq!(m.message.as_deref(), Some("hello\nworld"));
    assert!(m.midi_config.is_none());
    assert_eq!(m.channels, 3);
}

#[test]
fn test_history() {
    let (b, _) = build();
    let m = read(&b).unwrap();
    assert_eq!(m.history.len(), 1);
    let entry = &m.history[0];
    assert_eq!(entry.date(), (2001, 5, 17));
    assert_eq!(entry.time(), (13, 45, 30));
    assert!((entry.run_seconds() - 10.0).abs() < 1e-9);
}

#[test]
fn test_oversized_history_is_ignored() {
    let (mut b, l) = build();
    put16(&mut b, l.history, 0xffff);
    let m = read(&b).unwrap();
    assert!(m.history.is_empty());
    assert!(m.blocks.is_empty());
    assert_eq!(m.instruments[0].name(), "lead");
}

#[test]
fn test_blocks() {
    let (b, _) = build();
    let m = read(&b).unwrap();
    assert_eq!(m.blocks.len(), 2);
    assert_eq!(m.blocks[0].tag, block::PNAM);
    assert_eq!(m.pattern_names().unwrap(), &["intro".to_owned(), "main".to_owned()]);
    assert_eq!(m.blocks[1].tag_string(), "XTPM");
    assert_eq!(m.blocks[1].size(), Some(20));
    assert_eq!(m.blocks[1].data, BlockData::Unknown(vec![7; 12]));
    assert_eq!(m.fx_plugins().count(), 0);
}

#[test]
fn test_embedded_midi() {
    let (b, _) = build_with(0x0214, true);
    let m = read(&b).unwrap();
    assert_eq!(m.midi_config.as_ref().map(|c| c.len()), Some(MIDI_CONFIG_SIZE));
    assert_eq!(m.blocks.len(), 2);
    assert_eq!(m.samples[0].data.len(), 4);
}

#[test]
fn test_old_instrument_layout() {
    let (b, _) = build_with(0x0100, false);
    let m = read(&b).unwrap();
    match &m.instruments[0] {
        Instrument::Old(ins) => assert_eq!(ins.name, "lead"),
        _ => panic!("expected old instrument layout"),
    }
}

#[test]
fn test_patterns() {
    let (b, _) = build();
    let m = read(&b).unwrap();
    assert_eq!(m.patterns.len(), 2);

    let rows = m.patterns[0].unpack().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].len(), 64);
    assert_eq!(rows[0][0].note, Note(60));
    assert_eq!((rows[0][0].cmd, rows[0][0].cmd_data), (1, 6));

    // values repeated through channel memory
    let (a, r) = (&rows[0][0], &rows[1][0]);
    assert_eq!((r.what, r.note, r.ins, r.volpan, r.cmd, r.cmd_data),
               (a.what, a.note, a.ins, a.volpan, a.cmd, a.cmd_data));
    assert_eq!((rows[1][2].cmd, rows[1][2].cmd_data), (20, 0x40));

    let e = m.event(0, 0, 0).unwrap();
    assert_eq!((e.note, e.ins, e.vol, e.fxt, e.fxp), (61, 1, 64, 1, 6));
    assert!(m.event(0, 0, 1).unwrap().is_empty());
    assert!(m.event(0, 2, 0).is_none());
}

#[test]
fn test_truncated_pattern_fails_read() {
    let (mut b, _) = build();
    // the pattern is stored last: its final row end becomes a slot
    let last = b.len() - 1;
    b[last] = 0x83;
    assert!(matches!(read(&b), Err(Error::TruncatedInput { .. })));
}

#[test]
fn test_pattern_events() {
    let (b, _) = build();
    let m = read(&b).unwrap();
    let rows = m.pattern_events(0).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].len(), m.channels);
    for (r, row) in rows.iter().enumerate() {
        for (c, e) in row.iter().enumerate() {
            assert_eq!(Some(*e), m.event(0, r, c));
        }
    }
    assert!(m.pattern_events(2).is_none());
}

#[test]
fn test_null_pattern_pointer() {
    let (b, _) = build();
    let m = read(&b).unwrap();
    assert_eq!(m.pattern_pp[1], ParaPointer32(0));
    assert_eq!(m.patterns[1], ItPattern::empty());
    assert_eq!(m.patterns[1].data, vec![0; 64]);
    let rows = m.patterns[1].unpack().unwrap();
    assert_eq!(rows.len(), 64);
    assert!(m.event(1, 63, 63).unwrap().is_empty());
}

#[test]
fn test_pointer_below_watermark() {
    let (mut b, l) = build();
    put32(&mut b, l.pointers, (l.blocks_end - 4) as u32);
    assert!(matches!(read(&b), Err(Error::InvalidFormat(_))));

    let (mut b, l) = build();
    put32(&mut b, l.pointers + 8, l.history as u32);
    assert!(matches!(read(&b), Err(Error::InvalidFormat(_))));
}

#[test]
fn test_bad_record_magic() {
    let (mut b, l) = build();
    put32(&mut b, l.pointers, l.sample as u32);
    assert!(matches!(read(&b), Err(Error::InvalidInstrumentFormat(_))));

    let (mut b, l) = build();
    put32(&mut b, l.pointers + 4, l.instrument as u32);
    assert!(matches!(read(&b), Err(Error::InvalidInstrumentFormat(_))));
}

#[test]
fn test_probe() {
    let (b, _) = build();
    let info = ItLoader.probe(&b).unwrap();
    assert_eq!(info.format, Format::It);
    assert_eq!(info.title, "it song");
    assert!(ItLoader.probe(&b[..0x40]).is_err());

    let mut b = b;
    b[0] = b'X';
    assert!(ItLoader.probe(&b).is_err());
    assert!(matches!(read(&b), Err(Error::InvalidFormat(_))));
}

#[test]
fn test_truncated() {
    let (b, l) = build();
    for len in &[0, 4, 0xbf, 0xc2, l.pointers + 10, l.blocks_end, b.len() - 1] {
        assert!(read(&b[..*len]).is_err(), "length {}", len);
    }
}
