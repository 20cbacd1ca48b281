use super::*;
use crate::format::Loader;
use crate::module::event;

fn header(channels: u16, patterns: u16, instruments: u16) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend_from_slice(ID_TEXT.as_bytes());
    let mut name = [0u8; 20];
    name[..7].copy_from_slice(b"xm song");
    b.extend_from_slice(&name);
    b.push(0x1a);
    let mut tracker = [0u8; 20];
    tracker[..11].copy_from_slice(b"FastTracker");
    b.extend_from_slice(&tracker);
    b.extend_from_slice(&[0x04, 0x01]);          // version 1.04
    b.extend_from_slice(&[0x14, 0x01, 0, 0]);   // header size 276
    b.extend_from_slice(&[2, 0, 0, 0]);         // song length, restart
    b.extend_from_slice(&[channels as u8, (channels >> 8) as u8]);
    b.extend_from_slice(&[patterns as u8, (patterns >> 8) as u8]);
    b.extend_from_slice(&[instruments as u8, (instruments >> 8) as u8]);
    b.extend_from_slice(&[1, 0, 6, 0, 125, 0]);  // linear, speed, tempo
    let mut orders = [0u8; 256];
    orders[1] = 1;
    b.extend_from_slice(&orders);
    b
}

fn pattern(b: &mut Vec<u8>, rows: u16, packed: &[u8]) {
    b.extend_from_slice(&[9, 0, 0, 0, 0]);
    b.extend_from_slice(&[rows as u8, (rows >> 8) as u8]);
    b.extend_from_slice(&[packed.len() as u8, (packed.len() >> 8) as u8]);
    b.extend_from_slice(packed);
}

fn instrument(b: &mut Vec<u8>, name: &[u8], data: &[u8], flags: u8) {
    let mut h = vec![0u8; 263];
    h[0] = 0x07;
    h[1] = 0x01;  // size 263
    h[4..4 + name.len()].copy_from_slice(name);
    h[27] = 1;
    h[29] = 40;
    b.extend_from_slice(&h);

    let mut s = vec![0u8; SAMPLE_HEADER_SIZE];
    s[0] = data.len() as u8;
    s[12] = 64;
    s[14] = flags;
    b.extend_from_slice(&s);
    b.extend_from_slice(data);
}

fn build() -> Vec<u8> {
    let mut b = header(2, 2, 1);
    pattern(&mut b, 2, &[0x31, 0x01, 0x00, 0x00, 0x00, 0x80, 0x80, 0x88, 0x0f]);
    pattern(&mut b, 64, &[]);
    instrument(&mut b, b"lead", &[0x10, 0x00, 0xf0, 0xff], 0x10);
    b
}

#[test]
fn test_read() {
    let b = build();
    let m = read(&b).unwrap();
    assert_eq!(m.header.name, "xm song");
    assert_eq!(m.header.tracker_name, "FastTracker");
    assert_eq!(m.header.version, 0x0104);
    assert_eq!(m.header.channels, 2);
    assert!(m.header.flags.contains(HeaderFlags::LINEAR_SLIDES));
    assert_eq!((m.header.speed, m.header.tempo), (6, 125));
    assert_eq!(m.orders(), &[0, 1]);

    assert_eq!(m.patterns.len(), 2);
    assert_eq!(m.patterns[0].rows.len(), 2);
    assert_eq!(m.patterns[0].rows[0][0].note, 0x31);
    assert_eq!(m.patterns[0].rows[1][1].effect, 0x0f);
    assert_eq!(m.patterns[1].rows.len(), 64);
    assert!(m.event(1, 63, 1).unwrap().is_empty());

    let e = m.event(0, 0, 0).unwrap();
    assert!(e.has(event::HAS_NOTE | event::HAS_INS));
    assert_eq!(e.ins, 1);

    assert_eq!(m.instruments.len(), 1);
    let ins = &m.instruments[0];
    assert_eq!(ins.header.name(), "lead");
    assert_eq!(ins.samples.len(), 1);
    assert!(ins.samples[0].is_16bit());
    assert_eq!(ins.samples[0].data, vec![0x10, 0x00, 0x00, 0x00]);
}

#[test]
fn test_probe() {
    let b = build();
    assert_eq!(XmLoader.probe(&b).unwrap().title, "xm song");
    assert!(XmLoader.probe(&b[..40]).is_err());
}

#[test]
fn test_bad_magic() {
    let mut b = build();
    b[0] = b'e';
    assert!(matches!(read(&b), Err(Error::InvalidFormat(_))));
}

#[test]
fn test_counts_out_of_range() {
    let mut b = header(0, 0, 0);
    assert!(matches!(read(&b), Err(Error::OutOfRangeHeader(_))));
    b = header(33, 0, 0);
    assert!(matches!(read(&b), Err(Error::OutOfRangeHeader(_))));
    b = header(4, 257, 0);
    assert!(matches!(read(&b), Err(Error::OutOfRangeHeader(_))));
    b = header(4, 0, 129);
    assert!(matches!(read(&b), Err(Error::OutOfRangeHeader(_))));
    b = header(32, 256, 128);
    assert!(matches!(read(&b), Err(Error::TruncatedInput { .. })));
}

#[test]
fn test_short_header_size() {
    // header ending after the instrument count
    let mut b = header(4, 0, 0);
    b[60] = 14;
    b[61] = 0;
    b.truncate(74);
    let h = XmHeader::from_slice(&b).unwrap();
    assert_eq!(h.channels, 4);
    assert!(h.flags.is_empty());
    assert_eq!(h.speed, 0);
    assert_eq!(h.data_offset(), 74);
    assert!(read(&b).is_ok());
}

#[test]
fn test_truncated() {
    let b = build();
    for len in &[0, 16, 59, 62, 100, 336, 340, b.len() - 1] {
        assert!(read(&b[..*len]).is_err(), "length {}", len);
    }
}
