use byteorder::{ByteOrder, BigEndian, LittleEndian};
use crate::Error;

pub const NOTES: &[&str] = &[
    "C-", "C#", "D-", "D#", "E-", "F-", "F#", "G-", "G#", "A-", "A#", "B-"
];

pub const PERIOD_BASE: f64 = 13696.0;  // C0 period

/// Builds a big-endian four character code, the way the tags appear on disk.
#[macro_export]
macro_rules! magic4 {
    ( $a:expr, $b:expr, $c:expr, $d:expr ) => {
        (($a as u32) << 24) | (($b as u32) << 16) | (($c as u32) << 8) | ($d as u32)
    }
}

pub trait BinaryRead {
    fn read_string(&self, ofs: usize, size: usize) -> Result<String, Error>;
    fn read32b(&self, ofs: usize) -> Result<u32, Error>;
    fn read32l(&self, ofs: usize) -> Result<u32, Error>;
    fn read24l(&self, ofs: usize) -> Result<u32, Error>;
    fn read16b(&self, ofs: usize) -> Result<u16, Error>;
    fn read16l(&self, ofs: usize) -> Result<u16, Error>;
    fn read8(&self, ofs: usize) -> Result<u8, Error>;
    fn read8i(&self, ofs: usize) -> Result<i8, Error>;
    fn slice(&self, start: usize, size: usize) -> Result<&[u8], Error>;
}

impl<'a> BinaryRead for &'a [u8] {
    fn read_string(&self, ofs: usize, size: usize) -> Result<String, Error> {
        Ok(fixed_string(self.slice(ofs, size)?))
    }

    fn read32b(&self, ofs: usize) -> Result<u32, Error> {
        Ok(BigEndian::read_u32(self.slice(ofs, 4)?))
    }

    fn read32l(&self, ofs: usize) -> Result<u32, Error> {
        Ok(LittleEndian::read_u32(self.slice(ofs, 4)?))
    }

    // S3M MemSeg layout: high byte first, then the low word
    fn read24l(&self, ofs: usize) -> Result<u32, Error> {
        let b = self.slice(ofs, 3)?;
        Ok(((b[0] as u32) << 16) | LittleEndian::read_u16(&b[1..]) as u32)
    }

    fn read16b(&self, ofs: usize) -> Result<u16, Error> {
        Ok(BigEndian::read_u16(self.slice(ofs, 2)?))
    }

    fn read16l(&self, ofs: usize) -> Result<u16, Error> {
        Ok(LittleEndian::read_u16(self.slice(ofs, 2)?))
    }

    fn read8(&self, ofs: usize) -> Result<u8, Error> {
        Ok(self.slice(ofs, 1)?[0])
    }

    fn read8i(&self, ofs: usize) -> Result<i8, Error> {
        Ok(self.slice(ofs, 1)?[0] as i8)
    }

    fn slice(&self, start: usize, size: usize) -> Result<&[u8], Error> {
        check_buffer_size(self, start, size)?;
        Ok(&self[start..start + size])
    }
}

fn check_buffer_size(b: &[u8], ofs: usize, size: usize) -> Result<(), Error> {
    match ofs.checked_add(size) {
        Some(end) if end <= b.len() => Ok(()),
        _ => Err(Error::TruncatedInput { ofs, size, len: b.len() }),
    }
}

/// Decodes a fixed-width text field, stopping at the first zero byte.
pub fn fixed_string(b: &[u8]) -> String {
    let end = b.iter().position(|&x| x == 0).unwrap_or(b.len());
    String::from_utf8_lossy(&b[..end]).into_owned()
}

/// Converts an Amiga period to a 1-based semitone, 0 meaning no note.
pub fn period_to_note(period: u16) -> u8 {
    if period == 0 {
        return 0
    }

    let note = (12.0_f64 * (PERIOD_BASE / period as f64).log(2.0)).round() + 1.0;
    if note < 1.0 { 1 } else if note > 120.0 { 120 } else { note as u8 }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_le_be() {
        let b: &[u8] = &[0x12, 0x34, 0x56, 0x78];
        assert_eq!(b.read16l(0).unwrap(), 0x3412);
        assert_eq!(b.read16b(0).unwrap(), 0x1234);
        assert_eq!(b.read32l(0).unwrap(), 0x78563412);
        assert_eq!(b.read32b(0).unwrap(), 0x12345678);
        assert_eq!(b.read24l(0).unwrap(), 0x125634);
        assert_eq!(b.read8i(3).unwrap(), 0x78);
    }

    #[test]
    fn test_read24l_memseg() {
        let b: &[u8] = &[0x01, 0x34, 0x12];
        assert_eq!(b.read24l(0).unwrap(), 0x011234);
    }

    #[test]
    fn test_short_read() {
        let b: &[u8] = &[1, 2, 3];
        assert!(matches!(b.read32b(0), Err(Error::TruncatedInput { ofs: 0, size: 4, len: 3 })));
        assert!(b.read16l(2).is_err());
        assert!(b.slice(usize::max_value(), 2).is_err());
        assert_eq!(b.slice(3, 0).unwrap().len(), 0);
    }

    #[test]
    fn test_fixed_string() {
        assert_eq!(fixed_string(b"Hello\0World"), "Hello");
        assert_eq!(fixed_string(b"No null"), "No null");
        assert_eq!(fixed_string(b"\0\0\0"), "");
        assert_eq!(fixed_string(b""), "");
    }

    #[test]
    fn test_magic4() {
        assert_eq!(magic4!('I', 'M', 'P', 'I'), 0x494d5049);
        assert_eq!(magic4!(b'P', b'N', b'A', b'M'), 0x504e414d);
    }

    #[test]
    fn test_period_to_note() {
        assert_eq!(period_to_note(0), 0);
        assert_eq!(period_to_note(428), 61);
        assert_eq!(period_to_note(214), 73);
    }
}
