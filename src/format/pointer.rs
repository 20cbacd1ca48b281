use crate::util::BinaryRead;
use crate::Error;

/// 16-bit S3M parapointer, in 16-byte paragraphs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParaPointer16(pub u16);

/// 24-bit S3M sample memory segment, in 16-byte paragraphs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParaPointer24(pub u32);

/// 32-bit IT pointer, already an absolute file offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParaPointer32(pub u32);

pub trait Pointer {
    fn offset(&self) -> usize;
    fn is_null(&self) -> bool;
}

impl Pointer for ParaPointer16 {
    fn offset(&self) -> usize { self.0 as usize * 16 }
    fn is_null(&self) -> bool { self.0 == 0 }
}

impl Pointer for ParaPointer24 {
    fn offset(&self) -> usize { self.0 as usize * 16 }
    fn is_null(&self) -> bool { self.0 == 0 }
}

impl Pointer for ParaPointer32 {
    fn offset(&self) -> usize { self.0 as usize }
    fn is_null(&self) -> bool { self.0 == 0 }
}

impl ParaPointer16 {
    pub fn read(b: &[u8], ofs: usize) -> Result<Self, Error> {
        Ok(ParaPointer16(b.read16l(ofs)?))
    }

    pub fn read_table(b: &[u8], ofs: usize, num: usize) -> Result<Vec<Self>, Error> {
        (0..num).map(|i| Self::read(b, ofs + 2 * i)).collect()
    }
}

impl ParaPointer24 {
    pub fn read(b: &[u8], ofs: usize) -> Result<Self, Error> {
        Ok(ParaPointer24(b.read24l(ofs)?))
    }
}

impl ParaPointer32 {
    pub fn read(b: &[u8], ofs: usize) -> Result<Self, Error> {
        Ok(ParaPointer32(b.read32l(ofs)?))
    }

    pub fn read_table(b: &[u8], ofs: usize, num: usize) -> Result<Vec<Self>, Error> {
        (0..num).map(|i| Self::read(b, ofs + 4 * i)).collect()
    }
}


/// Lowest file offset a resolved pointer may refer to.
///
/// Everything below the watermark has already been consumed as header,
/// pointer tables or metadata blocks, so a pointer into that region is
/// rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Watermark {
    pub valid_from: usize,
}

impl Watermark {
    pub fn new(valid_from: usize) -> Self {
        Watermark { valid_from }
    }

    pub fn advance_to(&mut self, ofs: usize) {
        if ofs > self.valid_from {
            self.valid_from = ofs;
        }
    }

    pub fn check<P: Pointer>(&self, what: &str, ptr: &P) -> Result<usize, Error> {
        let ofs = ptr.offset();
        if ofs < self.valid_from {
            return Err(Error::InvalidFormat(format!("{} pointer {:#x} below minimum position {:#x}",
                                                    what, ofs, self.valid_from)));
        }
        Ok(ofs)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(ParaPointer16(3).offset(), 48);
        assert_eq!(ParaPointer24(0x010000).offset(), 0x100000);
        assert_eq!(ParaPointer32(0x1234).offset(), 0x1234);
        assert!(ParaPointer32(0).is_null());
    }

    #[test]
    fn test_read_table() {
        let b: &[u8] = &[0x01, 0x00, 0x02, 0x00, 0xff];
        let t = ParaPointer16::read_table(b, 0, 2).unwrap();
        assert_eq!(t, vec![ParaPointer16(1), ParaPointer16(2)]);
        assert!(ParaPointer16::read_table(b, 0, 3).is_err());
    }

    #[test]
    fn test_watermark() {
        let mut w = Watermark::new(0x100);
        assert!(matches!(w.check("pattern", &ParaPointer32(0xff)), Err(Error::InvalidFormat(_))));
        assert_eq!(w.check("pattern", &ParaPointer32(0x100)).unwrap(), 0x100);
        w.advance_to(0x200);
        assert!(w.check("sample", &ParaPointer16(0x1f)).is_err());
        assert_eq!(w.check("sample", &ParaPointer16(0x20)).unwrap(), 0x200);
        w.advance_to(0x10);
        assert_eq!(w.valid_from, 0x200);
    }
}
