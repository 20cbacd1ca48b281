use crate::util::BinaryRead;
use crate::Error;

/// Cursor over a size-prefixed record.
///
/// Every read first checks whether the declared record size has been used
/// up. Once it has, reads leave their destination untouched, so a record is
/// decoded as a flat sequence of field reads and whatever the writer did not
/// store keeps its default value.
pub struct Budget<'a> {
    b       : &'a [u8],
    ofs     : usize,
    consumed: usize,
    size    : usize,
}

impl<'a> Budget<'a> {
    /// Starts a budget at `ofs`, with `consumed` bytes of the record
    /// (usually the size field itself) already read.
    pub fn new(b: &'a [u8], ofs: usize, size: u32, consumed: usize) -> Self {
        Budget {
            b,
            ofs,
            consumed,
            size: size as usize,
        }
    }

    pub fn exhausted(&self) -> bool {
        self.consumed >= self.size
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    fn take(&mut self, n: usize) -> Option<usize> {
        if self.exhausted() {
            return None
        }
        let ofs = self.ofs;
        self.ofs += n;
        self.consumed += n;
        Some(ofs)
    }

    pub fn u8(&mut self, dst: &mut u8) -> Result<(), Error> {
        if let Some(ofs) = self.take(1) {
            *dst = self.b.read8(ofs)?;
        }
        Ok(())
    }

    pub fn i8(&mut self, dst: &mut i8) -> Result<(), Error> {
        if let Some(ofs) = self.take(1) {
            *dst = self.b.read8i(ofs)?;
        }
        Ok(())
    }

    pub fn u16(&mut self, dst: &mut u16) -> Result<(), Error> {
        if let Some(ofs) = self.take(2) {
            *dst = self.b.read16l(ofs)?;
        }
        Ok(())
    }

    pub fn u32(&mut self, dst: &mut u32) -> Result<(), Error> {
        if let Some(ofs) = self.take(4) {
            *dst = self.b.read32l(ofs)?;
        }
        Ok(())
    }

    /// Reads a fixed-width field as a whole.
    pub fn bytes(&mut self, dst: &mut [u8]) -> Result<(), Error> {
        if let Some(ofs) = self.take(dst.len()) {
            dst.copy_from_slice(self.b.slice(ofs, dst.len())?);
        }
        Ok(())
    }
}
