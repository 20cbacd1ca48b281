// IT 2.14 / 2.15 sample decompression.
//
// Samples are stored in blocks of 0x8000 (8-bit) or 0x4000 (16-bit) output
// samples. Each block starts with its compressed byte length and is read as
// an LSB-first bit stream whose code width changes in-band. IT 2.15 adds a
// second integration stage.

use std::cmp;
use crate::util::BinaryRead;
use crate::Error;

const BLOCK_SAMPLES_8 : usize = 0x8000;
const BLOCK_SAMPLES_16: usize = 0x4000;

struct BitReader<'a> {
    buf   : &'a [u8],
    base  : usize,  // file offset of buf
    pos   : usize,
    bitbuf: u32,
    bitnum: u32,
}

impl<'a> BitReader<'a> {
    fn new(buf: &'a [u8], base: usize) -> Self {
        BitReader { buf, base, pos: 0, bitbuf: 0, bitnum: 0 }
    }

    // The bit stream must not run past the end of its block.
    fn read_bits(&mut self, n: u32) -> Result<u32, Error> {
        let mut val = 0;
        for i in 0..n {
            if self.bitnum == 0 {
                self.bitbuf = match self.buf.get(self.pos) {
                    Some(&x) => x as u32,
                    None     => return Err(Error::TruncatedInput {
                        ofs : self.base + self.pos,
                        size: 1,
                        len : self.base + self.buf.len(),
                    }),
                };
                self.pos += 1;
                self.bitnum = 8;
            }
            val |= (self.bitbuf & 1) << i;
            self.bitbuf >>= 1;
            self.bitnum -= 1;
        }
        Ok(val)
    }
}

fn bad_width(width: u32) -> Error {
    Error::InvalidFormat(format!("invalid compressed sample bit width {}", width))
}

// Returns a reader over the next block and advances `ofs` past it.
fn next_block<'a>(b: &'a [u8], ofs: &mut usize) -> Result<BitReader<'a>, Error> {
    let size = b.read16l(*ofs)? as usize;
    let start = *ofs + 2;
    let block = b.get(start..start + size).ok_or(Error::TruncatedInput { ofs: start, size, len: b.len() })?;
    *ofs = start + size;
    Ok(BitReader::new(block, start))
}

/// Decodes `len` 8-bit samples starting at `ofs`.
///
/// Returns the samples and the number of input bytes consumed.
pub fn decompress8(b: &[u8], ofs: usize, len: usize, it215: bool) -> Result<(Vec<u8>, usize), Error> {
    let mut out = Vec::<u8>::new();
    let mut pos = ofs;

    while out.len() < len {
        let mut br = next_block(b, &mut pos)?;
        let count = cmp::min(BLOCK_SAMPLES_8, len - out.len());
        let mut width = 9_u32;
        let mut d1 = 0_u8;
        let mut d2 = 0_u8;
        let mut n = 0;

        while n < count {
            if width == 0 || width > 9 {
                return Err(bad_width(width));
            }
            let v = br.read_bits(width)?;

            if width < 7 {
                if v == 1 << (width - 1) {
                    let w = br.read_bits(3)? + 1;
                    width = if w < width { w } else { w + 1 };
                    continue;
                }
            } else if width < 9 {
                let border = (0xff >> (9 - width)) - 4;
                if v > border && v <= border + 8 {
                    let w = v - border;
                    width = if w < width { w } else { w + 1 };
                    continue;
                }
            } else if v & 0x100 != 0 {
                width = v - 0xff;
                continue;
            }

            let s = if width < 8 {
                let shift = 8 - width;
                (((v << shift) as u8 as i8) >> shift) as u8
            } else {
                v as u8
            };
            d1 = d1.wrapping_add(s);
            d2 = d2.wrapping_add(d1);
            out.push(if it215 { d2 } else { d1 });
            n += 1;
        }
    }

    Ok((out, pos - ofs))
}

/// Decodes `len` 16-bit samples starting at `ofs` into little-endian bytes.
///
/// Returns the sample bytes and the number of input bytes consumed.
pub fn decompress16(b: &[u8], ofs: usize, len: usize, it215: bool) -> Result<(Vec<u8>, usize), Error> {
    let mut out = Vec::<u8>::new();
    let mut pos = ofs;
    let mut done = 0;

    while done < len {
        let mut br = next_block(b, &mut pos)?;
        let count = cmp::min(BLOCK_SAMPLES_16, len - done);
        let mut width = 17_u32;
        let mut d1 = 0_u16;
        let mut d2 = 0_u16;
        let mut n = 0;

        while n < count {
            if width == 0 || width > 17 {
                return Err(bad_width(width));
            }
            let v = br.read_bits(width)?;

            if width < 7 {
                if v == 1 << (width - 1) {
                    let w = br.read_bits(4)? + 1;
                    width = if w < width { w } else { w + 1 };
                    continue;
                }
            } else if width < 17 {
                let border = (0xffff >> (17 - width)) - 8;
                if v > border && v <= border + 16 {
                    let w = v - border;
                    width = if w < width { w } else { w + 1 };
                    continue;
                }
            } else if v & 0x10000 != 0 {
                width = v - 0xffff;
                continue;
            }

            let s = if width < 16 {
                let shift = 16 - width;
                (((v << shift) as u16 as i16) >> shift) as u16
            } else {
                v as u16
            };
            d1 = d1.wrapping_add(s);
            d2 = d2.wrapping_add(d1);
            let x = if it215 { d2 } else { d1 };
            out.extend_from_slice(&x.to_le_bytes());
            n += 1;
        }
        done += count;
    }

    Ok((out, pos - ofs))
}
