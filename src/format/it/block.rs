use crate::util::{self, BinaryRead};
use crate::Error;

pub const PNAM: u32 = magic4!('P', 'N', 'A', 'M');
pub const IMPI: u32 = magic4!('I', 'M', 'P', 'I');

const FX_FAMILY: u32 = 0x4658;  // "FX" followed by two id bytes
const PATTERN_NAME_SIZE: usize = 32;
const FX_HEADER_SIZE: usize = 140;

/// Plugin setup stored in an `FXnn` block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FxPlugin {
    pub plugin_type   : [u8; 4],
    pub unique_id     : [u8; 4],
    pub routing       : u8,
    pub mix           : u8,
    pub gain          : u8,
    pub output_routing: u32,
    pub user_name     : String,
    pub library_name  : String,
    pub data          : Vec<u8>,
}

impl FxPlugin {
    /// Gain factor, stored in tenths.
    pub fn gain_value(&self) -> f32 {
        self.gain as f32 / 10.0
    }

    fn from_slice(b: &[u8], ofs: usize) -> Result<Self, Error> {
        let mut plugin_type = [0; 4];
        let mut unique_id = [0; 4];
        plugin_type.copy_from_slice(b.slice(ofs + 8, 4)?);
        unique_id.copy_from_slice(b.slice(ofs + 12, 4)?);
        let data_len = b.read32l(ofs + 136)? as usize;

        Ok(FxPlugin {
            plugin_type,
            unique_id,
            routing       : b.read8(ofs + 16)?,
            mix           : b.read8(ofs + 17)?,
            gain          : b.read8(ofs + 18)?,
            output_routing: b.read32l(ofs + 20)?,
            user_name     : b.read_string(ofs + 40, 32)?,
            library_name  : b.read_string(ofs + 72, 64)?,
            data          : b.slice(ofs + FX_HEADER_SIZE, data_len)?.to_vec(),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum BlockData {
    PatternNames(Vec<String>),
    Fx(FxPlugin),
    Unknown(Vec<u8>),
}

/// Tagged extension block found between the pointer tables and the first
/// instrument.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub tag : u32,
    pub len : u32,
    pub data: BlockData,
}

impl Block {
    /// Reads the block at `ofs`. The tag is stored big-endian, the length
    /// little-endian.
    pub fn from_slice(b: &[u8], ofs: usize) -> Result<Self, Error> {
        let tag = b.read32b(ofs)?;
        let len = b.read32l(ofs + 4)?;

        let data = if tag == PNAM {
            let names = b.slice(ofs + 8, len as usize)?
                .chunks(PATTERN_NAME_SIZE)
                .map(util::fixed_string)
                .collect();
            BlockData::PatternNames(names)
        } else if tag >> 16 == FX_FAMILY {
            BlockData::Fx(FxPlugin::from_slice(b, ofs)?)
        } else {
            BlockData::Unknown(b.slice(ofs + 8, len as usize)?.to_vec())
        };

        Ok(Block { tag, len, data })
    }

    /// Total size including the 8-byte tag and length prefix.
    pub fn size(&self) -> Option<usize> {
        (self.len as usize).checked_add(8)
    }

    pub fn tag_string(&self) -> String {
        self.tag.to_be_bytes().iter().map(|&c| if c.is_ascii_graphic() { c as char } else { '.' }).collect()
    }
}

/// Reads consecutive blocks starting at `ofs`.
///
/// The chain ends at the first instrument header, at a block that does not
/// fit in the buffer, or when fewer than 4 bytes remain. Returns the blocks
/// and the offset just past the last one that ends inside the buffer.
pub fn read_blocks(b: &[u8], ofs: usize) -> (Vec<Block>, usize) {
    let mut blocks = Vec::new();
    let mut valid_from = ofs;
    let mut next = ofs;

    while next.saturating_add(4) <= b.len() {
        let blk = match Block::from_slice(b, next) {
            Ok(blk) => blk,
            Err(e)  => { debug!("block chain ends at {:#x}: {}", next, e); break }
        };
        if blk.tag == IMPI {
            break
        }
        let size = match blk.size() {
            Some(size) if size >= 8 => size,
            _ => break,
        };
        trace!("block {} at {:#x}, {} bytes", blk.tag_string(), next, size);
        blocks.push(blk);

        next += size;
        if next < b.len() {
            valid_from = next;
        }
    }

    (blocks, valid_from)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn block(tag: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut b = tag.to_vec();
        b.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        b.extend_from_slice(payload);
        b
    }

    #[test]
    fn test_pattern_names() {
        let mut payload = vec![0u8; 40];
        payload[..5].copy_from_slice(b"intro");
        payload[32..36].copy_from_slice(b"bass");
        let b = block(b"PNAM", &payload);
        let blk = Block::from_slice(&b, 0).unwrap();
        assert_eq!(blk.tag_string(), "PNAM");
        assert_eq!(blk.size(), Some(48));
        assert_eq!(blk.data, BlockData::PatternNames(vec!["intro".to_owned(), "bass".to_owned()]));
    }

    #[test]
    fn test_fx_block() {
        let mut payload = vec![0u8; FX_HEADER_SIZE - 8 + 3];
        payload[..4].copy_from_slice(b"PtsV");
        payload[10] = 25;
        payload[32..38].copy_from_slice(b"reverb");
        payload[128] = 3;
        payload[132..].copy_from_slice(&[1, 2, 3]);
        let b = block(b"FX00", &payload);
        match Block::from_slice(&b, 0).unwrap().data {
            BlockData::Fx(fx) => {
                assert_eq!(&fx.plugin_type, b"PtsV");
                assert_eq!(fx.gain_value(), 2.5);
                assert_eq!(fx.user_name, "reverb");
                assert_eq!(fx.data, vec![1, 2, 3]);
            }
            _ => panic!("not an FX block"),
        }
    }

    #[test]
    fn test_chain_stops_at_instrument() {
        let mut b = block(b"PNAM", &[0u8; 32]);
        b.extend(block(b"XTPM", &[0u8; 12]));
        let end = b.len();
        b.extend_from_slice(b"IMPI");
        b.extend_from_slice(&[0u8; 60]);

        let (blocks, valid_from) = read_blocks(&b, 0);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].data, BlockData::Unknown(vec![0; 12]));
        assert_eq!(valid_from, end);
    }

    #[test]
    fn test_chain_stops_at_oversized_block() {
        let mut b = block(b"CNAM", &[0u8; 4]);
        b.extend_from_slice(b"XXXX");
        b.extend_from_slice(&1000_u32.to_le_bytes());
        b.extend_from_slice(&[0u8; 8]);

        let (blocks, valid_from) = read_blocks(&b, 0);
        assert_eq!(blocks.len(), 1);
        assert_eq!(valid_from, 12);
    }

    #[test]
    fn test_chain_ending_at_buffer_end() {
        let b = block(b"CNAM", &[0u8; 4]);
        let (blocks, valid_from) = read_blocks(&b, 0);
        assert_eq!(blocks.len(), 1);
        assert_eq!(valid_from, 0);

        let (blocks, valid_from) = read_blocks(&b[..3], 0);
        assert!(blocks.is_empty());
        assert_eq!(valid_from, 0);
    }
}
