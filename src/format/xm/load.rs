use crate::format::{Format, Loader, ProbeInfo};
use crate::format::xm::{self, XmData, XmHeader, XmInstrument, XmPattern, PatternHeader};
use crate::module::Module;
use crate::util::BinaryRead;
use crate::Error;

/// FastTracker 2 module loader
pub struct XmLoader;

impl Loader for XmLoader {
    fn name(&self) -> &'static str {
        "FastTracker II XM"
    }

    fn probe(&self, b: &[u8]) -> Result<ProbeInfo, Error> {
        if b.len() < xm::HEADER_OFFSET + 4 {
            return Err(Error::InvalidFormat(format!("file too short ({})", b.len())));
        }

        if b.slice(0, 17)? == xm::ID_TEXT.as_bytes() {
            Ok(ProbeInfo{format: Format::Xm, title: b.read_string(17, 20)?})
        } else {
            Err(Error::InvalidFormat("bad magic".to_owned()))
        }
    }

    fn load(self: Box<Self>, b: &[u8], info: ProbeInfo) -> Result<Module, Error> {
        if info.format != Format::Xm {
            return Err(Error::InvalidFormat("unsupported format".to_owned()));
        }
        Ok(Module::Xm(read(b)?))
    }
}

/// Decodes an XM file.
pub fn read(b: &[u8]) -> Result<XmData, Error> {
    let header = XmHeader::from_slice(b)?;
    let version = header.version;
    let channels = header.channels as usize;
    debug!("XM v{}.{:02} by {:?}: {} channels, {} patterns, {} instruments",
           version >> 8, version & 0xff, header.tracker_name, channels, header.patterns, header.instruments);

    let mut ofs = header.data_offset();
    let mut patterns = Vec::<XmPattern>::with_capacity(header.patterns as usize);
    for i in 0..header.patterns as usize {
        let ph = PatternHeader::from_slice(b, ofs, version)?;
        let start = ofs + ph.length as usize;
        let packed = b.slice(start, ph.packed_size as usize)?.to_vec();
        trace!("pattern {} at {:#x}: {} rows, {} bytes", i, ofs, ph.rows, ph.packed_size);
        ofs = start + ph.packed_size as usize;
        patterns.push(XmPattern::new(ph, packed, channels)?);
    }

    let mut instruments = Vec::<XmInstrument>::with_capacity(header.instruments as usize);
    for i in 0..header.instruments as usize {
        let (ins, size) = XmInstrument::from_slice(b, ofs)?;
        trace!("instrument {} at {:#x}: {} samples", i, ofs, ins.samples.len());
        ofs += size;
        instruments.push(ins);
    }

    Ok(XmData{
        header,
        patterns,
        instruments,
    })
}
