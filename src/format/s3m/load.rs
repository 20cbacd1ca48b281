use crate::format::{Format, Loader, ProbeInfo};
use crate::format::pointer::{ParaPointer16, Pointer, Watermark};
use crate::format::s3m::{self, S3mData, S3mHeader, S3mInstrument, S3mPattern, InstrumentKind, Packing};
use crate::module::Module;
use crate::util::BinaryRead;
use crate::Error;

const MAX_COUNT: u16 = 256;

/// Scream Tracker 3 module loader
pub struct S3mLoader;

impl Loader for S3mLoader {
    fn name(&self) -> &'static str {
        "Scream Tracker 3 S3M"
    }

    fn probe(&self, b: &[u8]) -> Result<ProbeInfo, Error> {
        if b.len() < 0x60 {
            return Err(Error::InvalidFormat(format!("file too short ({})", b.len())));
        }

        if b.read8(0x1d)? == 16 && b.slice(0x2c, 4)? == b"SCRM" {
            Ok(ProbeInfo{format: Format::S3m, title: b.read_string(0, 28)?})
        } else {
            Err(Error::InvalidFormat("bad magic".to_owned()))
        }
    }

    fn load(self: Box<Self>, b: &[u8], info: ProbeInfo) -> Result<Module, Error> {
        if info.format != Format::S3m {
            return Err(Error::InvalidFormat("unsupported format".to_owned()));
        }
        Ok(Module::S3m(read(b)?))
    }
}

fn read_header(b: &[u8]) -> Result<S3mHeader, Error> {
    if b.slice(0x2c, 4)? != b"SCRM" {
        return Err(Error::InvalidFormat("missing SCRM signature".to_owned()));
    }

    let mut ch_settings = [0; 32];
    ch_settings.copy_from_slice(b.slice(0x40, 32)?);

    let h = S3mHeader {
        song_name: b.read_string(0, 28)?,
        typ      : b.read8(0x1d)?,
        ord_num  : b.read16l(0x20)?,
        ins_num  : b.read16l(0x22)?,
        pat_num  : b.read16l(0x24)?,
        flags    : b.read16l(0x26)?,
        cwt_v    : b.read16l(0x28)?,
        ffi      : b.read16l(0x2a)?,
        g_v      : b.read8(0x30)?,
        i_s      : b.read8(0x31)?,
        i_t      : b.read8(0x32)?,
        m_v      : b.read8(0x33)?,
        u_c      : b.read8(0x34)?,
        d_p      : b.read8(0x35)?,
        special  : ParaPointer16::read(b, 0x3e)?,
        ch_settings,
    };

    if h.typ != 16 {
        return Err(Error::InvalidFormat(format!("bad file type {}", h.typ)));
    }

    for &(what, n) in &[("orders", h.ord_num), ("instruments", h.ins_num), ("patterns", h.pat_num)] {
        if n > MAX_COUNT {
            return Err(Error::OutOfRangeHeader(format!("{} {} > {}", what, n, MAX_COUNT)));
        }
    }

    Ok(h)
}

/// Decodes an S3M file.
pub fn read(b: &[u8]) -> Result<S3mData, Error> {
    let header = read_header(b)?;
    let ord_num = header.ord_num as usize;
    let ins_num = header.ins_num as usize;
    let pat_num = header.pat_num as usize;
    debug!("S3M: {} orders, {} instruments, {} patterns, cwt {:#06x}",
           ord_num, ins_num, pat_num, header.cwt_v);

    // Orders
    let orders = b.slice(0x60, ord_num)?.to_vec();

    // Instrument and pattern parapointers
    let mut ofs = 0x60 + ord_num;
    let instrum_pp = ParaPointer16::read_table(b, ofs, ins_num)?;
    ofs += 2 * ins_num;
    let pattern_pp = ParaPointer16::read_table(b, ofs, pat_num)?;
    ofs += 2 * pat_num;

    // Channel pan positions
    let ch_pan = if header.d_p == s3m::DEFAULT_PAN_FLAG {
        let mut pan = [0; 32];
        pan.copy_from_slice(b.slice(ofs, 32)?);
        ofs += 32;
        Some(pan)
    } else {
        None
    };

    let watermark = Watermark::new(ofs);

    // Load instruments
    let mut instruments = Vec::<S3mInstrument>::with_capacity(ins_num);
    for (i, pp) in instrum_pp.iter().enumerate() {
        let ofs = watermark.check("instrument", pp)?;
        trace!("instrument {} at {:#x}", i, ofs);
        let mut ins = S3mInstrument::from_slice(b.slice(ofs, s3m::SCRS_SIZE)?)?;

        if let InstrumentKind::Digiplayer(ref mut smp) = ins.kind {
            if smp.length > 0 {
                if smp.packing == Packing::Dp30Adpcm {
                    return Err(Error::UnsupportedVariant(format!("instrument {}: DP30 ADPCM sample", i)));
                }
                let data_ofs = watermark.check("sample", &smp.memseg)?;
                smp.data = b.slice(data_ofs, smp.data_size())?.to_vec();
            }
        }
        instruments.push(ins);
    }

    // Load patterns
    let mut patterns = Vec::<S3mPattern>::with_capacity(pat_num);
    for (i, pp) in pattern_pp.iter().enumerate() {
        if pp.is_null() {
            patterns.push(S3mPattern::empty());
            continue;
        }
        let ofs = watermark.check("pattern", pp)?;
        let length = b.read16l(ofs)?;
        trace!("pattern {} at {:#x}, {} bytes", i, ofs, length);
        let size = (length as usize).saturating_sub(2);
        patterns.push(S3mPattern{ length, data: b.slice(ofs + 2, size)?.to_vec() });
    }

    let channels = header.channels();
    for pat in &patterns {
        pat.unpack(channels)?;
    }

    Ok(S3mData{
        header,
        orders,
        instrum_pp,
        pattern_pp,
        ch_pan,
        instruments,
        patterns,
        channels,
    })
}
