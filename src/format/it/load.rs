use crate::format::{Format, Loader, ProbeInfo};
use crate::format::it::{self, block, HistoryEntry, Instrument, ItData, ItHeader, ItPattern, ItSample};
use crate::format::it::{FineVolume, HeaderFlags, PanSeparation, PanValue, SpecialFlags, Volume};
use crate::format::pointer::{ParaPointer32, Pointer, Watermark};
use crate::module::Module;
use crate::util::{self, BinaryRead};
use crate::Error;

/// Impulse Tracker module loader
pub struct ItLoader;

impl Loader for ItLoader {
    fn name(&self) -> &'static str {
        "Impulse Tracker IT"
    }

    fn probe(&self, b: &[u8]) -> Result<ProbeInfo, Error> {
        if b.len() < it::HEADER_SIZE {
            return Err(Error::InvalidFormat(format!("file too short ({})", b.len())));
        }

        if b.slice(0, 4)? == b"IMPM" {
            Ok(ProbeInfo{format: Format::It, title: b.read_string(4, 26)?})
        } else {
            Err(Error::InvalidFormat("bad magic".to_owned()))
        }
    }

    fn load(self: Box<Self>, b: &[u8], info: ProbeInfo) -> Result<Module, Error> {
        if info.format != Format::It {
            return Err(Error::InvalidFormat("unsupported format".to_owned()));
        }
        Ok(Module::It(read(b)?))
    }
}

fn read_header(b: &[u8]) -> Result<ItHeader, Error> {
    if b.slice(0, 4)? != b"IMPM" {
        return Err(Error::InvalidFormat("missing IMPM signature".to_owned()));
    }

    let mut channel_pan = [PanValue(0); it::MAX_CHANNELS];
    let mut channel_volume = [Volume(0); it::MAX_CHANNELS];
    for i in 0..it::MAX_CHANNELS {
        channel_pan[i] = PanValue(b.read8(0x40 + i)?);
        channel_volume[i] = Volume(b.read8(0x80 + i)?);
    }

    Ok(ItHeader {
        song_name        : b.read_string(4, 26)?,
        highlight_minor  : b.read8(0x1e)?,
        highlight_major  : b.read8(0x1f)?,
        ord_num          : b.read16l(0x20)?,
        ins_num          : b.read16l(0x22)?,
        smp_num          : b.read16l(0x24)?,
        pat_num          : b.read16l(0x26)?,
        cwt_v            : b.read16l(0x28)?,
        cmwt             : b.read16l(0x2a)?,
        flags            : HeaderFlags::from_bits_truncate(b.read16l(0x2c)?),
        special          : SpecialFlags::from_bits_truncate(b.read16l(0x2e)?),
        global_volume    : FineVolume(b.read8(0x30)?),
        mix_volume       : FineVolume(b.read8(0x31)?),
        initial_speed    : b.read8(0x32)?,
        initial_tempo    : b.read8(0x33)?,
        separation       : PanSeparation(b.read8(0x34)?),
        pitch_wheel_depth: b.read8(0x35)?,
        message_length   : b.read16l(0x36)?,
        message_offset   : b.read32l(0x38)?,
        channel_pan,
        channel_volume,
    })
}

// Returns the entries and the bytes they span, or nothing when the declared
// history does not fit in the file.
fn read_history(b: &[u8], ofs: usize) -> Result<(Vec<HistoryEntry>, usize), Error> {
    let num = b.read16l(ofs)? as usize;
    let size = 2 + num * HistoryEntry::SIZE;
    if ofs + size >= b.len() {
        warn!("history of {} entries at {:#x} exceeds file size, ignored", num, ofs);
        return Ok((Vec::new(), 0));
    }

    let history = (0..num)
        .map(|i| {
            let p = ofs + 2 + i * HistoryEntry::SIZE;
            Ok(HistoryEntry {
                fat_date: b.read16l(p)?,
                fat_time: b.read16l(p + 2)?,
                run_time: b.read32l(p + 4)?,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok((history, size))
}

fn read_message(b: &[u8], h: &ItHeader) -> Result<Option<String>, Error> {
    if !h.special.contains(SpecialFlags::MESSAGE) || h.message_length == 0 {
        return Ok(None);
    }
    let text = b.slice(h.message_offset as usize, h.message_length as usize)?;
    Ok(Some(util::fixed_string(text).replace('\r', "\n")))
}

/// The record at `ofs` up to the end of the buffer.
fn tail(b: &[u8], ofs: usize) -> Result<&[u8], Error> {
    b.get(ofs..).ok_or(Error::TruncatedInput { ofs, size: 0, len: b.len() })
}

/// Decodes an IT file.
pub fn read(b: &[u8]) -> Result<ItData, Error> {
    let header = read_header(b)?;
    let ord_num = header.ord_num as usize;
    let ins_num = header.ins_num as usize;
    let smp_num = header.smp_num as usize;
    let pat_num = header.pat_num as usize;
    debug!("IT: {} orders, {} instruments, {} samples, {} patterns, cwt {:#06x}, cmwt {:#06x}",
           ord_num, ins_num, smp_num, pat_num, header.cwt_v, header.cmwt);

    // Orders
    let orders = b.slice(it::HEADER_SIZE, ord_num)?.to_vec();

    // Instrument, sample and pattern pointers
    let mut ofs = it::HEADER_SIZE + ord_num;
    let instrument_pp = ParaPointer32::read_table(b, ofs, ins_num)?;
    ofs += 4 * ins_num;
    let sample_pp = ParaPointer32::read_table(b, ofs, smp_num)?;
    ofs += 4 * smp_num;
    let pattern_pp = ParaPointer32::read_table(b, ofs, pat_num)?;
    ofs += 4 * pat_num;

    let mut history = Vec::new();
    if header.special.contains(SpecialFlags::HISTORY) {
        let (entries, size) = read_history(b, ofs)?;
        history = entries;
        ofs += size;
    }

    let mut midi_config = None;
    if header.special.contains(SpecialFlags::EMBED_MIDI) {
        if ofs + it::MIDI_CONFIG_SIZE <= b.len() {
            midi_config = Some(b.slice(ofs, it::MIDI_CONFIG_SIZE)?.to_vec());
            ofs += it::MIDI_CONFIG_SIZE;
        } else {
            warn!("embedded MIDI configuration at {:#x} exceeds file size, ignored", ofs);
        }
    }

    let (blocks, valid_from) = block::read_blocks(b, ofs);
    debug!("{} extension blocks, data starts at {:#x}", blocks.len(), valid_from);
    let watermark = Watermark::new(valid_from);

    let message = read_message(b, &header)?;

    // Load instruments
    let mut instruments = Vec::<Instrument>::with_capacity(ins_num);
    for (i, pp) in instrument_pp.iter().enumerate() {
        let ofs = watermark.check("instrument", pp)?;
        trace!("instrument {} at {:#x}", i, ofs);
        instruments.push(Instrument::from_slice(tail(b, ofs)?, header.cmwt)?);
    }

    // Load samples
    let mut samples = Vec::<ItSample>::with_capacity(smp_num);
    for (i, pp) in sample_pp.iter().enumerate() {
        let ofs = watermark.check("sample", pp)?;
        let mut smp = ItSample::from_slice(tail(b, ofs)?)?;
        trace!("sample {} at {:#x}: {} bytes{}", i, ofs, smp.data_size(),
               if smp.is_compressed() { ", compressed" } else { "" });
        smp.load_data(b, &watermark)?;
        samples.push(smp);
    }

    // Load patterns
    let mut patterns = Vec::<ItPattern>::with_capacity(pat_num);
    for (i, pp) in pattern_pp.iter().enumerate() {
        if pp.is_null() {
            patterns.push(ItPattern::empty());
            continue;
        }
        let ofs = watermark.check("pattern", pp)?;
        let pat = ItPattern::from_slice(b, ofs)?;
        trace!("pattern {} at {:#x}: {} rows, {} bytes", i, ofs, pat.rows, pat.length);
        patterns.push(pat);
    }

    let mut channels = 1;
    for pat in &patterns {
        channels = channels.max(pat.channels_used()?);
    }

    Ok(ItData{
        header,
        orders,
        instrument_pp,
        sample_pp,
        pattern_pp,
        history,
        midi_config,
        blocks,
        message,
        instruments,
        samples,
        patterns,
        channels,
    })
}
