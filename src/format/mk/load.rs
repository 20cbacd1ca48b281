use crate::format::{Format, Loader, ProbeInfo};
use crate::format::mk::{self, ModData, ModInstrument, PatternReader};
use crate::module::Module;
use crate::util::BinaryRead;
use crate::Error;

/// Amiga Protracker/compatible module loader
pub struct ModLoader;

impl Loader for ModLoader {
    fn name(&self) -> &'static str {
        "Amiga Protracker/Compatible"
    }

    fn probe(&self, b: &[u8]) -> Result<ProbeInfo, Error> {
        if b.len() < mk::HEADER_SIZE {
            return Err(Error::InvalidFormat(format!("file too short ({})", b.len())));
        }

        match mk::lookup(b.slice(1080, 4)?) {
            Some(_) => Ok(ProbeInfo{format: Format::Mod, title: b.read_string(0, 20)?}),
            None    => Err(Error::InvalidFormat("bad magic".to_owned())),
        }
    }

    fn load(self: Box<Self>, b: &[u8], info: ProbeInfo) -> Result<Module, Error> {
        if info.format != Format::Mod {
            return Err(Error::InvalidFormat("unsupported format".to_owned()));
        }
        Ok(Module::Mod(read(b)?))
    }
}

/// Decodes a MOD file.
pub fn read(b: &[u8]) -> Result<ModData, Error> {
    let song_name = b.read_string(0, 20)?;

    // Load instruments
    let mut instruments = Vec::<ModInstrument>::new();
    for i in 0..mk::NUM_INSTRUMENTS {
        instruments.push(ModInstrument::from_slice(b.slice(20 + i * 30, 30)?)?);
    }

    // Load orders
    let song_length = b.read8(950)?;
    let restart = b.read8(951)?;
    let mut raw_orders = [0; mk::ORDERS];
    raw_orders.copy_from_slice(b.slice(952, mk::ORDERS)?);

    let sig = b.slice(1080, 4)?;
    let signature = match mk::lookup(sig) {
        Some(s) if s.channels > 0 => s,
        _ => return Err(Error::InvalidFormat(format!("unknown signature {:?}", String::from_utf8_lossy(sig)))),
    };
    let channels = signature.channels;
    let reader = signature.reader;
    debug!("signature {}: {} channels, {:?} patterns", signature.magic, channels, reader);

    let orders = reader.rectify_orders(channels, &raw_orders);
    let num_patterns = orders.iter().map(|&x| x as usize).max().unwrap_or(0) + 1;

    // Load patterns
    let size = PatternReader::pattern_size(channels);
    let mut ofs = mk::HEADER_SIZE;
    let mut patterns = Vec::with_capacity(num_patterns);
    for i in 0..num_patterns {
        trace!("pattern {} at {:#x}", i, ofs);
        patterns.push(reader.read_pattern(b.slice(ofs, size)?, channels)?);
        ofs += size;
    }

    // Load samples
    let mut samples = Vec::<Vec<u8>>::new();
    for ins in &instruments {
        let len = ins.length();
        samples.push(b.slice(ofs, len)?.to_vec());
        ofs += len;
    }

    Ok(ModData{
        song_name,
        instruments,
        song_length,
        restart,
        orders,
        magic: signature.magic.clone(),
        channels,
        reader,
        patterns,
        samples,
    })
}
