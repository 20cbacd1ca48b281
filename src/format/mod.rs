use std::fmt;
use std::io::Read;
use crate::module::Module;
use crate::Error;

pub mod pointer;
pub mod it;
pub mod mk;
pub mod s3m;
pub mod xm;

// Supported formats

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Format {
    It,
    Mod,
    S3m,
    Xm,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Format::It  => "Impulse Tracker",
            Format::Mod => "Amiga MOD",
            Format::S3m => "Scream Tracker 3",
            Format::Xm  => "FastTracker II",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProbeInfo {
    pub format: Format,
    pub title : String,
}

// Trait for module loader

pub trait Loader {
    fn name(&self) -> &'static str;
    fn probe(&self, b: &[u8]) -> Result<ProbeInfo, Error>;
    fn load(self: Box<Self>, b: &[u8], info: ProbeInfo) -> Result<Module, Error>;
}


pub fn list() -> Vec<Box<dyn Loader>> {
    vec![
        Box::new(it::ItLoader),
        Box::new(xm::XmLoader),
        Box::new(s3m::S3mLoader),
        Box::new(mk::ModLoader),
    ]
}

/// Identifies the format of `b` and decodes it.
pub fn load(b: &[u8]) -> Result<Module, Error> {

    for f in list() {
        debug!("probing format: {}", f.name());

        let info = match f.probe(b) {
            Ok(val) => val,
            Err(e)  => { trace!("{}: {}", f.name(), e); continue },
        };

        debug!("probe ok, load format {:?}", info.format);
        return f.load(b, info)
    }

    Err(Error::InvalidFormat("unsupported module format".to_owned()))
}

/// Reads the whole source into memory and decodes it.
pub fn load_from<R: Read>(mut r: R) -> Result<Module, Error> {
    let mut b = Vec::new();
    r.read_to_end(&mut b)?;
    load(&b)
}
