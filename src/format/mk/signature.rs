use crate::format::mk::PatternReader;

/// Channel count and pattern layout selected by a MOD signature.
#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub magic   : String,
    pub channels: usize,
    pub reader  : PatternReader,
}

lazy_static! {
    static ref SIGNATURES: Vec<Signature> = {
        let mut v = vec![
            sig("M.K.", 4, PatternReader::Protracker),
            sig("M!K!", 4, PatternReader::Protracker),
            sig("2CHN", 2, PatternReader::Fasttracker),
            sig("4CHN", 4, PatternReader::Fasttracker),
            sig("6CHN", 6, PatternReader::Fasttracker),
            sig("8CHN", 8, PatternReader::Fasttracker),
            sig("FLT4", 4, PatternReader::Startrekker),
            sig("FLT8", 8, PatternReader::Startrekker),
        ];
        for ch in 10..=32 {
            v.push(Signature{ magic: format!("{}CH", ch), channels: ch, reader: PatternReader::Fasttracker });
        }
        v
    };
}

fn sig(magic: &str, channels: usize, reader: PatternReader) -> Signature {
    Signature{ magic: magic.to_owned(), channels, reader }
}

/// Looks up the four-byte signature stored at offset 1080.
pub fn lookup(magic: &[u8]) -> Option<&'static Signature> {
    SIGNATURES.iter().find(|s| s.magic.as_bytes() == magic)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_signatures() {
        let s = lookup(b"M.K.").unwrap();
        assert_eq!(s.channels, 4);
        assert_eq!(s.reader, PatternReader::Protracker);

        let s = lookup(b"FLT8").unwrap();
        assert_eq!(s.channels, 8);
        assert_eq!(s.reader, PatternReader::Startrekker);

        let s = lookup(b"6CHN").unwrap();
        assert_eq!((s.channels, s.reader), (6, PatternReader::Fasttracker));

        let s = lookup(b"32CH").unwrap();
        assert_eq!((s.channels, s.reader), (32, PatternReader::Fasttracker));
    }

    #[test]
    fn test_unknown_signatures() {
        assert!(lookup(b"9CHN").is_none());
        assert!(lookup(b"33CH").is_none());
        assert!(lookup(b"M&K!").is_none());
        assert!(lookup(b"\0\0\0\0").is_none());
    }
}
