bitflags! {
    /// Song flags at 0x2c.
    #[derive(Default)]
    pub struct HeaderFlags: u16 {
        const STEREO           = 1 << 0;
        const VOL0_OPTIMIZE    = 1 << 1;
        const USE_INSTRUMENTS  = 1 << 2;
        const LINEAR_SLIDES    = 1 << 3;
        const OLD_EFFECTS      = 1 << 4;
        const LINK_EFG         = 1 << 5;
        const MIDI_PITCH       = 1 << 6;
        const REQ_EMBED_MIDI   = 1 << 7;
    }
}

bitflags! {
    /// Special flags at 0x2e.
    #[derive(Default)]
    pub struct SpecialFlags: u16 {
        const MESSAGE    = 1 << 0;
        const HISTORY    = 1 << 1;
        const HIGHLIGHT  = 1 << 2;
        const EMBED_MIDI = 1 << 3;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SampleFlags: u8 {
        const EXISTS           = 1 << 0;
        const BIT16            = 1 << 1;
        const STEREO           = 1 << 2;
        const COMPRESSED       = 1 << 3;
        const LOOP             = 1 << 4;
        const SUSTAIN_LOOP     = 1 << 5;
        const PINGPONG         = 1 << 6;
        const PINGPONG_SUSTAIN = 1 << 7;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct ConvertFlags: u8 {
        const SIGNED         = 1 << 0;
        const BIG_ENDIAN     = 1 << 1;
        const DELTA          = 1 << 2;  // IT215 when compressed
        const BYTE_DELTA     = 1 << 3;
        const TXWAVE_12BIT   = 1 << 4;
        const CHANNEL_PROMPT = 1 << 5;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct OldInstrumentFlags: u8 {
        const VOLUME_ENVELOPE = 1 << 0;
        const VOLUME_LOOP     = 1 << 1;
        const SUSTAIN_LOOP    = 1 << 2;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct EnvelopeFlags: u8 {
        const ON           = 1 << 0;
        const LOOP         = 1 << 1;
        const SUSTAIN_LOOP = 1 << 2;
        const FILTER       = 1 << 7;  // pitch envelope drives the filter
    }
}

bitflags! {
    /// Field presence in a packed pattern slot.
    #[derive(Default)]
    pub struct ChannelDataFlags: u8 {
        const NOTE            = 1 << 0;
        const INSTRUMENT      = 1 << 1;
        const VOLPAN          = 1 << 2;
        const COMMAND         = 1 << 3;
        const LAST_NOTE       = 1 << 4;
        const LAST_INSTRUMENT = 1 << 5;
        const LAST_VOLPAN     = 1 << 6;
        const LAST_COMMAND    = 1 << 7;
    }
}
