/// Volume on the 0..=64 scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Volume(pub u8);

impl Volume {
    pub fn value(&self) -> Option<f32> {
        if self.0 <= 64 { Some(self.0 as f32 / 64.0) } else { None }
    }
}

/// Volume on the 0..=128 scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FineVolume(pub u8);

impl FineVolume {
    pub fn value(&self) -> Option<f32> {
        if self.0 <= 128 { Some(self.0 as f32 / 128.0) } else { None }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanSeparation(pub u8);

impl PanSeparation {
    pub fn value(&self) -> Option<f32> {
        if self.0 <= 128 { Some(self.0 as f32 / 128.0) } else { None }
    }
}

fn pan_value(p: u8) -> Option<f32> {
    match p & 0x7f {
        pv @ 0..=64 => Some(pv as f32 / 64.0),
        100         => Some(0.5),
        _           => None,
    }
}

/// Channel pan. Bit 7 set means the channel is disabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanValue(pub u8);

impl PanValue {
    pub fn is_surround(&self) -> bool {
        self.0 & 0x7f == 100
    }

    pub fn is_disabled(&self) -> bool {
        self.0 & 0x80 != 0
    }

    pub fn value(&self) -> Option<f32> {
        pan_value(self.0)
    }
}

/// Sample default pan. Bit 7 set means the pan is used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SamplePanValue(pub u8);

impl SamplePanValue {
    pub fn is_surround(&self) -> bool {
        self.0 & 0x7f == 100
    }

    pub fn is_disabled(&self) -> bool {
        self.0 & 0x80 == 0
    }

    pub fn value(&self) -> Option<f32> {
        pan_value(self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Percentage8(pub u8);

impl Percentage8 {
    pub fn value(&self) -> f32 {
        self.0 as f32 / 100.0
    }
}

/// Note number: 0..=119 are C-0..B-9, 254 is cut, 255 is off, the rest fade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Note(pub u8);

impl Note {
    pub fn is_note_off(&self) -> bool {
        self.0 == 255
    }

    pub fn is_note_cut(&self) -> bool {
        self.0 == 254
    }

    pub fn is_note_fade(&self) -> bool {
        self.0 >= 120 && self.0 < 254
    }

    pub fn is_special(&self) -> bool {
        self.0 >= 120
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoteSample {
    pub note  : Note,
    pub sample: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NewNoteAction {
    Cut,
    Continue,
    Off,
    Fade,
}

impl NewNoteAction {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(NewNoteAction::Cut),
            1 => Some(NewNoteAction::Continue),
            2 => Some(NewNoteAction::Off),
            3 => Some(NewNoteAction::Fade),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicateCheckType {
    Off,
    Note,
    Sample,
    Instrument,
}

impl DuplicateCheckType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(DuplicateCheckType::Off),
            1 => Some(DuplicateCheckType::Note),
            2 => Some(DuplicateCheckType::Sample),
            3 => Some(DuplicateCheckType::Instrument),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicateCheckAction {
    Cut,
    Off,
    Fade,
}

impl DuplicateCheckAction {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(DuplicateCheckAction::Cut),
            1 => Some(DuplicateCheckAction::Off),
            2 => Some(DuplicateCheckAction::Fade),
            _ => None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volumes() {
        assert_eq!(Volume(32).value(), Some(0.5));
        assert_eq!(Volume(65).value(), None);
        assert_eq!(FineVolume(128).value(), Some(1.0));
        assert_eq!(FineVolume(129).value(), None);
        assert_eq!(PanSeparation(64).value(), Some(0.5));
        assert_eq!(Percentage8(25).value(), 0.25);
    }

    #[test]
    fn test_pan_value() {
        assert_eq!(PanValue(32).value(), Some(0.5));
        assert!(!PanValue(32).is_disabled());
        assert!(PanValue(0xa0).is_disabled());
        assert_eq!(PanValue(0xa0).value(), Some(0.5));
        assert!(PanValue(100).is_surround());
        assert_eq!(PanValue(100).value(), Some(0.5));
        assert_eq!(PanValue(80).value(), None);

        assert!(SamplePanValue(32).is_disabled());
        assert!(!SamplePanValue(0x80 | 64).is_disabled());
        assert_eq!(SamplePanValue(0x80 | 64).value(), Some(1.0));
    }

    #[test]
    fn test_note() {
        assert!(Note(255).is_note_off());
        assert!(Note(254).is_note_cut());
        assert!(Note(120).is_note_fade());
        assert!(Note(253).is_note_fade());
        assert!(!Note(254).is_note_fade());
        assert!(!Note(119).is_special());
        assert!(Note(120).is_special());
    }

    #[test]
    fn test_enums() {
        assert_eq!(NewNoteAction::from_u8(3), Some(NewNoteAction::Fade));
        assert_eq!(NewNoteAction::from_u8(4), None);
        assert_eq!(DuplicateCheckType::from_u8(2), Some(DuplicateCheckType::Sample));
        assert_eq!(DuplicateCheckAction::from_u8(3), None);
    }
}
