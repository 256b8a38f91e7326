/// Handle to a style registered on a [`crate::excel::Workbook`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StyleId(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillPattern {
    Solid,
    LightGray,
    MediumGray,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fill {
    pub pattern: FillPattern,
    /// RGB
    pub foreground: u32,
    /// RGB
    pub background: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style {
    pub bold: bool,
    pub font_color: Option<u32>,
    pub fill: Option<Fill>,
    pub num_format: Option<String>,
}

const ACCENT_1: u32 = 0x4472C4;
const ACCENT_5: u32 = 0x5B9BD5;
const WHITE: u32 = 0xFFFFFF;

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bold white text on a light-gray pattern of accent blues.
    pub fn header() -> Self {
        Self {
            bold: true,
            font_color: Some(WHITE),
            fill: Some(Fill {
                pattern: FillPattern::LightGray,
                foreground: ACCENT_1,
                background: ACCENT_5,
            }),
            num_format: None,
        }
    }

    pub fn is_default(&self) -> bool {
        self == &Self::default()
    }
}
