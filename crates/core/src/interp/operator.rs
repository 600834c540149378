//! Content stream operators.

use crate::parser::Keyword;

/// Every content stream operator, plus `Unknown` for anything else.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    // General graphics state
    q,
    Q,
    cm,
    w,
    J,
    j,
    M,
    d,
    ri,
    i,
    gs,
    // Path construction
    m,
    l,
    c,
    v,
    y,
    h,
    re,
    // Path painting
    S,
    s,
    f,
    F,
    f_star,
    B,
    B_star,
    b,
    b_star,
    n,
    // Clipping
    W,
    W_star,
    // Text objects and state
    BT,
    ET,
    Tc,
    Tw,
    Tz,
    TL,
    Tf,
    Tr,
    Ts,
    // Text positioning
    Td,
    TD,
    Tm,
    T_star,
    // Text showing
    Tj,
    TJ,
    Quote,
    DoubleQuote,
    // Type3 glyph metrics
    d0,
    d1,
    // Color
    CS,
    cs,
    SC,
    SCN,
    sc,
    scn,
    G,
    g,
    RG,
    rg,
    K,
    k,
    // Shading, XObjects, inline images
    sh,
    Do,
    BI,
    ID,
    EI,
    // Marked content
    MP,
    DP,
    BMC,
    BDC,
    EMC,
    // Compatibility
    BX,
    EX,
    Unknown(String),
}

impl Operator {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match bytes {
            b"q" => Self::q,
            b"Q" => Self::Q,
            b"cm" => Self::cm,
            b"w" => Self::w,
            b"J" => Self::J,
            b"j" => Self::j,
            b"M" => Self::M,
            b"d" => Self::d,
            b"ri" => Self::ri,
            b"i" => Self::i,
            b"gs" => Self::gs,
            b"m" => Self::m,
            b"l" => Self::l,
            b"c" => Self::c,
            b"v" => Self::v,
            b"y" => Self::y,
            b"h" => Self::h,
            b"re" => Self::re,
            b"S" => Self::S,
            b"s" => Self::s,
            b"f" => Self::f,
            b"F" => Self::F,
            b"f*" => Self::f_star,
            b"B" => Self::B,
            b"B*" => Self::B_star,
            b"b" => Self::b,
            b"b*" => Self::b_star,
            b"n" => Self::n,
            b"W" => Self::W,
            b"W*" => Self::W_star,
            b"BT" => Self::BT,
            b"ET" => Self::ET,
            b"Tc" => Self::Tc,
            b"Tw" => Self::Tw,
            b"Tz" => Self::Tz,
            b"TL" => Self::TL,
            b"Tf" => Self::Tf,
            b"Tr" => Self::Tr,
            b"Ts" => Self::Ts,
            b"Td" => Self::Td,
            b"TD" => Self::TD,
            b"Tm" => Self::Tm,
            b"T*" => Self::T_star,
            b"Tj" => Self::Tj,
            b"TJ" => Self::TJ,
            b"'" => Self::Quote,
            b"\"" => Self::DoubleQuote,
            b"d0" => Self::d0,
            b"d1" => Self::d1,
            b"CS" => Self::CS,
            b"cs" => Self::cs,
            b"SC" => Self::SC,
            b"SCN" => Self::SCN,
            b"sc" => Self::sc,
            b"scn" => Self::scn,
            b"G" => Self::G,
            b"g" => Self::g,
            b"RG" => Self::RG,
            b"rg" => Self::rg,
            b"K" => Self::K,
            b"k" => Self::k,
            b"sh" => Self::sh,
            b"Do" => Self::Do,
            b"BI" => Self::BI,
            b"ID" => Self::ID,
            b"EI" => Self::EI,
            b"MP" => Self::MP,
            b"DP" => Self::DP,
            b"BMC" => Self::BMC,
            b"BDC" => Self::BDC,
            b"EMC" => Self::EMC,
            b"BX" => Self::BX,
            b"EX" => Self::EX,
            other => Self::Unknown(String::from_utf8_lossy(other).into_owned()),
        }
    }

    pub fn from_keyword(kw: &Keyword) -> Self {
        Self::from_bytes(kw.as_bytes())
    }

    /// Operator name as it appears in content streams.
    pub fn name(&self) -> &str {
        match self {
            Self::f_star => "f*",
            Self::B_star => "B*",
            Self::b_star => "b*",
            Self::W_star => "W*",
            Self::T_star => "T*",
            Self::Quote => "'",
            Self::DoubleQuote => "\"",
            Self::Unknown(name) => name,
            Self::q => "q",
            Self::Q => "Q",
            Self::cm => "cm",
            Self::w => "w",
            Self::J => "J",
            Self::j => "j",
            Self::M => "M",
            Self::d => "d",
            Self::ri => "ri",
            Self::i => "i",
            Self::gs => "gs",
            Self::m => "m",
            Self::l => "l",
            Self::c => "c",
            Self::v => "v",
            Self::y => "y",
            Self::h => "h",
            Self::re => "re",
            Self::S => "S",
            Self::s => "s",
            Self::f => "f",
            Self::F => "F",
            Self::B => "B",
            Self::b => "b",
            Self::n => "n",
            Self::W => "W",
            Self::BT => "BT",
            Self::ET => "ET",
            Self::Tc => "Tc",
            Self::Tw => "Tw",
            Self::Tz => "Tz",
            Self::TL => "TL",
            Self::Tf => "Tf",
            Self::Tr => "Tr",
            Self::Ts => "Ts",
            Self::Td => "Td",
            Self::TD => "TD",
            Self::Tm => "Tm",
            Self::Tj => "Tj",
            Self::TJ => "TJ",
            Self::d0 => "d0",
            Self::d1 => "d1",
            Self::CS => "CS",
            Self::cs => "cs",
            Self::SC => "SC",
            Self::SCN => "SCN",
            Self::sc => "sc",
            Self::scn => "scn",
            Self::G => "G",
            Self::g => "g",
            Self::RG => "RG",
            Self::rg => "rg",
            Self::K => "K",
            Self::k => "k",
            Self::sh => "sh",
            Self::Do => "Do",
            Self::BI => "BI",
            Self::ID => "ID",
            Self::EI => "EI",
            Self::MP => "MP",
            Self::DP => "DP",
            Self::BMC => "BMC",
            Self::BDC => "BDC",
            Self::EMC => "EMC",
            Self::BX => "BX",
            Self::EX => "EX",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for name in ["q", "f*", "T*", "'", "\"", "SCN", "BDC", "d1", "sh"] {
            assert_eq!(Operator::from_bytes(name.as_bytes()).name(), name);
        }
    }

    #[test]
    fn unknown_keeps_its_name() {
        let op = Operator::from_bytes(b"zz");
        assert_eq!(op, Operator::Unknown("zz".into()));
        assert_eq!(op.name(), "zz");
    }
}
