//! LDraw color codes.
//!
//! The core never maps a code to an actual display color: that is the job of
//! a material layer reading `LDConfig.ldr`. It only threads codes through the
//! reference tree and replaces the inherit sentinels with the enclosing color.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Code meaning "use the color of the referencing context".
pub const INHERIT_CODE: u32 = 16;

/// Code meaning "use the edge color of the referencing context".
pub const EDGE_CODE: u32 = 24;

/// Inclusive range of direct RGB colors (`0x2RRGGBB`).
const DIRECT_MIN: u32 = 0x0200_0000;
const DIRECT_MAX: u32 = 0x02FF_FFFF;

/// A color code as found on LDraw line types 1 to 5.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColorCode {
    /// An index into the palette defined by the color table.
    Palette(u32),

    /// Code 16.
    #[default]
    Inherit,

    /// Code 24. Treated like `Inherit` when resolving the tree.
    Edge,

    /// A literal RGB value encoded as `0x2RRGGBB`.
    Direct { r: u8, g: u8, b: u8 },
}

impl ColorCode {
    /// Build a code from its numeric value.
    pub fn from_code(code: u32) -> Self {
        match code {
            INHERIT_CODE => ColorCode::Inherit,
            EDGE_CODE => ColorCode::Edge,
            DIRECT_MIN..=DIRECT_MAX => ColorCode::Direct {
                r: ((code >> 16) & 0xFF) as u8,
                g: ((code >> 8) & 0xFF) as u8,
                b: (code & 0xFF) as u8,
            },
            other => ColorCode::Palette(other),
        }
    }

    /// The numeric value of this code.
    pub fn code(&self) -> u32 {
        match *self {
            ColorCode::Palette(code) => code,
            ColorCode::Inherit => INHERIT_CODE,
            ColorCode::Edge => EDGE_CODE,
            ColorCode::Direct { r, g, b } => {
                DIRECT_MIN | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
            }
        }
    }

    /// True for codes 16 and 24.
    pub fn is_inherited(&self) -> bool {
        matches!(self, ColorCode::Inherit | ColorCode::Edge)
    }

    /// Substitute `enclosing` when this code is inherit-like.
    pub fn resolve(self, enclosing: ColorCode) -> ColorCode {
        if self.is_inherited() {
            enclosing
        } else {
            self
        }
    }
}

/// Error returned when a color token is not a number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color code '{0}'")]
pub struct InvalidColorCode(pub String);

impl FromStr for ColorCode {
    type Err = InvalidColorCode;

    /// Parse decimal (`4`) or hexadecimal (`0x2FF0000`) tokens.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let parsed = match token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => token.parse::<u32>(),
        };

        parsed
            .map(ColorCode::from_code)
            .map_err(|_| InvalidColorCode(token.to_string()))
    }
}

impl TryFrom<String> for ColorCode {
    type Error = InvalidColorCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColorCode> for String {
    fn from(code: ColorCode) -> Self {
        code.to_string()
    }
}

impl fmt::Display for ColorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorCode::Direct { .. } => write!(f, "0x{:07X}", self.code()),
            _ => write!(f, "{}", self.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sentinels() {
        assert_eq!("16".parse::<ColorCode>().unwrap(), ColorCode::Inherit);
        assert_eq!("24".parse::<ColorCode>().unwrap(), ColorCode::Edge);
        assert_eq!("4".parse::<ColorCode>().unwrap(), ColorCode::Palette(4));
    }

    #[test]
    fn test_parse_direct_color() {
        let code: ColorCode = "0x2FF8000".parse().unwrap();
        assert_eq!(code, ColorCode::Direct { r: 0xFF, g: 0x80, b: 0x00 });
        assert_eq!(code.to_string(), "0x2FF8000");

        // Same value written in decimal.
        let decimal: ColorCode = 0x2FF8000u32.to_string().parse().unwrap();
        assert_eq!(decimal, code);
    }

    #[test]
    fn test_parse_invalid() {
        assert!("red".parse::<ColorCode>().is_err());
        assert!("-1".parse::<ColorCode>().is_err());
        assert!("".parse::<ColorCode>().is_err());
    }

    #[test]
    fn test_resolve() {
        let parent = ColorCode::Palette(7);
        assert_eq!(ColorCode::Inherit.resolve(parent), parent);
        assert_eq!(ColorCode::Edge.resolve(parent), parent);
        assert_eq!(ColorCode::Palette(4).resolve(parent), ColorCode::Palette(4));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ColorCode::Palette(71)).unwrap();
        assert_eq!(json, "\"71\"");
        let back: ColorCode = serde_json::from_str("\"0x2000000\"").unwrap();
        assert_eq!(back, ColorCode::Direct { r: 0, g: 0, b: 0 });
    }
}
