use derive_more::From;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A pixel type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[rustfmt::skip]
pub enum PixelType {
    /// `int8` Integer in `[-2^7, 2^7-1]`.
    Int8,
    /// `uint8` Integer in `[0, 2^8-1]`.
    Uint8,
    /// `int16` Integer in `[-2^15, 2^15-1]`.
    Int16,
    /// `uint16` Integer in `[0, 2^16-1]`.
    Uint16,
    /// `int32` Integer in `[-2^31, 2^31-1]`.
    Int32,
    /// `uint32` Integer in `[0, 2^32-1]`.
    Uint32,
    /// `float` IEEE 754 single-precision floating point.
    Float,
}

/// An unsupported pixel type error.
#[derive(Debug, Error, From)]
#[error("unsupported pixel type {_0}")]
pub struct UnsupportedPixelTypeError(String);

impl PixelType {
    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Float => "float",
        }
    }

    /// Returns the number of bytes per sample.
    #[must_use]
    pub const fn byte_width(&self) -> u64 {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float => 4,
        }
    }
}

impl std::fmt::Display for PixelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for PixelType {
    type Err = UnsupportedPixelTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int8" => Ok(Self::Int8),
            "uint8" => Ok(Self::Uint8),
            "int16" => Ok(Self::Int16),
            "uint16" => Ok(Self::Uint16),
            "int32" => Ok(Self::Int32),
            "uint32" => Ok(Self::Uint32),
            "float" => Ok(Self::Float),
            _ => Err(UnsupportedPixelTypeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_type_byte_width() {
        assert_eq!(PixelType::Int8.byte_width(), 1);
        assert_eq!(PixelType::Uint8.byte_width(), 1);
        assert_eq!(PixelType::Int16.byte_width(), 2);
        assert_eq!(PixelType::Uint16.byte_width(), 2);
        assert_eq!(PixelType::Int32.byte_width(), 4);
        assert_eq!(PixelType::Uint32.byte_width(), 4);
        assert_eq!(PixelType::Float.byte_width(), 4);
    }

    #[test]
    fn pixel_type_names() {
        for pixel_type in [
            PixelType::Int8,
            PixelType::Uint8,
            PixelType::Int16,
            PixelType::Uint16,
            PixelType::Int32,
            PixelType::Uint32,
            PixelType::Float,
        ] {
            assert_eq!(pixel_type.name().parse::<PixelType>().unwrap(), pixel_type);
            assert_eq!(
                serde_json::to_string(&pixel_type).unwrap(),
                format!("\"{pixel_type}\"")
            );
        }
        assert_eq!(
            "double".parse::<PixelType>().unwrap_err().to_string(),
            "unsupported pixel type double"
        );
    }
}
