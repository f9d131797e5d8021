//! Owned still-image buffer and its format metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ImageError};

/// Length of the fixed region the raw-pixel capture format attaches to every
/// raw RGB buffer.
///
/// The region sits at the *end* of the buffer: a raw capture is laid out as
/// `width * height * 3` pixel bytes followed by these 54 bytes, and
/// [`strip_header`](crate::transform::strip_header) removes the trailing
/// bytes. It is called a header throughout the API for compatibility with
/// the camera's own naming.
// NOTE: whether the camera ever places this region in front of the pixels is
// unconfirmed; trailing removal matches every capture observed so far.
pub const CAPTURE_TRAILER_LEN: usize = 54;

/// Bytes per pixel in a raw RGB buffer.
pub const RGB_CHANNELS: usize = 3;

/// Image encoding of a captured buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Encoding {
    /// PNG, compressed, header always present.
    Png,
    /// JPEG, compressed, header always present.
    Jpeg,
    /// Packed 24-bit RGB rows with a removable capture trailer.
    RawRgb,
}

impl Encoding {
    /// Canonical name, also used as the file extension for compressed encodings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::RawRgb => "rgb",
        }
    }

    /// Extension a saved file must carry, or `None` when any extension is accepted.
    #[must_use]
    pub const fn file_extension(self) -> Option<&'static str> {
        match self {
            Self::Png => Some("png"),
            Self::Jpeg => Some("jpeg"),
            Self::RawRgb => None,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "png" => Ok(Self::Png),
            "jpeg" => Ok(Self::Jpeg),
            "rgb" => Ok(Self::RawRgb),
            other => Err(ConfigError::UnsupportedEncoding(other.to_owned())),
        }
    }
}

impl TryFrom<String> for Encoding {
    type Error = ConfigError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<Encoding> for String {
    fn from(encoding: Encoding) -> Self {
        encoding.as_str().to_owned()
    }
}

/// A still image that exclusively owns its bytes.
///
/// Cloning duplicates the bytes. [`ImageBuffer::take`] transfers them and
/// leaves the source in the [`Default`] state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageBuffer {
    pub(crate) data: Option<Vec<u8>>,
    pub(crate) size: usize,
    width: u32,
    height: u32,
    encoding: Option<Encoding>,
    pub(crate) has_header: bool,
}

impl ImageBuffer {
    /// Create a buffer that records metadata only; bytes arrive later through
    /// [`ImageBuffer::fill_from`].
    #[must_use]
    pub const fn empty(
        size: usize,
        width: u32,
        height: u32,
        encoding: Encoding,
        has_header: bool,
    ) -> Self {
        Self {
            data: None,
            size,
            width,
            height,
            encoding: Some(encoding),
            has_header,
        }
    }

    /// Create a buffer holding a copy of the first `size` bytes of `source`.
    ///
    /// Width and height are not checked against `size`.
    pub fn from_source(
        source: &[u8],
        size: usize,
        width: u32,
        height: u32,
        encoding: Encoding,
        has_header: bool,
    ) -> Result<Self, ImageError> {
        let mut buffer = Self::empty(size, width, height, encoding, has_header);
        buffer.fill_from(source)?;
        Ok(buffer)
    }

    /// Copy `size` bytes from `source` into a buffer created with
    /// [`ImageBuffer::empty`].
    pub fn fill_from(&mut self, source: &[u8]) -> Result<(), ImageError> {
        if self.data.is_some() {
            return Err(ImageError::AlreadyFilled);
        }
        let bytes = source.get(..self.size).ok_or(ImageError::SourceTooShort {
            expected: self.size,
            actual: source.len(),
        })?;
        self.data = Some(bytes.to_vec());
        Ok(())
    }

    /// Move the contents out, leaving `self` empty.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Image bytes, if any have been supplied.
    #[must_use]
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Mutable access to the image bytes.
    pub fn data_mut(&mut self) -> Option<&mut [u8]> {
        self.data.as_deref_mut()
    }

    /// Declared size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Image width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Encoding, `None` for a default or moved-from buffer.
    #[must_use]
    pub const fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    /// Whether the buffer has no bytes to work with.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.as_ref().map_or(true, Vec::is_empty) || self.size == 0
    }

    /// Whether the capture header is still attached.
    ///
    /// # Panics
    ///
    /// Panics if a PNG or JPEG buffer reports no header. Only raw RGB buffers
    /// can lose their header, so this is a broken invariant, not an input error.
    #[must_use]
    pub fn has_header(&self) -> bool {
        if let Some(encoding) = self.encoding {
            assert!(
                encoding == Encoding::RawRgb || self.has_header,
                "{encoding} buffer without header: only rgb buffers may have their header removed"
            );
        }
        self.has_header
    }

    /// Row length in bytes of a raw RGB buffer.
    #[must_use]
    pub const fn row_len(&self) -> usize {
        self.width as usize * RGB_CHANNELS
    }

    /// RGB values of the pixel at `(x, y)` in a header-less raw RGB buffer.
    #[must_use]
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if self.encoding != Some(Encoding::RawRgb)
            || self.has_header
            || x >= self.width
            || y >= self.height
        {
            return None;
        }
        let row_len = (self.width as usize).checked_mul(RGB_CHANNELS)?;
        let offset = (y as usize)
            .checked_mul(row_len)?
            .checked_add((x as usize).checked_mul(RGB_CHANNELS)?)?;
        match self.data()?.get(offset..offset.checked_add(RGB_CHANNELS)?)? {
            &[r, g, b] => Some((r, g, b)),
            _ => None,
        }
    }
}
