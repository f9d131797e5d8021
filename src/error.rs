//! Error types for the image pipeline, persistence, configuration and the
//! hardware collaborators.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building an [`ImageBuffer`](crate::buffer::ImageBuffer).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    /// The source slice holds fewer bytes than the declared buffer size.
    #[error("source holds {actual} bytes but {expected} were requested")]
    SourceTooShort {
        /// Declared buffer size.
        expected: usize,
        /// Bytes actually available in the source.
        actual: usize,
    },
    /// The buffer already owns bytes and cannot be filled again.
    #[error("buffer already holds data")]
    AlreadyFilled,
}

/// Reasons a buffer could not be written to disk.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The buffer has no bytes or a zero size.
    #[error("no data to save")]
    NoData,
    /// The path has no extension, or ends with a bare `.`.
    #[error("invalid file extension in {0}")]
    MissingExtension(PathBuf),
    /// The path's extension does not name the buffer's encoding.
    #[error("file extension `{found}` does not match image encoding `{expected}`")]
    ExtensionMismatch {
        /// Canonical extension of the buffer's encoding.
        expected: &'static str,
        /// Extension found in the path.
        found: String,
    },
    /// The destination could not be created or written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Configuration errors. An unsupported encoding aborts the calling operation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The encoding name is not one of `png`, `jpeg` or `rgb`.
    #[error("unsupported encoding `{0}`: use png, jpeg, or rgb instead")]
    UnsupportedEncoding(String),
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration file is not valid JSON for the expected layout.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Error type for camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// Failed to open device.
    #[error("failed to open device: {0}")]
    DeviceOpenFailed(String),
    /// The device refused the requested capture format.
    #[error("format not supported: {0}")]
    FormatNotSupported(String),
    /// Capture was requested before the device was opened.
    #[error("camera is not open")]
    NotOpen,
    /// Error while grabbing a frame.
    #[error("capture error: {0}")]
    CaptureFailed(String),
    /// The grabbed buffer does not have the layout its format requires.
    #[error("unexpected capture size: expected {expected} bytes, got {actual}")]
    UnexpectedBufferSize {
        /// Size implied by width, height and encoding.
        expected: usize,
        /// Size reported by the device.
        actual: usize,
    },
    /// Encoding the grabbed pixels failed.
    #[error("failed to encode capture: {0}")]
    Encode(#[from] image::ImageError),
    /// The grabbed bytes could not be copied into an image buffer.
    #[error(transparent)]
    Image(#[from] ImageError),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type for GPIO operations.
#[derive(Debug, Error)]
pub enum GpioError {
    /// Exporting a pin to user space failed.
    #[error("failed to export pin {pin}: {source}")]
    Export {
        /// Pin identifier.
        pin: u32,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Setting the pin direction failed.
    #[error("failed to set mode of pin {pin}: {source}")]
    Mode {
        /// Pin identifier.
        pin: u32,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Writing the pin level failed.
    #[error("failed to write pin {pin}: {source}")]
    Write {
        /// Pin identifier.
        pin: u32,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Top-level error for code that drives both subsystems.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Camera error.
    #[error(transparent)]
    Camera(#[from] CameraError),
    /// GPIO error.
    #[error(transparent)]
    Gpio(#[from] GpioError),
    /// Persistence error.
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Result type for operations that span subsystems.
pub type Result<T> = std::result::Result<T, Error>;
