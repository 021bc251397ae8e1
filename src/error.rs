// A tiny error type so we don't rely on anyhow/thiserror.
// Every variant states *where* things went wrong.
use std::fmt::{self, Display};

#[derive(Debug)]
pub enum Error {
    ImageLoad(String),    // Reading/decoding the base image failed
    BufferSize(String),   // A whole-buffer write had the wrong length
    MaskBusy(String),     // The shared mask handle was borrowed elsewhere
    FrameSize(String),    // Display frame and layers disagree on dimensions
    WindowInit(String),   // Creating the host window failed
    WindowUpdate(String), // Updating the host window buffer failed
}

impl Display for Error {
    // This decides how the error is printed to your console.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ImageLoad(s) => write!(f, "Image load error: {s}"),
            Error::BufferSize(s) => write!(f, "Buffer size error: {s}"),
            Error::MaskBusy(s) => write!(f, "Mask busy: {s}"),
            Error::FrameSize(s) => write!(f, "Frame size error: {s}"),
            Error::WindowInit(s) => write!(f, "Window init error: {s}"),
            Error::WindowUpdate(s) => write!(f, "Window update error: {s}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::ImageLoad(e.to_string())
    }
}
