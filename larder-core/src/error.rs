use image::ImageFormat;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email address is required")]
    Missing,

    #[error("Enter a valid email address")]
    Invalid,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid id in `{param}`: {value:?}")]
    InvalidId { param: &'static str, value: String },

    #[error("Invalid value for `{param}`: {value:?}")]
    InvalidFlag { param: &'static str, value: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("A valid number is required")]
    NotANumber,

    #[error("Price cannot be negative")]
    Negative,

    #[error("Price must have no more than 2 decimal places")]
    TooPrecise,

    #[error("Price must be less than 1000")]
    TooLarge,
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("File too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Failed to read image: {0}")]
    Unreadable(String),

    #[error("Could not detect image format")]
    UnknownFormat,

    #[error("Unsupported image format: {0:?}. Allowed: JPEG, PNG, GIF, WebP")]
    Unsupported(ImageFormat),

    #[error("Failed to decode image: {0}")]
    Decode(String),
}
