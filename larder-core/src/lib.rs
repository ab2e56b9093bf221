pub mod email;
pub mod error;
pub mod filters;
pub mod image;
pub mod price;

pub use email::normalize_email;
pub use error::{EmailError, FilterError, ImageError, PriceError};
pub use filters::{parse_flag, parse_id_list};
pub use image::{validate_image, ValidatedImage, ALLOWED_FORMATS, MAX_FILE_SIZE};
pub use price::validate_price;
