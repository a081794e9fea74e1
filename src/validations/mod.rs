mod link;

pub use link::{is_valid_short_code, normalize_url, validate_short_code, validate_url};
