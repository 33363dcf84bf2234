//! # Utility Functions Module
//!
//! Helpers for building external tool command lines.

use crate::error::ConvertError;
use std::path::Path;

/// Converts any iterable of string-like items to `Vec<String>`.
///
/// Used to build encoder argument lists without repeating `.to_string()`:
///
/// ```rust,ignore
/// let args = to_string_vec(["-q", &quality.to_string(), input, "-o", output]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Borrows a path as UTF-8 for use on a tool command line.
pub fn path_arg(path: &Path) -> Result<&str, ConvertError> {
    path.to_str()
        .ok_or_else(|| ConvertError::InvalidPath(format!("not valid UTF-8: {}", path.display())))
}

/// Macro form of [`to_string_vec`] accepting mixed argument types.
///
/// ```rust,ignore
/// let args = args!["-q", quality, "-m", 4, input];
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        $crate::utils::to_string_vec([$(($item).to_string()),*])
    };
}
