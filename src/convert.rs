//! Conversion of captured path-variable text into handler parameter types.
//!
//! Bindings arrive as raw URL text. [`PathVars::get_as`] turns one into the
//! type a handler declares: strings are percent-decoded, scalars parse in
//! their base-10 form, and anything else deserializes through the
//! [`Json`] wrapper.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;

use crate::body::Json;

/// Error raised when a binding cannot be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The text does not parse as the requested type.
    InvalidValue { target: &'static str, value: String },
    /// No binding with the requested name exists.
    MissingVariable { name: String },
}

impl ConvertError {
    fn invalid(target: &'static str, value: &str) -> Self {
        ConvertError::InvalidValue {
            target,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::InvalidValue { target, value } => {
                write!(f, "invalid {target} value: '{value}'")
            }
            ConvertError::MissingVariable { name } => {
                write!(f, "no path variable named '{name}'")
            }
        }
    }
}

impl std::error::Error for ConvertError {}

/// Percent-decode URL text.
///
/// `%XX` with two hex digits becomes the encoded byte; a malformed `%` is
/// kept literally; `+` becomes a space (form-style encoders produce it in
/// path segments too).
#[must_use]
pub fn url_decode(input: &str) -> String {
    String::from_utf8_lossy(&url_decode_bytes(input)).into_owned()
}

/// Byte-level percent-decoding, for bindings that are not UTF-8 text.
#[must_use]
pub fn url_decode_bytes(input: &str) -> Vec<u8> {
    fn hex_digit(byte: u8) -> Option<u8> {
        (byte as char).to_digit(16).map(|d| d as u8)
    }

    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                    decoded.push(hi * 16 + lo);
                    i += 3;
                } else {
                    decoded.push(b'%');
                    i += 1;
                }
            }
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            byte => {
                decoded.push(byte);
                i += 1;
            }
        }
    }
    decoded
}

/// Types constructible from a single path-variable binding.
pub trait FromPathVar: Sized {
    /// Convert the raw binding text.
    ///
    /// # Errors
    ///
    /// [`ConvertError::InvalidValue`] when the text does not represent a
    /// value of `Self`.
    fn from_path_var(raw: &str) -> Result<Self, ConvertError>;
}

impl FromPathVar for String {
    fn from_path_var(raw: &str) -> Result<Self, ConvertError> {
        Ok(url_decode(raw))
    }
}

impl FromPathVar for bool {
    fn from_path_var(raw: &str) -> Result<Self, ConvertError> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ConvertError::invalid("boolean", raw)),
        }
    }
}

impl FromPathVar for char {
    fn from_path_var(raw: &str) -> Result<Self, ConvertError> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            (None, _) => Ok('\0'),
            _ => raw
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| ConvertError::invalid("character", raw)),
        }
    }
}

macro_rules! impl_from_path_var_parse {
    ($($ty:ty => $target:literal),* $(,)?) => {
        $(
            impl FromPathVar for $ty {
                fn from_path_var(raw: &str) -> Result<Self, ConvertError> {
                    raw.parse::<$ty>()
                        .map_err(|_| ConvertError::invalid($target, raw))
                }
            }
        )*
    };
}

impl_from_path_var_parse!(
    i8 => "signed integer",
    i16 => "signed integer",
    i32 => "signed integer",
    i64 => "signed integer",
    isize => "signed integer",
    u8 => "unsigned integer",
    u16 => "unsigned integer",
    u32 => "unsigned integer",
    u64 => "unsigned integer",
    usize => "unsigned integer",
    f32 => "floating point",
    f64 => "floating point",
);

impl<T: DeserializeOwned> FromPathVar for Json<T> {
    fn from_path_var(raw: &str) -> Result<Self, ConvertError> {
        serde_json::from_str(raw)
            .map(Json)
            .map_err(|_| ConvertError::invalid("json", raw))
    }
}

/// Variable bindings captured by a trie match, delivered to handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVars(HashMap<String, String>);

impl PathVars {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw binding text, undecoded.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Binding converted to a declared parameter type.
    ///
    /// ```rust,ignore
    /// let user_id: u32 = vars.get_as("userId")?;
    /// let file: String = vars.get_as("name")?; // percent-decoded
    /// ```
    ///
    /// # Errors
    ///
    /// [`ConvertError::MissingVariable`] when no such binding exists,
    /// [`ConvertError::InvalidValue`] when conversion fails.
    pub fn get_as<T: FromPathVar>(&self, name: &str) -> Result<T, ConvertError> {
        let raw = self.get(name).ok_or_else(|| ConvertError::MissingVariable {
            name: name.to_string(),
        })?;
        T::from_path_var(raw)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The underlying binding map.
    #[must_use]
    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.0
    }
}

impl From<HashMap<String, String>> for PathVars {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}
