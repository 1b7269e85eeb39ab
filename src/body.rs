//! Response body serialization seam.
//!
//! Handlers return [`crate::entity::ResponseEntity`] values whose body type
//! decides its own textual wire form through [`ResponseBody`]:
//!
//! - `()` produces no body at all
//! - numbers render in base-10, booleans as `true`/`false`
//! - strings and chars pass through verbatim
//! - [`Json`]-wrapped values serialize through `serde_json`
//!
//! The trait is the type-dispatch point that lets one generic conversion
//! path (`ResponseEntity<T>` to a wire response) serve every body type a
//! handler can declare.

use serde::Serialize;
use tracing::error;

/// Types usable as a response envelope body.
pub trait ResponseBody {
    /// Textual form placed in the wire response body.
    fn to_body_text(&self) -> String;
}

impl ResponseBody for () {
    fn to_body_text(&self) -> String {
        String::new()
    }
}

impl ResponseBody for bool {
    fn to_body_text(&self) -> String {
        if *self { "true".to_string() } else { "false".to_string() }
    }
}

impl ResponseBody for char {
    fn to_body_text(&self) -> String {
        self.to_string()
    }
}

impl ResponseBody for String {
    fn to_body_text(&self) -> String {
        self.clone()
    }
}

impl ResponseBody for &str {
    fn to_body_text(&self) -> String {
        (*self).to_string()
    }
}

macro_rules! impl_body_for_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ResponseBody for $ty {
                fn to_body_text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_body_for_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl ResponseBody for serde_json::Value {
    fn to_body_text(&self) -> String {
        self.to_string()
    }
}

/// Wrapper marking a user-defined body that serializes to JSON.
///
/// ```rust,ignore
/// #[derive(Serialize)]
/// struct Device { id: u32, name: String }
///
/// let entity = ResponseEntity::ok(Json(Device { id: 7, name: "edge-7".into() }));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consume the wrapper and return the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize> ResponseBody for Json<T> {
    fn to_body_text(&self) -> String {
        match serde_json::to_string(&self.0) {
            Ok(text) => text,
            Err(err) => {
                error!(error = %err, "Failed to serialize response body");
                String::new()
            }
        }
    }
}
