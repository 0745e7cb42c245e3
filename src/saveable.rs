//! The [`Saveable`] trait that payload types implement so the autosave can
//! compare snapshots and turn them into file contents.

use serde::Serialize;

use crate::error::{AutosaveError, Result};

/// Trait implemented by data snapshots handed to the autosave.
///
/// The autosave treats the payload as opaque: it only compares snapshots
/// (to detect "nothing changed since load") and encodes the one that is
/// finally written.
///
/// # Example
///
/// ```
/// use budget_autosave::{Result, Saveable};
///
/// #[derive(Clone, PartialEq)]
/// struct Notes(String);
///
/// impl Saveable for Notes {
///     fn encode(&self) -> Result<Vec<u8>> {
///         Ok(self.0.as_bytes().to_vec())
///     }
/// }
/// ```
pub trait Saveable: Clone + PartialEq + Send + Sync + 'static {
    /// Encode the snapshot into the bytes written to the file.
    fn encode(&self) -> Result<Vec<u8>>;
}

/// Wrapper that saves any serde-serializable value as pretty-printed JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Saveable for Json<T>
where
    T: Serialize + Clone + PartialEq + Send + Sync + 'static,
{
    fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(&self.0).map_err(|e| AutosaveError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn json_wrapper_encodes_pretty() {
        let mut totals = BTreeMap::new();
        totals.insert("rent", 1200);
        totals.insert("groceries", 450);

        let bytes = Json(totals).encode().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"groceries\": 450"));
        assert!(text.contains('\n'));
    }

    #[test]
    fn json_wrapper_compares_inner_value() {
        assert_eq!(Json(vec![1, 2, 3]), Json(vec![1, 2, 3]));
        assert_ne!(Json(vec![1, 2, 3]), Json(vec![1, 2]));
    }
}
