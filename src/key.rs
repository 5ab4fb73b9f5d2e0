//! Deterministic cache key construction
//!
//! Keys are the base64 encoding of the JSON array of their arguments, so the
//! same arguments in the same order always yield the same key. Argument order
//! matters; maps inside arguments are serialized with sorted keys.

use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use serde_json::Value;

use crate::error::CacheError;

/// Builds a cache key from an ordered argument list
///
/// `args` is normally a tuple, slice or `Vec`; a single non-sequence value
/// is treated as a one-element list. An empty list, `()` or `None` fails with
/// [`CacheError::EmptyKey`].
///
/// ```
/// use cachefront::key::make_key;
///
/// let a = make_key(&("countries", "BR", 3)).unwrap();
/// let b = make_key(&("countries", "BR", 3)).unwrap();
/// assert_eq!(a, b);
/// assert!(make_key(&()).is_err());
/// ```
pub fn make_key<A: Serialize + ?Sized>(args: &A) -> Result<String, CacheError> {
    let arguments = match serde_json::to_value(args)? {
        Value::Null => return Err(CacheError::EmptyKey),
        Value::Array(items) if items.is_empty() => return Err(CacheError::EmptyKey),
        Value::Array(items) => items,
        single => vec![single],
    };

    let encoded = serde_json::to_vec(&arguments)?;
    Ok(general_purpose::STANDARD.encode(encoded))
}

/// Builds a cache key from heterogeneous arguments
///
/// `cache_key!(a, b, c)` is `make_key(&(&a, &b, &c))`; `cache_key!()` fails
/// with [`CacheError::EmptyKey`](crate::CacheError::EmptyKey).
#[macro_export]
macro_rules! cache_key {
    () => {
        $crate::key::make_key(&())
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::key::make_key(&($(&$arg,)+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_no_arguments_is_empty_key() {
        assert!(matches!(make_key(&()), Err(CacheError::EmptyKey)));
        assert!(matches!(make_key::<[u8]>(&[]), Err(CacheError::EmptyKey)));
        assert!(matches!(make_key(&Vec::<String>::new()), Err(CacheError::EmptyKey)));
        assert!(matches!(cache_key!(), Err(CacheError::EmptyKey)));
    }

    #[test]
    fn test_same_arguments_give_same_key() {
        let first = make_key(&("all", 42)).unwrap();
        let second = make_key(&("all", 42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_argument_order_matters() {
        let ab = make_key(&("a", "b")).unwrap();
        let ba = make_key(&("b", "a")).unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_key_is_base64_of_json_array() {
        let key = make_key(&("a", 1)).unwrap();
        let decoded = general_purpose::STANDARD.decode(&key).unwrap();
        assert_eq!(decoded, br#"["a",1]"#);
    }

    #[test]
    fn test_single_value_is_wrapped() {
        assert_eq!(make_key("x").unwrap(), make_key(&["x"]).unwrap());
    }

    #[test]
    fn test_distinct_arguments_differ() {
        let keys = [
            make_key(&("a",)).unwrap(),
            make_key(&("a", "")).unwrap(),
            make_key(&(1,)).unwrap(),
            make_key(&("1",)).unwrap(),
            make_key(&(Option::<u8>::None, 1)).unwrap(),
        ];
        for (i, k1) in keys.iter().enumerate() {
            for k2 in keys.iter().skip(i + 1) {
                assert_ne!(k1, k2);
            }
        }
    }

    #[test]
    fn test_map_arguments_are_deterministic() {
        let mut first = HashMap::new();
        let mut second = HashMap::new();
        for i in 0..32 {
            first.insert(format!("k{i}"), i);
        }
        for i in (0..32).rev() {
            second.insert(format!("k{i}"), i);
        }
        assert_eq!(make_key(&("m", &first)).unwrap(), make_key(&("m", &second)).unwrap());
    }

    #[test]
    fn test_macro_matches_function() {
        let name = String::from("brazil");
        let from_macro = cache_key!("country", name, 7u32).unwrap();
        let from_fn = make_key(&("country", "brazil", 7u32)).unwrap();
        assert_eq!(from_macro, from_fn);
    }
}
