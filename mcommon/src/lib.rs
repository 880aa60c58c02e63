//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use mcommon::{MetadataMap, Registry, TraceId};
//!
//! let trace = TraceId::new("trace-1");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("tenant".to_string(), "acme".to_string());
//!
//! let mut registry = Registry::new();
//! registry.insert("alpha".to_string(), 1_u32);
//!
//! assert_eq!(trace.as_str(), "trace-1");
//! assert_eq!(registry.get("alpha"), Some(&1));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use mcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Shared metadata and cross-crate identifier newtypes.
    //!
    //! ```rust
    //! use mcommon::{MetadataMap, TraceId};
    //!
    //! let trace = TraceId::from("trace-42");
    //! let mut metadata = MetadataMap::new();
    //! metadata.insert("env".to_string(), "test".to_string());
    //!
    //! assert_eq!(trace.to_string(), "trace-42");
    //! ```

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct TraceId(String);

    impl TraceId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for TraceId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for TraceId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for TraceId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod registry {
    //! Generic registry map wrapper used by runtime registries.
    //!
    //! ```rust
    //! use mcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert!(registry.contains_key("alpha"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{MetadataMap, TraceId};
pub use future::BoxFuture;
pub use registry::Registry;
