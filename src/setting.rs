use std::fmt;
use std::sync::Arc;

/// A configuration value that is either fixed or computed on demand.
///
/// Resolvers run every time the filter is built into a schema or applied to a
/// query, so a value like "the current user's timezone" is read per request.
pub enum Setting<T> {
    Value(T),
    Resolver(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T: Clone> Setting<T> {
    pub fn resolver(f: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Setting::Resolver(Arc::new(f))
    }

    pub fn resolve(&self) -> T {
        match self {
            Setting::Value(value) => value.clone(),
            Setting::Resolver(f) => f(),
        }
    }

    pub fn is_resolver(&self) -> bool {
        matches!(self, Setting::Resolver(_))
    }
}

impl<T> From<T> for Setting<T> {
    fn from(value: T) -> Self {
        Setting::Value(value)
    }
}

impl<T: Clone> Clone for Setting<T> {
    fn clone(&self) -> Self {
        match self {
            Setting::Value(value) => Setting::Value(value.clone()),
            Setting::Resolver(f) => Setting::Resolver(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Setting::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}
