use alloc::sync::Arc;

use crate::{any::RcAny, errors::InstantiateErrorKind};

type BoxedInstantiateFn = dyn Fn() -> Result<RcAny, InstantiateErrorKind> + Send + Sync;

/// Type-erased factory call.
/// Every call builds a new value, except for instantiators created with [`instance`] and [`instance_rc`].
#[derive(Clone)]
pub struct Instantiator {
    inner: Arc<BoxedInstantiateFn>,
}

impl Instantiator {
    #[inline]
    #[must_use]
    pub fn new<F, T>(factory: F) -> Self
    where
        F: Fn() -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(move || factory().map(|value| Arc::new(value) as RcAny)),
        }
    }

    #[inline]
    pub(crate) fn call(&self) -> Result<RcAny, InstantiateErrorKind> {
        (self.inner)()
    }
}

/// Wrapper to create an instantiator that returns passed value.
/// It can be used when the value was created outside the container.
#[inline]
#[must_use]
pub fn instance<T: Send + Sync + 'static>(value: T) -> Instantiator {
    instance_rc(Arc::new(value))
}

/// Same as [`instance`], but every call returns the same shared value
#[inline]
#[must_use]
pub fn instance_rc<T: Send + Sync + 'static>(value: Arc<T>) -> Instantiator {
    Instantiator {
        inner: Arc::new(move || Ok(value.clone() as RcAny)),
    }
}
