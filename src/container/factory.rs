//! Generic factory functions for constructing services

use super::{Error, FactoryFn, Instance, from_instance::FromInstances};
use crate::ServiceName;
use std::sync::Arc;

/// A trait that describes a generic factory function
/// that receives the resolved dependencies of a service positionally
pub trait GenericFactory<Args>: Send + Sync + 'static {
    /// A type of object that will be constructed
    type Output;

    /// Calls a generic function and returns either constructed object or error
    fn call(&self, args: Args) -> Result<Self::Output, Error>;
}

impl<F, R> GenericFactory<()> for F
where
    F: Fn() -> R + Send + Sync + 'static
{
    type Output = R;

    #[inline]
    fn call(&self, _: ()) -> Result<Self::Output, Error> {
        Ok(self())
    }
}

macro_rules! define_generic_factory ({ $($param:ident)* } => {
    impl<F, R, $($param,)*> GenericFactory<($($param,)*)> for F
    where
        F: Fn($($param),*) -> Result<R, Error> + Send + Sync + 'static,
    {
        type Output = R;

        #[inline]
        #[allow(non_snake_case)]
        fn call(&self, ($($param,)*): ($($param,)*)) -> Result<Self::Output, Error> {
            (self)($($param,)*)
        }
    }
});

define_generic_factory! { T1 }
define_generic_factory! { T1 T2 }
define_generic_factory! { T1 T2 T3 }
define_generic_factory! { T1 T2 T3 T4 }
define_generic_factory! { T1 T2 T3 T4 T5 }

/// Erases a typed factory into the positional form stored in the registry
#[inline]
pub(crate) fn make_factory_fn<T, F, Args>(factory: F) -> FactoryFn
where
    T: Send + Sync + 'static,
    F: GenericFactory<Args, Output = T>,
    Args: FromInstances
{
    Arc::new(move |names: &[ServiceName], instances: &[Instance]| -> Result<Instance, Error> {
        let args = Args::from_instances(names, instances)?;
        factory.call(args).map(|t| Arc::new(t) as Instance)
    })
}
