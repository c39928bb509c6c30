//! Extractors for turning resolved dependencies into factory arguments

use super::{Error, Instance};
use crate::ServiceName;

/// A trait that defines how to extract `Self` from a resolved dependency
pub trait FromInstance: Sized + Send + Sync {
    /// Extracts `Self` from the instance resolved for the dependency `name`
    fn from_instance(name: &ServiceName, instance: &Instance) -> Result<Self, Error>;
}

impl<T: Clone + Send + Sync + 'static> FromInstance for T {
    #[inline]
    fn from_instance(name: &ServiceName, instance: &Instance) -> Result<Self, Error> {
        instance
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| Error::TypeMismatch {
                service: name.clone(),
                expected: std::any::type_name::<T>()
            })
    }
}

/// A trait that defines how to extract the whole argument list of a factory
pub trait FromInstances: Sized {
    /// Number of positional arguments, checked against the declared dependencies
    const ARITY: usize;

    /// Extracts the arguments, `names[i]` is the dependency that produced `instances[i]`
    fn from_instances(names: &[ServiceName], instances: &[Instance]) -> Result<Self, Error>;
}

impl FromInstances for () {
    const ARITY: usize = 0;

    #[inline]
    fn from_instances(_: &[ServiceName], _: &[Instance]) -> Result<Self, Error> {
        Ok(())
    }
}

macro_rules! define_generic_from_instances {
    ($arity:literal => $($T: ident),*) => {
        impl<$($T: FromInstance),+> FromInstances for ($($T,)+) {
            const ARITY: usize = $arity;

            #[inline]
            #[allow(non_snake_case)]
            fn from_instances(names: &[ServiceName], instances: &[Instance]) -> Result<Self, Error> {
                let mut args = names.iter().zip(instances);
                let tuple = (
                    $({
                        let (name, instance) = args
                            .next()
                            .ok_or_else(|| Error::validation("factory received fewer dependencies than it declares"))?;
                        $T::from_instance(name, instance)?
                    },)*
                );
                Ok(tuple)
            }
        }
    }
}

define_generic_from_instances! { 1 => T1 }
define_generic_from_instances! { 2 => T1, T2 }
define_generic_from_instances! { 3 => T1, T2, T3 }
define_generic_from_instances! { 4 => T1, T2, T3, T4 }
define_generic_from_instances! { 5 => T1, T2, T3, T4, T5 }
