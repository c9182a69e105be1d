mod value;
mod format;

pub use value::*;
pub use format::*;

/// Builds a [`Dict`]. An entry written `key =>? value` takes an `Option` and
/// is left out when it is `None`.
#[doc(hidden)]
#[macro_export]
macro_rules! dict {
    (@insert $dict:ident) => {};
    (@insert $dict:ident $key:expr =>? $value:expr $(, $($rest:tt)*)?) => {
        if let Some(value) = $value {
            $dict.insert($key.into(), value.into());
        }

        $crate::dict!(@insert $dict $($($rest)*)?);
    };
    (@insert $dict:ident $key:expr => $value:expr $(, $($rest:tt)*)?) => {
        $dict.insert($key.into(), $value.into());
        $crate::dict!(@insert $dict $($($rest)*)?);
    };
    ($($tokens:tt)*) => ({
        #[allow(unused_mut)]
        let mut dict = $crate::value::Dict::new();
        $crate::dict!(@insert dict $($tokens)*);
        dict
    });
}
