use std::{fmt, io};
use std::panic::Location;
use std::error::Error as StdError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A fatal error: one or more details, optionally chained behind the error
/// that caused it.
#[derive(Debug)]
pub struct Error {
    details: Vec<Box<dyn ErrorDetail>>,
    cause: Option<Box<Error>>,
    origin: &'static Location<'static>,
}

/// Something that can describe a failure, plus `(key, value)` context lines.
pub trait ErrorDetail: fmt::Display + fmt::Debug + Send + Sync {
    fn context(&self) -> Vec<(Option<String>, String)> { vec![] }
}

impl Error {
    /// Places `self` as the innermost cause of `outer` and returns `outer`.
    pub fn chain(self, mut outer: Error) -> Self {
        fn attach(error: Error, behind: &mut Error) {
            if let Some(cause) = behind.cause.as_mut() {
                attach(error, cause);
            } else {
                behind.cause = Some(Box::new(error));
            }
        }

        attach(self, &mut outer);
        outer
    }

    /// The message of the outermost detail.
    pub fn message(&self) -> String {
        self.details.first().map(|d| d.to_string()).unwrap_or_default()
    }

    pub fn causes(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(self.cause.as_deref(), |e| e.cause.as_deref())
    }
}

impl ErrorDetail for &(dyn StdError + Send + Sync) {
    fn context(&self) -> Vec<(Option<String>, String)> {
        std::iter::successors(self.source(), |&e| e.source())
            .map(|e| (None, e.to_string()))
            .collect()
    }
}

macro_rules! impl_error_detail_with_std_error {
    ($($T:ty),* $(,)?) => {$(
        impl $crate::error::ErrorDetail for $T {
            fn context(&self) -> Vec<(Option<String>, String)> {
                let error: &(dyn std::error::Error + Send + Sync) = self;
                error.context()
            }
        }
    )*}
}

impl_error_detail_with_std_error! {
    io::Error,
    toml::de::Error,
    toml::ser::Error,
    serde_json::Error,
    jwalk::Error,
}

impl ErrorDetail for String { }
impl ErrorDetail for &str { }

impl<T: ErrorDetail + 'static> From<T> for Error {
    #[track_caller]
    fn from(detail: T) -> Self {
        Error {
            details: vec![Box::new(detail)],
            cause: None,
            origin: Location::caller(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = std::iter::once(self).chain(self.causes());
        for (depth, error) in errors.enumerate() {
            let indent = "    ".repeat(depth);
            let newline = format!("\n{indent}");
            for detail in &error.details {
                writeln!(f, "{indent}{}", detail.to_string().replace('\n', &newline))?;
                for (key, value) in detail.context() {
                    let value = value.replace('\n', &newline);
                    match key {
                        Some(key) => writeln!(f, "{indent}{key}: {value}")?,
                        None => writeln!(f, "{indent}{value}")?,
                    }
                }
            }

            if std::env::var_os("RUST_BACKTRACE").is_some() {
                writeln!(f, "{indent}[{}]", error.origin)?;
            }
        }

        Ok(())
    }
}

/// An ad-hoc error detail built by [`error!`].
#[derive(Debug)]
pub struct Message {
    pub message: String,
    pub parameters: Vec<(Option<String>, String)>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl ErrorDetail for Message {
    fn context(&self) -> Vec<(Option<String>, String)> {
        self.parameters.clone()
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! err {
    ($($token:tt)*) => (Err($crate::error!($($token)*)));
}

/// Builds an [`Error`] from a message and `"key" => value` or bare context
/// parameters.
#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($msg:expr $(, $($rest:tt)*)?) => (
        $crate::error::Error::from($crate::error::Message {
            message: $msg.to_string(),
            parameters: {
                #[allow(unused_mut)]
                let mut v: Vec<(Option<String>, String)> = Vec::new();
                $crate::error!(@param v $($($rest)*)?);
                v
            },
        })
    );

    (@param $v:ident $key:expr => $value:expr $(, $($rest:tt)*)?) => {
        $v.push((Some($key.to_string()), $value.to_string()));
        $crate::error!(@param $v $($($rest)*)?);
    };

    (@param $v:ident $value:expr $(, $($rest:tt)*)?) => {
        $v.push((None, $value.to_string()));
        $crate::error!(@param $v $($($rest)*)?);
    };

    (@param $v:ident) => { };
}

pub trait Chainable<T> {
    fn chain(self, outer: impl Into<Error>) -> Result<T>;

    fn chain_with<F, E>(self, f: F) -> Result<T>
        where F: FnOnce() -> E, E: Into<Error>;
}

impl<T, E: Into<Error>> Chainable<T> for Result<T, E> {
    #[track_caller]
    fn chain(self, outer: impl Into<Error>) -> Result<T> {
        self.map_err(|e| e.into().chain(outer.into()))
    }

    #[track_caller]
    fn chain_with<F, Outer>(self, f: F) -> Result<T>
        where F: FnOnce() -> Outer, Outer: Into<Error>,
    {
        self.map_err(|e| e.into().chain(f().into()))
    }
}
