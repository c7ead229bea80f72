use std::{fmt, io};
use std::panic::Location;
use std::error::Error as StdError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The kind of failure. Every kind is fatal to a build.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OutputExists,
    ManifestNotFound,
    ManifestMalformed,
    TemplateRootMissing,
    TemplateNotFound,
    TemplateRenderError,
    WriteError,
    CopyError,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    parameters: Vec<(Option<String>, String)>,
    cause: Option<Box<dyn ErrorDetail>>,
    _location: &'static Location<'static>,
}

/// A lower-level failure that can be carried as the cause of an [`Error`].
pub trait ErrorDetail: fmt::Display + fmt::Debug + Send + Sync {
    fn context(&self) -> Vec<String> { vec![] }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::OutputExists => "output exists",
            ErrorKind::ManifestNotFound => "manifest not found",
            ErrorKind::ManifestMalformed => "manifest malformed",
            ErrorKind::TemplateRootMissing => "template root missing",
            ErrorKind::TemplateNotFound => "template not found",
            ErrorKind::TemplateRenderError => "template render error",
            ErrorKind::WriteError => "write error",
            ErrorKind::CopyError => "copy error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl Error {
    #[track_caller]
    pub fn new<M: Into<String>>(kind: ErrorKind, message: M) -> Self {
        Error {
            kind,
            message: message.into(),
            parameters: vec![],
            cause: None,
            _location: Location::caller(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parameters(&self) -> &[(Option<String>, String)] {
        &self.parameters
    }

    /// Looks up the value of the parameter named `key`, if any.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.iter()
            .find(|(k, _)| k.as_deref() == Some(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn cause(&self) -> Option<&dyn ErrorDetail> {
        self.cause.as_deref()
    }

    pub fn with_parameter<K: fmt::Display, V: fmt::Display>(mut self, key: K, value: V) -> Self {
        self.parameters.push((Some(key.to_string()), value.to_string()));
        self
    }

    pub fn with_cause<D: ErrorDetail + 'static>(mut self, cause: D) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

impl ErrorDetail for &(dyn StdError + Send + Sync) {
    fn context(&self) -> Vec<String> {
        let mut ctxt = vec![];
        let mut error = self.source();
        while let Some(e) = error {
            ctxt.push(e.to_string());
            error = e.source();
        }

        ctxt
    }
}

impl ErrorDetail for Box<dyn StdError + Send + Sync> {
    fn context(&self) -> Vec<String> {
        let error: &(dyn StdError + Send + Sync) = &**self;
        error.context()
    }
}

macro_rules! impl_error_detail_with_std_error {
    ($T:ty) => {
        impl $crate::error::ErrorDetail for $T {
            fn context(&self) -> Vec<String> {
                let error: &(dyn std::error::Error + Send + Sync) = self;
                $crate::error::ErrorDetail::context(&error)
            }
        }
    }
}

impl_error_detail_with_std_error!(io::Error);
impl_error_detail_with_std_error!(toml::de::Error);
impl_error_detail_with_std_error!(serde_json::Error);
impl_error_detail_with_std_error!(jwalk::Error);

impl ErrorDetail for String { }
impl ErrorDetail for &'static str { }

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if !self.parameters.is_empty() {
            write!(f, " (")?;
            for (i, (key, value)) in self.parameters.iter().enumerate() {
                if i > 0 { write!(f, ", ")?; }
                match key {
                    Some(key) => write!(f, "{key}: {value}")?,
                    None => write!(f, "{value}")?,
                }
            }

            write!(f, ")")?;
        }

        if let Some(cause) = &self.cause {
            let cause_line = cause.to_string().replace('\n', "\n    ");
            write!(f, "\n    {cause_line}")?;
            for line in cause.context() {
                write!(f, "\n    {}", line.replace('\n', "\n    "))?;
            }
        }

        if std::env::var_os("RUST_BACKTRACE").is_some() {
            write!(f, "\n    [{}]", self._location)?;
        }

        Ok(())
    }
}

impl StdError for Error { }

#[doc(hidden)]
#[macro_export]
macro_rules! err {
    ($($token:tt)*) => (Err($crate::error!($($token)*)));
}

/// Builds an [`Error`](crate::error::Error) of the given kind:
///
/// ```rust
/// use atticus::error::ErrorKind;
///
/// let e = atticus::error!(WriteError, "failed to write page", "path" => "a/index.html");
/// assert_eq!(e.kind(), ErrorKind::WriteError);
/// assert_eq!(e.parameter("path"), Some("a/index.html"));
/// ```
#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($kind:ident, $msg:expr, $($rest:tt)*) => ({
        #[allow(unused_mut)]
        let mut e = $crate::error::Error::new($crate::error::ErrorKind::$kind, $msg.to_string());
        $crate::error!(@param e $($rest)*);
        e
    });

    ($kind:ident, $msg:expr) => ( $crate::error!($kind, $msg,) );

    (@param $e:ident if $cond:expr => $key:expr => $value:expr, $($rest:tt)*) => {
        if $cond {
            $e = $e.with_parameter($key, $value);
        }

        $crate::error!(@param $e $($rest)*);
    };

    (@param $e:ident if $cond:expr => $key:expr => $value:expr) => {
        $crate::error!(@param $e if $cond => $key => $value,);
    };

    (@param $e:ident $key:expr => $value:expr, $($rest:tt)*) => {
        $e = $e.with_parameter($key, $value);
        $crate::error!(@param $e $($rest)*);
    };

    (@param $e:ident $key:expr => $value:expr) => {
        $crate::error!(@param $e $key => $value,);
    };

    (@param $e:ident $(,)?) => { };
}

/// Attaches a lower-level failure as the cause of a taxonomy [`Error`].
pub trait Chainable<T> {
    fn chain_with<F>(self, f: F) -> Result<T>
        where F: FnOnce() -> Error;
}

impl<T, E: ErrorDetail + 'static> Chainable<T> for Result<T, E> {
    fn chain_with<F>(self, f: F) -> Result<T>
        where F: FnOnce() -> Error,
    {
        self.map_err(|e| f().with_cause(e))
    }
}
