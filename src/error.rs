//! Error types for `labcert`.

use std::error;
use std::fmt;
use std::io;

/// Helper trait for creating [`Error`][] instances.
///
/// This trait is inspired by [`anyhow::Context`][].
///
/// # Examples
///
/// ```
/// use labcert::error::{Context as _, Error};
/// use std::io;
/// let res: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::Other, "boom"));
/// let mapped = res.context("wrapped");
/// assert!(mapped.is_err());
/// ```
///
/// [`Error`]: struct.Error.html
/// [`anyhow::Context`]: https://docs.rs/anyhow/latest/anyhow/trait.Context.html
pub trait Context<T> {
    /// Maps the error to an [`Error`][] instance with the given message.
    ///
    /// [`Error`]: struct.Error.html
    fn context(self, msg: impl Into<String>) -> Result<T, Error>;

    /// Maps the error to an [`Error`][] instance message produced by the given callback.
    ///
    /// [`Error`]: struct.Error.html
    fn with_context<F, S>(self, cb: F) -> Result<T, Error>
    where
        F: Fn() -> S,
        S: Into<String>;
}

impl<T, E: Into<ErrorKind>> Context<T> for Result<T, E> {
    fn context(self, msg: impl Into<String>) -> Result<T, Error> {
        self.map_err(|err| Error::new(msg, err))
    }

    fn with_context<F, S>(self, cb: F) -> Result<T, Error>
    where
        F: Fn() -> S,
        S: Into<String>,
    {
        self.map_err(move |err| Error::new(cb(), err))
    }
}

/// An error that occured while computing, populating or exporting a certificate.
///
/// The error consists of an error message (provided by the `Display` implementation) and an error
/// kind, see [`kind`](#method.kind).
#[derive(Debug)]
pub struct Error {
    msg: String,
    kind: ErrorKind,
}

impl Error {
    /// Creates a new error.
    ///
    /// # Examples
    ///
    /// ```
    /// use labcert::error::{Error, ErrorKind};
    /// let e = Error::new("oops", ErrorKind::Internal);
    /// assert_eq!(format!("{}", e), "oops");
    /// match e.kind() { ErrorKind::Internal => {}, k => panic!("unexpected: {:?}", k) }
    /// ```
    pub fn new(msg: impl Into<String>, kind: impl Into<ErrorKind>) -> Error {
        Error {
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// Returns the error kind for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::IoError(err) => Some(err),
            ErrorKind::JsonError(err) => Some(err),
            _ => None,
        }
    }
}

/// The kind of an [`Error`](struct.Error.html).
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An internal error.
    Internal,
    /// An error caused by invalid input data.
    InvalidData,
    /// Strict validation rejected the inputs; one entry per offending field.
    Validation(Vec<String>),
    /// The template still contained `{{token}}` placeholders after population.
    UnresolvedPlaceholder(Vec<String>),
    /// The headless browser could not be started.
    BrowserLaunch(String),
    /// A page could not be opened or the certificate HTML could not be loaded into it.
    PageLoad(String),
    /// The browser failed to print the loaded page.
    PdfPrint(String),
    /// A PDF document could not be parsed.
    PdfError(String),
    /// An IO error.
    IoError(io::Error),
    /// A record could not be (de)serialized.
    JsonError(serde_json::Error),
}

impl From<io::Error> for ErrorKind {
    fn from(error: io::Error) -> ErrorKind {
        ErrorKind::IoError(error)
    }
}

impl From<serde_json::Error> for ErrorKind {
    fn from(error: serde_json::Error) -> ErrorKind {
        ErrorKind::JsonError(error)
    }
}

impl From<lopdf::Error> for ErrorKind {
    fn from(error: lopdf::Error) -> ErrorKind {
        ErrorKind::PdfError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_error_display_and_source() {
        let io_err = io::Error::new(io::ErrorKind::Other, "io fail");
        let e: Error = Error::new("oops", ErrorKind::IoError(io_err));
        assert_eq!(format!("{}", e), "oops");
        match e.source() {
            Some(src) => {
                let src_str = format!("{}", src);
                assert!(src_str.contains("io fail"));
            }
            None => panic!("expected source for IoError"),
        }
    }

    #[test]
    fn test_context_maps_errors() {
        let res: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::Other, "boom"));
        let mapped = res.context("wrapped");
        match mapped {
            Err(err) => {
                assert_eq!(format!("{}", err), "wrapped");
                match err.kind() {
                    ErrorKind::IoError(ioe) => assert_eq!(ioe.kind(), io::ErrorKind::Other),
                    k => panic!("unexpected kind: {:?}", k),
                }
            }
            Ok(_) => panic!("expected Err"),
        }
    }

    #[test]
    fn test_json_errors_keep_their_source() {
        let res: Result<serde_json::Value, serde_json::Error> = serde_json::from_str("{");
        let err = res.with_context(|| "bundle is not valid JSON").unwrap_err();
        assert_eq!(err.to_string(), "bundle is not valid JSON");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_lopdf_errors_keep_their_text() {
        let res = lopdf::Document::load_mem(b"not a pdf").map(|_| ());
        let err = res.context("Failed to parse PDF").unwrap_err();
        match err.kind() {
            ErrorKind::PdfError(detail) => assert!(!detail.is_empty()),
            k => panic!("unexpected kind: {:?}", k),
        }
    }

    #[test]
    fn test_unresolved_placeholder_has_no_source() {
        let e = Error::new(
            "unresolved",
            ErrorKind::UnresolvedPlaceholder(vec!["clientName".into()]),
        );
        assert!(e.source().is_none());
        match e.kind() {
            ErrorKind::UnresolvedPlaceholder(tokens) => assert_eq!(tokens, &["clientName"]),
            k => panic!("unexpected kind: {:?}", k),
        }
    }
}
