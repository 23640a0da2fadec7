use std::fmt;

#[derive(Debug)]
pub enum Error {
    NotFound,
    AlreadyExists,
    InvalidPath(&'static str),
    InvalidSeek,
    Closed,
    OutOfOrder(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "file does not exist"),
            Error::AlreadyExists => write!(f, "file already exists"),
            Error::InvalidPath(msg) => write!(f, "invalid path: {msg}"),
            Error::InvalidSeek => write!(f, "invalid seek target"),
            Error::Closed => write!(f, "handle is closed"),
            Error::OutOfOrder(path) => write!(f, "out-of-order insert: {path}"),
            Error::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

impl From<Error> for std::io::Error {
    fn from(value: Error) -> Self {
        use std::io::ErrorKind;
        match value {
            Error::NotFound => ErrorKind::NotFound.into(),
            Error::AlreadyExists => ErrorKind::AlreadyExists.into(),
            Error::InvalidPath(_) | Error::InvalidSeek => {
                std::io::Error::new(ErrorKind::InvalidInput, value)
            }
            Error::Closed | Error::OutOfOrder(_) => {
                std::io::Error::new(ErrorKind::Other, value)
            }
            Error::Io(err) => err,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
