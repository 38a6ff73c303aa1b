use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not access ledger file")]
    FileError(#[from] std::io::Error),
    #[error("could not read or write ledger CSV rows")]
    CsvError(#[from] csv::Error),
    #[error(transparent)]
    BusinessError(#[from] crate::domain::error::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::io::{self, Read};

    use super::*;

    struct Unreadable;

    impl Read for Unreadable {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk gone"))
        }
    }

    #[test]
    fn read_failure_surfaces_as_csv_error() {
        let err = crate::csv::read(Unreadable).unwrap_err();

        assert!(matches!(err, Error::CsvError(_)));
        assert_eq!(err.to_string(), "could not read or write ledger CSV rows");
    }
}
