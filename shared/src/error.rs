#![allow(dead_code)]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    // DNS message wire format
    #[error("insufficient data for base length type")]
    ErrBaseLen,
    #[error("insufficient data for calculated length type")]
    ErrCalcLen,
    #[error("segment prefix is reserved")]
    ErrReserved,
    #[error("too many compression pointers")]
    ErrTooManyPtr,
    #[error("invalid compression pointer")]
    ErrInvalidPtr,
    #[error("name is longer than 255 bytes")]
    ErrNameTooLong,
    #[error("segment length too long")]
    ErrSegTooLong,
    #[error("zero length segment")]
    ErrZeroSegLen,
    #[error("resource length too long")]
    ErrResTooLong,
    #[error("insufficient data for resource body length")]
    ErrResourceLen,
    #[error("too many Questions")]
    ErrTooManyQuestions,
    #[error("too many Answers")]
    ErrTooManyAnswers,
    #[error("too many Authorities")]
    ErrTooManyAuthorities,
    #[error("too many Additionals")]
    ErrTooManyAdditionals,
    #[error("parsing/packing of this section has completed")]
    ErrSectionDone,

    // responder engine
    #[error("bad parameters: {0}")]
    ErrBadParameters(String),
    #[error("service id {0} is already registered")]
    ErrAlreadyActive(i32),
    #[error("internal error: {0}")]
    ErrInternal(String),
    #[error("listener limit reached")]
    ErrMaxLimit,
    #[error("no registration for id {0}")]
    ErrNoTransaction(i32),
    #[error("operation not running for id {0}")]
    ErrOperationNotRunning(i32),
    #[error("connection closed")]
    ErrConnectionClosed,
}
