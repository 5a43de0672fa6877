#![allow(dead_code)]

mod test_postgres;

pub use fixtures::{
    FailingTalkRepository, FaultyReaderStore, HEADER, ImportFixture, RejectingJobRepository, csv,
    upload,
};
pub use test_postgres::TestPostgres;
