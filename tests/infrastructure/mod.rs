mod observability;
mod persistence;
mod storage;
