//! Integration tests for the md5db file digest catalog

mod cli_parse;
mod end_to_end;
mod store_roundtrip;
