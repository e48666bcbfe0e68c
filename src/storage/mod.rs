//! Durable repository backends.

pub mod postgres;

pub use postgres::PgRepository;
