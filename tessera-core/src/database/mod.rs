pub mod memory;
pub mod ports;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::InMemoryUsersRepository;
#[cfg(feature = "database")]
pub use postgres::PostgresUsersRepository;
