pub mod users;

pub use users::PostgresUsersRepository;
