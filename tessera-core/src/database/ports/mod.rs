pub mod users;

pub use users::UsersRepository;
