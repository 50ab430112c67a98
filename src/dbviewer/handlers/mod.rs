pub mod health;
pub use self::health::health;

pub mod index;
pub use self::index::index;

pub mod login;
pub use self::login::{login, login_page, logout};

pub mod records;
pub use self::records::{create_data, delete_data, get_data, list_data, update_data};

#[cfg(test)]
mod tests;
