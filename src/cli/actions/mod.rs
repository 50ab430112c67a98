pub mod hash_password;
pub mod server;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    HashPassword { password: SecretString },
}
