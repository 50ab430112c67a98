use secrecy::SecretString;

/// Process-wide credentials read once at startup.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub admin_username: String,
    pub admin_password_hash: Option<String>,
    pub admin_password: Option<SecretString>,
    pub session_secret: Option<SecretString>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(admin_username: String) -> Self {
        Self {
            admin_username,
            admin_password_hash: None,
            admin_password: None,
            session_secret: None,
        }
    }

    #[must_use]
    pub fn with_admin_password_hash(mut self, hash: Option<String>) -> Self {
        self.admin_password_hash = hash;
        self
    }

    #[must_use]
    pub fn with_admin_password(mut self, password: Option<SecretString>) -> Self {
        self.admin_password = password;
        self
    }

    #[must_use]
    pub fn with_session_secret(mut self, secret: Option<SecretString>) -> Self {
        self.session_secret = secret;
        self
    }
}
