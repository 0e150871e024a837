use serde::{Deserialize, Serialize};

/// Sign-in form / upstream sign-in payload.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body returned by the upstream sign-in endpoint on HTTP 200.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    pub token: String,
}
