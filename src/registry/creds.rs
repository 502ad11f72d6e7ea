//! Username/token pass-through to the external registry client. No
//! authentication logic of our own — just a value to thread through.

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}
