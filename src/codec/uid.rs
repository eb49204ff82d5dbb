use uuid::Uuid;

/// Generate a fresh UID of the form `{uuid}@{first four chars}.org`
pub fn generate() -> String {
    let id = Uuid::new_v4().to_string();
    format!("{}@{}.org", id, &id[..4])
}
