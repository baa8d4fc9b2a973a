pub mod user;

/// Generate a new random identifier for a stored row
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
