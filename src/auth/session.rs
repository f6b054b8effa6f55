use actix_session::Session;

/// Session keys written by the authentication subsystem.
pub const USER_ID_KEY: &str = "user_id";
pub const USERNAME_KEY: &str = "username";
const FLASH_KEY: &str = "flash";

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>(USER_ID_KEY).unwrap_or(None)
}

pub fn get_username(session: &Session) -> Option<String> {
    session.get::<String>(USERNAME_KEY).unwrap_or(None)
}

/// Store a one-time message shown on the next rendered page.
pub fn set_flash(session: &Session, message: &str) {
    if let Err(e) = session.insert(FLASH_KEY, message) {
        log::warn!("Failed to store flash message: {e}");
    }
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>(FLASH_KEY).unwrap_or(None);
    if flash.is_some() {
        session.remove(FLASH_KEY);
    }
    flash
}
