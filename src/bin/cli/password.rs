//! Password prompting for CLI operations.

use rpassword::prompt_password;
use varc::Password;

/// Returns the provided password, or prompts for one.
pub fn get_password(provided: &Option<String>) -> Option<Password> {
    if let Some(pwd) = provided {
        return Some(Password::new(pwd.clone()));
    }
    match prompt_password("Enter password: ") {
        Ok(pwd) if !pwd.is_empty() => Some(Password::new(pwd)),
        _ => None,
    }
}

/// Returns the provided password, or prompts twice and requires both
/// entries to match. Used when creating encrypted archives.
pub fn get_password_confirmed(provided: &Option<String>) -> Option<Password> {
    if let Some(pwd) = provided {
        return Some(Password::new(pwd.clone()));
    }

    let first = match prompt_password("Enter password: ") {
        Ok(pwd) => pwd,
        Err(_) => return None,
    };
    if first.is_empty() {
        eprintln!("Password cannot be empty");
        return None;
    }
    let second = match prompt_password("Confirm password: ") {
        Ok(pwd) => pwd,
        Err(_) => return None,
    };
    if first == second {
        Some(Password::new(first))
    } else {
        eprintln!("Passwords do not match");
        None
    }
}
