//! Account rules shared by students and professors.
//!
//! Registration number (matrícula) format, email uniqueness messages and the
//! password-change handshake applied on self-service account updates.

use crate::error::{CoreError, FieldErrors, NON_FIELD_ERRORS};

/// Exact length of a student registration number.
pub const REGISTRATION_NUMBER_LEN: usize = 12;

pub const MSG_EMAIL_TAKEN: &str = "Já existe um usuário cadastrado com o e-mail informado.";
pub const MSG_REGISTRATION_TAKEN: &str = "Já existe um aluno com a matrícula informada.";
pub const MSG_REGISTRATION_LENGTH: &str = "A matrícula deve ter 12 caracteres.";
pub const MSG_REGISTRATION_DIGITS: &str = "Devem ser informados apenas números na matrícula.";
pub const MSG_WRONG_PASSWORD: &str = "Senha incorreta.";
pub const MSG_PASSWORD_PAIR_REQUIRED: &str =
    "Ao alterar a senha, a nova senha e a confirmação devem ser informados.";
pub const MSG_PASSWORD_MISMATCH: &str = "A nova_senha e a confirmação da senha não conferem.";
pub const MSG_EMAIL_NOT_FOUND: &str = "E-mail de usuário não encontrado.";

/// Validate a registration number: exactly 12 characters, all ASCII digits.
pub fn validate_registration_number(value: &str) -> Result<(), String> {
    if value.chars().count() != REGISTRATION_NUMBER_LEN {
        return Err(MSG_REGISTRATION_LENGTH.to_string());
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(MSG_REGISTRATION_DIGITS.to_string());
    }
    Ok(())
}

/// Validate that a password meets the minimum length.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!(
            "A senha deve ter pelo menos {min_length} caracteres."
        ));
    }
    Ok(())
}

/// Password fields supplied on an account update.
#[derive(Debug, Default, Clone, Copy)]
pub struct PasswordChange<'a> {
    /// Current password (`senha`).
    pub current: Option<&'a str>,
    /// Replacement (`nova_senha`).
    pub new: Option<&'a str>,
    /// Repeated replacement (`confirmacao_senha`).
    pub confirmation: Option<&'a str>,
}

/// Resolve a password change request.
///
/// Returns `Ok(None)` when no current password was supplied (nothing to
/// change), `Ok(Some(new))` when the change is valid. `current_matches` is
/// the result of verifying `current` against the stored hash and is only
/// consulted when `current` is present.
pub fn resolve_password_change<'a>(
    change: PasswordChange<'a>,
    current_matches: bool,
    min_length: usize,
) -> Result<Option<&'a str>, CoreError> {
    if change.current.map_or(true, str::is_empty) {
        return Ok(None);
    }
    if !current_matches {
        return Err(CoreError::validation("senha", MSG_WRONG_PASSWORD));
    }

    let (new, confirmation) = match (change.new, change.confirmation) {
        (Some(n), Some(c)) if !n.is_empty() && !c.is_empty() => (n, c),
        _ => return Err(CoreError::rule(MSG_PASSWORD_PAIR_REQUIRED)),
    };

    if new != confirmation {
        return Err(CoreError::rule(MSG_PASSWORD_MISMATCH));
    }

    validate_password_strength(new, min_length)
        .map_err(|msg| CoreError::validation("nova_senha", msg))?;

    Ok(Some(new))
}

/// Collect signup field errors that do not need the database.
pub fn validate_signup(
    password: &str,
    registration_number: Option<&str>,
    min_length: usize,
) -> Result<(), CoreError> {
    let mut errors = FieldErrors::new();
    if let Err(msg) = validate_password_strength(password, min_length) {
        errors.add("senha", msg);
    }
    if let Some(number) = registration_number {
        if let Err(msg) = validate_registration_number(number) {
            errors.add("matricula", msg);
        }
    }
    errors.into_result()
}

/// Error for a registration number already held by another student.
pub fn registration_taken() -> CoreError {
    CoreError::validation("matricula", MSG_REGISTRATION_TAKEN)
}

/// Error for an email already held by any account.
pub fn email_taken() -> CoreError {
    CoreError::validation("email", MSG_EMAIL_TAKEN)
}

/// Error for a password-recovery request naming an unknown email.
pub fn email_not_found() -> CoreError {
    CoreError::validation(NON_FIELD_ERRORS, MSG_EMAIL_NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn change<'a>(
        current: Option<&'a str>,
        new: Option<&'a str>,
        confirmation: Option<&'a str>,
    ) -> PasswordChange<'a> {
        PasswordChange {
            current,
            new,
            confirmation,
        }
    }

    #[test]
    fn registration_number_must_have_twelve_digits() {
        assert!(validate_registration_number("202200000001").is_ok());
        assert_eq!(
            validate_registration_number("20220000000").unwrap_err(),
            MSG_REGISTRATION_LENGTH
        );
        assert_eq!(
            validate_registration_number("2022000000ab").unwrap_err(),
            MSG_REGISTRATION_DIGITS
        );
    }

    #[test]
    fn non_ascii_digits_are_rejected() {
        // Arabic-Indic digits are numeric but not ASCII.
        assert!(validate_registration_number("٠١٢٣٤٥٦٧٨٩٠١").is_err());
    }

    #[test]
    fn no_current_password_means_no_change() {
        let result = resolve_password_change(change(None, Some("novasenha"), None), false, 6);
        assert_matches!(result, Ok(None));
    }

    #[test]
    fn wrong_current_password_is_rejected() {
        let result = resolve_password_change(
            change(Some("velha"), Some("novasenha"), Some("novasenha")),
            false,
            6,
        );
        assert_matches!(result, Err(CoreError::Validation(e)) if e.get("senha").is_some());
    }

    #[test]
    fn new_password_and_confirmation_required() {
        let result =
            resolve_password_change(change(Some("velha"), Some("novasenha"), None), true, 6);
        assert_matches!(
            result,
            Err(CoreError::Validation(e)) if e.first_message() == Some(MSG_PASSWORD_PAIR_REQUIRED)
        );
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let result = resolve_password_change(
            change(Some("velha"), Some("novasenha"), Some("outrasenha")),
            true,
            6,
        );
        assert_matches!(
            result,
            Err(CoreError::Validation(e)) if e.first_message() == Some(MSG_PASSWORD_MISMATCH)
        );
    }

    #[test]
    fn valid_change_returns_new_password() {
        let result = resolve_password_change(
            change(Some("velha"), Some("novasenha"), Some("novasenha")),
            true,
            6,
        );
        assert_matches!(result, Ok(Some("novasenha")));
    }

    #[test]
    fn signup_collects_every_field_error() {
        let err = validate_signup("123", Some("abc"), 6).unwrap_err();
        match err {
            CoreError::Validation(errors) => {
                assert!(errors.get("senha").is_some());
                assert!(errors.get("matricula").is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
