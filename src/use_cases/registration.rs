use std::time::Duration;

use crate::domain::{Identity, RegistrationRequest, Route};
use crate::use_cases::role_router::landing_route;
use crate::use_cases::session::{LoginOutcome, RegisterOutcome, SessionHolder};

pub const MIN_PASSWORD_LEN: usize = 6;
/// Pause before sending the user to the login page when auto-login fails.
pub const LOGIN_FALLBACK_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,
}

pub fn validate(form: &RegistrationRequest) -> Result<(), RegistrationError> {
    if form.password != form.confirm_password {
        return Err(RegistrationError::PasswordMismatch);
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(RegistrationError::PasswordTooShort);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    /// Rejected locally; nothing was sent.
    Invalid(RegistrationError),
    /// The backend refused the account.
    Failed(String),
    /// Account created and signed in.
    SignedIn { identity: Identity, destination: Route },
    /// Account created but the automatic sign-in did not work.
    LoginRequired { redirect: Route, after: Duration },
}

impl RegistrationOutcome {
    pub fn message(&self) -> String {
        match self {
            RegistrationOutcome::Invalid(err) => err.to_string(),
            RegistrationOutcome::Failed(message) => message.clone(),
            RegistrationOutcome::SignedIn { .. } | RegistrationOutcome::LoginRequired { .. } => {
                "Account created successfully! Signing you in...".to_string()
            }
        }
    }
}

/// Registers the account, then signs in with the same credentials.
pub async fn register_and_sign_in(
    session: &SessionHolder,
    form: RegistrationRequest,
) -> RegistrationOutcome {
    if let Err(err) = validate(&form) {
        return RegistrationOutcome::Invalid(err);
    }

    let email = form.email.clone();
    let password = form.password.clone();

    if let RegisterOutcome::Failure(message) = session.register(form).await {
        return RegistrationOutcome::Failed(message);
    }

    match session.login(&email, &password).await {
        LoginOutcome::Success(identity) => {
            let destination = landing_route(Some(&identity));
            RegistrationOutcome::SignedIn {
                identity,
                destination,
            }
        }
        LoginOutcome::Failure(message) => {
            tracing::warn!(%message, "auto-login after registration failed.");
            RegistrationOutcome::LoginRequired {
                redirect: Route::Login,
                after: LOGIN_FALLBACK_DELAY,
            }
        }
    }
}
