//! Detection of a usable WebAuthn capability on the platform.

use crate::{Platform, WebauthnError};

/// Determine whether the platform can be used for FIDO2 ceremonies.
///
/// Fails with [`WebauthnError::WebAuthnUnavailable`] when the platform has no public-key
/// credential API and, if `require_platform_authenticator` is set, with
/// [`WebauthnError::WebAuthnPlatformUnavailable`] when no user-verifying platform authenticator is
/// available. The check is advisory: credential operations re-validate on their own.
pub async fn is_fido2_available<P>(
    platform: &P,
    require_platform_authenticator: bool,
) -> Result<bool, WebauthnError>
where
    P: Platform + ?Sized,
{
    if !platform.has_public_key_credential() {
        return Err(WebauthnError::WebAuthnUnavailable);
    }

    if require_platform_authenticator {
        ensure_platform_authenticator(platform).await?;
    }

    Ok(true)
}

/// Fail unless a user-verifying platform authenticator is available.
pub(crate) async fn ensure_platform_authenticator<P>(platform: &P) -> Result<(), WebauthnError>
where
    P: Platform + ?Sized,
{
    match platform
        .is_user_verifying_platform_authenticator_available()
        .await
    {
        Ok(true) => Ok(()),
        Ok(false) => Err(WebauthnError::WebAuthnPlatformUnavailable),
        Err(err) => {
            log::error!(
                "Error querying platform authenticator availability with code: {:?} and message: {} and name: {}",
                err.code,
                err.message,
                err.name
            );
            Err(WebauthnError::PlatformOperation(err))
        }
    }
}
