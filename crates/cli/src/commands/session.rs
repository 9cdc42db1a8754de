//! Session commands.

use secrecy::SecretString;
use shopfront_storefront::ShopState;

use super::CommandError;
use crate::output;

/// Sign in with `token` and pull the backend cart.
pub async fn login(state: &ShopState, token: String) -> Result<(), CommandError> {
    let sync = state.login(SecretString::from(token))?;
    if let Some(sync) = sync {
        sync.wait().await;
    }

    if state.session().is_signed_in() {
        output::line(&format!("Signed in ({} items in cart)", state.cart_count()));
    } else {
        output::line("No token given, still signed out");
    }
    Ok(())
}

/// Sign out and empty the local cart.
pub fn logout(state: &ShopState) -> Result<(), CommandError> {
    state.logout()?;
    output::line("Signed out");
    Ok(())
}
