//! Gated access sub-flow

use candy_mint_common::{Address, PassRequestKind};

use super::alert::{messages, AlertState};
use super::classify::classify_error;
use super::state::{MintFailure, MintState};
use super::{MintOrchestrator, SignWith};

impl MintOrchestrator {
    /// Make sure the wallet holds a valid pass for `network`, issuing or
    /// refreshing one when it does not
    pub(super) async fn ensure_gating_pass(&self, network: &Address) -> Result<(), MintFailure> {
        let issuer = self.gating.as_deref().ok_or_else(|| {
            MintFailure::Configuration(
                "Mint is gated but no gating pass issuer is configured".to_string(),
            )
        })?;

        match issuer.has_valid_pass(network, &self.wallet).await {
            Ok(true) => return Ok(()),
            Ok(false) => (),
            // Fail closed: try to obtain a pass
            Err(err) => tracing::warn!("Could not check gating pass: {}", err),
        }

        self.shared.set_state(MintState::AcquiringPass);

        let issuance = issuer
            .request_pass(network, &self.wallet)
            .await
            .map_err(|err| classify_error(&err))?;

        let sign_with = if issuance.requires_user_signature {
            self.shared.set_alert(AlertState::info(messages::SIGN_PASS));
            SignWith::Wallet
        } else {
            if issuance.kind == PassRequestKind::Refresh {
                self.shared
                    .set_alert(AlertState::info(messages::REFRESHING_PASS));
            }
            SignWith::Issuer(issuer)
        };

        self.sign_submit_confirm(issuance.transaction, sign_with, MintState::AcquiringPass)
            .await
            .map_err(|failure| match failure {
                MintFailure::TimedOut => MintFailure::PassDropped,
                failure => failure,
            })?;

        tracing::debug!("Gating pass acquired for {}", self.wallet);
        Ok(())
    }
}
