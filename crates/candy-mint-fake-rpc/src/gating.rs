//! Fake gating network

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use candy_mint_common::{
    Address, Error, GatingPassIssuer, PassIssuance, PassRequestKind, SignedTransaction,
    UnsignedTransaction,
};

use crate::{pass_instruction, sign_as, FakeLedger};

/// Issues passes recorded on a [`FakeLedger`]
#[derive(Debug, Clone)]
pub struct FakePassIssuer {
    ledger: FakeLedger,
    address: Address,
    requires_user_signature: bool,
    fail_requests: Arc<AtomicBool>,
}

impl FakePassIssuer {
    /// Create new [`FakePassIssuer`] signing issuances itself as `address`
    pub fn new(ledger: FakeLedger, address: Address) -> Self {
        Self {
            ledger,
            address,
            requires_user_signature: false,
            fail_requests: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Issuances must be signed by the wallet
    pub fn requiring_user_signature(mut self) -> Self {
        self.requires_user_signature = true;
        self
    }

    /// Fail every following pass request
    pub fn set_fail_requests(&self, fail: bool) {
        self.fail_requests.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl GatingPassIssuer for FakePassIssuer {
    async fn has_valid_pass(&self, network: &Address, wallet: &Address) -> Result<bool, Error> {
        Ok(self.ledger.has_pass(network, wallet).await)
    }

    async fn request_pass(
        &self,
        network: &Address,
        wallet: &Address,
    ) -> Result<PassIssuance, Error> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(Error::PassIssuance(
                "gating network unavailable".to_string(),
            ));
        }

        let kind = if self.ledger.has_expired_pass(network, wallet).await {
            PassRequestKind::Refresh
        } else {
            PassRequestKind::Issue
        };
        let fee_payer = if self.requires_user_signature {
            *wallet
        } else {
            self.address
        };

        Ok(PassIssuance {
            kind,
            transaction: UnsignedTransaction::new(
                fee_payer,
                vec![pass_instruction(network, wallet)],
            ),
            requires_user_signature: self.requires_user_signature,
        })
    }

    async fn sign_issuance(
        &self,
        transaction: UnsignedTransaction,
    ) -> Result<SignedTransaction, Error> {
        sign_as(&self.address, transaction)
    }
}
