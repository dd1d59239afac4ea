//! Fake wallet signer

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use candy_mint_common::{Address, Error, SignedTransaction, UnsignedTransaction, WalletSigner};

use crate::sign_as;

/// Wallet that signs everything, unless told to reject
#[derive(Debug, Clone)]
pub struct FakeSigner {
    address: Address,
    reject: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
    delay_ms: Arc<AtomicU64>,
}

impl FakeSigner {
    /// Create new [`FakeSigner`]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            reject: Arc::new(AtomicBool::new(false)),
            requests: Arc::new(AtomicUsize::new(0)),
            delay_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Reject every following signature request
    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    /// Hold every signature request for `delay`, like a wallet prompt
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Signature requests so far, rejected ones included
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletSigner for FakeSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_transaction(
        &self,
        transaction: UnsignedTransaction,
    ) -> Result<SignedTransaction, Error> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let delay_ms = self.delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        if self.reject.load(Ordering::SeqCst) {
            tracing::debug!("Fake signer {} rejecting", self.address);
            return Err(Error::UserRejected);
        }

        if transaction.fee_payer != self.address {
            return Err(Error::Signer(format!(
                "Fee payer {} is not {}",
                transaction.fee_payer, self.address
            )));
        }

        sign_as(&self.address, transaction)
    }
}
