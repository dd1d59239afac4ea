//! Transactions and signature statuses

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::address::Address;
use crate::commitment::Commitment;
use crate::error::{Error, ProgramErrorCode};

/// Length of a transaction signature in bytes
pub const SIGNATURE_LEN: usize = 64;

/// Maximum serialized transaction size accepted by the network
pub const MAX_TRANSACTION_SIZE: usize = 1230;

/// Account referenced by an instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
    /// Address
    pub address: Address,
    /// Must sign
    pub is_signer: bool,
    /// Written by the instruction
    pub is_writable: bool,
}

impl AccountMeta {
    /// Writable account
    pub fn writable(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: true,
        }
    }

    /// Read-only account
    pub fn readonly(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: false,
        }
    }
}

/// Program instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Program executing the instruction
    pub program_id: Address,
    /// Accounts
    pub accounts: Vec<AccountMeta>,
    /// Opaque instruction data
    pub data: Vec<u8>,
}

/// Recent blockhash a transaction is anchored to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blockhash(pub String);

impl fmt::Display for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transaction waiting for the wallet signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Fee payer, the connected wallet
    pub fee_payer: Address,
    /// Instructions in execution order
    pub instructions: Vec<Instruction>,
    /// Set right before signing
    pub recent_blockhash: Option<Blockhash>,
    /// Additional signers that already signed, e.g. a freshly generated mint
    pub partial_signers: Vec<Address>,
}

impl UnsignedTransaction {
    /// New transaction paid by `fee_payer`
    pub fn new(fee_payer: Address, instructions: Vec<Instruction>) -> Self {
        Self {
            fee_payer,
            instructions,
            recent_blockhash: None,
            partial_signers: Vec::new(),
        }
    }

    /// Anchor the transaction to a blockhash
    pub fn with_blockhash(mut self, blockhash: Blockhash) -> Self {
        self.recent_blockhash = Some(blockhash);
        self
    }
}

/// Transaction signature, also the transaction id
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    /// Create [`Signature`] from raw bytes
    pub const fn new(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

impl FromStr for Signature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| Error::Custom(format!("Invalid signature: {}", e)))?;
        let bytes: [u8; SIGNATURE_LEN] = decoded.as_slice().try_into().map_err(|_| {
            Error::Custom(format!(
                "Invalid signature length: expected 64 bytes, got {}",
                decoded.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Signature::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Transaction signed by the wallet, ready to submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Fee payer signature, the transaction id
    pub signature: Signature,
    /// Serialized wire format
    pub wire: Vec<u8>,
    /// The transaction that was signed
    pub transaction: UnsignedTransaction,
}

/// Execution error reported for a landed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionError {
    /// Custom program error code, when the failure came from a program
    pub code: Option<ProgramErrorCode>,
    /// Raw error description
    pub message: String,
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} [program error {}]", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

/// Status of a submitted signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureStatus {
    /// Slot the transaction was processed in
    pub slot: u64,
    /// Commitment reached so far, `None` when the node does not report it
    pub confirmation: Option<Commitment>,
    /// Execution error
    pub err: Option<TransactionError>,
}

impl SignatureStatus {
    /// Reached at least `commitment`
    pub fn has_reached(&self, commitment: Commitment) -> bool {
        self.confirmation.is_some_and(|reached| reached >= commitment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_string_form() {
        let signature = Signature::new([42; SIGNATURE_LEN]);
        let parsed = Signature::from_str(&signature.to_string()).unwrap();
        assert_eq!(parsed, signature);
        assert!(Signature::from_str("abc").is_err());
    }

    #[test]
    fn test_status_reached() {
        let status = SignatureStatus {
            slot: 10,
            confirmation: Some(Commitment::Confirmed),
            err: None,
        };
        assert!(status.has_reached(Commitment::Processed));
        assert!(status.has_reached(Commitment::Confirmed));
        assert!(!status.has_reached(Commitment::Finalized));

        let unknown = SignatureStatus {
            confirmation: None,
            ..status
        };
        assert!(!unknown.has_reached(Commitment::Processed));
    }
}
