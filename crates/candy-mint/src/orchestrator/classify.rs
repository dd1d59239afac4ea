//! Failure classification
//!
//! Every failure of an attempt ends up as one [`MintFailure`] and one alert.

use std::collections::BTreeSet;

use candy_mint_common::{Error, ProgramErrorCode, ProgramErrorKind, TransactionError};

use super::alert::{messages, AlertState, LIKELY_FAILED_HIDE_AFTER};
use super::state::MintFailure;
use crate::eligibility::ReasonCode;

fn from_code(code: ProgramErrorCode) -> MintFailure {
    match code.kind() {
        ProgramErrorKind::SoldOut => MintFailure::SoldOut,
        ProgramErrorKind::NotLive => MintFailure::NotLive,
        ProgramErrorKind::InsufficientFunds => MintFailure::InsufficientFunds,
        ProgramErrorKind::Other => MintFailure::ProgramRejected(Some(code)),
    }
}

/// Classify an error raised while building, signing or submitting
pub fn classify_error(err: &Error) -> MintFailure {
    match err {
        Error::UserRejected => MintFailure::UserCancelled,
        Error::Timeout => MintFailure::TimedOut,
        Error::Program(code) => from_code(*code),
        // Preflight simulation failures come back as rpc errors carrying the
        // program error in the message
        Error::Rpc { message, .. } | Error::TransactionRejected(message) => {
            match ProgramErrorCode::from_message(message) {
                Some(code) => from_code(code),
                None if matches!(err, Error::Rpc { .. }) => MintFailure::Network(err.to_string()),
                None => MintFailure::ProgramRejected(None),
            }
        }
        Error::RpcUnavailable(_) => MintFailure::Network(err.to_string()),
        Error::PassIssuance(reason) => MintFailure::PassUnavailable(reason.clone()),
        err if err.is_configuration() => MintFailure::Configuration(err.to_string()),
        _ => MintFailure::ProgramRejected(None),
    }
}

/// Classify an execution error of a landed transaction
pub fn classify_transaction_error(err: &TransactionError) -> MintFailure {
    err.code
        .or_else(|| ProgramErrorCode::from_message(&err.message))
        .map(from_code)
        .unwrap_or(MintFailure::ProgramRejected(None))
}

impl MintFailure {
    /// Alert shown for this failure
    pub fn alert(&self) -> AlertState {
        match self {
            MintFailure::NotEligible(reasons) => AlertState::error(ineligible_message(reasons)),
            MintFailure::NotReady => AlertState::warning(messages::NOT_READY),
            MintFailure::SoldOut => AlertState::error(messages::SOLD_OUT),
            MintFailure::NotLive => AlertState::error(messages::NOT_LIVE),
            MintFailure::InsufficientFunds => AlertState::error(messages::INSUFFICIENT_FUNDS),
            MintFailure::ProgramRejected(_) => AlertState::error(messages::MINT_FAILED),
            MintFailure::UserCancelled => AlertState::error(messages::USER_CANCELLED),
            MintFailure::TimedOut => AlertState::error(messages::TIMEOUT),
            MintFailure::LikelyFailed => AlertState::error(messages::MINT_LIKELY_FAILED)
                .hide_after(Some(LIKELY_FAILED_HIDE_AFTER)),
            MintFailure::PassDropped => AlertState::warning(messages::PASS_DROPPED),
            MintFailure::PassUnavailable(_) => AlertState::error(messages::PASS_REQUIRED),
            MintFailure::Network(_) => AlertState::warning(messages::NETWORK_UNAVAILABLE),
            MintFailure::Configuration(reason) => AlertState::persistent(reason.clone()),
            MintFailure::Abandoned => AlertState::hidden(),
        }
    }
}

fn ineligible_message(reasons: &BTreeSet<ReasonCode>) -> &'static str {
    // Most specific reason first
    if reasons.contains(&ReasonCode::SoldOut) {
        messages::SOLD_OUT
    } else if reasons.contains(&ReasonCode::Ended) {
        messages::ENDED
    } else if reasons.contains(&ReasonCode::NotStarted) {
        messages::NOT_LIVE
    } else if reasons.contains(&ReasonCode::InsufficientBalance) {
        messages::INSUFFICIENT_FUNDS
    } else {
        messages::PASS_REQUIRED
    }
}

#[cfg(test)]
mod tests {
    use candy_mint_common::Address;

    use super::*;
    use crate::orchestrator::alert::Severity;

    #[test]
    fn test_program_codes() {
        assert_eq!(
            classify_error(&Error::Program(ProgramErrorCode(311))),
            MintFailure::SoldOut
        );
        assert_eq!(
            classify_error(&Error::Program(ProgramErrorCode(312))),
            MintFailure::NotLive
        );
        assert_eq!(
            classify_error(&Error::Program(ProgramErrorCode(309))),
            MintFailure::InsufficientFunds
        );
        assert_eq!(
            classify_error(&Error::Program(ProgramErrorCode(6001))),
            MintFailure::ProgramRejected(Some(ProgramErrorCode(6001)))
        );
    }

    #[test]
    fn test_preflight_message() {
        let err = Error::Rpc {
            code: -32002,
            message: "Transaction simulation failed: Error processing Instruction 0: custom program error: 0x137".to_string(),
        };
        assert_eq!(classify_error(&err), MintFailure::SoldOut);

        let err = Error::Rpc {
            code: -32005,
            message: "Node is behind".to_string(),
        };
        assert!(matches!(classify_error(&err), MintFailure::Network(_)));
    }

    #[test]
    fn test_landed_error() {
        let err = TransactionError {
            code: Some(ProgramErrorCode(0x135)),
            message: "InstructionError".to_string(),
        };
        assert_eq!(classify_transaction_error(&err), MintFailure::InsufficientFunds);

        let err = TransactionError {
            code: None,
            message: "InsufficientFundsForRent".to_string(),
        };
        assert_eq!(
            classify_transaction_error(&err),
            MintFailure::ProgramRejected(None)
        );
    }

    #[test]
    fn test_user_rejection_is_distinct() {
        let failure = classify_error(&Error::UserRejected);
        assert_eq!(failure, MintFailure::UserCancelled);
        assert!(!failure.counts_as_failure());
        assert_eq!(failure.alert().message, messages::USER_CANCELLED);
    }

    #[test]
    fn test_alerts() {
        assert_eq!(MintFailure::SoldOut.alert().message, "SOLD OUT");
        assert_eq!(
            MintFailure::TimedOut.alert().message,
            "Transaction timeout! Please try again."
        );

        let likely = MintFailure::LikelyFailed.alert();
        assert_eq!(likely.hide_after, Some(LIKELY_FAILED_HIDE_AFTER));

        let config = classify_error(&Error::AccountNotFound(Address::default())).alert();
        assert_eq!(config.hide_after, None);
        assert_eq!(config.severity, Severity::Error);

        let ineligible = MintFailure::NotEligible(BTreeSet::from([
            ReasonCode::NotStarted,
            ReasonCode::InsufficientBalance,
        ]));
        assert_eq!(ineligible.alert().message, messages::NOT_LIVE);
    }
}
