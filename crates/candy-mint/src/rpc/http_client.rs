//! JSON-RPC client for a ledger node

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use candy_mint_common::{
    AccountInfo, Address, Amount, Blockhash, Commitment, Error, NetworkClient, ProgramErrorCode,
    Signature, SignatureStatus, SignedTransaction, TransactionError,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;
use url::Url;

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct RpcAccount {
    data: (String, String),
    owner: String,
    lamports: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTokenAmount {
    amount: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTokenInfo {
    token_amount: RpcTokenAmount,
}

#[derive(Debug, Deserialize)]
struct RpcParsedToken {
    info: RpcTokenInfo,
}

#[derive(Debug, Deserialize)]
struct RpcParsedData {
    parsed: RpcParsedToken,
}

#[derive(Debug, Deserialize)]
struct RpcTokenAccountData {
    data: RpcParsedData,
}

#[derive(Debug, Deserialize)]
struct RpcKeyedTokenAccount {
    account: RpcTokenAccountData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcSignatureStatus {
    slot: u64,
    confirmations: Option<u64>,
    err: Option<Value>,
    confirmation_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcBlockhash {
    blockhash: String,
}

/// Ledger node client over JSON-RPC
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    url: Url,
    next_id: Arc<AtomicU64>,
}

impl HttpClient {
    /// Create new [`HttpClient`]
    pub fn new(url: Url) -> Self {
        Self {
            inner: Client::new(),
            url,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Create new [`HttpClient`] with a custom reqwest client
    pub fn with_client(url: Url, inner: Client) -> Self {
        Self {
            inner,
            url,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Node url
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn call<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .inner
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::RpcUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RpcUnavailable(format!(
                "{} answered {}",
                method, status
            )));
        }

        let response: RpcResponse<R> = response.json().await.map_err(|e| {
            tracing::warn!("Rpc response error: {}", e);
            Error::RpcUnavailable(e.to_string())
        })?;

        if let Some(err) = response.error {
            return Err(match ProgramErrorCode::from_message(&err.message) {
                Some(code) => Error::Program(code),
                None => Error::Rpc {
                    code: err.code,
                    message: err.message,
                },
            });
        }

        response
            .result
            .ok_or_else(|| Error::RpcUnavailable(format!("{} returned no result", method)))
    }
}

/// Custom program error code of an `InstructionError`, e.g.
/// `{"InstructionError":[2,{"Custom":311}]}`
fn custom_code(err: &Value) -> Option<ProgramErrorCode> {
    err.get("InstructionError")?
        .get(1)?
        .get("Custom")?
        .as_u64()
        .and_then(|code| u32::try_from(code).ok())
        .map(ProgramErrorCode)
}

fn parse_status(status: RpcSignatureStatus) -> SignatureStatus {
    let confirmation = match status.confirmation_status.as_deref() {
        Some(name) => Commitment::from_str(name).ok(),
        // Older nodes: no confirmations means rooted
        None if status.confirmations.is_none() => Some(Commitment::Finalized),
        None => Some(Commitment::Processed),
    };

    SignatureStatus {
        slot: status.slot,
        confirmation,
        err: status.err.map(|err| TransactionError {
            code: custom_code(&err),
            message: err.to_string(),
        }),
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl NetworkClient for HttpClient {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn read_account(
        &self,
        address: &Address,
        commitment: Commitment,
    ) -> Result<Option<AccountInfo>, Error> {
        let response: WithContext<Option<RpcAccount>> = self
            .call(
                "getAccountInfo",
                json!([address.to_string(), { "encoding": "base64", "commitment": commitment }]),
            )
            .await?;

        let Some(account) = response.value else {
            return Ok(None);
        };

        let data = BASE64
            .decode(account.data.0.as_bytes())
            .map_err(|e| Error::InvalidAccountData(e.to_string()))?;

        Ok(Some(AccountInfo {
            owner: Address::from_str(&account.owner)?,
            lamports: Amount::from(account.lamports),
            data,
        }))
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn get_balance(
        &self,
        address: &Address,
        commitment: Commitment,
    ) -> Result<Amount, Error> {
        let response: WithContext<u64> = self
            .call(
                "getBalance",
                json!([address.to_string(), { "commitment": commitment }]),
            )
            .await?;

        Ok(Amount::from(response.value))
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn get_token_balance(
        &self,
        owner: &Address,
        mint: &Address,
        commitment: Commitment,
    ) -> Result<u64, Error> {
        let response: WithContext<Vec<RpcKeyedTokenAccount>> = self
            .call(
                "getTokenAccountsByOwner",
                json!([
                    owner.to_string(),
                    { "mint": mint.to_string() },
                    { "encoding": "jsonParsed", "commitment": commitment }
                ]),
            )
            .await?;

        response
            .value
            .iter()
            .map(|keyed| {
                keyed
                    .account
                    .data
                    .parsed
                    .info
                    .token_amount
                    .amount
                    .parse::<u64>()
                    .map_err(|e| Error::InvalidAccountData(e.to_string()))
            })
            .try_fold(0u64, |total, amount| Ok(total.saturating_add(amount?)))
    }

    #[instrument(skip_all, fields(url = %self.url))]
    async fn submit(&self, transaction: &SignedTransaction) -> Result<Signature, Error> {
        let signature: String = self
            .call(
                "sendTransaction",
                json!([BASE64.encode(&transaction.wire), { "encoding": "base64" }]),
            )
            .await?;

        Signature::from_str(&signature)
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, Error> {
        let response: WithContext<Vec<Option<RpcSignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([[signature.to_string()], { "searchTransactionHistory": true }]),
            )
            .await?;

        Ok(response
            .value
            .into_iter()
            .next()
            .flatten()
            .map(parse_status))
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn latest_blockhash(&self, commitment: Commitment) -> Result<Blockhash, Error> {
        let response: WithContext<RpcBlockhash> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": commitment }]),
            )
            .await?;

        Ok(Blockhash(response.value.blockhash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_custom_error_status() {
        let status: RpcSignatureStatus = serde_json::from_value(json!({
            "slot": 72,
            "confirmations": 10,
            "err": { "InstructionError": [2, { "Custom": 311 }] },
            "confirmationStatus": "confirmed"
        }))
        .unwrap();

        let status = parse_status(status);
        assert_eq!(status.slot, 72);
        assert_eq!(status.confirmation, Some(Commitment::Confirmed));
        let err = status.err.unwrap();
        assert_eq!(err.code, Some(ProgramErrorCode::CANDY_MACHINE_EMPTY));
    }

    #[test]
    fn test_parse_rooted_status() {
        let status: RpcSignatureStatus = serde_json::from_value(json!({
            "slot": 5,
            "confirmations": null,
            "err": null
        }))
        .unwrap();

        let status = parse_status(status);
        assert_eq!(status.confirmation, Some(Commitment::Finalized));
        assert!(status.err.is_none());
    }

    #[test]
    fn test_non_program_error() {
        assert_eq!(custom_code(&json!("AccountInUse")), None);
        assert_eq!(
            custom_code(&json!({ "InstructionError": [0, "InvalidAccountData"] })),
            None
        );
    }

    #[test]
    fn test_account_response() {
        let response: RpcResponse<WithContext<Option<RpcAccount>>> =
            serde_json::from_value(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "context": { "slot": 1 },
                    "value": {
                        "data": ["AQID", "base64"],
                        "executable": false,
                        "lamports": 1_000_000,
                        "owner": "11111111111111111111111111111111",
                        "rentEpoch": 2
                    }
                }
            }))
            .unwrap();

        let account = response.result.unwrap().value.unwrap();
        assert_eq!(BASE64.decode(account.data.0).unwrap(), vec![1, 2, 3]);
        assert_eq!(account.lamports, 1_000_000);
    }
}
