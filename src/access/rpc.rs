//! Ethereum JSON-RPC oracle.
//!
//! Issues `eth_call` against the lock contract; optionally checks once that
//! the endpoint serves the lock's network.

use super::{
    AccessError, AccessOracle, Address, Lock, OracleFuture,
    abi::{decode_balance, encode_balance_of},
};
use crate::log;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tokio::sync::OnceCell;

/// Per-request timeout for the RPC endpoint.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl RpcResponse {
    /// Extract the string result, turning JSON-RPC errors into [`AccessError::Rpc`].
    fn into_hex(self) -> Result<String, AccessError> {
        if let Some(RpcErrorBody { code, message }) = self.error {
            return Err(AccessError::Rpc { code, message });
        }
        match self.result {
            Some(Value::String(hex)) => Ok(hex),
            Some(other) => Err(AccessError::Decode(format!("unexpected result: {other}"))),
            None => Err(AccessError::Decode("response has neither result nor error".into())),
        }
    }
}

/// [`AccessOracle`] backed by an HTTP JSON-RPC endpoint.
pub struct RpcOracle {
    client: reqwest::Client,
    url: String,
    verify_chain: bool,
    chain_id: OnceCell<u64>,
    next_id: AtomicU64,
}

impl RpcOracle {
    pub fn new(url: &str, verify_chain: bool) -> Result<Self, AccessError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: url.to_owned(),
            verify_chain,
            chain_id: OnceCell::new(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<String, AccessError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_hex()
    }

    /// Chain id reported by the endpoint, fetched once.
    pub async fn chain_id(&self) -> Result<u64, AccessError> {
        let id = self
            .chain_id
            .get_or_try_init(|| async {
                let hex = self.call("eth_chainId", json!([])).await?;
                let id = parse_quantity(&hex)?;
                log!("oracle"; "endpoint serves chain {id}");
                Ok::<_, AccessError>(id)
            })
            .await?;
        Ok(*id)
    }

    async fn read_balance(
        &self,
        lock: &Lock,
        owner: &Address,
    ) -> Result<super::Balance, AccessError> {
        if self.verify_chain {
            let actual = self.chain_id().await?;
            if actual != lock.network {
                return Err(AccessError::ChainMismatch {
                    expected: lock.network,
                    actual,
                });
            }
        }

        let call = json!({
            "to": lock.address.to_string(),
            "data": encode_balance_of(owner),
        });
        let data = self.call("eth_call", json!([call, "latest"])).await?;
        decode_balance(&data)
    }
}

impl AccessOracle for RpcOracle {
    fn balance_of<'a>(&'a self, lock: &'a Lock, owner: &'a Address) -> OracleFuture<'a> {
        Box::pin(self.read_balance(lock, owner))
    }
}

/// Parse a JSON-RPC hex quantity such as `"0x5"`.
fn parse_quantity(hex: &str) -> Result<u64, AccessError> {
    let digits = hex
        .strip_prefix("0x")
        .ok_or_else(|| AccessError::Decode(format!("quantity `{hex}` lacks 0x prefix")))?;
    u64::from_str_radix(digits, 16).map_err(|e| AccessError::Decode(format!("`{hex}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::thread;
    use tiny_http::{Header, Response, Server};

    const LOCK: &str = "0x8C1C77B37549De45834739f8cf8b9181D690e2bf";
    const OWNER: &str = "0x00000000000000000000000000000000000a11ce";

    fn lock(network: u64) -> Lock {
        Lock {
            address: Address::parse(LOCK).unwrap(),
            network,
        }
    }

    /// Serve `count` JSON-RPC requests, answering each method with `answer`.
    fn mock_endpoint(
        count: usize,
        answer: impl Fn(&Value) -> Value + Send + 'static,
    ) -> (String, thread::JoinHandle<Vec<Value>>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();

        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for mut request in server.incoming_requests().take(count) {
                let mut body = String::new();
                request.as_reader().read_to_string(&mut body).unwrap();
                let call: Value = serde_json::from_str(&body).unwrap();
                let reply = answer(&call);
                seen.push(call);
                let response = Response::from_string(reply.to_string()).with_header(
                    Header::from_bytes("Content-Type", "application/json").unwrap(),
                );
                request.respond(response).unwrap();
            }
            seen
        });

        (format!("http://{addr}"), handle)
    }

    fn word(value: u64) -> String {
        format!("0x{value:064x}")
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x5").unwrap(), 5);
        assert_eq!(parse_quantity("0x89").unwrap(), 137);
        assert!(parse_quantity("5").is_err());
        assert!(parse_quantity("0xg").is_err());
    }

    #[test]
    fn test_response_error_maps_to_rpc_error() {
        let response: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid argument"}}"#,
        )
        .unwrap();
        assert!(matches!(
            response.into_hex(),
            Err(AccessError::Rpc { code: -32602, .. })
        ));
    }

    #[tokio::test]
    async fn test_eth_call_request_shape() {
        let (url, handle) = mock_endpoint(1, |_| json!({"jsonrpc":"2.0","id":1,"result": word(3)}));
        let oracle = RpcOracle::new(&url, false).unwrap();
        let owner = Address::parse(OWNER).unwrap();

        let balance = oracle.balance_of(&lock(5), &owner).await.unwrap();
        assert_eq!(balance.saturating_u64(), 3);

        let calls = handle.join().unwrap();
        assert_eq!(calls[0]["method"], "eth_call");
        assert_eq!(calls[0]["params"][1], "latest");
        assert_eq!(
            calls[0]["params"][0]["to"],
            "0x8c1c77b37549de45834739f8cf8b9181d690e2bf"
        );
        let data = calls[0]["params"][0]["data"].as_str().unwrap();
        assert!(data.starts_with("0x70a08231"));
        assert!(data.ends_with("a11ce"));
    }

    #[tokio::test]
    async fn test_chain_verification_rejects_wrong_network() {
        let (url, handle) = mock_endpoint(1, |_| json!({"jsonrpc":"2.0","id":1,"result":"0x1"}));
        let oracle = RpcOracle::new(&url, true).unwrap();
        let owner = Address::parse(OWNER).unwrap();

        let err = oracle.balance_of(&lock(5), &owner).await.unwrap_err();
        assert!(matches!(
            err,
            AccessError::ChainMismatch {
                expected: 5,
                actual: 1
            }
        ));
        handle.join().unwrap();
    }

    #[tokio::test]
    async fn test_chain_id_is_fetched_once() {
        let (url, handle) = mock_endpoint(3, |call| match call["method"].as_str() {
            Some("eth_chainId") => json!({"jsonrpc":"2.0","id":1,"result":"0x5"}),
            _ => json!({"jsonrpc":"2.0","id":1,"result": word(0)}),
        });
        let oracle = RpcOracle::new(&url, true).unwrap();
        let owner = Address::parse(OWNER).unwrap();

        for _ in 0..2 {
            let balance = oracle.balance_of(&lock(5), &owner).await.unwrap();
            assert!(!balance.is_positive());
        }

        let methods: Vec<_> = handle
            .join()
            .unwrap()
            .iter()
            .map(|c| c["method"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(methods, ["eth_chainId", "eth_call", "eth_call"]);
    }

    #[tokio::test]
    async fn test_revert_surfaces_as_rpc_error() {
        let (url, handle) = mock_endpoint(1, |_| {
            json!({"jsonrpc":"2.0","id":1,"error":{"code":3,"message":"execution reverted"}})
        });
        let oracle = RpcOracle::new(&url, false).unwrap();
        let owner = Address::parse(OWNER).unwrap();

        let err = oracle.balance_of(&lock(5), &owner).await.unwrap_err();
        assert!(err.to_string().contains("execution reverted"));
        handle.join().unwrap();
    }
}
