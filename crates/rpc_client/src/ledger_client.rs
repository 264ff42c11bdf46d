use crate::models::BlockInfo;
use crate::rpc_error::RpcResult;
use async_trait::async_trait;

/// The node operations the pacing loop depends on.
///
/// Every call is a single request/response; implementations must not retry
/// internally, retry policy belongs to the caller.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Height of the node's best chain
    async fn current_height(&self) -> RpcResult<u64>;

    /// Produces `count` blocks, paying the reward to `target` when given and
    /// to the node wallet otherwise. Returns the new block hashes in order.
    async fn produce_blocks(&self, count: u32, target: Option<&str>) -> RpcResult<Vec<String>>;

    /// Looks up a block by hash
    async fn inspect_block(&self, hash: &str) -> RpcResult<BlockInfo>;

    /// Sends `amount` whole coins from the node wallet to `recipient`,
    /// returning the transaction id
    async fn submit_payment(&self, recipient: &str, amount: u64) -> RpcResult<String>;
}
