//! Transaction and query abstractions built on top of `ledgersdk-client`'s
//! network view and execution loop: the common transaction base (frozen
//! vs. building), chunked transactions, the query base with optional
//! payment, receipt polling, and the contract-create composite flow.

pub mod body;
pub mod chunked;
pub mod contract_create;
pub mod error;
pub mod query;
pub mod receipt;
pub mod transaction;
pub mod transaction_id;

pub use body::TransactionBody;
pub use chunked::{ChunkedTransaction, TopicMessageSubmit, TopicMessageSubmitBody};
pub use contract_create::{ContractCreateBody, ContractCreateFlow, FileAppendBody, FileCreateBody, FileDeleteBody};
pub use error::TransactionError;
pub use query::{Query, QueryBody, QueryPaymentBody};
pub use receipt::ReceiptQueryBody;
pub use transaction::{Transaction, TransactionResponse};
pub use transaction_id::TransactionId;
