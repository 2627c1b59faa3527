//! Token Custody
//!
//! In-memory fungible-token books, one per token contract address. A send
//! models the cross-contract `transfer` call: the recipient's hook runs
//! inside it, may re-enter the vault, and may refuse the tokens.

use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;
use tracing::debug;

use super::{AssetMover, HookTable, ReceiveHook};
use crate::balance::{Balance, BalanceError};
use crate::core_types::{Address, Amount};
use crate::vault::lock;
use crate::vault::types::{AssetKind, MoveOutcome};

#[derive(Default)]
struct TokenBook {
    custody: Balance,
    holders: FxHashMap<Address, Balance>,
}

#[derive(Default)]
pub struct TokenCustody {
    books: Mutex<FxHashMap<Address, TokenBook>>,
    hooks: HookTable,
}

impl TokenCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit the vault's holding of `token` (tokens sent to the vault)
    pub fn mint_to_custody(&self, token: Address, amount: Amount) -> Result<(), BalanceError> {
        lock(&self.books)
            .entry(token)
            .or_default()
            .custody
            .credit(amount)
    }

    /// Token balance the vault has paid out to `holder`
    pub fn holder_balance(&self, token: &Address, holder: &Address) -> Amount {
        lock(&self.books)
            .get(token)
            .and_then(|book| book.holders.get(holder))
            .map(Balance::available)
            .unwrap_or(0)
    }

    pub fn set_receive_hook(&self, recipient: Address, hook: Arc<dyn ReceiveHook>) {
        self.hooks.set(recipient, hook);
    }

    pub fn clear_receive_hook(&self, recipient: &Address) {
        self.hooks.clear(recipient);
    }
}

impl AssetMover for TokenCustody {
    fn name(&self) -> &'static str {
        "token"
    }

    fn balance_of(&self, asset: &AssetKind) -> Amount {
        match asset {
            AssetKind::Native => 0,
            AssetKind::Token(token) => lock(&self.books)
                .get(token)
                .map(|book| book.custody.available())
                .unwrap_or(0),
        }
    }

    fn deposit(&self, _sender: Address, _amount: Amount) -> MoveOutcome {
        MoveOutcome::Failed("token custody is funded by token transfers".to_string())
    }

    fn send(&self, asset: &AssetKind, recipient: Address, amount: Amount) -> MoveOutcome {
        let AssetKind::Token(token) = asset else {
            return MoveOutcome::Failed("token custody cannot move native currency".to_string());
        };

        let available = self.balance_of(asset);
        if available < amount {
            return MoveOutcome::Failed(format!(
                "token {} custody holds {}, send needs {}",
                token, available, amount
            ));
        }

        if !self.hooks.accepts(&recipient, asset, amount) {
            return MoveOutcome::Failed(format!("recipient {} refused token {}", recipient, token));
        }

        let mut books = lock(&self.books);
        let Some(book) = books.get_mut(token) else {
            return MoveOutcome::Failed(format!("unknown token {}", token));
        };
        let TokenBook { custody, holders } = book;
        let holder = holders.entry(recipient).or_default();
        match custody.transfer_to(holder, amount) {
            Ok(()) => {
                debug!(token = %token, recipient = %recipient, amount, "Token send completed");
                MoveOutcome::Success
            }
            Err(e) => MoveOutcome::Failed(e.to_string()),
        }
    }
}
