//! Integration Tests for the Vault
//!
//! Drive the full engine over the in-memory custody adapters, including
//! recipients whose receive hooks re-enter the vault mid-execution.

#[cfg(test)]
mod integration_tests {
    use std::sync::{Arc, Mutex, Weak};

    use crate::core_types::{Address, Amount};
    use crate::vault::adapters::{NativeCustody, TokenCustody};
    use crate::vault::engine::Vault;
    use crate::vault::error::VaultError;
    use crate::vault::events::VaultEvent;
    use crate::vault::policy::{VaultPolicy, VaultProfile};
    use crate::vault::registry::ApproverRegistry;
    use crate::vault::state::TransferStatus;
    use crate::vault::types::AssetKind;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    const S1: u64 = 1;
    const S2: u64 = 2;
    const S3: u64 = 3;
    const USDC: u64 = 0xc0;

    /// Helper to create a vault with real custody adapters
    struct TestHarness {
        vault: Arc<Vault>,
        native: Arc<NativeCustody>,
        tokens: Arc<TokenCustody>,
    }

    impl TestHarness {
        fn new(profile: VaultProfile, native_balance: Amount) -> Self {
            let native = Arc::new(NativeCustody::with_balance(native_balance).unwrap());
            let tokens = Arc::new(TokenCustody::new());
            let registry = ApproverRegistry::new([addr(S1), addr(S2), addr(S3)], 2).unwrap();

            let vault = Vault::new(registry, VaultPolicy::from(profile), native.clone())
                .with_token_mover(tokens.clone());

            Self {
                vault: Arc::new(vault),
                native,
                tokens,
            }
        }

        fn weak_vault(&self) -> Weak<Vault> {
            Arc::downgrade(&self.vault)
        }
    }

    // ========================================================================
    // Token Lifecycle
    // ========================================================================

    #[test]
    fn test_token_transfer_happy_path() {
        let h = TestHarness::new(VaultProfile::Token, 0);
        let usdc = addr(USDC);
        h.tokens.mint_to_custody(usdc, 1_000).unwrap();

        let id = h
            .vault
            .initiate(addr(S1), AssetKind::Token(usdc), addr(9), 400)
            .unwrap();
        h.vault.approve(addr(S3), id).unwrap();
        h.vault.execute(addr(S2), id).unwrap();

        assert_eq!(h.tokens.holder_balance(&usdc, &addr(9)), 400);
        assert_eq!(h.vault.custody_balance(&AssetKind::Token(usdc)), 600);
        assert_eq!(
            h.vault.events().last(),
            Some(&VaultEvent::TransferExecuted { id })
        );
    }

    #[test]
    fn test_cancel_freezes_transfer() {
        let h = TestHarness::new(VaultProfile::Token, 0);
        let usdc = addr(USDC);
        h.tokens.mint_to_custody(usdc, 10).unwrap();

        let id = h
            .vault
            .initiate(addr(S1), AssetKind::Token(usdc), addr(9), 5)
            .unwrap();
        h.vault.approve(addr(S2), id).unwrap();
        h.vault.cancel(addr(S3), id).unwrap();

        let record = h.vault.get(id).unwrap();
        assert_eq!(record.status(), TransferStatus::Cancelled);
        assert_eq!(record.approval_count(), 2);

        assert_eq!(h.vault.approve(addr(S3), id), Err(VaultError::AlreadyCancelled(id)));
        assert_eq!(h.vault.execute(addr(S1), id), Err(VaultError::AlreadyCancelled(id)));
        assert_eq!(h.vault.cancel(addr(S1), id), Err(VaultError::AlreadyCancelled(id)));
        assert_eq!(h.vault.custody_balance(&AssetKind::Token(usdc)), 10);
        assert_eq!(
            h.vault.events().last(),
            Some(&VaultEvent::TransferCancelled {
                id,
                canceller: addr(S3)
            })
        );
    }

    #[test]
    fn test_ids_never_reused_across_cancels() {
        let h = TestHarness::new(VaultProfile::Unified, 100);

        let mut last = None;
        for _ in 0..10 {
            let id = h
                .vault
                .initiate(addr(S1), AssetKind::Native, addr(9), 1)
                .unwrap();
            if let Some(prev) = last {
                assert!(id > prev);
            }
            h.vault.cancel(addr(S2), id).unwrap();
            last = Some(id);
        }
        assert_eq!(h.vault.count(), 10);
        assert_eq!(last, Some(9));
    }

    // ========================================================================
    // Reconfiguration
    // ========================================================================

    #[test]
    fn test_removed_approver_approvals_still_count() {
        let h = TestHarness::new(VaultProfile::Unified, 100);
        let id = h
            .vault
            .initiate(addr(S1), AssetKind::Native, addr(9), 10)
            .unwrap();
        h.vault.approve(addr(S2), id).unwrap();

        // S1 and S2 are removed; quorum rises to 3 over a new set
        h.vault
            .replace_registry(addr(S3), vec![addr(S3), addr(4), addr(5)], 3)
            .unwrap();

        // Old approvals are kept on the record
        assert!(h.vault.has_approved(id, &addr(S1)).unwrap());
        assert_eq!(h.vault.get(id).unwrap().approval_count(), 2);

        // Removed approvers are locked out of new actions
        assert_eq!(
            h.vault.approve(addr(S2), id),
            Err(VaultError::NotAnApprover(addr(S2)))
        );
        assert_eq!(
            h.vault.initiate(addr(S1), AssetKind::Native, addr(9), 1),
            Err(VaultError::NotAnApprover(addr(S1)))
        );

        // 2 stale + 1 new approval reach the new quorum of 3
        assert!(matches!(
            h.vault.execute(addr(4), id),
            Err(VaultError::QuorumNotReached { .. })
        ));
        h.vault.approve(addr(4), id).unwrap();
        h.vault.execute(addr(5), id).unwrap();
        assert_eq!(h.native.holder_balance(&addr(9)), 10);
    }

    #[test]
    fn test_invalid_replace_changes_nothing() {
        let h = TestHarness::new(VaultProfile::Unified, 100);
        let before = h.vault.approvers();

        assert_eq!(
            h.vault.replace_registry(addr(S1), vec![], 1),
            Err(VaultError::EmptyApproverSet)
        );
        assert_eq!(
            h.vault.replace_registry(addr(S1), vec![addr(4)], 0),
            Err(VaultError::QuorumZero)
        );
        assert_eq!(
            h.vault.replace_registry(addr(8), vec![addr(4)], 1),
            Err(VaultError::NotAnApprover(addr(8)))
        );

        assert_eq!(h.vault.approvers(), before);
        assert_eq!(h.vault.quorum(), 2);
        assert!(h.vault.events().is_empty());
    }

    #[test]
    fn test_replace_emits_both_notifications() {
        let h = TestHarness::new(VaultProfile::Native, 100);
        h.vault
            .replace_registry(addr(S2), vec![addr(5), addr(4)], 1)
            .unwrap();

        assert_eq!(
            h.vault.events(),
            vec![
                VaultEvent::RegistryUpdated {
                    approvers: vec![addr(4), addr(5)]
                },
                VaultEvent::QuorumUpdated { quorum: 1 },
            ]
        );
    }

    // ========================================================================
    // Reentrancy
    // ========================================================================

    /// Recipient is an approver whose receive hook calls back into the vault
    /// for the very transfer that is paying it.
    #[test]
    fn test_reentrant_execute_same_id_blocked() {
        let h = TestHarness::new(VaultProfile::Unified, 100);
        let attacker = addr(S3);
        let id = h
            .vault
            .initiate(addr(S1), AssetKind::Native, attacker, 30)
            .unwrap();
        h.vault.approve(addr(S2), id).unwrap();

        let seen: Arc<Mutex<Vec<Result<(), VaultError>>>> = Arc::default();
        let weak = h.weak_vault();
        let log = seen.clone();
        h.native.set_receive_hook(
            attacker,
            Arc::new(move |_: &AssetKind, _: Amount| {
                if let Some(vault) = weak.upgrade() {
                    let mut log = log.lock().unwrap();
                    log.push(vault.execute(attacker, id));
                    log.push(vault.approve(attacker, id));
                    log.push(vault.cancel(attacker, id));
                }
                true
            }),
        );

        h.vault.execute(addr(S1), id).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Err(VaultError::AlreadyExecuted(id)),
                Err(VaultError::AlreadyExecuted(id)),
                Err(VaultError::AlreadyExecuted(id)),
            ]
        );
        assert_eq!(h.native.holder_balance(&attacker), 30);
        assert_eq!(h.vault.custody_balance(&AssetKind::Native), 70);
        assert_eq!(h.vault.get(id).unwrap().status(), TransferStatus::Executed);
    }

    /// The hook drains custody through another transfer; the outer send then
    /// cannot be covered and the outer transfer rolls back to PENDING.
    #[test]
    fn test_reentrant_drain_rolls_back_outer() {
        let h = TestHarness::new(VaultProfile::Unified, 100);
        let receiver = addr(9);

        let outer = h
            .vault
            .initiate(addr(S1), AssetKind::Native, receiver, 60)
            .unwrap();
        h.vault.approve(addr(S2), outer).unwrap();
        let inner = h
            .vault
            .initiate(addr(S1), AssetKind::Native, addr(10), 60)
            .unwrap();
        h.vault.approve(addr(S3), inner).unwrap();

        let weak = h.weak_vault();
        h.native.set_receive_hook(
            receiver,
            Arc::new(move |_: &AssetKind, _: Amount| {
                if let Some(vault) = weak.upgrade() {
                    let _ = vault.execute(addr(S2), inner);
                }
                true
            }),
        );

        let result = h.vault.execute(addr(S1), outer);
        assert!(matches!(
            result,
            Err(VaultError::TransferExecutionFailed { id, .. }) if id == outer
        ));

        assert_eq!(h.vault.get(outer).unwrap().status(), TransferStatus::Pending);
        assert_eq!(h.vault.get(outer).unwrap().approval_count(), 2);
        assert_eq!(h.vault.get(inner).unwrap().status(), TransferStatus::Executed);
        assert_eq!(h.native.holder_balance(&receiver), 0);
        assert_eq!(h.native.holder_balance(&addr(10)), 60);
        assert_eq!(h.vault.custody_balance(&AssetKind::Native), 40);
    }

    /// A recipient hook that panics aborts the movement; the transfer must
    /// come back to PENDING and stay executable.
    #[test]
    fn test_panicking_recipient_rolls_back() {
        let h = TestHarness::new(VaultProfile::Unified, 10);
        let receiver = addr(9);
        h.native.set_receive_hook(
            receiver,
            Arc::new(|_: &AssetKind, _: Amount| -> bool { panic!("recipient aborted") }),
        );

        let id = h
            .vault
            .initiate(addr(S1), AssetKind::Native, receiver, 4)
            .unwrap();
        h.vault.approve(addr(S2), id).unwrap();
        let before = h.vault.get(id).unwrap();

        assert!(matches!(
            h.vault.execute(addr(S3), id),
            Err(VaultError::TransferExecutionFailed { id: failed, .. }) if failed == id
        ));
        assert_eq!(h.vault.get(id).unwrap(), before);
        assert_eq!(h.vault.custody_balance(&AssetKind::Native), 10);
        assert_eq!(h.native.holder_balance(&receiver), 0);
        assert!(
            !h.vault
                .events()
                .contains(&VaultEvent::TransferExecuted { id })
        );

        // The record is still live: it can be retried or cancelled
        h.native.clear_receive_hook(&receiver);
        h.vault.execute(addr(S1), id).unwrap();
        assert_eq!(h.native.holder_balance(&receiver), 4);
        assert_eq!(
            h.vault.events().last(),
            Some(&VaultEvent::TransferExecuted { id })
        );
    }

    #[test]
    fn test_refusing_token_recipient() {
        let h = TestHarness::new(VaultProfile::Token, 0);
        let usdc = addr(USDC);
        h.tokens.mint_to_custody(usdc, 50).unwrap();
        h.tokens
            .set_receive_hook(addr(9), Arc::new(|_: &AssetKind, _: Amount| false));

        let id = h
            .vault
            .initiate(addr(S1), AssetKind::Token(usdc), addr(9), 50)
            .unwrap();
        h.vault.approve(addr(S2), id).unwrap();

        assert!(matches!(
            h.vault.execute(addr(S3), id),
            Err(VaultError::TransferExecutionFailed { .. })
        ));
        assert_eq!(h.vault.get(id).unwrap().status(), TransferStatus::Pending);
        assert_eq!(h.vault.custody_balance(&AssetKind::Token(usdc)), 50);
        assert_eq!(h.tokens.holder_balance(&usdc, &addr(9)), 0);
    }
}
