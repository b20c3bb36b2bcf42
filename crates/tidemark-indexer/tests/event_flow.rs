//! Integration tests for the event handlers
//!
//! These tests drive the indexer with decoded events and check balances,
//! points, stats and log records end to end.

use tidemark_core::{Address, Balance, TidemarkError, ONE_TOKEN, SECS_PER_HOUR};
use tidemark_indexer::{
    ApprovalEvent, DepositEvent, EventLog, EventMeta, HandleOutcome, Indexer, IndexerConfig,
    LogRecord, MemoryEventLog, TokenEvent, TransferEvent, WithdrawalEvent,
};
use tidemark_points::{MemoryStore, PointsStore, Tier};

// 2024-01-03 (Wednesday) 15:42:17 UTC
const T: i64 = 1_704_296_537;

const ALICE: Address = Address::new([0xa1; 20]);
const BOB: Address = Address::new([0xb0; 20]);

struct Chain {
    block: u64,
    log_index: u64,
}

impl Chain {
    fn new() -> Self {
        Self { block: 100, log_index: 0 }
    }

    fn meta(&mut self, timestamp: i64) -> EventMeta {
        let meta = EventMeta {
            chain_id: 1,
            block_number: self.block,
            block_hash: format!("0x{:064x}", self.block),
            log_index: self.log_index,
            timestamp,
            contract: None,
        };
        self.log_index += 1;
        meta
    }

    fn deposit(&mut self, dst: Address, amount: u128, ts: i64) -> TokenEvent {
        TokenEvent::Deposit(DepositEvent { meta: self.meta(ts), dst, amount })
    }

    fn withdrawal(&mut self, src: Address, amount: u128, ts: i64) -> TokenEvent {
        TokenEvent::Withdrawal(WithdrawalEvent { meta: self.meta(ts), src, amount })
    }

    fn transfer(&mut self, src: Address, dst: Address, amount: u128, ts: i64) -> TokenEvent {
        TokenEvent::Transfer(TransferEvent { meta: self.meta(ts), src, dst, amount })
    }
}

fn indexer() -> Indexer<MemoryStore, MemoryEventLog> {
    Indexer::new(MemoryStore::new(), MemoryEventLog::new(), &IndexerConfig::default()).unwrap()
}

fn balance(indexer: &Indexer<MemoryStore, MemoryEventLog>, who: &Address) -> Balance {
    indexer
        .engine()
        .store()
        .user(who)
        .unwrap()
        .map(|u| u.balance)
        .unwrap_or(0)
}

mod deposit_tests {
    use super::*;

    #[test]
    fn test_deposit_of_15_tokens() {
        let indexer = indexer();
        let mut chain = Chain::new();

        let outcome = indexer.handle(&chain.deposit(ALICE, 15 * ONE_TOKEN, T)).unwrap();
        assert_eq!(outcome.points(), 1);

        let user = indexer.engine().store().user(&ALICE).unwrap().unwrap();
        assert_eq!(user.tier, Tier::Tier1);
        assert_eq!(user.total_points, 1);

        let weekly = indexer.engine().store().weekly_for(&ALICE);
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].points_earned, 1);
        assert_eq!(weekly[0].weekly_cap, 120);
        assert!(!weekly[0].is_cap_reached);

        let stats = indexer.engine().global_stats().unwrap();
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.tier_histogram.tier1, 1);
        assert_eq!(stats.total_points, 1);
    }

    #[test]
    fn test_deposit_log_record() {
        let indexer = indexer();
        let mut chain = Chain::new();
        indexer.handle(&chain.deposit(ALICE, 1_500_000_000_000_000_000, T)).unwrap();

        match indexer.log().get("1_100_0").unwrap() {
            Some(LogRecord::Deposit(log)) => {
                assert_eq!(log.dst, ALICE);
                assert_eq!(log.header.amount, 1_500_000_000_000_000_000);
                assert_eq!(log.header.amount_display, "1.500000");
                assert_eq!(log.header.transaction_id, format!("0x{:064x}_0", 100));
            }
            other => panic!("unexpected record {:?}", other),
        }
    }
}

mod transfer_tests {
    use super::*;

    #[test]
    fn test_mint_skips_sender_side() {
        let indexer = indexer();
        let mut chain = Chain::new();

        let outcome = indexer
            .handle(&chain.transfer(Address::ZERO, BOB, 40 * ONE_TOKEN, T))
            .unwrap();

        match outcome {
            HandleOutcome::Applied { accruals, .. } => {
                assert_eq!(accruals.len(), 1);
                assert_eq!(accruals[0].0, BOB);
            }
            HandleOutcome::Skipped => panic!("mint was skipped"),
        }
        assert!(indexer.engine().store().user(&Address::ZERO).unwrap().is_none());
        assert_eq!(balance(&indexer, &BOB), 40 * ONE_TOKEN as Balance);
        assert_eq!(indexer.engine().global_stats().unwrap().total_users, 1);
    }

    #[test]
    fn test_burn_skips_receiver_side() {
        let indexer = indexer();
        let mut chain = Chain::new();
        indexer.handle(&chain.deposit(ALICE, 20 * ONE_TOKEN, T)).unwrap();
        indexer
            .handle(&chain.transfer(ALICE, Address::ZERO, 5 * ONE_TOKEN, T + 1))
            .unwrap();

        assert_eq!(balance(&indexer, &ALICE), 15 * ONE_TOKEN as Balance);
        assert!(indexer.engine().store().user(&Address::ZERO).unwrap().is_none());
    }

    #[test]
    fn test_round_trip_restores_balances() {
        let indexer = indexer();
        let mut chain = Chain::new();
        indexer.handle(&chain.deposit(ALICE, 120 * ONE_TOKEN, T)).unwrap();
        indexer.handle(&chain.deposit(BOB, 7 * ONE_TOKEN, T)).unwrap();

        let before = (balance(&indexer, &ALICE), balance(&indexer, &BOB));
        indexer.handle(&chain.transfer(ALICE, BOB, 33 * ONE_TOKEN, T + 60)).unwrap();
        indexer.handle(&chain.transfer(BOB, ALICE, 33 * ONE_TOKEN, T + 120)).unwrap();
        let after = (balance(&indexer, &ALICE), balance(&indexer, &BOB));

        assert_eq!(before, after);
    }

    #[test]
    fn test_transfer_moves_tiers_and_keeps_histogram_consistent() {
        let indexer = indexer();
        let mut chain = Chain::new();
        indexer.handle(&chain.deposit(ALICE, 600 * ONE_TOKEN, T)).unwrap();
        indexer
            .handle(&chain.transfer(ALICE, BOB, 550 * ONE_TOKEN, T + SECS_PER_HOUR))
            .unwrap();

        let store = indexer.engine().store();
        assert_eq!(store.user(&ALICE).unwrap().unwrap().tier, Tier::Tier2);
        assert_eq!(store.user(&BOB).unwrap().unwrap().tier, Tier::Tier4);

        let stats = indexer.engine().global_stats().unwrap();
        assert_eq!(stats.tier_histogram.tier2, 1);
        assert_eq!(stats.tier_histogram.tier4, 1);
        assert_eq!(stats.tier_histogram.total(), stats.total_users);
        // Alice: 4 (tier4 hour) + 2 (tier2 next hour); Bob: 4
        assert_eq!(stats.total_points, 10);
    }
}

mod withdrawal_tests {
    use super::*;

    #[test]
    fn test_withdrawal_can_go_negative() {
        let indexer = indexer();
        let mut chain = Chain::new();
        indexer.handle(&chain.deposit(ALICE, 2 * ONE_TOKEN, T)).unwrap();
        let outcome = indexer.handle(&chain.withdrawal(ALICE, 5 * ONE_TOKEN, T + 1)).unwrap();

        assert_eq!(outcome.points(), 0);
        assert_eq!(balance(&indexer, &ALICE), -3 * ONE_TOKEN as Balance);
        assert_eq!(indexer.engine().store().user(&ALICE).unwrap().unwrap().tier, Tier::Tier0);
    }

    #[test]
    fn test_withdrawal_accrues_at_remaining_balance() {
        let indexer = indexer();
        let mut chain = Chain::new();
        indexer.handle(&chain.deposit(ALICE, 40 * ONE_TOKEN, T)).unwrap();
        let outcome = indexer
            .handle(&chain.withdrawal(ALICE, 25 * ONE_TOKEN, T + SECS_PER_HOUR))
            .unwrap();

        // 15 tokens left: tier 1, one point for the new hour
        assert_eq!(outcome.points(), 1);
        assert_eq!(indexer.engine().store().user(&ALICE).unwrap().unwrap().total_points, 3);
    }
}

mod log_tests {
    use super::*;

    #[test]
    fn test_approval_is_logged_only() {
        let indexer = indexer();
        let mut chain = Chain::new();
        let event = TokenEvent::Approval(ApprovalEvent {
            meta: chain.meta(T),
            owner: ALICE,
            spender: BOB,
            amount: u128::MAX,
        });
        indexer.handle(&event).unwrap();

        assert!(matches!(indexer.log().get("1_100_0").unwrap(), Some(LogRecord::Approval(_))));
        assert!(indexer.engine().store().users().is_empty());
    }

    #[test]
    fn test_redelivered_event_rejected_by_log() {
        let indexer = indexer();
        let mut chain = Chain::new();
        let event = chain.deposit(ALICE, 15 * ONE_TOKEN, T);

        indexer.handle(&event).unwrap();
        let err = indexer.handle(&event).unwrap_err();

        assert_eq!(err, TidemarkError::DuplicateLogRecord("1_100_0".to_string()));
        assert_eq!(balance(&indexer, &ALICE), 15 * ONE_TOKEN as Balance);
    }

    #[test]
    fn test_replay_from_json_lines() {
        let lines = [
            r#"{"event":"Deposit","meta":{"chain_id":1,"block_number":5,"block_hash":"0x05","log_index":0,"timestamp":1704296537},"dst":"0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1","amount":"100000000000000000000"}"#,
            r#"{"event":"Transfer","meta":{"chain_id":1,"block_number":5,"block_hash":"0x05","log_index":1,"timestamp":1704296537},"src":"0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1","dst":"0xb0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0","amount":"30000000000000000000"}"#,
        ];

        let indexer = indexer();
        for line in lines {
            let event: TokenEvent = serde_json::from_str(line).unwrap();
            indexer.handle(&event).unwrap();
        }

        assert_eq!(balance(&indexer, &ALICE), 70 * ONE_TOKEN as Balance);
        assert_eq!(balance(&indexer, &BOB), 30 * ONE_TOKEN as Balance);
        assert_eq!(indexer.log().len(), 2);
    }
}

mod rejection_tests {
    use super::*;

    #[test]
    fn test_overflowing_transfer_is_neither_logged_nor_applied() {
        let indexer = indexer();
        let mut chain = Chain::new();
        indexer.handle(&chain.deposit(BOB, i128::MAX as u128, T)).unwrap();
        indexer.handle(&chain.deposit(ALICE, 100, T)).unwrap();
        let stats = indexer.engine().global_stats().unwrap();

        let transfer = chain.transfer(ALICE, BOB, 10, T + 1);
        let err = indexer.handle(&transfer).unwrap_err();

        assert_eq!(err, TidemarkError::InvalidAmount("10".to_string()));
        assert_eq!(balance(&indexer, &ALICE), 100);
        assert_eq!(balance(&indexer, &BOB), i128::MAX);
        assert!(indexer.log().get("1_100_2").unwrap().is_none());
        assert_eq!(indexer.log().len(), 2);
        assert_eq!(indexer.engine().global_stats().unwrap(), stats);

        // The record id is still free, so redelivery fails the same way
        assert_eq!(indexer.handle(&transfer).unwrap_err(), err);
    }

    #[test]
    fn test_oversized_deposit_is_not_logged() {
        let indexer = indexer();
        let mut chain = Chain::new();

        assert!(indexer.handle(&chain.deposit(ALICE, u128::MAX, T)).is_err());
        assert!(indexer.log().get("1_100_0").unwrap().is_none());
        assert!(indexer.engine().store().user(&ALICE).unwrap().is_none());
        assert!(indexer.engine().store().stats().unwrap().is_none());
    }

    #[test]
    fn test_oversized_withdrawal_is_not_logged() {
        let indexer = indexer();
        let mut chain = Chain::new();
        indexer.handle(&chain.deposit(ALICE, 15 * ONE_TOKEN, T)).unwrap();

        assert!(indexer.handle(&chain.withdrawal(ALICE, u128::MAX, T + 1)).is_err());
        assert!(indexer.log().get("1_100_1").unwrap().is_none());
        assert_eq!(balance(&indexer, &ALICE), 15 * ONE_TOKEN as Balance);
    }

    #[test]
    fn test_out_of_range_timestamp_is_not_logged() {
        let indexer = indexer();
        let mut chain = Chain::new();

        let err = indexer
            .handle(&chain.transfer(ALICE, BOB, ONE_TOKEN, i64::MAX))
            .unwrap_err();

        assert_eq!(err, TidemarkError::InvalidTimestamp(i64::MAX));
        assert!(indexer.log().is_empty());
        assert!(indexer.engine().store().users().is_empty());
    }
}
