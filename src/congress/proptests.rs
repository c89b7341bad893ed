//! Property-based tests for voting and amounts
//!
//! Tests for:
//! - Tally: conservation, completion exactly at the roster size, frozen quorum
//! - Uniqueness: repeated votes never move the tally
//! - Amounts: display/parse agreement

use super::config::GovernanceConfig;
use super::engine::Congress;
use super::mock::MockCongressStore;
use super::traits::{ManualClock, TaxStore};
use super::types::*;
use proptest::prelude::*;
use std::sync::Arc;

const HOME: BodyId = BodyId(1);

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    /// Property: every accepted vote adds exactly one to the tally, the
    /// tally never exceeds the snapshot, and the proposal is applied exactly
    /// when the last eligible member votes.
    #[test]
    fn tally_is_conserved(
        ballots in prop::collection::vec((0u64..8, any::<bool>()), 1..40),
        roster_size in 1u64..8,
        late_joiners in 0u64..4,
    ) {
        runtime().block_on(async {
            let store = MockCongressStore::new();
            for user in 0..roster_size {
                store.add_member(UserId(user), HOME);
            }
            let engine = Congress::with_clock(
                Arc::new(store),
                GovernanceConfig::default(),
                Arc::new(ManualClock::new(1_000_000)),
            );

            let proposer = engine.actor(UserId(0)).await.unwrap();
            let id = engine
                .submit_proposal(
                    &proposer,
                    ProposalDraft {
                        kind: ProposalKind::WorkTax { rate: Amount::from_units(7) },
                        reason: "property".to_string(),
                    },
                )
                .await
                .unwrap();

            // Members seated after submission must not move the quorum.
            for extra in 0..late_joiners {
                engine.store().add_member(UserId(100 + extra), HOME);
            }

            let mut accepted = 0u32;
            for (voter, in_favor) in ballots {
                let actor = engine.actor(UserId(voter)).await.unwrap();
                let before = engine.proposal(id).await.unwrap();
                match engine.cast_vote(&actor, id, in_favor).await {
                    Ok(delta) => {
                        accepted += 1;
                        prop_assert_eq!(delta.yes_votes + delta.no_votes, before.total_votes() + 1);
                    }
                    Err(_) => {
                        let after = engine.proposal(id).await.unwrap();
                        prop_assert_eq!(after.total_votes(), before.total_votes());
                    }
                }

                let now = engine.proposal(id).await.unwrap();
                prop_assert_eq!(now.expected_votes, roster_size as u32);
                prop_assert!(now.total_votes() <= now.expected_votes);
                prop_assert_eq!(now.total_votes(), accepted);
            }

            let final_state = engine.proposal(id).await.unwrap();
            let applied = engine.store().operation_count("set_rate");
            if final_state.tally_complete() {
                prop_assert_eq!(final_state.status, ProposalStatus::Applied);
                prop_assert_eq!(applied, 1);
                prop_assert_eq!(
                    engine.store().rate(HOME, TaxKind::Work).await.unwrap(),
                    Some(Amount::from_units(7))
                );
            } else {
                prop_assert_eq!(final_state.status, ProposalStatus::Open);
                prop_assert_eq!(applied, 0);
            }
            Ok(())
        })?;
    }

    /// Property: a displayed amount parses back to itself
    #[test]
    fn amount_display_parses_back(minor in 0u64..u64::MAX / 200) {
        let amount = Amount::from_minor(minor);
        let parsed: Amount = amount.to_string().parse().unwrap();
        prop_assert_eq!(parsed, amount);
    }

    /// Property: negative amounts never parse
    #[test]
    fn negative_amounts_rejected(whole in 0u64..1_000_000, frac in 0u64..100) {
        let raw = format!("-{}.{:02}", whole, frac);
        prop_assert!(raw.parse::<Amount>().is_err());
    }
}
