//! Mint, burn and reserved-token distribution through the controller.

mod common;

use std::sync::Arc;

use common::*;
use treasury_controller::{ControllerError, ErrorKind, MintRequest};
use treasury_storage::{CallbackResult, OperatorStore, SplitAllocator, TokenStore};
use treasury_types::{
    Address, ControllerEvent, FundingCycleMetadata, Operation, Split, SplitAllocationData, U256,
    MAX_RESERVED_RATE,
};

// ---------------------------------------------------------------------------
// Minting
// ---------------------------------------------------------------------------

#[test]
fn zero_reserved_rate_mints_everything_to_beneficiary() {
    let h = launch(minting_metadata(0), vec![]);
    let minted = h
        .controller
        .mint_tokens_of(owner(), h.project, &MintRequest::new(units(100), holder()))
        .unwrap();

    assert_eq!(minted, units(100));
    assert_eq!(h.balance_of(holder()), units(100));
    assert_eq!(h.controller.reserved_token_balance_of(h.project).unwrap(), U256::ZERO);
}

#[test]
fn full_reserved_rate_reserves_everything() {
    let h = launch(minting_metadata(MAX_RESERVED_RATE), vec![]);
    let minted = h
        .controller
        .mint_tokens_of(owner(), h.project, &MintRequest::new(units(100), holder()))
        .unwrap();

    assert_eq!(minted, U256::ZERO);
    assert_eq!(h.balance_of(holder()), U256::ZERO);
    assert_eq!(h.total_supply(), U256::ZERO);
    assert_eq!(h.controller.reserved_token_balance_of(h.project).unwrap(), units(100));
    assert_eq!(h.controller.total_outstanding_tokens_of(h.project).unwrap(), units(100));
}

#[test]
fn partial_reserved_rate_floors_beneficiary_share() {
    let h = launch(minting_metadata(5_000), vec![]);
    let minted = h
        .controller
        .mint_tokens_of(owner(), h.project, &MintRequest::new(units(101), holder()))
        .unwrap();

    assert_eq!(minted, units(50));
    assert_eq!(h.controller.reserved_token_balance_of(h.project).unwrap(), units(51));
    assert_eq!(h.controller.total_outstanding_tokens_of(h.project).unwrap(), units(101));
}

#[test]
fn reserved_rate_can_be_ignored() {
    let h = launch(minting_metadata(MAX_RESERVED_RATE), vec![]);
    let request = MintRequest::new(units(40), holder()).use_reserved_rate(false);
    let minted = h.controller.mint_tokens_of(owner(), h.project, &request).unwrap();

    assert_eq!(minted, units(40));
    assert_eq!(h.controller.reserved_token_balance_of(h.project).unwrap(), U256::ZERO);
}

#[test]
fn zero_mint_fails_without_side_effects() {
    let h = launch(minting_metadata(5_000), vec![]);
    let err = h
        .controller
        .mint_tokens_of(owner(), h.project, &MintRequest::new(U256::ZERO, holder()))
        .unwrap_err();

    assert!(matches!(err, ControllerError::ZeroMintAmount));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(h.controller.reserved_token_balance_of(h.project).unwrap(), U256::ZERO);
    assert_eq!(h.total_supply(), U256::ZERO);
}

#[test]
fn owner_cannot_mint_when_minting_disallowed() {
    let h = launch(FundingCycleMetadata::default(), vec![]);
    let err = h
        .controller
        .mint_tokens_of(owner(), h.project, &MintRequest::new(units(1), holder()))
        .unwrap_err();
    assert!(matches!(err, ControllerError::MintingNotAllowed(_)));
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn terminal_mints_even_when_minting_disallowed() {
    let h = launch(FundingCycleMetadata::default(), vec![]);
    let minted = h
        .controller
        .mint_tokens_of(terminal(), h.project, &MintRequest::new(units(7), holder()))
        .unwrap();
    assert_eq!(minted, units(7));
}

#[test]
fn data_source_may_mint() {
    let metadata = FundingCycleMetadata {
        data_source: Some(data_source()),
        ..Default::default()
    };
    let h = launch(metadata, vec![]);
    h.controller
        .mint_tokens_of(data_source(), h.project, &MintRequest::new(units(3), holder()))
        .unwrap();
    assert_eq!(h.balance_of(holder()), units(3));
}

#[test]
fn stranger_cannot_mint_but_operator_can() {
    let h = launch(minting_metadata(0), vec![]);
    let err = h
        .controller
        .mint_tokens_of(stranger(), h.project, &MintRequest::new(units(1), holder()))
        .unwrap_err();
    assert!(matches!(err, ControllerError::PermissionDenied { .. }));
    assert_eq!(err.kind(), ErrorKind::Authorization);

    h.shared
        .operators
        .set_operator(owner(), stranger(), h.project.as_u64(), &[Operation::Mint])
        .unwrap();
    h.controller
        .mint_tokens_of(stranger(), h.project, &MintRequest::new(units(1), holder()))
        .unwrap();
    assert_eq!(h.balance_of(holder()), units(1));
}

#[test]
fn claimed_token_override_forces_claimed_mint() {
    let metadata = FundingCycleMetadata {
        allow_minting: true,
        prefer_claimed_token_override: true,
        ..Default::default()
    };
    let h = launch(metadata, vec![]);
    h.controller
        .issue_token_for(owner(), h.project, "Juice", "JBX")
        .unwrap();
    h.controller
        .mint_tokens_of(owner(), h.project, &MintRequest::new(units(10), holder()))
        .unwrap();

    let balance = h.shared.tokens.balance_of(holder(), h.project).unwrap();
    assert_eq!(balance.claimed, units(10));
    assert_eq!(balance.unclaimed, U256::ZERO);
}

#[test]
fn mint_event_reports_both_counts() {
    let h = launch(minting_metadata(2_500), vec![]);
    h.controller
        .mint_tokens_of(
            owner(),
            h.project,
            &MintRequest::new(units(100), holder()).with_memo("hello"),
        )
        .unwrap();

    let events = h.shared.events.events_for(h.project).unwrap();
    let mint = events.last().unwrap();
    assert_eq!(
        mint,
        &ControllerEvent::MintTokens {
            beneficiary: holder(),
            project_id: h.project,
            token_count: units(100),
            beneficiary_token_count: units(75),
            memo: "hello".into(),
            reserved_rate: 2_500,
            caller: owner(),
        }
    );
}

// ---------------------------------------------------------------------------
// Burning
// ---------------------------------------------------------------------------

fn funded(metadata: FundingCycleMetadata) -> Harness {
    let h = launch(metadata, vec![]);
    h.controller
        .mint_tokens_of(terminal(), h.project, &MintRequest::new(units(50), holder()))
        .unwrap();
    h
}

#[test]
fn holder_burns_own_tokens() {
    let h = funded(FundingCycleMetadata::default());
    h.controller
        .burn_tokens_of(holder(), holder(), h.project, units(20), "burn", false)
        .unwrap();
    assert_eq!(h.balance_of(holder()), units(30));
    assert_eq!(
        h.shared.events.names().unwrap().last().copied(),
        Some("BurnTokens")
    );
}

#[test]
fn zero_burn_fails() {
    let h = funded(FundingCycleMetadata::default());
    let err = h
        .controller
        .burn_tokens_of(holder(), holder(), h.project, U256::ZERO, "", false)
        .unwrap_err();
    assert!(matches!(err, ControllerError::ZeroBurnAmount));
}

#[test]
fn stranger_cannot_burn_for_holder() {
    let h = funded(FundingCycleMetadata::default());
    let err = h
        .controller
        .burn_tokens_of(stranger(), holder(), h.project, units(1), "", false)
        .unwrap_err();
    assert!(matches!(err, ControllerError::PermissionDenied { .. }));

    h.shared
        .operators
        .set_operator(holder(), stranger(), h.project.as_u64(), &[Operation::Burn])
        .unwrap();
    h.controller
        .burn_tokens_of(stranger(), holder(), h.project, units(1), "", false)
        .unwrap();
    assert_eq!(h.balance_of(holder()), units(49));
}

#[test]
fn paused_burn_only_allows_terminals() {
    let h = funded(FundingCycleMetadata {
        pause_burn: true,
        ..Default::default()
    });
    let err = h
        .controller
        .burn_tokens_of(holder(), holder(), h.project, units(1), "", false)
        .unwrap_err();
    assert!(matches!(err, ControllerError::BurnPausedForNonTerminal(_)));

    h.controller
        .burn_tokens_of(terminal(), holder(), h.project, units(5), "", false)
        .unwrap();
    assert_eq!(h.balance_of(holder()), units(45));
}

#[test]
fn burning_more_than_held_is_a_precondition_failure() {
    let h = funded(FundingCycleMetadata::default());
    let err = h
        .controller
        .burn_tokens_of(holder(), holder(), h.project, units(51), "", false)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert_eq!(h.balance_of(holder()), units(50));
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

#[test]
fn fifty_thirty_split_sends_leftover_to_owner() {
    let alice = Address::from_low_u64(0xa1);
    let bob = Address::from_low_u64(0xb1);
    let h = launch(
        minting_metadata(MAX_RESERVED_RATE),
        vec![
            Split::new(percent(50)).with_beneficiary(alice),
            Split::new(percent(30)).with_beneficiary(bob),
        ],
    );
    h.controller
        .mint_tokens_of(owner(), h.project, &MintRequest::new(units(100), holder()))
        .unwrap();

    let distributed = h
        .controller
        .distribute_reserved_tokens_of(stranger(), h.project, "payday")
        .unwrap();

    assert_eq!(distributed, units(100));
    assert_eq!(h.balance_of(alice), units(50));
    assert_eq!(h.balance_of(bob), units(30));
    assert_eq!(h.balance_of(owner()), units(20));
    assert_eq!(h.controller.reserved_token_balance_of(h.project).unwrap(), U256::ZERO);
    assert_eq!(h.total_supply(), units(100));

    let names = h.shared.events.names().unwrap();
    let tail = &names[names.len() - 3..];
    assert_eq!(
        tail,
        [
            "DistributeToReservedTokenSplit",
            "DistributeToReservedTokenSplit",
            "DistributeReservedTokens"
        ]
    );
}

#[test]
fn second_distribution_distributes_nothing() {
    let h = launch(minting_metadata(MAX_RESERVED_RATE), vec![]);
    h.controller
        .mint_tokens_of(owner(), h.project, &MintRequest::new(units(10), holder()))
        .unwrap();

    assert_eq!(
        h.controller
            .distribute_reserved_tokens_of(owner(), h.project, "")
            .unwrap(),
        units(10)
    );
    assert_eq!(
        h.controller
            .distribute_reserved_tokens_of(owner(), h.project, "")
            .unwrap(),
        U256::ZERO
    );
    assert_eq!(h.balance_of(owner()), units(10));
}

#[test]
fn split_without_recipient_pays_the_caller() {
    let h = launch(
        minting_metadata(MAX_RESERVED_RATE),
        vec![Split::new(percent(100))],
    );
    h.controller
        .mint_tokens_of(owner(), h.project, &MintRequest::new(units(9), holder()))
        .unwrap();
    h.controller
        .distribute_reserved_tokens_of(stranger(), h.project, "")
        .unwrap();
    assert_eq!(h.balance_of(stranger()), units(9));
    assert_eq!(h.balance_of(owner()), U256::ZERO);
}

#[test]
fn aggregate_event_names_owner_and_leftover() {
    let h = launch(
        minting_metadata(MAX_RESERVED_RATE),
        vec![Split::new(percent(40)).with_beneficiary(holder())],
    );
    h.controller
        .mint_tokens_of(owner(), h.project, &MintRequest::new(units(10), holder()))
        .unwrap();
    h.controller
        .distribute_reserved_tokens_of(stranger(), h.project, "memo")
        .unwrap();

    let events = h.shared.events.events_for(h.project).unwrap();
    match events.last().unwrap() {
        ControllerEvent::DistributeReservedTokens {
            beneficiary,
            token_count,
            beneficiary_token_count,
            caller,
            ..
        } => {
            assert_eq!(*beneficiary, owner());
            assert_eq!(*token_count, units(10));
            assert_eq!(*beneficiary_token_count, units(6));
            assert_eq!(*caller, stranger());
        }
        other => panic!("unexpected event {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Failed distributions
// ---------------------------------------------------------------------------

struct ClosedAllocator;

impl SplitAllocator for ClosedAllocator {
    fn allocate(&self, _data: SplitAllocationData) -> CallbackResult {
        Err("allocator is closed".into())
    }
}

#[test]
fn split_group_above_total_percent_is_refused() {
    let h = launch(minting_metadata(MAX_RESERVED_RATE), vec![]);
    let (before, _, _) = h.controller.latest_configured_funding_cycle_of(h.project).unwrap();
    let full = Split::new(percent(100)).with_beneficiary(holder());

    let err = h
        .controller
        .reconfigure_funding_cycles_of(
            owner(),
            h.project,
            &configuration(minting_metadata(MAX_RESERVED_RATE), vec![full.clone(), full]),
            "",
        )
        .unwrap_err();

    assert!(matches!(err, ControllerError::InvalidSplitTotal { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
    let (after, _, _) = h.controller.latest_configured_funding_cycle_of(h.project).unwrap();
    assert_eq!(after.configuration, before.configuration);
}

#[test]
fn missing_allocator_keeps_reserved_balance() {
    let beneficiary = Address::from_low_u64(0xbe);
    let h = launch(
        minting_metadata(MAX_RESERVED_RATE),
        vec![
            Split::new(percent(50)).with_beneficiary(beneficiary),
            Split::new(percent(10)).with_allocator(Address::from_low_u64(0xdead)),
        ],
    );
    h.controller
        .mint_tokens_of(owner(), h.project, &MintRequest::new(units(100), holder()))
        .unwrap();

    let err = h
        .controller
        .distribute_reserved_tokens_of(owner(), h.project, "")
        .unwrap_err();

    assert!(matches!(err, ControllerError::AllocatorNotFound(_)));
    assert_eq!(h.controller.reserved_token_balance_of(h.project).unwrap(), units(100));
    assert_eq!(h.balance_of(beneficiary), U256::ZERO);
    assert_eq!(h.total_supply(), U256::ZERO);
}

#[test]
fn failed_allocation_returns_unpaid_tokens_to_reserve() {
    let alice = Address::from_low_u64(0xa1);
    let bob = Address::from_low_u64(0xb1);
    let closed = Address::from_low_u64(0xc105ed);
    let h = launch(
        minting_metadata(MAX_RESERVED_RATE),
        vec![
            Split::new(percent(20)).with_beneficiary(alice),
            Split::new(percent(30)).with_allocator(closed),
            Split::new(percent(40)).with_beneficiary(bob),
        ],
    );
    h.shared
        .allocators
        .register(closed, Arc::new(ClosedAllocator))
        .unwrap();
    h.controller
        .mint_tokens_of(owner(), h.project, &MintRequest::new(units(100), holder()))
        .unwrap();

    let err = h
        .controller
        .distribute_reserved_tokens_of(owner(), h.project, "")
        .unwrap_err();

    assert!(matches!(err, ControllerError::AllocationFailed { .. }));
    assert_eq!(h.balance_of(alice), units(20));
    assert_eq!(h.balance_of(closed), units(30));
    assert_eq!(h.balance_of(bob), U256::ZERO);
    assert_eq!(h.controller.reserved_token_balance_of(h.project).unwrap(), units(50));
    assert_eq!(h.controller.total_outstanding_tokens_of(h.project).unwrap(), units(100));
}
