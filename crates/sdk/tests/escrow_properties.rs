use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use proptest::prelude::*;
use pulse_sdk::{
    marketplace::{EscrowMarketplace, Settlement},
    PdaBuilder, LAMPORTS_PER_TOKEN, MAX_TRANSFER_LAMPORTS, SECONDS_PER_DAY,
};
use solana_sdk::pubkey::Pubkey;

const NOW: i64 = 1_700_000_000;
const FEE_BPS: u16 = 250;

#[derive(Debug, Clone)]
enum Op {
    Offer { buyer: usize, amount: u64 },
    Accept { buyer: usize },
    Withdraw { buyer: usize },
    CancelListing,
    CloseAndRelist,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..4usize, 1..100 * LAMPORTS_PER_TOKEN)
            .prop_map(|(buyer, amount)| Op::Offer { buyer, amount }),
        2 => (0..4usize).prop_map(|buyer| Op::Accept { buyer }),
        2 => (0..4usize).prop_map(|buyer| Op::Withdraw { buyer }),
        1 => Just(Op::CancelListing),
        1 => Just(Op::CloseAndRelist),
    ]
}

/// Lamport flows observed through settlements
#[derive(Default)]
struct Ledger {
    escrowed: u64,
    refunded: u64,
    proceeds: u64,
    fees: u64,
    escrow_events: HashMap<Pubkey, u32>,
    settle_events: HashMap<Pubkey, u32>,
}

impl Ledger {
    fn apply(&mut self, settlement: &Settlement) {
        match settlement {
            Settlement::Escrowed { offer, amount, .. } => {
                self.escrowed += amount;
                *self.escrow_events.entry(*offer).or_default() += 1;
            }
            Settlement::Refunded { offer, amount, .. } => {
                self.refunded += amount;
                *self.settle_events.entry(*offer).or_default() += 1;
            }
            Settlement::Sold {
                offer,
                seller_proceeds,
                platform_fee,
                ..
            } => {
                self.proceeds += seller_proceeds;
                self.fees += platform_fee;
                *self.settle_events.entry(*offer).or_default() += 1;
            }
            Settlement::Listed { .. }
            | Settlement::ListingCancelled { .. }
            | Settlement::ListingClosed { .. } => {}
        }
    }
}

proptest! {
    #[test]
    fn prop_escrow_is_conserved(ops in prop::collection::vec(op(), 1..40)) {
        let pda = Arc::new(PdaBuilder::new(Pubkey::new_unique()));
        let mut market = EscrowMarketplace::new(pda.clone(), MAX_TRANSFER_LAMPORTS);
        let seller = Pubkey::new_unique();
        let nft = Pubkey::new_unique();
        let buyers: Vec<Pubkey> = (0..4).map(|_| Pubkey::new_unique()).collect();
        let listing = pda.listing(&nft).unwrap().address;
        let offer_of = |buyer: &Pubkey| pda.offer(&listing, buyer).unwrap().address;

        let mut ledger = Ledger::default();
        ledger.apply(&market.list(seller, nft, LAMPORTS_PER_TOKEN, "short", NOW, None).unwrap());
        // offers placed against the current listing record
        let mut current: HashSet<Pubkey> = HashSet::new();

        for op in ops {
            let result = match op {
                Op::Offer { buyer, amount } => market.make_offer(
                    &listing,
                    buyers[buyer],
                    amount,
                    NOW,
                    NOW + SECONDS_PER_DAY,
                ),
                Op::Accept { buyer } => {
                    market.accept_offer(&listing, &offer_of(&buyers[buyer]), &seller, FEE_BPS, NOW)
                }
                Op::Withdraw { buyer } => {
                    market.cancel_offer(&offer_of(&buyers[buyer]), &buyers[buyer])
                }
                Op::CancelListing => market.cancel_listing(&listing, &seller),
                Op::CloseAndRelist => match market.close_listing(&listing, &seller) {
                    Ok(_) => {
                        let relisted =
                            market.list(seller, nft, 9 * LAMPORTS_PER_TOKEN, "short", NOW, None);
                        prop_assert!(relisted.is_ok());
                        // nothing from the old listing carries over
                        prop_assert!(market.offers_for(&listing).is_empty());
                        current.clear();
                        relisted
                    }
                    Err(e) => Err(e),
                },
            };
            if let Ok(settlement) = result {
                match &settlement {
                    Settlement::Escrowed { offer, .. } => {
                        current.insert(*offer);
                    }
                    Settlement::Sold { offer, .. } => {
                        prop_assert!(current.contains(offer), "stale offer {} settled", offer);
                    }
                    _ => {}
                }
                ledger.apply(&settlement);
            }

            prop_assert_eq!(
                ledger.escrowed,
                ledger.refunded + ledger.proceeds + ledger.fees + market.escrow_total()
            );
        }

        // every remaining escrow can still be withdrawn
        for buyer in &buyers {
            if let Ok(settlement) = market.cancel_offer(&offer_of(buyer), buyer) {
                ledger.apply(&settlement);
            }
        }
        prop_assert_eq!(market.escrow_total(), 0);
        prop_assert_eq!(ledger.escrowed, ledger.refunded + ledger.proceeds + ledger.fees);
        prop_assert_eq!(&ledger.escrow_events, &ledger.settle_events);
    }

    #[test]
    fn prop_fee_split_never_leaks(amount in 1..MAX_TRANSFER_LAMPORTS) {
        let pda = Arc::new(PdaBuilder::new(Pubkey::new_unique()));
        let mut market = EscrowMarketplace::new(pda.clone(), MAX_TRANSFER_LAMPORTS);
        let seller = Pubkey::new_unique();
        let buyer = Pubkey::new_unique();
        let nft = Pubkey::new_unique();
        let listing = pda.listing(&nft).unwrap().address;

        market.list(seller, nft, amount, "", NOW, None).unwrap();
        market.make_offer(&listing, buyer, amount, NOW, NOW + 60).unwrap();
        let offer = pda.offer(&listing, &buyer).unwrap().address;

        match market.accept_offer(&listing, &offer, &seller, FEE_BPS, NOW).unwrap() {
            Settlement::Sold { seller_proceeds, platform_fee, .. } => {
                prop_assert_eq!(seller_proceeds + platform_fee, amount);
            }
            other => prop_assert!(false, "unexpected settlement {:?}", other),
        }
    }
}
