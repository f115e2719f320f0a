//! Property tests for cart totals and guest persistence.
//!
//! Random sequences of adds, updates and removals are replayed against a guest
//! cart; after every step each subtotal must equal unit price times quantity and
//! the total must equal the sum of subtotals.

use std::sync::Arc;

use proptest::prelude::*;
use proptest::test_runner::Config;

use rouge::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add { sku: usize, quantity: u32, cents: u32 },
    Update { line: usize, quantity: i64 },
    Remove { line: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0_usize..4, 1_u32..20, 0_u32..100_000).prop_map(|(sku, quantity, cents)| Op::Add {
            sku,
            quantity,
            cents
        }),
        (0_usize..8, -3_i64..20).prop_map(|(line, quantity)| Op::Update { line, quantity }),
        (0_usize..8).prop_map(|line| Op::Remove { line }),
    ]
}

fn price(cents: u32) -> Result<Price, PriceError> {
    Price::parse(&format!("{}.{:02}", cents / 100, cents % 100))
}

fn assert_invariants(cart: &Cart) -> Result<(), TestCaseError> {
    let mut sum = Price::zero();

    for item in cart.items() {
        let expected = item
            .price()
            .times(item.quantity().get())
            .map_err(|error| TestCaseError::fail(error.to_string()))?;

        prop_assert_eq!(item.subtotal(), expected);

        sum = sum
            .checked_add(item.subtotal())
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
    }

    prop_assert_eq!(cart.total(), sum);

    Ok(())
}

fn apply(store: &mut GuestCartStore, op: &Op) -> Result<(), TestCaseError> {
    let fail = |error: GuestCartError| TestCaseError::fail(error.to_string());

    match *op {
        Op::Add { sku, quantity, cents } => {
            let item = NewCartItem {
                sku: Sku::new(format!("SKU-{sku}")).map_err(|error| TestCaseError::fail(error.to_string()))?,
                quantity: Quantity::new(quantity).map_err(|error| TestCaseError::fail(error.to_string()))?,
                price: price(cents).map_err(|error| TestCaseError::fail(error.to_string()))?,
                name: None,
            };

            store.add_item(item).map_err(fail)?;
        }
        Op::Update { line, quantity } => {
            let Some(id) = store.cart().items().get(line).map(|item| item.id().clone()) else {
                return Ok(());
            };

            store.update_item(&id, quantity).map_err(fail)?;

            if quantity <= 0 {
                prop_assert!(store.cart().item(&id).is_none());
            }
        }
        Op::Remove { line } => {
            let Some(id) = store.cart().items().get(line).map(|item| item.id().clone()) else {
                return Ok(());
            };

            store.remove_item(&id).map_err(fail)?;
        }
    }

    Ok(())
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn totals_hold_after_every_mutation(ops in prop::collection::vec(op(), 1..40)) {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let mut store = GuestCartStore::load(Arc::clone(&storage))
            .map_err(|error| TestCaseError::fail(error.to_string()))?;

        for op in &ops {
            apply(&mut store, op)?;
            assert_invariants(store.cart())?;
        }

        let reloaded = GuestCartStore::load(storage)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;

        prop_assert_eq!(reloaded.cart(), store.cart());
    }

    #[test]
    fn repeated_adds_sum_quantities(quantities in prop::collection::vec(1_u32..50, 1..10), cents in 0_u32..10_000) {
        let mut store = GuestCartStore::load(Arc::new(MemoryStorage::new()))
            .map_err(|error| TestCaseError::fail(error.to_string()))?;

        for quantity in &quantities {
            apply(&mut store, &Op::Add { sku: 1, quantity: *quantity, cents })?;
        }

        let total_quantity: u32 = quantities.iter().sum();
        let unit = price(cents).map_err(|error| TestCaseError::fail(error.to_string()))?;
        let expected = unit
            .times(total_quantity)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;

        prop_assert_eq!(store.cart().len(), 1);
        prop_assert_eq!(store.cart().item_count(), u64::from(total_quantity));
        prop_assert_eq!(store.cart().total(), expected);
    }
}
