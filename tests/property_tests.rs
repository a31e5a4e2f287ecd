//! Property-based checks over the inventory ledger.
//!
//! Random movement sequences against an in-memory database, with a plain
//! integer model tracking the expected on-hand alongside.

mod common;

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use ledgercore::entities::item::TrackingType;
use ledgercore::services::inventory::{on_hand, RecordMovement};
use ledgercore::ServiceError;

use common::{seed_item, setup_core, test_epoch};

#[derive(Debug, Clone, Copy)]
enum Op {
    Receive(i64),
    Issue(i64),
    Adjust(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1i64..=20).prop_map(Op::Receive),
        (1i64..=20).prop_map(Op::Issue),
        (-10i64..=10).prop_map(Op::Adjust),
    ]
}

fn movement(warehouse_id: Uuid, item_id: Uuid, quantity: i64) -> RecordMovement {
    RecordMovement {
        occurred_at: test_epoch(),
        warehouse_id,
        item_id,
        quantity: Decimal::from(quantity),
        unit_cost: None,
        reference_type: "property_check".to_string(),
        reference_id: Uuid::new_v4(),
        reference_line_id: None,
        batch_number: None,
        serial_numbers: Vec::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn on_hand_always_equals_the_signed_sum_and_never_goes_negative(
        ops in prop::collection::vec(op_strategy(), 1..24)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let core = setup_core().await;
            let warehouse = Uuid::new_v4();
            let item = seed_item(&core, "PROP-1", TrackingType::None).await;
            let mut expected: i64 = 0;

            for op in ops {
                match op {
                    Op::Receive(quantity) => {
                        core.inventory
                            .record_receipt(movement(warehouse, item, quantity))
                            .await
                            .unwrap();
                        expected += quantity;
                    }
                    Op::Issue(quantity) => {
                        let result = core
                            .inventory
                            .record_issue(movement(warehouse, item, quantity))
                            .await;
                        if quantity <= expected {
                            result.unwrap();
                            expected -= quantity;
                        } else {
                            assert!(matches!(result, Err(ServiceError::InsufficientStock(_))));
                        }
                    }
                    Op::Adjust(delta) => {
                        let result = core
                            .inventory
                            .record_adjustment(movement(warehouse, item, delta))
                            .await;
                        if delta == 0 {
                            assert!(matches!(result, Err(ServiceError::ValidationError(_))));
                        } else if delta < 0 && -delta > expected {
                            assert!(matches!(result, Err(ServiceError::InsufficientStock(_))));
                        } else {
                            result.unwrap();
                            expected += delta;
                        }
                    }
                }

                let derived = on_hand(&*core.db, warehouse, item, None).await.unwrap();
                assert_eq!(derived, Decimal::from(expected));
                assert!(derived >= Decimal::ZERO);
            }
        });
    }
}
