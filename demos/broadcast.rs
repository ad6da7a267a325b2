//! # Broadcast Example
//!
//! Wires three subscribers to an order bus and shows how each fault policy
//! reports a failing subscriber.
//!
//! - `audit` receives every order
//! - `fraud` only sees large orders and rejects them
//! - `mailer` receives every order
//!
//! ## Run
//! ```bash
//! cargo run --example broadcast
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use patternkit::{BoxError, Broadcaster, FaultPolicy, SubscriberFault, Subscription};

#[derive(Debug)]
struct Order {
    id: u64,
    amount: u64,
}

fn wire(bus: &Broadcaster<Order>, mailed: &Arc<AtomicU64>) -> Vec<Subscription> {
    let audit = bus.subscribe(|o: &Order| {
        println!("  [audit]  order={} amount={}", o.id, o.amount);
        Ok(())
    });
    let fraud = bus.subscribe_when(
        |o: &Order| o.amount > 1_000,
        |o: &Order| Err(format!("order {} flagged for review", o.id).into()),
    );
    let m = Arc::clone(mailed);
    let mailer = bus.subscribe(move |o: &Order| {
        m.fetch_add(1, Ordering::Relaxed);
        println!("  [mailer] confirmation for order={}", o.id);
        Ok(())
    });
    vec![audit, fraud, mailer]
}

fn main() {
    let orders = [Order { id: 1, amount: 40 }, Order { id: 2, amount: 5_000 }];

    for policy in [FaultPolicy::Swallow, FaultPolicy::ThrowFirst, FaultPolicy::ThrowAggregate] {
        println!("policy={}", policy.as_label());
        let mailed = Arc::new(AtomicU64::new(0));
        let bus = Broadcaster::<Order>::builder()
            .with_name("orders")
            .with_policy(policy)
            .with_sink(|f: &SubscriberFault| -> Result<(), BoxError> {
                println!("  [sink]   {}", f.as_message());
                Ok(())
            })
            .build();
        let _subs = wire(&bus, &mailed);

        for order in &orders {
            match bus.publish(order) {
                Ok(()) => println!("  publish order={} ok", order.id),
                Err(e) => println!("  publish order={} failed: {}", order.id, e.as_message()),
            }
        }
        println!("  confirmations sent: {}", mailed.load(Ordering::Relaxed));
        println!();
    }
}
