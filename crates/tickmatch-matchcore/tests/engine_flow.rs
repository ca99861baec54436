//! Integration tests: full batch flow through the engine.
//!
//! The core invariant of tickmatch: given the same order snapshot, any
//! node produces the same clearing price, fills and fill root, and
//! conservation holds on every successful match.

use rust_decimal::Decimal;
use tickmatch_matchcore::{verify_fill_root, MatchEngine, OrderBook, OrderSource, TickPrecision};
use tickmatch_types::numeric::{mul_int_ceil, mul_int_floor};
use tickmatch_types::{Amount, BatchId, BatchOrder, Direction, Order, OrderId};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn order(id: u64, direction: Direction, price: &str, amount: Amount) -> BatchOrder {
    BatchOrder::user_limit(OrderId(id), BatchId(1), direction, dec(price), amount)
}

fn build_book(orders: &[BatchOrder]) -> OrderBook<BatchOrder> {
    let mut book = OrderBook::new();
    book.add_orders(orders.to_vec()).unwrap();
    book
}

/// Σ filled base units per side, recomputed from the committed orders.
fn side_totals(book: &OrderBook<BatchOrder>) -> (Amount, Amount) {
    let mut buy_base = 0;
    let mut sell_base = 0;
    for o in book.orders() {
        match o.direction() {
            Direction::Buy => buy_base += o.filled_amount(),
            Direction::Sell => sell_base += o.filled_amount(),
        }
    }
    (buy_base, sell_base)
}

#[test]
fn simple_cross_fills_both_sides_with_zero_dust() {
    let mut book = build_book(&[
        order(1, Direction::Buy, "10", 100),
        order(2, Direction::Sell, "10", 100),
    ]);
    let engine = MatchEngine::new(TickPrecision::new(3).unwrap());
    let outcome = engine.run(&mut book).unwrap();

    assert_eq!(outcome.clearing_price, dec("10"));
    assert_eq!(outcome.quote_dust, 0);
    for o in book.orders() {
        assert_eq!(o.open_amount(), 0);
        assert!(o.is_matched());
    }
}

#[test]
fn crossed_spread_clears_at_the_midpoint_tick() {
    let mut book = build_book(&[
        order(1, Direction::Buy, "12", 50),
        order(2, Direction::Sell, "8", 50),
    ]);
    let engine = MatchEngine::new(TickPrecision::new(1).unwrap());
    let outcome = engine.run(&mut book).unwrap();

    assert_eq!(outcome.clearing_price, dec("10"));
    assert_eq!(outcome.quote_dust, 0);
    let buy = &book.buy_orders_at(dec("12"))[0];
    assert_eq!(buy.open_amount, 0);
    assert_eq!(buy.received_demand_coin, 50);
    // Paid the clearing price, not the limit: 100 of the 600 reserved
    // quote stays with the order.
    assert_eq!(buy.remaining_offer_coin, 100);
    let sell = &book.sell_orders_at(dec("8"))[0];
    assert_eq!(sell.received_demand_coin, 500);
}

#[test]
fn marginal_tick_is_split_and_volume_conserved() {
    let mut book = build_book(&[
        order(1, Direction::Buy, "10", 100),
        order(2, Direction::Buy, "10", 30),
        order(3, Direction::Sell, "10", 110),
    ]);
    let engine = MatchEngine::new(TickPrecision::new(3).unwrap());
    let outcome = engine.run(&mut book).unwrap();

    assert_eq!(outcome.clearing_price, dec("10"));
    let (buy_base, sell_base) = side_totals(&book);
    assert_eq!(buy_base, 110);
    assert_eq!(sell_base, 110);
    assert_eq!(outcome.quote_dust, 0);
    // The sell is exhausted; the marginal buy tick keeps 20 open.
    let open_buys: Amount = book.buy_orders_at(dec("10")).iter().map(|o| o.open_amount).sum();
    assert_eq!(open_buys, 20);
}

#[test]
fn sub_unit_price_surplus_is_returned_as_dust() {
    let mut book = build_book(&[
        order(1, Direction::Buy, "10.0001", 1),
        order(2, Direction::Sell, "10.0001", 1),
    ]);
    let engine = MatchEngine::new(TickPrecision::new(5).unwrap());
    let outcome = engine.run(&mut book).unwrap();

    assert_eq!(outcome.clearing_price, dec("10.0001"));
    // Buyer pays ⌈10.0001⌉ = 11, seller receives ⌊10.0001⌋ = 10.
    assert_eq!(outcome.quote_dust, 1);
    assert_eq!(book.sell_orders_at(dec("10.0001"))[0].received_demand_coin, 10);
}

#[test]
fn uncrossed_book_is_left_untouched() {
    let orders = [
        order(1, Direction::Buy, "9", 100),
        order(2, Direction::Sell, "10", 100),
    ];
    let mut book = build_book(&orders);
    let engine = MatchEngine::new(TickPrecision::new(3).unwrap());
    assert!(engine.run(&mut book).is_none());

    for (committed, original) in book.orders().zip(orders.iter()) {
        assert_eq!(committed, original);
    }
}

#[test]
fn conservation_holds_on_a_multi_tick_book() {
    let orders = [
        order(1, Direction::Buy, "10.5", 20),
        order(2, Direction::Buy, "10.2", 15),
        order(3, Direction::Buy, "10", 30),
        order(4, Direction::Buy, "9.8", 10),
        order(5, Direction::Sell, "9.7", 25),
        order(6, Direction::Sell, "10", 20),
        order(7, Direction::Sell, "10.3", 15),
        order(8, Direction::Sell, "10.6", 10),
    ];
    let mut book = build_book(&orders);
    let engine = MatchEngine::new(TickPrecision::new(2).unwrap());
    let outcome = engine.run(&mut book).unwrap();

    let (buy_base, sell_base) = side_totals(&book);
    assert!(buy_base > 0);
    assert_eq!(buy_base, sell_base, "matched base amounts must conserve");

    // quote_dust == Σ⌈P·b⌉ − Σ⌊P·s⌋ over the committed fills.
    let mut paid = 0;
    let mut received = 0;
    for (id, result) in outcome.context.iter() {
        let original = orders.iter().find(|o| o.id == *id).unwrap();
        for record in &result.match_records {
            match original.direction {
                Direction::Buy => paid += mul_int_ceil(record.price, record.amount),
                Direction::Sell => received += mul_int_floor(record.price, record.amount),
            }
        }
    }
    assert_eq!(outcome.quote_dust, paid - received);

    // Open amounts never grow, and every journalled order is flagged.
    for o in book.orders() {
        assert!(o.open_amount() <= o.amount());
        if outcome.context.result(o.id()).is_some() {
            assert!(o.is_matched());
        }
    }
}

#[test]
fn clearing_price_is_always_on_the_lattice() {
    let precision = TickPrecision::new(2).unwrap();
    let mut book = build_book(&[
        order(1, Direction::Buy, "11.3", 70),
        order(2, Direction::Sell, "8.21", 30),
    ]);
    let engine = MatchEngine::new(precision);
    let outcome = engine.run(&mut book).unwrap();
    assert!(precision.is_tick_price(outcome.clearing_price));
}

#[test]
fn repeated_runs_produce_identical_fill_roots() {
    let orders = [
        order(1, Direction::Buy, "10.5", 20),
        order(2, Direction::Buy, "10", 35),
        order(3, Direction::Sell, "9.7", 25),
        order(4, Direction::Sell, "10", 22),
    ];
    let engine = MatchEngine::new(TickPrecision::new(2).unwrap());

    let mut roots = Vec::new();
    let mut dusts = Vec::new();
    for _ in 0..5 {
        let mut book = build_book(&orders);
        let outcome = engine.run(&mut book).unwrap();
        assert!(verify_fill_root(&outcome.context, &outcome.fill_root));
        roots.push(outcome.fill_root);
        dusts.push(outcome.quote_dust);
    }
    assert!(roots.windows(2).all(|w| w[0] == w[1]));
    assert!(dusts.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn cross_tick_insertion_order_does_not_change_the_outcome() {
    // Permuting orders across ticks preserves per-tick priority, so the
    // whole outcome must be identical, not just the price.
    let orders = [
        order(1, Direction::Buy, "10.5", 20),
        order(2, Direction::Buy, "10", 35),
        order(3, Direction::Sell, "9.7", 25),
        order(4, Direction::Sell, "10", 22),
    ];
    let engine = MatchEngine::new(TickPrecision::new(2).unwrap());

    let mut forward = build_book(&orders);
    let outcome_fwd = engine.run(&mut forward).unwrap();

    let reversed: Vec<BatchOrder> = orders.iter().rev().cloned().collect();
    let mut backward = OrderBook::new();
    backward.add_orders(reversed).unwrap();
    let outcome_bwd = engine.run(&mut backward).unwrap();

    assert_eq!(outcome_fwd.clearing_price, outcome_bwd.clearing_price);
    assert_eq!(outcome_fwd.quote_dust, outcome_bwd.quote_dust);
    assert_eq!(outcome_fwd.fill_root, outcome_bwd.fill_root);
    assert_eq!(outcome_fwd.context, outcome_bwd.context);
}

#[test]
fn discovery_through_the_book_matches_the_source_view() {
    let book = build_book(&[
        order(1, Direction::Buy, "12", 50),
        order(2, Direction::Sell, "8", 50),
    ]);
    assert_eq!(book.highest_buy_price(), Some(dec("12")));
    assert_eq!(book.lowest_sell_price(), Some(dec("8")));
    assert_eq!(book.buy_amount_over(dec("8")), 50);
    assert_eq!(book.sell_amount_under(dec("12")), 50);
}

#[test]
fn journal_snapshot_round_trips_through_serde() {
    let mut book = build_book(&[
        order(1, Direction::Buy, "10", 100),
        order(2, Direction::Sell, "10", 60),
    ]);
    let engine = MatchEngine::new(TickPrecision::new(3).unwrap());
    let outcome = engine.run(&mut book).unwrap();

    let json = serde_json::to_string(&outcome.context).unwrap();
    let back: tickmatch_matchcore::MatchContext = serde_json::from_str(&json).unwrap();
    assert_eq!(back, outcome.context);
    assert!(verify_fill_root(&back, &outcome.fill_root));
}
