//! The order model seen by the matching core.
//!
//! The engine is generic over the [`Order`] capability trait, so hosts can
//! back orders with their own storage. [`BatchOrder`] is the concrete
//! implementation used by the book and the tests; pool-generated synthetic
//! orders carry the same shape under a different [`OrderKind`] tag.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::numeric::mul_int_ceil;
use crate::{Amount, BatchId, OrderId};

/// Which side of the book an order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Provenance of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    /// A user-submitted limit order.
    UserLimit,
    /// A synthetic order derived from a pool's AMM curve. Generation of
    /// these lives outside the core; the engine treats both kinds alike.
    PoolSynthetic,
}

/// Capability surface the matching core requires from an order.
///
/// Reads must be stable for the duration of one matching invocation; the
/// mutators are called only by the engine's commit paths after matching
/// completes.
pub trait Order {
    fn id(&self) -> OrderId;
    fn batch_id(&self) -> BatchId;
    fn direction(&self) -> Direction;
    /// Limit price, a tick-lattice value.
    fn price(&self) -> Decimal;
    /// Original base-unit quantity, positive.
    fn amount(&self) -> Amount;

    /// Base units not yet matched.
    fn open_amount(&self) -> Amount;
    fn set_open_amount(&mut self, amount: Amount);

    /// Offer-side balance still reservable by the order.
    fn remaining_offer_coin(&self) -> Amount;
    fn decr_remaining_offer_coin(&mut self, amount: Amount);

    /// Cumulative demand-side coin credited to the order.
    fn received_demand_coin(&self) -> Amount;
    fn incr_received_demand_coin(&mut self, amount: Amount);

    fn is_matched(&self) -> bool;
    fn set_matched(&mut self, matched: bool);
}

/// Concrete order used by the book and in tests.
///
/// Constructed before a batch runs with `open_amount == amount`,
/// `matched == false` and no demand coin received. `remaining_offer_coin`
/// starts at the quote needed to fund a buy (`⌈price·amount⌉`) or the base
/// amount of a sell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOrder {
    pub id: OrderId,
    pub batch_id: BatchId,
    pub kind: OrderKind,
    pub direction: Direction,
    pub price: Decimal,
    pub amount: Amount,
    pub open_amount: Amount,
    pub remaining_offer_coin: Amount,
    pub received_demand_coin: Amount,
    pub matched: bool,
}

impl BatchOrder {
    /// A fresh user limit order.
    #[must_use]
    pub fn user_limit(
        id: OrderId,
        batch_id: BatchId,
        direction: Direction,
        price: Decimal,
        amount: Amount,
    ) -> Self {
        Self::new(id, batch_id, OrderKind::UserLimit, direction, price, amount)
    }

    /// A fresh pool-synthetic order.
    #[must_use]
    pub fn pool_synthetic(
        id: OrderId,
        direction: Direction,
        price: Decimal,
        amount: Amount,
    ) -> Self {
        Self::new(
            id,
            BatchId::UNBATCHED,
            OrderKind::PoolSynthetic,
            direction,
            price,
            amount,
        )
    }

    fn new(
        id: OrderId,
        batch_id: BatchId,
        kind: OrderKind,
        direction: Direction,
        price: Decimal,
        amount: Amount,
    ) -> Self {
        let offer_coin = match direction {
            Direction::Buy => mul_int_ceil(price, amount),
            Direction::Sell => amount,
        };
        Self {
            id,
            batch_id,
            kind,
            direction,
            price,
            amount,
            open_amount: amount,
            remaining_offer_coin: offer_coin,
            received_demand_coin: 0,
            matched: false,
        }
    }

    /// Base units matched so far.
    #[must_use]
    pub fn filled_amount(&self) -> Amount {
        self.amount - self.open_amount
    }
}

impl Order for BatchOrder {
    fn id(&self) -> OrderId {
        self.id
    }

    fn batch_id(&self) -> BatchId {
        self.batch_id
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn price(&self) -> Decimal {
        self.price
    }

    fn amount(&self) -> Amount {
        self.amount
    }

    fn open_amount(&self) -> Amount {
        self.open_amount
    }

    fn set_open_amount(&mut self, amount: Amount) {
        self.open_amount = amount;
    }

    fn remaining_offer_coin(&self) -> Amount {
        self.remaining_offer_coin
    }

    fn decr_remaining_offer_coin(&mut self, amount: Amount) {
        self.remaining_offer_coin = self
            .remaining_offer_coin
            .checked_sub(amount)
            .unwrap_or_else(|| panic!("offer coin underflow on {}", self.id));
    }

    fn received_demand_coin(&self) -> Amount {
        self.received_demand_coin
    }

    fn incr_received_demand_coin(&mut self, amount: Amount) {
        self.received_demand_coin += amount;
    }

    fn is_matched(&self) -> bool {
        self.matched
    }

    fn set_matched(&mut self, matched: bool) {
        self.matched = matched;
    }
}
