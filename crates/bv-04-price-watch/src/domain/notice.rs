use std::fmt;

use shared_types::{CardKey, Price, UserId};

/// A watched card's price moved.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChangeNotice {
    pub key: CardKey,
    pub old_price: Price,
    pub new_price: Price,
}

impl fmt::Display for PriceChangeNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "🔔 {}: {}€ → {}€",
            self.key, self.old_price, self.new_price
        )
    }
}

/// A notice addressed to one user.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectMessage {
    pub user: UserId,
    pub notice: PriceChangeNotice,
}
