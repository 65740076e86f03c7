//! Length-tiered registration pricing.
//!
//! The contract enforces its own price; this only decides what payment to
//! attach. A disagreement shows up as a reverted registration.

use xns_types::{MintRequest, Wei};

use crate::error::ValidationError;

pub const MIN_DOMAIN_LEN: usize = 3;

const THREE_CHAR_PRICE: Wei = Wei::from_finney(50);
const FOUR_CHAR_PRICE: Wei = Wei::from_finney(30);
const LONG_NAME_PRICE: Wei = Wei::from_finney(10);

pub fn price_for(domain: &str) -> Option<Wei> {
    match domain.chars().count() {
        len if len < MIN_DOMAIN_LEN => None,
        3 => Some(THREE_CHAR_PRICE),
        4 => Some(FOUR_CHAR_PRICE),
        _ => Some(LONG_NAME_PRICE),
    }
}

/// Checks a mint request before any network call and returns its price.
pub fn validate(request: &MintRequest) -> Result<Wei, ValidationError> {
    if request.domain.is_empty() {
        return Err(ValidationError::EmptyDomain);
    }
    let Some(price) = price_for(&request.domain) else {
        return Err(ValidationError::DomainTooShort {
            min: MIN_DOMAIN_LEN,
            len: request.domain.chars().count(),
        });
    };
    if request.record.is_empty() {
        return Err(ValidationError::EmptyRecord);
    }
    Ok(price)
}

pub fn price_label(domain: &str, symbol: &str) -> Option<String> {
    price_for(domain).map(|price| format!("{} {symbol}", price.ether_label()))
}
