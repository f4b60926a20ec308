//! Pure floating-point math kernel underlying position and margin
//! accounting. Every function here is side-effect free; callers are
//! responsible for snapping results destined for price/qty fields back to
//! step precision with [`round_down`].

/// Largest multiple of `step` that is `<= x`. `step <= 0.0` returns `x`
/// unchanged (no step configured).
pub fn round_down(x: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return x;
    }
    (x / step).floor() * step
}

/// Notional value of `qty` contracts at `price`, for linear (non-inverse)
/// contracts: `qty * price * contract_multiplier`.
pub fn quantity_to_cost(qty: f64, price: f64, inverse: bool, contract_multiplier: f64) -> f64 {
    debug_assert!(!inverse, "inverse contracts are not supported");
    qty.abs() * price * contract_multiplier
}

/// Realized pnl for closing `qty` of a long position bought at `entry` and
/// exited at `exit`.
pub fn calculate_long_pnl(entry: f64, exit: f64, qty: f64, inverse: bool, mult: f64) -> f64 {
    debug_assert!(!inverse, "inverse contracts are not supported");
    (exit - entry) * qty * mult
}

/// Realized pnl for closing `qty` of a short position sold at `entry` and
/// exited at `exit`.
pub fn calculate_short_pnl(entry: f64, exit: f64, qty: f64, inverse: bool, mult: f64) -> f64 {
    debug_assert!(!inverse, "inverse contracts are not supported");
    (entry - exit) * qty * mult
}

/// Folds a fill of `delta_qty` at `fill_price` into an existing position of
/// `old_qty` at `old_price`, returning the new `(qty, price)` pair.
///
/// `delta_qty > 0` increases the position (volume-weighted average price).
/// `delta_qty < 0` reduces it; the average price is unchanged by a
/// reduction, since realized pnl on the reduced slice is recognized
/// separately by the caller. A reduction that brings `qty` to (rounded)
/// zero resets `price` to zero as well, so a flat position never reports a
/// stale entry price.
///
/// Over-closing (`|delta_qty| > old_qty`) is not a reachable caller state
/// in this simulator: a fill's quantity is always bounded by the open
/// order's own remaining qty, which in turn never exceeds the position it
/// was opened against. Debug builds assert this; release builds clamp to
/// `(0.0, 0.0)` rather than produce a negative position.
pub fn calculate_new_position_size_position_price(
    old_qty: f64,
    old_price: f64,
    delta_qty: f64,
    fill_price: f64,
    qty_step: f64,
) -> (f64, f64) {
    if delta_qty >= 0.0 {
        let total_qty = old_qty + delta_qty;
        if total_qty == 0.0 {
            return (0.0, 0.0);
        }
        let new_qty = if qty_step > 0.0 {
            round_down(total_qty, qty_step)
        } else {
            total_qty
        };
        let new_price = (old_qty * old_price + delta_qty * fill_price) / total_qty;
        (new_qty, new_price)
    } else {
        let reduce_by = -delta_qty;
        debug_assert!(
            reduce_by <= old_qty + f64::EPSILON,
            "position reduction exceeds open size"
        );
        let reduce_by = reduce_by.min(old_qty);
        let new_qty = if qty_step > 0.0 {
            round_down(old_qty - reduce_by, qty_step)
        } else {
            old_qty - reduce_by
        };
        if new_qty <= 0.0 {
            (0.0, 0.0)
        } else {
            (new_qty, old_price)
        }
    }
}

/// Free margin remaining given current balance, both sides' positions, and
/// a mark price: `balance - required_margin + unrealized_pnl`, where
/// required margin per side is `qty * price * mult / leverage`.
#[allow(clippy::too_many_arguments)]
pub fn calculate_available_margin(
    balance: f64,
    long_qty: f64,
    long_price: f64,
    short_qty: f64,
    short_price: f64,
    mark_price: f64,
    inverse: bool,
    mult: f64,
    leverage: f64,
) -> f64 {
    debug_assert!(!inverse, "inverse contracts are not supported");
    debug_assert!(leverage > 0.0, "leverage must be positive");
    let required_long = quantity_to_cost(long_qty, long_price, inverse, mult) / leverage;
    let required_short = quantity_to_cost(short_qty, short_price, inverse, mult) / leverage;
    let unrealized = calculate_long_pnl(long_price, mark_price, long_qty, inverse, mult)
        + calculate_short_pnl(short_price, mark_price, short_qty, inverse, mult);
    balance - (required_long + required_short) + unrealized
}

/// Mark price at which [`calculate_available_margin`] would reach exactly
/// zero given the current balance and both sides' positions. Derived by
/// solving `available_margin(mark) = 0` for `mark`, holding required
/// margin fixed at the entry prices (the conventional bankruptcy-price
/// approximation used by cross-margined perpetuals).
pub fn calculate_bankruptcy_price(
    balance: f64,
    long_qty: f64,
    long_price: f64,
    short_qty: f64,
    short_price: f64,
    inverse: bool,
    mult: f64,
) -> f64 {
    debug_assert!(!inverse, "inverse contracts are not supported");
    let net_qty = long_qty - short_qty;
    if net_qty == 0.0 {
        return 0.0;
    }
    // balance + (mark - long_price)*long_qty*mult - (mark - short_price)*short_qty*mult = 0
    // => mark * (long_qty - short_qty) * mult = long_price*long_qty*mult + short_price*short_qty*mult - balance
    let numerator = long_price * long_qty * mult + short_price * short_qty * mult - balance;
    (numerator / (net_qty * mult)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn round_down_floors_to_step() {
        assert_relative_eq!(round_down(105.07, 0.01), 105.07, epsilon = 1e-9);
        assert_relative_eq!(round_down(105.079, 0.01), 105.07, epsilon = 1e-9);
        assert_relative_eq!(round_down(3.0, 0.0), 3.0);
    }

    #[test]
    fn round_down_is_idempotent_and_within_one_step() {
        let x = 123.456;
        let step = 0.5;
        let r = round_down(x, step);
        assert_relative_eq!(round_down(r, step), r, epsilon = 1e-9);
        assert!(r <= x);
        assert!(x - step < r);
    }

    #[test]
    fn quantity_to_cost_is_linear() {
        assert_relative_eq!(quantity_to_cost(2.0, 50.0, false, 1.0), 100.0);
    }

    #[test]
    fn long_pnl_is_positive_on_price_increase() {
        assert_relative_eq!(calculate_long_pnl(100.0, 110.0, 2.0, false, 1.0), 20.0);
    }

    #[test]
    fn short_pnl_is_positive_on_price_decrease() {
        assert_relative_eq!(calculate_short_pnl(100.0, 90.0, 2.0, false, 1.0), 20.0);
    }

    #[test]
    fn increasing_position_uses_weighted_average_price() {
        let (qty, price) = calculate_new_position_size_position_price(1.0, 100.0, 1.0, 200.0, 0.0);
        assert_relative_eq!(qty, 2.0);
        assert_relative_eq!(price, 150.0);
    }

    #[test]
    fn reducing_position_keeps_entry_price() {
        let (qty, price) = calculate_new_position_size_position_price(5.0, 100.0, -2.0, 150.0, 0.0);
        assert_relative_eq!(qty, 3.0);
        assert_relative_eq!(price, 100.0);
    }

    #[test]
    fn fully_closing_position_resets_price_to_zero() {
        let (qty, price) = calculate_new_position_size_position_price(3.0, 100.0, -3.0, 150.0, 0.0);
        assert_relative_eq!(qty, 0.0);
        assert_relative_eq!(price, 0.0);
    }

    #[test]
    fn available_margin_accounts_for_unrealized_pnl() {
        let margin = calculate_available_margin(1000.0, 1.0, 100.0, 0.0, 0.0, 110.0, false, 1.0, 10.0);
        assert_relative_eq!(margin, 1000.0 - 10.0 + 10.0);
    }

    #[test]
    fn bankruptcy_price_is_zero_when_flat() {
        assert_relative_eq!(
            calculate_bankruptcy_price(1000.0, 0.0, 0.0, 0.0, 0.0, false, 1.0),
            0.0
        );
    }
}
