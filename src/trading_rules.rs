use chrono::{DateTime, Datelike, Duration, Utc};

use crate::config::TradeRules;
use crate::models::{JournalEntry, OptionType, Signal, Trade, TradeStatus};

pub const PRICE_EPSILON: f64 = 1e-6;

const EXPIRY_WEEKDAY_OFFSET: i64 = 3; // Thursday, num_days_from_monday

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeSelection {
    Atm,
    Itm,
    Otm,
}

/// Strike on the symbol's grid nearest to the spot, half-step boundaries
/// rounding away from zero.
pub fn nearest_strike(spot: f64, step: i64) -> i64 {
    ((spot / step as f64).round() as i64) * step
}

pub fn pick_strike(
    spot: f64,
    step: i64,
    selection: StrikeSelection,
    option_type: OptionType,
) -> i64 {
    let atm = nearest_strike(spot, step);
    match (selection, option_type) {
        (StrikeSelection::Atm, _) => atm,
        (StrikeSelection::Itm, OptionType::Ce) => atm - step,
        (StrikeSelection::Itm, OptionType::Pe) => atm + step,
        (StrikeSelection::Otm, OptionType::Ce) => atm + step,
        (StrikeSelection::Otm, OptionType::Pe) => atm - step,
    }
}

/// Synthetic premium proxy: a fixed fraction of spot with a floor.
pub fn option_premium(spot: f64, rules: &TradeRules) -> f64 {
    rules.premium_floor.max(rules.premium_rate * spot)
}

/// Assumed ATM delta for the chosen side. Signed; the entry gate compares
/// its magnitude.
pub fn option_delta(option_type: OptionType, rules: &TradeRules) -> f64 {
    match option_type {
        OptionType::Ce => rules.call_delta,
        OptionType::Pe => rules.put_delta,
    }
}

/// Next weekly expiry (Thursday) strictly after the given instant,
/// formatted for the journal.
pub fn next_weekly_expiry(after: DateTime<Utc>) -> String {
    let weekday = after.weekday().num_days_from_monday() as i64;
    let mut days_ahead = (EXPIRY_WEEKDAY_OFFSET - weekday).rem_euclid(7);
    if days_ahead == 0 {
        days_ahead = 7;
    }
    (after + Duration::days(days_ahead))
        .format("%d-%b-%Y")
        .to_string()
}

pub struct EntryParams<'a> {
    pub symbol: &'a str,
    pub signal: Signal,
    pub spot: f64,
    pub strike_step: i64,
    pub at: DateTime<Utc>,
    pub selection: StrikeSelection,
    pub rules: &'a TradeRules,
}

#[derive(Debug, PartialEq)]
pub enum EntryOutcome {
    Opened(Trade),
    Rejected { reason: &'static str },
}

/// Builds the option position for an actionable signal: BUY takes a call,
/// SELL takes a put. Entry, stop and target are fixed here and rounded to
/// paise; later premium marks stay unrounded.
pub fn open_trade(params: EntryParams) -> EntryOutcome {
    let EntryParams {
        symbol,
        signal,
        spot,
        strike_step,
        at,
        selection,
        rules,
    } = params;

    let option_type = match signal {
        Signal::Buy => OptionType::Ce,
        Signal::Sell => OptionType::Pe,
        Signal::None => {
            return EntryOutcome::Rejected {
                reason: "no actionable signal",
            }
        }
    };

    if option_delta(option_type, rules).abs() + PRICE_EPSILON < rules.min_delta {
        return EntryOutcome::Rejected {
            reason: "assumed delta below minimum",
        };
    }

    let premium = option_premium(spot, rules);
    EntryOutcome::Opened(Trade {
        symbol: symbol.to_string(),
        expiry: next_weekly_expiry(at),
        strike: pick_strike(spot, strike_step, selection, option_type),
        option_type,
        entry: round2(premium),
        stop_loss: round2(premium * rules.stop_loss_ratio),
        target: round2(premium * rules.target_ratio),
        trailing_active: false,
        status: TradeStatus::Open,
    })
}

/// One bar of position management: move the stop first, then check exits.
/// The breakeven snap and the trailing ratchet never happen on the same
/// bar, and the stop check wins when stop and target are both satisfied.
pub fn manage_trade(trade: &mut Trade, premium: f64, rules: &TradeRules) {
    if trade.status != TradeStatus::Open {
        return;
    }

    if !trade.trailing_active
        && premium + PRICE_EPSILON >= trade.entry * rules.breakeven_trigger_ratio
    {
        trade.stop_loss = trade.entry;
        trade.trailing_active = true;
    } else if trade.trailing_active {
        trade.stop_loss = trade.stop_loss.max(premium * rules.trail_ratio);
    }

    if premium <= trade.stop_loss + PRICE_EPSILON {
        trade.status = TradeStatus::SlHit;
    } else if premium + PRICE_EPSILON >= trade.target {
        trade.status = TradeStatus::TargetHit;
    }
}

/// Folds a finished trade into its journal row. PnL is exit minus entry,
/// unrounded; journaled PnL sums exactly to the capital move.
pub fn close_trade(trade: Trade, exit_premium: f64) -> JournalEntry {
    let pnl = exit_premium - trade.entry;
    JournalEntry {
        trade,
        exit: exit_premium,
        pnl,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
