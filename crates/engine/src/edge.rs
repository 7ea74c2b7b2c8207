//! Edge and qualification scoring of candidate binary-outcome trades.
//!
//! A candidate buys one outcome token at its quoted bid. Winning pays the
//! premium `1 - bid`; losing forfeits the bid. The edge ratio compares that
//! premium with the model's probability of losing.

use regime_odds_core::QualificationConfig;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Outcome token being bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    BuyYes,
    BuyNo,
}

impl Side {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BuyYes => "BUY YES",
            Self::BuyNo => "BUY NO",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "yes" | "buy_yes" => Ok(Self::BuyYes),
            "no" | "buy_no" => Ok(Self::BuyNo),
            other => Err(format!("unknown side: {other}")),
        }
    }
}

/// Accepts a probability as a fraction or a percentage (`p > 1`).
#[must_use]
pub fn normalize_probability(probability: f64) -> f64 {
    if probability > 1.0 {
        probability / 100.0
    } else {
        probability
    }
}

/// Payoff metrics of one candidate trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperationMetrics {
    pub bid: f64,
    /// Profit per share if the bought outcome resolves true.
    pub premium: f64,
    /// Loss per share otherwise.
    pub max_loss: f64,
    pub success_prob: f64,
    pub loss_prob: f64,
    /// `premium / loss_prob`; infinite when the loss probability is zero.
    pub edge_ratio: f64,
    pub ev: f64,
    /// EV per unit staked; zero for a zero bid.
    pub ev_pct: f64,
}

impl OperationMetrics {
    /// Computes metrics from the model's YES probability (fraction or percent).
    #[must_use]
    pub fn compute(yes_probability: f64, bid: f64, side: Side) -> Self {
        let p_yes = normalize_probability(yes_probability);
        let success_prob = match side {
            Side::BuyYes => p_yes,
            Side::BuyNo => 1.0 - p_yes,
        };
        let loss_prob = 1.0 - success_prob;

        let premium = 1.0 - bid;
        let max_loss = bid;

        let edge_ratio = if loss_prob > 0.0 {
            premium / loss_prob
        } else {
            f64::INFINITY
        };

        let ev = success_prob * premium - loss_prob * max_loss;
        let ev_pct = if bid > 0.0 { ev / bid } else { 0.0 };

        Self {
            bid,
            premium,
            max_loss,
            success_prob,
            loss_prob,
            edge_ratio,
            ev,
            ev_pct,
        }
    }
}

/// One failed qualification criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "criterion", rename_all = "snake_case")]
pub enum Rejection {
    BidAboveMax { bid: f64, max: f64 },
    SuccessProbTooLow { success_prob: f64, min: f64 },
    EdgeBelowMin { edge_ratio: f64, min: f64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::BidAboveMax { max, .. } => write!(f, "BID>{:.1}c", max * 100.0),
            Self::SuccessProbTooLow { min, .. } => write!(f, "P.SUC<={:.1}%", min * 100.0),
            Self::EdgeBelowMin { edge_ratio, min } => {
                write!(f, "EDGE={edge_ratio:.2}x<{min}x")
            }
        }
    }
}

/// Outcome of the qualification rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Accepted { ev_pct: f64 },
    Rejected { reasons: Vec<Rejection> },
}

impl Verdict {
    #[must_use]
    pub const fn is_qualified(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted { ev_pct } => write!(f, "ACCEPTED (EV: {:.1}%)", ev_pct * 100.0),
            Self::Rejected { reasons } => {
                let joined: Vec<String> = reasons.iter().map(ToString::to_string).collect();
                write!(f, "REJECTED {}", joined.join(" | "))
            }
        }
    }
}

/// Applies every criterion and records each failure.
#[must_use]
pub fn qualify(metrics: &OperationMetrics, rules: &QualificationConfig) -> Verdict {
    let mut reasons = Vec::new();

    if metrics.bid > rules.max_entry_price {
        reasons.push(Rejection::BidAboveMax {
            bid: metrics.bid,
            max: rules.max_entry_price,
        });
    }
    if metrics.success_prob <= rules.min_success_prob {
        reasons.push(Rejection::SuccessProbTooLow {
            success_prob: metrics.success_prob,
            min: rules.min_success_prob,
        });
    }
    if metrics.edge_ratio < rules.min_edge_ratio {
        reasons.push(Rejection::EdgeBelowMin {
            edge_ratio: metrics.edge_ratio,
            min: rules.min_edge_ratio,
        });
    }

    if reasons.is_empty() {
        Verdict::Accepted {
            ev_pct: metrics.ev_pct,
        }
    } else {
        Verdict::Rejected { reasons }
    }
}

/// A scored candidate trade. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub side: Side,
    pub bid: f64,
    /// Model probability of the YES outcome, as a fraction.
    pub probability: f64,
    pub metrics: OperationMetrics,
    pub verdict: Verdict,
}

impl Operation {
    #[must_use]
    pub const fn is_qualified(&self) -> bool {
        self.verdict.is_qualified()
    }
}

/// Scores buying `side` at `bid` given the model YES probability.
#[must_use]
pub fn evaluate_operation(
    probability: f64,
    bid: f64,
    side: Side,
    rules: &QualificationConfig,
) -> Operation {
    let metrics = OperationMetrics::compute(probability, bid, side);
    let verdict = qualify(&metrics, rules);
    Operation {
        side,
        bid,
        probability: normalize_probability(probability),
        metrics,
        verdict,
    }
}

/// Candidate operations for one contract: BUY_YES when a YES bid is quoted,
/// BUY_NO when a NO bid is quoted.
///
/// A missing or zero model probability yields no candidates.
#[must_use]
pub fn operations_for_contract(
    probability: Option<f64>,
    yes_bid: Option<f64>,
    no_bid: Option<f64>,
    rules: &QualificationConfig,
) -> Vec<Operation> {
    let Some(probability) = probability.filter(|p| *p > 0.0) else {
        return Vec::new();
    };

    [(Side::BuyYes, yes_bid), (Side::BuyNo, no_bid)]
        .into_iter()
        .filter_map(|(side, bid)| {
            bid.filter(|b| *b > 0.0)
                .map(|b| evaluate_operation(probability, b, side, rules))
        })
        .collect()
}

/// Qualified before rejected, then by EV% descending.
#[must_use]
pub fn compare_operations(a: &Operation, b: &Operation) -> Ordering {
    b.is_qualified()
        .cmp(&a.is_qualified())
        .then_with(|| b.metrics.ev_pct.total_cmp(&a.metrics.ev_pct))
}

pub fn rank_operations(operations: &mut [Operation]) {
    operations.sort_by(compare_operations);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> QualificationConfig {
        QualificationConfig::default()
    }

    #[test]
    fn high_probability_cheap_premium_is_accepted() {
        let op = evaluate_operation(0.97, 0.95, Side::BuyYes, &rules());
        let m = op.metrics;
        assert!((m.premium - 0.05).abs() < 1e-9);
        assert!((m.loss_prob - 0.03).abs() < 1e-9);
        assert!((m.edge_ratio - 5.0 / 3.0).abs() < 1e-6);
        assert!((m.ev - 0.02).abs() < 1e-9);
        assert!((m.ev_pct - 0.021_052_6).abs() < 1e-6);
        assert!(op.is_qualified());
        assert_eq!(op.verdict.to_string(), "ACCEPTED (EV: 2.1%)");
    }

    #[test]
    fn percentage_input_is_normalized() {
        let a = evaluate_operation(97.0, 0.95, Side::BuyYes, &rules());
        let b = evaluate_operation(0.97, 0.95, Side::BuyYes, &rules());
        assert_eq!(a.metrics, b.metrics);
        assert!((a.probability - 0.97).abs() < 1e-12);
    }

    #[test]
    fn small_loss_probability_dominates_edge() {
        let op = evaluate_operation(0.97, 0.40, Side::BuyYes, &rules());
        assert!((op.metrics.edge_ratio - 20.0).abs() < 1e-6);
        assert!(op.is_qualified());
    }

    #[test]
    fn thin_edge_is_rejected() {
        let op = evaluate_operation(0.80, 0.92, Side::BuyYes, &rules());
        assert!((op.metrics.edge_ratio - 0.4).abs() < 1e-9);
        assert!(!op.is_qualified());
        assert_eq!(op.verdict.to_string(), "REJECTED EDGE=0.40x<1.5x");
    }

    #[test]
    fn buy_no_uses_complement() {
        let op = evaluate_operation(0.10, 0.80, Side::BuyNo, &rules());
        assert!((op.metrics.success_prob - 0.90).abs() < 1e-12);
        assert!((op.metrics.loss_prob - 0.10).abs() < 1e-12);
        assert!((op.metrics.edge_ratio - 2.0).abs() < 1e-9);
        assert!(op.is_qualified());
    }

    #[test]
    fn every_failing_criterion_is_recorded() {
        let op = evaluate_operation(0.01, 0.995, Side::BuyYes, &rules());
        match &op.verdict {
            Verdict::Rejected { reasons } => {
                assert_eq!(reasons.len(), 3);
                assert!(matches!(reasons[0], Rejection::BidAboveMax { .. }));
                assert!(matches!(reasons[1], Rejection::SuccessProbTooLow { .. }));
                assert!(matches!(reasons[2], Rejection::EdgeBelowMin { .. }));
            }
            Verdict::Accepted { .. } => panic!("expected rejection"),
        }
        assert_eq!(
            op.verdict.to_string(),
            "REJECTED BID>98.9c | P.SUC<=1.5% | EDGE=0.01x<1.5x"
        );
    }

    #[test]
    fn certain_outcome_has_infinite_edge() {
        let op = evaluate_operation(1.0, 0.50, Side::BuyYes, &rules());
        assert!(op.metrics.edge_ratio.is_infinite());
        assert!(op.is_qualified());
    }

    #[test]
    fn zero_bid_has_zero_ev_pct() {
        let m = OperationMetrics::compute(0.5, 0.0, Side::BuyYes);
        assert_eq!(m.ev_pct, 0.0);
    }

    #[test]
    fn contract_candidates_follow_quoted_bids() {
        let ops = operations_for_contract(Some(0.6), Some(0.55), None, &rules());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].side, Side::BuyYes);

        let ops = operations_for_contract(Some(0.6), Some(0.55), Some(0.40), &rules());
        assert_eq!(ops.len(), 2);

        assert!(operations_for_contract(None, Some(0.5), Some(0.5), &rules()).is_empty());
        assert!(operations_for_contract(Some(0.0), Some(0.5), Some(0.5), &rules()).is_empty());
        assert!(operations_for_contract(Some(0.5), Some(0.0), None, &rules()).is_empty());
    }

    #[test]
    fn ranking_puts_qualified_first_then_ev() {
        let mut ops = vec![
            evaluate_operation(0.80, 0.92, Side::BuyYes, &rules()),
            evaluate_operation(0.97, 0.95, Side::BuyYes, &rules()),
            evaluate_operation(0.97, 0.40, Side::BuyYes, &rules()),
        ];
        rank_operations(&mut ops);
        assert!(ops[0].is_qualified() && ops[1].is_qualified());
        assert!(ops[0].metrics.ev_pct > ops[1].metrics.ev_pct);
        assert!(!ops[2].is_qualified());
    }

    #[test]
    fn side_parsing() {
        assert_eq!("yes".parse::<Side>().unwrap(), Side::BuyYes);
        assert_eq!("BUY_NO".parse::<Side>().unwrap(), Side::BuyNo);
        assert_eq!("buy-yes".parse::<Side>().unwrap(), Side::BuyYes);
        assert!("maybe".parse::<Side>().is_err());
        assert_eq!(serde_json::to_string(&Side::BuyYes).unwrap(), "\"BUY_YES\"");
    }
}
