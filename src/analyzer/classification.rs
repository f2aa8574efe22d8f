use crate::config::ScanThresholds;
use crate::model::IndicatorSnapshot;
use crate::utils::round2;

/// Composite ALL_STOCKS verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotOk,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::NotOk => "NOT OK",
        }
    }
}

/// Tier decision for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub snapshot: IndicatorSnapshot,
    pub rel_return: f64,
    /// EMA structure condition ("C0").
    pub structure_ok: bool,
    pub volume_ok: bool,
    pub base_ok: bool,
    pub pullback_ok: bool,
}

impl Classification {
    pub fn evaluate(
        snapshot: IndicatorSnapshot,
        benchmark_weekly_return_pct: f64,
        thresholds: &ScanThresholds,
    ) -> Self {
        let rel_return = round2(snapshot.weekly_return_pct - benchmark_weekly_return_pct);
        let structure_ok = ema_structure_ok(snapshot.ema20, snapshot.ema50, snapshot.ema200);
        let volume_ok = snapshot.volume >= thresholds.min_volume;

        let rsi_ok = snapshot
            .rsi14
            .is_some_and(|rsi| thresholds.rsi_min < rsi && rsi < thresholds.rsi_max);
        let rel_ok = thresholds.rel_return_min < rel_return && rel_return < thresholds.rel_return_max;

        let base_ok = snapshot.close > snapshot.ema20
            && snapshot.close > snapshot.ema50
            && volume_ok
            && rsi_ok
            && rel_ok;

        let pullback_ok = snapshot.low <= snapshot.ema20 || snapshot.low <= snapshot.ema50;

        Self {
            snapshot,
            rel_return,
            structure_ok,
            volume_ok,
            base_ok,
            pullback_ok,
        }
    }

    pub fn in_without_c0(&self) -> bool {
        self.base_ok
    }

    pub fn in_with_c0(&self) -> bool {
        self.base_ok && self.structure_ok
    }

    pub fn in_with_c0_pullback(&self) -> bool {
        self.base_ok && self.structure_ok && self.pullback_ok
    }

    pub fn status(&self) -> Status {
        if self.in_with_c0_pullback() {
            Status::Ok
        } else {
            Status::NotOk
        }
    }
}

/// Any of the three accepted EMA orderings. Equal EMAs match none of them.
pub fn ema_structure_ok(ema20: f64, ema50: f64, ema200: f64) -> bool {
    (ema20 > ema50 && ema50 < ema200)
        || (ema20 < ema50 && ema50 > ema200)
        || (ema20 > ema50 && ema50 > ema200)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> ScanThresholds {
        ScanThresholds {
            rel_return_min: 0.5,
            rel_return_max: 10.0,
            rsi_min: 30.0,
            rsi_max: 75.0,
            min_volume: 300_000,
        }
    }

    fn snapshot(low: f64, volume: u64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            symbol: "SYN.NS".into(),
            close: 100.0,
            low,
            ema20: 95.0,
            ema50: 90.0,
            ema200: 85.0,
            rsi14: Some(50.0),
            volume,
            weekly_return_pct: 3.0,
        }
    }

    #[test]
    fn strong_symbol_with_pullback_reaches_every_tier() {
        let c = Classification::evaluate(snapshot(94.0, 500_000), 1.0, &thresholds());
        assert_eq!(c.rel_return, 2.0);
        assert!(c.structure_ok && c.base_ok && c.pullback_ok);
        assert!(c.in_without_c0() && c.in_with_c0() && c.in_with_c0_pullback());
        assert_eq!(c.status(), Status::Ok);
    }

    #[test]
    fn strong_symbol_without_pullback_stops_at_with_c0() {
        let c = Classification::evaluate(snapshot(97.0, 500_000), 1.0, &thresholds());
        assert!(c.in_without_c0() && c.in_with_c0());
        assert!(!c.in_with_c0_pullback());
        assert_eq!(c.status(), Status::NotOk);
    }

    #[test]
    fn low_volume_fails_base() {
        let c = Classification::evaluate(snapshot(94.0, 100_000), 1.0, &thresholds());
        assert!(!c.volume_ok);
        assert!(!c.base_ok);
        assert!(!c.in_without_c0() && !c.in_with_c0() && !c.in_with_c0_pullback());
        assert_eq!(c.status().label(), "NOT OK");
    }

    #[test]
    fn bounds_are_strict() {
        let mut snap = snapshot(94.0, 300_000);
        snap.rsi14 = Some(75.0);
        let c = Classification::evaluate(snap.clone(), 1.0, &thresholds());
        assert!(c.volume_ok);
        assert!(!c.base_ok);

        snap.rsi14 = Some(50.0);
        // rel_return == 0.5 sits on the lower bound
        let c = Classification::evaluate(snap.clone(), 2.5, &thresholds());
        assert_eq!(c.rel_return, 0.5);
        assert!(!c.base_ok);

        snap.rsi14 = None;
        let c = Classification::evaluate(snap, 1.0, &thresholds());
        assert!(!c.base_ok);
    }

    #[test]
    fn ema_ties_fail_structure() {
        assert!(!ema_structure_ok(90.0, 90.0, 85.0));
        assert!(!ema_structure_ok(95.0, 90.0, 90.0));
        assert!(!ema_structure_ok(80.0, 85.0, 90.0));
        assert!(ema_structure_ok(95.0, 90.0, 85.0));
        assert!(ema_structure_ok(95.0, 90.0, 99.0));
        assert!(ema_structure_ok(85.0, 90.0, 80.0));
    }

    #[test]
    fn classification_is_idempotent() {
        let snap = snapshot(94.0, 500_000);
        let a = Classification::evaluate(snap.clone(), 1.37, &thresholds());
        let b = Classification::evaluate(snap, 1.37, &thresholds());
        assert_eq!(a, b);
    }
}
