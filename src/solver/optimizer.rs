//! Local coordinate search over theta and the free Hölder exponents.
use super::problem::{Move, Optimum, Scorer, SearchPoint, SearchStep};
use crate::bound::Optimizable;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::holder::{Holder, HolderMap};
use smallvec::SmallVec;
use tracing::{debug, info, warn};

/// Deterministic greedy descent on a fixed grid.
///
/// Each iteration scans the single-coordinate neighbors of the current point
/// and commits the best strictly improving one (earlier neighbors win ties).
/// The search stops at the first point with no improving neighbor, so the
/// result is a local optimum only.
#[derive(Debug, Clone)]
pub struct SimpleGradient {
    config: SearchConfig,
}

impl SimpleGradient {
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SearchConfig { &self.config }

    pub fn minimize<O: Optimizable>(&self, bound: &mut O) -> Result<Optimum> {
        bound.prepare()?;
        let bound = &*bound;
        let max_theta = bound.maximum_theta();
        let mut scorer = Scorer::default();

        let mut current = SearchPoint {
            theta: self.config.theta_granularity,
            params: bound
                .holder_parameters()
                .keys()
                .map(|&id| (id, Holder::symmetric(id)))
                .collect(),
        };
        let mut value = scorer.score(bound.evaluate(current.theta, &current.params))?;
        let mut trace = vec![SearchStep { iteration: 0, theta: current.theta, value }];
        let mut iterations = 0;

        loop {
            if iterations >= self.config.max_iterations {
                warn!(iterations, theta = current.theta, value, "iteration budget exhausted");
                break;
            }

            let mut best: Option<(f64, SearchPoint)> = None;
            for mv in self.neighborhood(&current, max_theta) {
                let Some(trial) = self.apply(&current, mv) else { continue };
                let trial_value = scorer.score(bound.evaluate(trial.theta, &trial.params))?;
                let threshold = best.as_ref().map_or(value, |(v, _)| *v);
                if trial_value < threshold {
                    best = Some((trial_value, trial));
                }
            }

            match best {
                Some((next_value, next)) => {
                    iterations += 1;
                    debug!(iteration = iterations, theta = next.theta, value = next_value, "step");
                    current = next;
                    value = next_value;
                    trace.push(SearchStep { iteration: iterations, theta: current.theta, value });
                }
                None => break,
            }
        }

        if !value.is_finite() {
            return Err(scorer.exhausted());
        }

        info!(value, theta = current.theta, iterations, "bound optimized");
        Ok(Optimum {
            value,
            theta: current.theta,
            holders: current.params,
            iterations,
            trace,
        })
    }

    /// Scan order: theta down, theta up, then each pair by ascending id.
    fn neighborhood(&self, point: &SearchPoint, max_theta: f64) -> SmallVec<[Move; 8]> {
        let step = self.config.theta_granularity;
        let mut moves = SmallVec::new();

        let down = point.theta - step;
        if down > 0.0 && down < max_theta {
            moves.push(Move::ThetaDown);
        }
        let up = point.theta + step;
        if up > 0.0 && up < max_theta {
            moves.push(Move::ThetaUp);
        }
        for &id in point.params.keys() {
            moves.push(Move::TowardSmallerP(id));
            moves.push(Move::TowardLargerP(id));
        }
        moves
    }

    /// Builds the trial point for `mv`, or `None` when the move would leave
    /// the valid region of a Hölder pair.
    fn apply(&self, point: &SearchPoint, mv: Move) -> Option<SearchPoint> {
        let step = self.config.theta_granularity;
        let h_step = self.config.holder_granularity;

        match mv {
            Move::ThetaDown => Some(SearchPoint { theta: point.theta - step, params: point.params.clone() }),
            Move::ThetaUp => Some(SearchPoint { theta: point.theta + step, params: point.params.clone() }),
            Move::TowardSmallerP(id) => {
                let h = point.params.get(&id)?;
                // Below p = 2, stepping q keeps p above 1.
                let moved = if h.p() >= 2.0 { h.with_p(h.p() - h_step) } else { h.with_q(h.q() + h_step) };
                Some(SearchPoint { theta: point.theta, params: replace(&point.params, moved.ok()?) })
            }
            Move::TowardLargerP(id) => {
                let h = point.params.get(&id)?;
                let moved = if h.q() >= 2.0 { h.with_q(h.q() - h_step) } else { h.with_p(h.p() + h_step) };
                Some(SearchPoint { theta: point.theta, params: replace(&point.params, moved.ok()?) })
            }
        }
    }
}

fn replace(params: &HolderMap, holder: Holder) -> HolderMap {
    let mut next = params.clone();
    next.insert(holder.id(), holder);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::{Bound, BoundKind};
    use crate::error::{AnalysisError, Infeasibility};
    use crate::holder::{HolderId, HolderRegistry};
    use crate::model::{net_envelope, output, ArrivalFactory, ServiceFactory};
    use rstest::rstest;

    /// `-ln(v)/θ + cθ + Σ (p - p*)^2`: convex with minimum at
    /// `θ* = sqrt(-ln(v)/c)` and `p = p*`.
    struct Synthetic {
        log_violation: f64,
        slope: f64,
        p_star: f64,
        max_theta: f64,
        params: HolderMap,
    }

    impl Synthetic {
        fn new(v: f64, slope: f64, holders: u32) -> Self {
            let params = (0..holders).map(|i| (HolderId(i), Holder::symmetric(HolderId(i)))).collect();
            Self {
                log_violation: -v.ln(),
                slope,
                p_star: 3.0,
                max_theta: f64::INFINITY,
                params,
            }
        }

        fn theta_star(&self) -> f64 { (self.log_violation / self.slope).sqrt() }
    }

    impl Optimizable for Synthetic {
        fn prepare(&mut self) -> Result<()> { Ok(()) }

        fn evaluate(&self, theta: f64, params: &HolderMap) -> Result<f64> {
            if theta >= self.max_theta {
                return Err(Infeasibility::ThetaOutOfBound { theta, max_theta: self.max_theta }.into());
            }
            let penalty: f64 = params.values().map(|h| (h.p() - self.p_star).powi(2)).sum();
            Ok(self.log_violation / theta + self.slope * theta + penalty)
        }

        fn holder_parameters(&self) -> &HolderMap { &self.params }
        fn maximum_theta(&self) -> f64 { self.max_theta }
    }

    #[rstest]
    #[case(0.01, 0.1)]
    #[case(0.05, 0.05)]
    #[case(0.002, 0.25)]
    fn test_converges_within_one_step(#[case] theta_step: f64, #[case] holder_step: f64) {
        let mut objective = Synthetic::new(1e-3, 4.0, 1);
        let start = objective.evaluate(theta_step, &objective.params.clone()).unwrap();
        let solver = SimpleGradient::new(SearchConfig::new(theta_step, holder_step).unwrap()).unwrap();
        let best = solver.minimize(&mut objective).unwrap();

        assert!((best.theta - objective.theta_star()).abs() <= theta_step + 1e-9,
            "theta {} vs {}", best.theta, objective.theta_star());
        let p = best.holders[&HolderId(0)].p();
        assert!((p - 3.0).abs() <= holder_step * 1.5, "p = {}", p);
        assert!(best.value <= start);
    }

    #[test]
    fn test_values_never_increase_along_trace() {
        let mut objective = Synthetic::new(1e-6, 2.0, 2);
        let solver = SimpleGradient::new(SearchConfig::new(0.01, 0.1).unwrap()).unwrap();
        let best = solver.minimize(&mut objective).unwrap();
        assert!(best.trace.windows(2).all(|w| w[1].value < w[0].value));
        assert_eq!(best.trace.len(), best.iterations + 1);
        assert_eq!(best.trace.last().map(|s| s.value), Some(best.value));
    }

    #[test]
    fn test_stays_below_theta_star() {
        let mut objective = Synthetic::new(1e-3, 0.01, 0);
        objective.max_theta = 0.2; // unconstrained optimum ~26
        let solver = SimpleGradient::new(SearchConfig::new(0.01, 0.1).unwrap()).unwrap();
        let best = solver.minimize(&mut objective).unwrap();
        assert!(best.theta < 0.2);
        assert!(best.theta >= 0.19 - 1e-9);
    }

    #[test]
    fn test_respects_iteration_budget() {
        let mut objective = Synthetic::new(1e-3, 4.0, 0);
        let config = SearchConfig::new(0.001, 0.1).unwrap().with_max_iterations(5);
        let best = SimpleGradient::new(config).unwrap().minimize(&mut objective).unwrap();
        assert_eq!(best.iterations, 5);
        assert!((best.theta - 0.006).abs() < 1e-12);
    }

    #[test]
    fn test_holder_moves_keep_pairs_valid() {
        // A large step cannot take p below 1: the move is skipped instead.
        let mut objective = Synthetic::new(1e-3, 4.0, 1);
        objective.p_star = 1.01;
        let solver = SimpleGradient::new(SearchConfig::new(0.05, 1.5).unwrap()).unwrap();
        let best = solver.minimize(&mut objective).unwrap();
        let h = best.holders[&HolderId(0)];
        assert!(h.p() > 1.0 && h.q() > 1.0);
        assert_eq!(h.p(), 2.0);
    }

    #[test]
    fn test_optimizes_stable_queue_backlog() {
        let mut reg = HolderRegistry::new();
        let arrival = output(
            &ArrivalFactory::exponential(2.0).unwrap(),
            &ServiceFactory::constant_rate(1.0).unwrap(),
            &mut reg,
        );
        let mut bound = Bound::new(BoundKind::InverseBacklog, arrival, 1e-3, &reg).unwrap();
        let start = bound.evaluate_at(0.01).unwrap();
        let best = SimpleGradient::new(SearchConfig::new(0.01, 0.1).unwrap())
            .unwrap()
            .minimize(&mut bound)
            .unwrap();
        assert!(best.value.is_finite() && best.value > 0.0);
        assert!(best.value < start);
        assert!(best.theta < 2.0);
    }

    #[rstest]
    #[case(2.0)]
    #[case(8.0)]
    #[case(100.0)]
    fn test_optimizes_stable_queue_delay(#[case] capacity: f64) {
        let mut reg = HolderRegistry::new();
        let net = net_envelope(
            &ArrivalFactory::exponential(4.0).unwrap(),
            &ServiceFactory::constant_rate(capacity).unwrap(),
            &mut reg,
        );
        let mut bound = Bound::new(BoundKind::Delay, net, 1e-3, &reg).unwrap();
        let start = bound.evaluate_at(0.01).unwrap();
        let best = SimpleGradient::new(SearchConfig::new(0.01, 0.1).unwrap())
            .unwrap()
            .minimize(&mut bound)
            .unwrap();
        assert!(best.value.is_finite() && best.value > 0.0);
        assert!(best.value < start);
        assert!(best.theta > 0.01 && best.theta < 4.0);
    }

    #[test]
    fn test_overloaded_system_reports_overload() {
        let mut reg = HolderRegistry::new();
        let arrival = output(
            &ArrivalFactory::constant_rate(10.0).unwrap(),
            &ServiceFactory::constant_rate(8.0).unwrap(),
            &mut reg,
        );
        let mut bound = Bound::new(BoundKind::Backlog, arrival, 1e-3, &reg).unwrap();
        let err = SimpleGradient::new(SearchConfig::default()).unwrap().minimize(&mut bound).unwrap_err();
        assert!(matches!(err, AnalysisError::Infeasible(Infeasibility::ServerOverload { .. })));
    }

    #[test]
    fn test_start_beyond_theta_star_is_theta_out_of_bound() {
        let reg = HolderRegistry::new();
        let arrival = ArrivalFactory::exponential(0.05).unwrap();
        let mut bound = Bound::new(BoundKind::Backlog, arrival, 1e-3, &reg).unwrap();
        let config = SearchConfig::new(0.1, 0.1).unwrap();
        let err = SimpleGradient::new(config).unwrap().minimize(&mut bound).unwrap_err();
        assert!(matches!(err, AnalysisError::Infeasible(Infeasibility::ThetaOutOfBound { .. })));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SearchConfig { theta_granularity: -1.0, ..SearchConfig::default() };
        assert!(SimpleGradient::new(config).is_err());
    }
}
