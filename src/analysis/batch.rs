use super::request::{analyze, BoundReport, BoundRequest};
use crate::config::SearchConfig;
use crate::error::Result;
use crate::holder::HolderRegistry;
use crate::model::Arrival;
use rayon::prelude::*;

/// A self-contained request: the arrival expression together with the
/// registry that allocated its Hölder pairs.
#[derive(Debug, Clone)]
pub struct BoundJob {
    pub arrival: Arrival,
    pub registry: HolderRegistry,
    pub request: BoundRequest,
}

/// Evaluates independent jobs in parallel. Each job searches on its own
/// snapshot; results come back in input order.
pub fn compute_bounds(jobs: &[BoundJob], config: &SearchConfig) -> Vec<Result<BoundReport>> {
    jobs.par_iter()
        .map(|job| analyze(&job.arrival, &job.registry, &job.request, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::BoundType;
    use crate::model::{net_envelope, output, ArrivalFactory, ServiceFactory};

    fn job(lambda: f64, capacity: f64, bound_type: BoundType) -> BoundJob {
        let mut registry = HolderRegistry::new();
        let traffic = ArrivalFactory::exponential(lambda).unwrap();
        let server = ServiceFactory::constant_rate(capacity).unwrap();
        let arrival = match bound_type {
            BoundType::Delay | BoundType::InverseDelay => net_envelope(&traffic, &server, &mut registry),
            _ => output(&traffic, &server, &mut registry),
        };
        BoundJob { arrival, registry, request: BoundRequest::new(bound_type, 1e-3) }
    }

    #[test]
    fn test_batch_matches_sequential_results() {
        let jobs = vec![
            job(2.0, 1.0, BoundType::InverseBacklog),
            job(0.5, 1.0, BoundType::Backlog),
            job(2.0, 1.0, BoundType::Output),
            job(4.0, 1.0, BoundType::Delay),
        ];
        let config = SearchConfig::default();
        let results = compute_bounds(&jobs, &config);
        assert_eq!(results.len(), jobs.len());

        for (job, result) in jobs.iter().zip(&results) {
            let sequential = analyze(&job.arrival, &job.registry, &job.request, &config);
            match (result, &sequential) {
                (Ok(a), Ok(b)) if a.value.is_nan() => assert!(b.value.is_nan()),
                (Ok(a), Ok(b)) => assert_eq!(a, b),
                (Err(a), Err(b)) => assert_eq!(a, b),
                _ => panic!("batch and sequential disagree: {:?} vs {:?}", result, sequential),
            }
        }
        assert!(results[1].is_err());
        assert!(results[3].as_ref().is_ok_and(|r| r.value.is_finite() && r.value > 0.0));
    }
}
