//! Closed-form arrival and service types.
use super::flow::{Arrival, Service};
use crate::error::{AnalysisError, Result};
use crate::function::Function;

pub struct ArrivalFactory;

impl ArrivalFactory {
    /// Deterministic traffic: exactly `rate` per slot.
    pub fn constant_rate(rate: f64) -> Result<Arrival> {
        require_non_negative("rate", rate)?;
        Ok(Arrival::new(Function::zero(), Function::constant(rate)?))
    }

    /// One exponentially distributed increment with parameter `lambda` per slot.
    pub fn exponential(lambda: f64) -> Result<Arrival> {
        Ok(Arrival::new(Function::zero(), Function::exponential_sigma(lambda)?))
    }

    /// Compound Poisson traffic with `mu` packets per slot. `packet` is the
    /// packet-size term (log-MGF over theta), e.g. a constant size.
    pub fn poisson(mu: f64, packet: Function) -> Result<Arrival> {
        Ok(Arrival::new(Function::zero(), Function::poisson_rho(packet, mu)?))
    }

    pub fn poisson_constant_size(mu: f64, size: f64) -> Result<Arrival> {
        require_non_negative("packet size", size)?;
        Self::poisson(mu, Function::constant(size)?)
    }

    pub fn poisson_exponential_size(mu: f64, lambda: f64) -> Result<Arrival> {
        Self::poisson(mu, Function::exponential_sigma(lambda)?)
    }

    /// Exponentially bounded burstiness around a mean `rate`.
    pub fn ebb(rate: f64, decay: f64, prefactor: f64) -> Result<Arrival> {
        require_non_negative("rate", rate)?;
        Ok(Arrival::new(Function::ebb_sigma(decay, prefactor)?, Function::constant(rate)?))
    }

    pub fn stationary_token_bucket(rate: f64, bucket: f64, max_theta: f64) -> Result<Arrival> {
        require_non_negative("rate", rate)?;
        Ok(Arrival::new(
            Function::stationary_tb_sigma_bounded(bucket, max_theta)?,
            Function::constant(rate)?,
        ))
    }
}

pub struct ServiceFactory;

impl ServiceFactory {
    /// A work-conserving server of capacity `rate` per slot.
    pub fn constant_rate(rate: f64) -> Result<Service> {
        require_positive("rate", rate)?;
        Ok(Service::new(Function::zero(), Function::minus(Function::constant(rate)?)))
    }

    /// Service guaranteeing `rate` up to an EBB-distributed deficit.
    pub fn ebb(rate: f64, decay: f64, prefactor: f64) -> Result<Service> {
        require_positive("rate", rate)?;
        Ok(Service::new(
            Function::ebb_sigma(decay, prefactor)?,
            Function::minus(Function::constant(rate)?),
        ))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::BadInitialization(format!("{} must be non-negative, got {}", name, value)))
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::BadInitialization(format!("{} must be positive, got {}", name, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holder::HolderMap;
    use rstest::rstest;

    #[test]
    fn test_constant_rate_arrival() {
        let a = ArrivalFactory::constant_rate(5.0).unwrap();
        assert_eq!(a.sigma_rho(0.3, &HolderMap::new()).unwrap(), (0.0, 5.0));
        assert!(a.dependencies().is_empty());
    }

    #[test]
    fn test_constant_rate_service_is_negated() {
        let s = ServiceFactory::constant_rate(8.0).unwrap();
        let rho = s.rho().evaluate(0.3, &HolderMap::new()).unwrap();
        assert_eq!(rho, -8.0);
    }

    #[test]
    fn test_exponential_arrival_theta_star() {
        let a = ArrivalFactory::exponential(1.5).unwrap();
        assert_eq!(a.max_theta(), 1.5);
    }

    #[test]
    fn test_ebb_arrival_bound_follows_decay() {
        let a = ArrivalFactory::ebb(2.0, 0.8, 1.0).unwrap();
        assert_eq!(a.max_theta(), 0.8);
        let t = ArrivalFactory::stationary_token_bucket(1.0, 3.0, f64::INFINITY).unwrap();
        assert_eq!(t.max_theta(), f64::INFINITY);
    }

    #[test]
    fn test_poisson_exponential_size_inherits_packet_bound() {
        let a = ArrivalFactory::poisson_exponential_size(0.4, 2.0).unwrap();
        assert_eq!(a.max_theta(), 2.0);
        let c = ArrivalFactory::poisson_constant_size(0.4, 1.0).unwrap();
        assert!(c.sigma_rho(0.5, &HolderMap::new()).unwrap().1 > 0.4);
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn test_rejects_negative_arrival_rate(#[case] rate: f64) {
        assert!(matches!(
            ArrivalFactory::constant_rate(rate),
            Err(AnalysisError::BadInitialization(_))
        ));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-4.0)]
    fn test_rejects_non_positive_service_rate(#[case] rate: f64) {
        assert!(ServiceFactory::constant_rate(rate).is_err());
        assert!(ServiceFactory::ebb(rate, 1.0, 1.0).is_err());
    }
}
