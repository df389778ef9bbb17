//! compose.rs
//! Dependency-aware composition of arrivals and services.
//!
//! Every operator checks whether its operands share a flow or a server. Shared
//! operands are statistically dependent, so their MGFs may not be multiplied
//! directly; instead a fresh Hölder pair splits the sum as `f/p + g/q`.
//! Either way the result records the union of both dependency sets.

use super::flow::{Arrival, Service};
use crate::function::{Exponent, Function};
use crate::holder::{HolderId, HolderRegistry};
use tracing::debug;

/// Aggregates two arrivals sharing a link.
pub fn multiplex(a1: &Arrival, a2: &Arrival, registry: &mut HolderRegistry) -> Arrival {
    let deps = a1.dependencies().union(a2.dependencies());

    if a1.dependencies().overlaps(a2.dependencies()) {
        let h = registry.allocate();
        debug!(holder = %h, "multiplex: dependent operands, splitting with Hölder pair");
        let sigma = Function::add_dependent(a1.sigma().clone(), a2.sigma().clone(), h);
        let rho = Function::add_dependent(a1.rho().clone(), a2.rho().clone(), h);
        Arrival::with_dependencies(sigma, rho, deps)
    } else {
        debug!("multiplex: independent operands");
        let sigma = Function::add(a1.sigma().clone(), a2.sigma().clone());
        let rho = Function::add(a1.rho().clone(), a2.rho().clone());
        Arrival::with_dependencies(sigma, rho, deps)
    }
}

/// The departure process of `arrival` after crossing `service`.
pub fn output(arrival: &Arrival, service: &Service, registry: &mut HolderRegistry) -> Arrival {
    let deps = arrival.dependencies().union(service.dependencies());

    if arrival.dependencies().overlaps(service.dependencies()) {
        let h = registry.allocate();
        debug!(holder = %h, "output: arrival and service are dependent");
        let sigma = Function::add(
            Function::add_dependent(arrival.sigma().clone(), service.sigma().clone(), h),
            Function::b(Function::add_dependent(arrival.rho().clone(), service.rho().clone(), h)),
        );
        let rho = Function::scaled(arrival.rho().clone(), h, Exponent::Q);
        Arrival::with_dependencies(sigma, rho, deps)
    } else {
        debug!("output: arrival and service are independent");
        let sigma = Function::add(
            Function::add(arrival.sigma().clone(), service.sigma().clone()),
            Function::b(Function::add(arrival.rho().clone(), service.rho().clone())),
        );
        // The departure rate equals the arrival rate; only sigma absorbs the server.
        Arrival::with_dependencies(sigma, arrival.rho().clone(), deps)
    }
}

/// The service left over for other traffic once `arrival` has been served.
pub fn leftover(service: &Service, arrival: &Arrival, registry: &mut HolderRegistry) -> Service {
    let deps = service.dependencies().union(arrival.dependencies());

    if service.dependencies().overlaps(arrival.dependencies()) {
        let h = registry.allocate();
        debug!(holder = %h, "leftover: service and cross traffic are dependent");
        let sigma = Function::add_dependent(service.sigma().clone(), arrival.sigma().clone(), h);
        let rho = Function::add_dependent(service.rho().clone(), arrival.rho().clone(), h);
        Service::with_dependencies(sigma, rho, deps)
    } else {
        debug!("leftover: service and cross traffic are independent");
        let sigma = Function::add(service.sigma().clone(), arrival.sigma().clone());
        let rho = Function::add(service.rho().clone(), arrival.rho().clone());
        Service::with_dependencies(sigma, rho, deps)
    }
}

/// The net envelope of `arrival` offered to `service`: `σ_A + σ_S` and
/// `ρ_A + ρ_S`. A stable system has a negative net rate, which is what the
/// delay bounds are evaluated over.
pub fn net_envelope(arrival: &Arrival, service: &Service, registry: &mut HolderRegistry) -> Arrival {
    let deps = arrival.dependencies().union(service.dependencies());

    if arrival.dependencies().overlaps(service.dependencies()) {
        let h = registry.allocate();
        debug!(holder = %h, "net envelope: arrival and service are dependent");
        let sigma = Function::add_dependent(arrival.sigma().clone(), service.sigma().clone(), h);
        let rho = Function::add_dependent(arrival.rho().clone(), service.rho().clone(), h);
        Arrival::with_dependencies(sigma, rho, deps)
    } else {
        debug!("net envelope: arrival and service are independent");
        let sigma = Function::add(arrival.sigma().clone(), service.sigma().clone());
        let rho = Function::add(arrival.rho().clone(), service.rho().clone());
        Arrival::with_dependencies(sigma, rho, deps)
    }
}

/// Tandem of two servers (min-plus convolution).
///
/// The result runs at the slower of the two rates; the rate gap feeds a
/// geometric-sum term, so two servers of identical rate surface as a
/// `ServerOverload` at evaluation.
pub fn convolve(s1: &Service, s2: &Service, registry: &mut HolderRegistry) -> Service {
    let deps = s1.dependencies().union(s2.dependencies());

    let holder = if s1.dependencies().overlaps(s2.dependencies()) {
        let h = registry.allocate();
        debug!(holder = %h, "convolve: dependent servers");
        Some(h)
    } else {
        debug!("convolve: independent servers");
        None
    };

    let (sigma1, rho1) = weight(s1, holder, Exponent::P);
    let (sigma2, rho2) = weight(s2, holder, Exponent::Q);

    // rho1 + rho2 - 2 max(rho1, rho2) == -|rho1 - rho2|
    let slower = Function::max(rho1.clone(), rho2.clone());
    let gap = Function::add(
        Function::add(rho1, rho2),
        Function::minus(Function::add(slower.clone(), slower.clone())),
    );
    let sigma = Function::add(Function::add(sigma1, sigma2), Function::b(gap));
    Service::with_dependencies(sigma, slower, deps)
}

fn weight(service: &Service, holder: Option<HolderId>, exponent: Exponent) -> (Function, Function) {
    match holder {
        Some(h) => (
            Function::scaled(service.sigma().clone(), h, exponent),
            Function::scaled(service.rho().clone(), h, exponent),
        ),
        None => (service.sigma().clone(), service.rho().clone()),
    }
}
