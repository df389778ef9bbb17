use super::node::{Exponent, Function, FunctionKind};
use std::fmt::{self, Write};

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        format_node(self, &mut out)?;
        f.write_str(&out)
    }
}

fn format_node(node: &Function, out: &mut String) -> fmt::Result {
    match node.kind() {
        FunctionKind::Constant(c) => write!(out, "{}", c),
        FunctionKind::ExponentialSigma { lambda } => write!(out, "Exp(λ={})", lambda),
        FunctionKind::EbbSigma { decay, prefactor } => write!(out, "EBB(decay={}, prefactor={})", decay, prefactor),
        FunctionKind::StationaryTbSigma { bucket, max_theta } => {
            if max_theta.is_finite() {
                write!(out, "StatTB(bucket={}, θ*={})", bucket, max_theta)
            } else {
                write!(out, "StatTB(bucket={})", bucket)
            }
        }
        FunctionKind::PoissonRho { packet, mu } => {
            write!(out, "Poisson(μ={}, ", mu)?;
            format_node(packet, out)?;
            out.write_char(')')
        }
        FunctionKind::Additive { left, right, holder } => binary(left, right, *holder, " + ", out),
        FunctionKind::Maximum { left, right, holder } => {
            out.write_str("max")?;
            binary(left, right, *holder, ", ", out)
        }
        FunctionKind::B { inner } => {
            out.write_str("B(")?;
            format_node(inner, out)?;
            out.write_char(')')
        }
        FunctionKind::Scaled { inner, holder, exponent } => {
            out.write_char('(')?;
            format_node(inner, out)?;
            match exponent {
                Exponent::P => write!(out, ")/p{}", holder),
                Exponent::Q => write!(out, ")/q{}", holder),
            }
        }
        FunctionKind::Minus { inner } => {
            out.write_str("-(")?;
            format_node(inner, out)?;
            out.write_char(')')
        }
        FunctionKind::NewParameter { holder } => write!(out, "x{}", holder),
    }
}

fn binary(
    left: &Function,
    right: &Function,
    holder: Option<crate::holder::HolderId>,
    sep: &str,
    out: &mut String,
) -> fmt::Result {
    out.write_char('(')?;
    format_node(left, out)?;
    if let Some(h) = holder { write!(out, "/p{}", h)?; }
    out.write_str(sep)?;
    format_node(right, out)?;
    if let Some(h) = holder { write!(out, "/q{}", h)?; }
    out.write_char(')')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holder::HolderId;

    #[test]
    fn test_format_nested_expression() {
        let sigma = Function::add_dependent(
            Function::exponential_sigma(2.0).unwrap(),
            Function::zero(),
            HolderId(3),
        );
        let rate = Function::minus(Function::constant(8.0).unwrap());
        let f = Function::add(sigma, Function::b(rate));
        assert_eq!(f.to_string(), "((Exp(λ=2)/p3 + 0/q3) + B(-(8)))");
    }

    #[test]
    fn test_format_leaves() {
        assert_eq!(Function::stationary_tb_sigma(1.5).unwrap().to_string(), "StatTB(bucket=1.5)");
        assert_eq!(Function::new_parameter(HolderId(0)).to_string(), "x0");
        let m = Function::max(Function::zero(), Function::constant(1.0).unwrap());
        assert_eq!(m.to_string(), "max(0, 1)");
        let s = Function::scaled(Function::constant(2.0).unwrap(), HolderId(1), Exponent::Q);
        assert_eq!(s.to_string(), "(2)/q1");
    }
}
