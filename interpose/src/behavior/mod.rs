//! The behavior chain and the policy injection behavior.

mod chain;
mod policy_injection;

pub use chain::EffectiveBehaviorChain;
pub use policy_injection::PolicyInjectionBehavior;
