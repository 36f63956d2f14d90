use crate::domain::{
    error::DomainError,
    registry::{GeneratorDefinition, Strategy},
};

/// Opt-in check for generators that execute third-party template logic.
pub struct TrustGate;

impl TrustGate {
    /// Rejects an external template generator unless it is marked trusted in
    /// the registry or the caller passed the trust flag for this invocation.
    /// Every other strategy passes.
    pub fn check(generator: &GeneratorDefinition, trust_flag: bool) -> Result<(), DomainError> {
        match &generator.strategy {
            Strategy::ExternalTemplate(ext) if !ext.trusted && !trust_flag => {
                Err(DomainError::UntrustedGenerator {
                    generator: generator.name.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}
