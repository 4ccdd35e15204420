//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod admission;

pub use admission::{
    // Components
    AdmissionServices,
    ClientLockScope,
    ClientRegistry,
    RuleResolver,
    RuleStore,
    // Errors
    AdmissionError,
    // Commands
    AddClientCommand,
    AddClientHandler,
    AdmissionConfig,
    CheckAdmissionCommand,
    CheckAdmissionHandler,
    ConfigureClientCommand,
    ConfigureClientHandler,
    ConfigureClientResult,
    DeleteRulesCommand,
    DeleteRulesHandler,
    DeleteRulesResult,
    RemoveClientCommand,
    RemoveClientHandler,
    RemoveClientResult,
    // Queries
    ListAllRulesHandler,
    ListClientRulesHandler,
    ListClientRulesQuery,
};
