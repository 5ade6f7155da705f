// Two tiers: public handlers need no session; protected handlers resolve a
// TenantContext before doing anything else.
pub mod protected;
pub mod public;
