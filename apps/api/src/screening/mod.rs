pub mod decision;
pub mod experience;
pub mod explanation;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod skill_match;
