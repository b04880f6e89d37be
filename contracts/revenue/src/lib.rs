#![no_std]

mod errors;
mod revenue;
mod types;


pub use crate::errors::RevenueError;
pub use crate::revenue::{RevenueRouter, RevenueRouterClient};
pub use crate::types::{
    Cohort, CohortParams, CohortShare, DataKey, DistributionBreakdown, RouterConfig,
};
