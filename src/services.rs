pub mod auth;
pub mod dashboard_service;
pub mod dispute_service;
pub mod fee_calculator;
pub mod finance_service;
pub mod onboarding_service;
pub mod order_service;
pub mod storage;
