pub mod accounts;
pub mod financials;

pub use accounts::AccountService;
pub use financials::{
    ApartmentFinancials, FinancialError, FinancialService, KpiSummary, PortfolioFinancials, Recovery,
};
