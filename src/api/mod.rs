pub mod extract;
pub mod params;

pub use extract::ApiJson;
pub use params::{
    amount, check_month, non_negative, optional_amount, parse_date, parse_id, parse_month, parse_year, required,
};
