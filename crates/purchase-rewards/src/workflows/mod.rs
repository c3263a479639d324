pub mod discounts;
