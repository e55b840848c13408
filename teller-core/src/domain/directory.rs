//! Customer and account lookup
//!
//! Linear scans, first match wins. The customer list is small enough that
//! no index is kept.

use super::account::Account;
use super::customer::Customer;

pub fn find_customer<'a>(customers: &'a [Customer], tax_id: &str) -> Option<&'a Customer> {
    customers.iter().find(|c| c.tax_id() == tax_id)
}

pub fn find_customer_mut<'a>(customers: &'a mut [Customer], tax_id: &str) -> Option<&'a mut Customer> {
    customers.iter_mut().find(|c| c.tax_id() == tax_id)
}

pub fn find_account(customer: &Customer, number: u32) -> Option<&Account> {
    customer.account(number)
}
