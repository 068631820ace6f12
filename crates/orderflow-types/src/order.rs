//! Order domain types for the orderflow system.
//!
//! This module defines the order record tracked through fulfillment, the
//! status enumeration that drives the lifecycle state machine, and the
//! validated creation request accepted by the lifecycle engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum length of a product name.
pub const MAX_PRODUCT_NAME_LEN: usize = 100;
/// Maximum length of a delivery address.
pub const MAX_DELIVERY_ADDRESS_LEN: usize = 255;

/// Maximum monetary amount accepted for a single order (999,999.99).
pub fn max_order_amount() -> Decimal {
	Decimal::new(99_999_999, 2)
}

/// A single customer purchase request tracked through fulfillment.
///
/// An order is created by the order factory with status `New` and is mutated
/// exclusively through the lifecycle engine's transition operations. Only
/// `status` (and the bookkeeping `updated_at`) change after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
	/// Unique identifier for this order, assigned at construction.
	pub id: String,
	/// Name of the purchased product.
	pub product_name: String,
	/// Monetary value of the order.
	pub amount: Decimal,
	/// Kind of customer that placed the order.
	pub customer: CustomerType,
	/// Address the order ships to. May be empty only transiently; an empty
	/// address drives the `Error` transition when shipping is attempted.
	pub delivery_address: String,
	/// How the order is paid for.
	pub payment: PaymentMethod,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Timestamp when this order was created (Unix seconds).
	pub created_at: u64,
	/// Timestamp when this order was last updated (Unix seconds).
	pub updated_at: u64,
}

/// Kind of customer placing an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CustomerType {
	/// A private individual.
	Individual,
	/// A registered company.
	Company,
}

impl fmt::Display for CustomerType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CustomerType::Individual => write!(f, "Individual"),
			CustomerType::Company => write!(f, "Company"),
		}
	}
}

/// Payment method for an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
	/// Paid by card at creation time.
	Card,
	/// Paid in cash when the order is delivered.
	CashOnDelivery,
}

impl fmt::Display for PaymentMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PaymentMethod::Card => write!(f, "Card"),
			PaymentMethod::CashOnDelivery => write!(f, "Cash on delivery"),
		}
	}
}

/// Status of an order in the fulfillment lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
	/// Order has been created but not yet processed.
	New,
	/// Order has been accepted into the warehouse.
	InWarehouse,
	/// Order is in transit to the customer.
	InShipping,
	/// Order was returned to the customer by payment policy.
	ReturnedToCustomer,
	/// Order could not be shipped due to a missing delivery address.
	Error,
	/// Order was delivered and the record is closed.
	Closed,
	/// Order was cancelled before shipping.
	Cancelled,
}

impl OrderStatus {
	/// Returns true for statuses from which no further transition is permitted.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Closed | OrderStatus::Cancelled)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::New => write!(f, "New"),
			OrderStatus::InWarehouse => write!(f, "In warehouse"),
			OrderStatus::InShipping => write!(f, "In shipping"),
			OrderStatus::ReturnedToCustomer => write!(f, "Returned to customer"),
			OrderStatus::Error => write!(f, "Error"),
			OrderStatus::Closed => write!(f, "Closed"),
			OrderStatus::Cancelled => write!(f, "Cancelled"),
		}
	}
}

/// Raw input for creating a new order.
///
/// The request is validated before any construction or persistence happens;
/// each violated rule is reported as a distinct error variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
	/// Name of the purchased product.
	pub product_name: String,
	/// Monetary value of the order.
	pub amount: Decimal,
	/// Kind of customer placing the order.
	pub customer: CustomerType,
	/// Address the order ships to.
	pub delivery_address: String,
	/// How the order is paid for.
	pub payment: PaymentMethod,
}

/// Errors reported when an order creation request violates a validation rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderValidationError {
	/// The product name is empty or whitespace-only.
	#[error("Product name is required")]
	ProductNameRequired,
	/// The product name exceeds the maximum length.
	#[error("Product name cannot exceed {MAX_PRODUCT_NAME_LEN} characters")]
	ProductNameTooLong,
	/// The amount is zero or negative.
	#[error("Amount must be greater than 0")]
	AmountNotPositive,
	/// The amount exceeds the maximum accepted value.
	#[error("Amount cannot exceed 999999.99")]
	AmountTooLarge,
	/// The delivery address is empty or whitespace-only.
	#[error("Delivery address is required")]
	DeliveryAddressRequired,
	/// The delivery address exceeds the maximum length.
	#[error("Delivery address cannot exceed {MAX_DELIVERY_ADDRESS_LEN} characters")]
	DeliveryAddressTooLong,
}

impl OrderRequest {
	/// Validates the creation request against the order intake rules.
	///
	/// Rules are checked in order: product name, amount, delivery address.
	/// The first violated rule is returned. An invalid payment method cannot
	/// be expressed at this level; parsing failures are reported at the
	/// presentation boundary.
	pub fn validate(&self) -> Result<(), OrderValidationError> {
		let product_name = self.product_name.trim();
		if product_name.is_empty() {
			return Err(OrderValidationError::ProductNameRequired);
		}
		if product_name.len() > MAX_PRODUCT_NAME_LEN {
			return Err(OrderValidationError::ProductNameTooLong);
		}

		if self.amount <= Decimal::ZERO {
			return Err(OrderValidationError::AmountNotPositive);
		}
		if self.amount > max_order_amount() {
			return Err(OrderValidationError::AmountTooLarge);
		}

		let delivery_address = self.delivery_address.trim();
		if delivery_address.is_empty() {
			return Err(OrderValidationError::DeliveryAddressRequired);
		}
		if delivery_address.len() > MAX_DELIVERY_ADDRESS_LEN {
			return Err(OrderValidationError::DeliveryAddressTooLong);
		}

		Ok(())
	}
}
