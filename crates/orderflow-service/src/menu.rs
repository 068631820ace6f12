//! Interactive console menu for the orderflow service.
//!
//! Presentation layer only: the menu gathers input, re-prompts on
//! unparseable values, and renders the outcomes the lifecycle engine
//! reports. All decision logic lives in the engine.

use orderflow_core::{LifecycleEngine, LifecycleError};
use orderflow_types::{CustomerType, Order, OrderRequest, OrderStatus, PaymentMethod};
use rust_decimal::Decimal;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Console menu driving the lifecycle engine.
pub struct Menu {
	engine: Arc<LifecycleEngine>,
	lines: Lines<BufReader<Stdin>>,
}

impl Menu {
	/// Creates a new menu reading from standard input.
	pub fn new(engine: Arc<LifecycleEngine>) -> Self {
		Self {
			engine,
			lines: BufReader::new(tokio::io::stdin()).lines(),
		}
	}

	/// Runs the menu loop until the user exits or input ends.
	pub async fn run(mut self) -> std::io::Result<()> {
		loop {
			println!();
			println!("Order Management System");
			println!("1 Create Order");
			println!("2 Send Order to Warehouse");
			println!("3 Send Order to Shipping");
			println!("4 View Orders");
			println!("5 Cancel Order");
			println!("6 Delete Order");
			println!("7 Exit");

			let choice = match self.prompt("Choose an option: ").await? {
				Some(line) => line,
				None => return Ok(()),
			};

			match choice.trim() {
				"1" => self.create_order().await?,
				"2" => self.send_to_warehouse().await?,
				"3" => self.send_to_shipping().await?,
				"4" => self.view_orders().await,
				"5" => self.cancel_order().await?,
				"6" => self.delete_order().await?,
				"7" => return Ok(()),
				_ => println!("Invalid choice, try again."),
			}
		}
	}

	/// Prints a prompt and reads the next input line.
	///
	/// Returns None when standard input has been closed.
	async fn prompt(&mut self, text: &str) -> std::io::Result<Option<String>> {
		print!("{}", text);
		std::io::stdout().flush()?;
		self.lines.next_line().await
	}

	async fn create_order(&mut self) -> std::io::Result<()> {
		let product_name = match self.prompt("Enter product name: ").await? {
			Some(line) => line,
			None => return Ok(()),
		};

		let amount = loop {
			match self.prompt("Enter amount: ").await? {
				Some(line) => match line.trim().parse::<Decimal>() {
					Ok(amount) if amount > Decimal::ZERO => break amount,
					_ => println!("Invalid amount. Enter a positive number."),
				},
				None => return Ok(()),
			}
		};

		let customer = loop {
			match self
				.prompt("Enter customer type (1 - Individual, 2 - Company): ")
				.await?
			{
				Some(line) => match line.trim() {
					"1" => break CustomerType::Individual,
					"2" => break CustomerType::Company,
					_ => println!("Invalid choice. Enter 1 for Individual or 2 for Company."),
				},
				None => return Ok(()),
			}
		};

		let delivery_address = match self.prompt("Enter delivery address: ").await? {
			Some(line) => line,
			None => return Ok(()),
		};

		let payment = loop {
			match self
				.prompt("Enter payment method (1 - Card, 2 - Cash on Delivery): ")
				.await?
			{
				Some(line) => match line.trim() {
					"1" => break PaymentMethod::Card,
					"2" => break PaymentMethod::CashOnDelivery,
					_ => println!("Invalid choice. Enter 1 for Card or 2 for Cash on Delivery."),
				},
				None => return Ok(()),
			}
		};

		let request = OrderRequest {
			product_name,
			amount,
			customer,
			delivery_address,
			payment,
		};

		match self.engine.create_order(request).await {
			Ok(order) => println!("Order successfully created! ID: {}", order.id),
			Err(e) => print_error(&e),
		}
		Ok(())
	}

	async fn send_to_warehouse(&mut self) -> std::io::Result<()> {
		self.show_compact_order_list().await;

		let order_id = match self.prompt("Enter order ID: ").await? {
			Some(line) => line.trim().to_string(),
			None => return Ok(()),
		};

		match self.engine.send_to_warehouse(&order_id).await {
			Ok(order) if order.status == OrderStatus::ReturnedToCustomer => {
				println!("Order returned to customer due to payment policy.");
			},
			Ok(_) => println!("Order moved to warehouse."),
			Err(e) => print_error(&e),
		}
		Ok(())
	}

	async fn send_to_shipping(&mut self) -> std::io::Result<()> {
		self.show_compact_order_list().await;

		let order_id = match self.prompt("Enter order ID: ").await? {
			Some(line) => line.trim().to_string(),
			None => return Ok(()),
		};

		println!("Order is being shipped...");
		match self.engine.send_to_shipping(&order_id).await {
			Ok(order) if order.status == OrderStatus::Error => {
				println!("Error: Missing delivery address.");
			},
			Ok(_) => println!("Order shipped successfully!"),
			Err(e) => print_error(&e),
		}
		Ok(())
	}

	async fn cancel_order(&mut self) -> std::io::Result<()> {
		self.show_compact_order_list().await;

		let order_id = match self.prompt("Enter order ID: ").await? {
			Some(line) => line.trim().to_string(),
			None => return Ok(()),
		};

		match self.engine.cancel_order(&order_id).await {
			Ok(_) => println!("Order cancelled successfully!"),
			Err(e) => print_error(&e),
		}
		Ok(())
	}

	async fn delete_order(&mut self) -> std::io::Result<()> {
		self.show_compact_order_list().await;

		let order_id = match self.prompt("Enter order ID: ").await? {
			Some(line) => line.trim().to_string(),
			None => return Ok(()),
		};

		match self.engine.delete_order(&order_id).await {
			Ok(()) => println!("Order deleted."),
			Err(e) => print_error(&e),
		}
		Ok(())
	}

	async fn view_orders(&self) {
		let orders = match self.engine.list_orders().await {
			Ok(orders) => orders,
			Err(e) => {
				print_error(&e);
				return;
			},
		};

		if orders.is_empty() {
			println!("No orders found.");
			return;
		}

		println!();
		println!("=== ORDER LIST ===");
		for order in &orders {
			print_order(order);
		}
		println!();
	}

	/// Shows a compact order list so the user can pick an id.
	async fn show_compact_order_list(&self) {
		let orders = match self.engine.list_orders().await {
			Ok(orders) => orders,
			Err(e) => {
				print_error(&e);
				return;
			},
		};

		if orders.is_empty() {
			println!("No orders found.");
			return;
		}

		println!();
		println!("Available Orders:");
		for order in &orders {
			println!(
				"{} - {} | Status: {}",
				order.product_name, order.id, order.status
			);
		}
		println!();
	}
}

/// Renders an amount with exactly two decimal places.
fn format_amount(amount: Decimal) -> String {
	let mut amount = amount.round_dp(2);
	amount.rescale(2);
	amount.to_string()
}

fn print_order(order: &Order) {
	println!();
	println!("----------------------------------------");
	println!("Order ID: {}", order.id);
	println!("Product: {}", order.product_name);
	println!("Amount: ${}", format_amount(order.amount));
	println!("Status: {}", order.status);
	println!("Customer Type: {}", order.customer);
	println!("Payment Method: {}", order.payment);
	println!("Delivery Address: {}", order.delivery_address);
	println!("----------------------------------------");
}

fn print_error(error: &LifecycleError) {
	println!("Error: {}", error);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_format_amount_two_decimals() {
		assert_eq!(format_amount(Decimal::from(100)), "100.00");
		assert_eq!(format_amount("12.5".parse().unwrap()), "12.50");
		assert_eq!(format_amount("99.999".parse().unwrap()), "100.00");
		assert_eq!(format_amount("0.01".parse().unwrap()), "0.01");
	}
}
