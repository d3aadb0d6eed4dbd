//! Plain-text invoice rendering for order downloads.
//!
//! Fixed-layout document: company header, order metadata, billing block,
//! itemized table with a flat 10% tax per line, then subtotal, total tax and
//! grand total.

use rust_decimal::Decimal;

use crate::db::OrderGraph;

const COMPANY_NAME: &str = "My ECommerce App";
const COMPANY_ADDRESS: &str = "1234 Business Rd, Suite 100\nCityville, ST 12345";
const TAX_RATE_PERCENT: u32 = 10;

const PAGE_WIDTH: usize = 92;

fn money(value: Decimal) -> String {
    format!("${:.2}", value.round_dp(2))
}

fn rule(buf: &mut String) {
    buf.push_str(&"-".repeat(PAGE_WIDTH));
    buf.push('\n');
}

/// Render a complete invoice for the given order graph.
///
/// Line tax is `line total * 10%`; the grand total is the sum of taxed line
/// totals. An order line whose product row has since been deleted is shown
/// with a placeholder description rather than dropped, so the arithmetic
/// still accounts for every line.
#[must_use]
pub fn render_invoice(graph: &OrderGraph) -> String {
    let tax_rate = Decimal::from(TAX_RATE_PERCENT) / Decimal::from(100);

    let mut out = String::new();

    out.push_str(COMPANY_NAME);
    out.push('\n');
    out.push_str(COMPANY_ADDRESS);
    out.push('\n');
    out.push('\n');
    out.push_str(&format!("Invoice #{}\n", graph.order.id));
    out.push_str(&format!(
        "Date: {}\n",
        graph.order.order_date.get(..10).unwrap_or(&graph.order.order_date)
    ));
    rule(&mut out);

    out.push_str("Bill To:\n");
    if let Some(user) = &graph.user {
        match &user.last_name {
            Some(last) => out.push_str(&format!("{} {}\n", user.first_name, last)),
            None => out.push_str(&format!("{}\n", user.first_name)),
        }
        out.push_str(&format!("Email: {}\n", user.email));
    } else {
        out.push_str("(customer record removed)\n");
    }
    out.push('\n');
    out.push_str("Payment Details:\n");
    out.push_str("Payment not recorded.\n");
    rule(&mut out);

    out.push_str(&format!(
        "{:<40} {:>5} {:>12} {:>7} {:>10} {:>12}\n",
        "Description", "Qty", "Unit Price", "Tax %", "Tax Amt", "Total"
    ));
    rule(&mut out);

    let mut subtotal = Decimal::ZERO;
    let mut total_tax = Decimal::ZERO;
    let mut grand_total = Decimal::ZERO;

    for (item, product) in &graph.items {
        let mut description = product.as_ref().map_or_else(
            || "(product removed)".to_string(),
            |p| format!("{} - {}", p.name, p.description),
        );
        if description.chars().count() > 40 {
            description = description.chars().take(37).collect();
            description.push_str("...");
        }

        let line_total = item.unit_price * Decimal::from(item.quantity);
        let tax_amount = (line_total * tax_rate).round_dp(2);
        let taxed_total = line_total + tax_amount;

        subtotal += line_total;
        total_tax += tax_amount;
        grand_total += taxed_total;

        out.push_str(&format!(
            "{:<40} {:>5} {:>12} {:>6}% {:>10} {:>12}\n",
            description,
            item.quantity,
            money(item.unit_price),
            TAX_RATE_PERCENT,
            money(tax_amount),
            money(taxed_total)
        ));
    }

    rule(&mut out);
    out.push_str(&format!("{:>79} {:>12}\n", "Subtotal:", money(subtotal)));
    out.push_str(&format!("{:>79} {:>12}\n", "Total Tax:", money(total_tax)));
    out.push_str(&format!("{:>79} {:>12}\n", "Grand Total:", money(grand_total)));
    out.push('\n');
    rule(&mut out);
    out.push_str("Thank you for your business!\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{order_items, orders, products, users};

    fn sample_graph() -> OrderGraph {
        let order = orders::Model {
            id: "Ord0007".to_string(),
            user_id: "Cust0001".to_string(),
            order_date: "2026-03-14T09:26:53Z".to_string(),
            total_amount: Decimal::new(3000, 2),
        };
        let user = users::Model {
            id: "Cust0001".to_string(),
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
            gender: "Female".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            image_path: None,
            date_of_birth: "1990-01-01".to_string(),
            mobile: "0300-0000000".to_string(),
            address: "1 Analytical Way".to_string(),
            country_id: 1,
            state_id: 1,
            city_id: 1,
        };
        let product = products::Model {
            id: "Prod001".to_string(),
            name: "Mug".to_string(),
            description: "Ceramic".to_string(),
            price: Decimal::new(1000, 2),
            stock: 5,
            image_url: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            category_id: 1,
        };
        let item = order_items::Model {
            id: "OI001".to_string(),
            order_id: "Ord0007".to_string(),
            product_id: "Prod001".to_string(),
            quantity: 3,
            unit_price: Decimal::new(1000, 2),
        };
        OrderGraph {
            order,
            user: Some(user),
            items: vec![(item, Some(product))],
        }
    }

    #[test]
    fn totals_include_ten_percent_tax() {
        let text = render_invoice(&sample_graph());

        assert!(text.contains("Subtotal:"));
        assert!(text.contains("$30.00"));
        assert!(text.contains("$3.00"));
        assert!(text.contains("$33.00"));
    }

    #[test]
    fn header_and_footer_are_present() {
        let text = render_invoice(&sample_graph());

        assert!(text.starts_with("My ECommerce App"));
        assert!(text.contains("Invoice #Ord0007"));
        assert!(text.contains("Date: 2026-03-14"));
        assert!(text.contains("Bill To:"));
        assert!(text.contains("Ada Lovelace"));
        assert!(text.contains("Email: ada@example.com"));
        assert!(text.trim_end().ends_with("Thank you for your business!"));
    }

    #[test]
    fn missing_product_rows_keep_their_line() {
        let mut graph = sample_graph();
        graph.items[0].1 = None;

        let text = render_invoice(&graph);
        assert!(text.contains("(product removed)"));
        assert!(text.contains("$33.00"));
    }
}
