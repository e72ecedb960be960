//! Print the link budget for the default bench parameters.
//!
//! Run with `cargo run --example link_budget`.

use fso_core::link_budget::compute_link_budget;
use fso_core::{LinkParameters, LossSelectors};

fn main() {
    let params = LinkParameters::default();
    let report = compute_link_budget(&params, &LossSelectors::all_enabled());

    println!("{report}");
    println!(
        "constant loss factor (linear): {:.4e}",
        report.constant_loss_linear()
    );
    println!("link margin: {:.2} dB", report.link_margin_db());
}
